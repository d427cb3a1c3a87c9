// 该文件是 Mingmu （明目） 项目的一部分。
// src/task.rs - 推理任务
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::time::Instant;

use tracing::info;

use crate::{
  model::Model,
  output::{Render, RenderSummary},
};

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

/// 取一帧、推理一次、渲染一次
pub struct OneShotTask;

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Output = RenderSummary;
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始推理...");

    let now = Instant::now();
    let result = model.infer(&frame)?;
    info!("推理完成，耗时: {:.2?}", now.elapsed());

    let now = Instant::now();
    let summary = output.render_result(&frame, &result)?;
    info!("渲染完成，耗时: {:.2?}", now.elapsed());

    Ok(summary)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    frame::RgbFrame,
    model::{CocoLabel, DetectItem, DetectResult, WithLabel},
    output::SaveImageFileOutput,
  };
  use image::{Rgb, RgbImage};
  use std::{convert::Infallible, path::PathBuf};

  // 固定返回一个检测结果的替身模型
  struct StubModel {
    score: f32,
  }

  impl Model for StubModel {
    type Input = RgbFrame;
    type Output = DetectResult<CocoLabel>;
    type Error = Infallible;

    fn infer(&self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
      Ok(DetectResult {
        items: vec![DetectItem {
          kind: CocoLabel::from_label_id(1),
          score: self.score,
          bbox: [10.0, 10.0, 50.0, 50.0],
        }]
        .into_boxed_slice(),
      })
    }
  }

  fn output_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mingmu-task-{}-{}.png", name, std::process::id()))
  }

  fn run(score: f32, name: &str) -> (RenderSummary, RgbImage) {
    let path = output_path(name);
    let input = vec![RgbFrame::from(RgbImage::new(100, 100))].into_iter();
    let output = SaveImageFileOutput::new(&path)
      .expect("output")
      .threshold(0.5);

    let summary = OneShotTask
      .run_task(input, StubModel { score }, output)
      .expect("task");
    let image = image::open(&path).expect("saved image").to_rgb8();
    let _ = std::fs::remove_file(&path);
    (summary, image)
  }

  #[test]
  fn confident_detection_is_drawn_and_counted() {
    let (summary, image) = run(0.9, "kept");
    assert_eq!(summary.retained, 1);

    let red = Rgb([255, 0, 0]);
    assert_eq!(image.get_pixel(10, 30), &red);
    assert_eq!(image.get_pixel(50, 30), &red);
    assert_eq!(image.get_pixel(30, 50), &red);
    assert_eq!(image.get_pixel(30, 40), &Rgb([0, 0, 0]));
    assert_eq!(image.get_pixel(70, 70), &Rgb([0, 0, 0]));
  }

  #[test]
  fn weak_detection_leaves_image_untouched() {
    let (summary, image) = run(0.3, "skipped");
    assert_eq!(summary.retained, 0);
    assert!(image.pixels().all(|p| *p == Rgb([0, 0, 0])));
  }

  #[test]
  fn empty_input_is_an_error() {
    let path = output_path("empty");
    let output = SaveImageFileOutput::new(&path).expect("output");
    let result = OneShotTask.run_task(
      std::iter::empty::<RgbFrame>(),
      StubModel { score: 0.9 },
      output,
    );
    assert!(result.is_err());
    assert!(!path.exists());
  }
}
