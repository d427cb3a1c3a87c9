// 该文件是 Mingmu （明目） 项目的一部分。
// src/output/save_image_file.rs - 保存图像文件
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

use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
  frame::RgbFrame,
  model::{DetectResult, WithLabel},
  output::{
    Render, RenderSummary,
    draw::{Annotator, Draw, DrawError, Record},
    preview::open_preview,
  },
};

pub struct SaveImageFileOutput {
  path: PathBuf,
  annotator: Annotator,
  record: Option<Record>,
  preview: bool,
}

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("绘制错误: {0}")]
  DrawError(#[from] DrawError),
}

impl SaveImageFileOutput {
  pub fn new(path: impl AsRef<Path>) -> Result<Self, SaveImageFileError> {
    Ok(SaveImageFileOutput {
      path: path.as_ref().to_path_buf(),
      annotator: Annotator::new(Draw::new()?),
      record: None,
      preview: false,
    })
  }

  pub fn threshold(mut self, threshold: f32) -> Self {
    self.annotator = self.annotator.with_threshold(threshold);
    self
  }

  pub fn record(mut self, enabled: bool) -> Self {
    self.record = enabled.then_some(Record);
    self
  }

  pub fn preview(mut self, enabled: bool) -> Self {
    self.preview = enabled;
    self
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn save_image(&self, image: &RgbImage) -> Result<(), SaveImageFileError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    image.save(&self.path)?;

    info!("保存图像到文件: {}", self.path.display());

    Ok(())
  }
}

impl<T: WithLabel> Render<RgbFrame, DetectResult<T>> for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(
    &self,
    frame: &RgbFrame,
    result: &DetectResult<T>,
  ) -> Result<RenderSummary, Self::Error> {
    let mut image = frame.image().clone();
    let retained = self.annotator.annotate(&mut image, result);
    info!(
      "保留 {} / {} 个检测结果 (阈值 {:.2})",
      retained,
      result.len(),
      self.annotator.threshold()
    );

    self.save_image(&image)?;

    if let Some(record) = &self.record {
      record.record(&self.annotator, result, &self.path)?;
      info!("检测记录已写入: {}", self.path.with_extension("json").display());
    }

    if retained == 0 {
      warn!("没有置信度不低于阈值的检测结果");
    }

    if self.preview {
      open_preview(&self.path);
    }

    Ok(RenderSummary {
      retained,
      path: self.path.clone(),
    })
  }
}
