// 该文件是 Mingmu （明目） 项目的一部分。
// src/model.rs - 模型
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

use thiserror::Error;

mod coco;
pub use self::coco::{COCO_INSTANCE_CATEGORY_NAMES, CocoLabel};

mod faster_rcnn;
pub use self::faster_rcnn::{FasterRcnn, FasterRcnnBuilder, FasterRcnnError};

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, Clone)]
pub struct DetectItem<T> {
  pub kind: T,
  pub score: f32,
  pub bbox: [f32; 4], // [x_min, y_min, x_max, y_max]，原图像素坐标
}

/// 一次推理的全部检测结果，保持模型输出顺序
#[derive(Debug, Clone)]
pub struct DetectResult<T> {
  pub items: Box<[DetectItem<T>]>,
}

pub trait WithLabel: Sized + std::fmt::Debug {
  fn to_label_str(&self) -> String;
  fn from_label_id(id: u32) -> Self;
  fn to_label_id(&self) -> u32;
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PostprocessError {
  #[error("输出长度不一致: boxes={boxes}, labels={labels}, scores={scores}")]
  ShapeMismatch {
    boxes: usize,
    labels: usize,
    scores: usize,
  },
}

impl<T> DetectResult<T> {
  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}

impl<T: WithLabel> DetectResult<T> {
  /// 由三路并行输出（框、类别、置信度）组装检测结果
  ///
  /// `boxes` 为按行展开的 `[N, 4]`，`labels`、`scores` 长度均为 `N`。
  pub fn from_parallel(
    boxes: &[f32],
    labels: &[i64],
    scores: &[f32],
  ) -> Result<Self, PostprocessError> {
    if boxes.len() != labels.len() * 4 || labels.len() != scores.len() {
      return Err(PostprocessError::ShapeMismatch {
        boxes: boxes.len(),
        labels: labels.len(),
        scores: scores.len(),
      });
    }

    let items = boxes
      .chunks_exact(4)
      .zip(labels)
      .zip(scores)
      .map(|((bbox, &label), &score)| DetectItem {
        // 负数类别号映射到表外，渲染为占位符
        kind: T::from_label_id(u32::try_from(label).unwrap_or(u32::MAX)),
        score,
        bbox: [bbox[0], bbox[1], bbox[2], bbox[3]],
      })
      .collect::<Vec<_>>();

    Ok(DetectResult {
      items: items.into_boxed_slice(),
    })
  }
}
