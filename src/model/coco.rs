// 该文件是 Mingmu （明目） 项目的一部分。
// src/model/coco.rs - COCO 类别表
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

use tracing::warn;

use crate::model::WithLabel;

const PLACEHOLDER: &str = "N/A";

/// torchvision COCO 检测模型的类别表
///
/// 下标与模型输出的类别号一一对应：0 为背景，数据集中未标注的类别号保留为 `N/A`。
/// 表项顺序不可调整，否则标签会静默错位。
#[rustfmt::skip]
pub const COCO_INSTANCE_CATEGORY_NAMES: [&str; 91] = [
  "__background__", "person", "bicycle", "car", "motorcycle", "airplane",
  "bus", "train", "truck", "boat", "traffic light", "fire hydrant",
  "N/A", "stop sign", "parking meter", "bench", "bird", "cat",
  "dog", "horse", "sheep", "cow", "elephant", "bear",
  "zebra", "giraffe", "N/A", "backpack", "umbrella", "N/A",
  "N/A", "handbag", "tie", "suitcase", "frisbee", "skis",
  "snowboard", "sports ball", "kite", "baseball bat", "baseball glove", "skateboard",
  "surfboard", "tennis racket", "bottle", "N/A", "wine glass", "cup",
  "fork", "knife", "spoon", "bowl", "banana", "apple",
  "sandwich", "orange", "broccoli", "carrot", "hot dog", "pizza",
  "donut", "cake", "chair", "couch", "potted plant", "bed",
  "N/A", "dining table", "N/A", "N/A", "toilet", "N/A",
  "tv", "laptop", "mouse", "remote", "keyboard", "cell phone",
  "microwave", "oven", "toaster", "sink", "refrigerator", "N/A",
  "book", "clock", "vase", "scissors", "teddy bear", "hair drier",
  "toothbrush",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CocoLabel(u32);

impl WithLabel for CocoLabel {
  fn to_label_str(&self) -> String {
    match COCO_INSTANCE_CATEGORY_NAMES.get(self.0 as usize) {
      Some(name) => name.to_string(),
      None => {
        warn!("类别号 {} 超出类别表范围", self.0);
        PLACEHOLDER.to_string()
      }
    }
  }

  fn from_label_id(id: u32) -> Self {
    CocoLabel(id)
  }

  fn to_label_id(&self) -> u32 {
    self.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn table_matches_torchvision_label_space() {
    assert_eq!(COCO_INSTANCE_CATEGORY_NAMES.len(), 91);
    assert_eq!(CocoLabel::from_label_id(1).to_label_str(), "person");
    assert_eq!(CocoLabel::from_label_id(3).to_label_str(), "car");
    assert_eq!(CocoLabel::from_label_id(18).to_label_str(), "dog");
    assert_eq!(CocoLabel::from_label_id(90).to_label_str(), "toothbrush");
  }

  #[test]
  fn reserved_indices_are_placeholders() {
    let reserved: Vec<usize> = COCO_INSTANCE_CATEGORY_NAMES
      .iter()
      .enumerate()
      .filter(|(_, name)| **name == PLACEHOLDER)
      .map(|(i, _)| i)
      .collect();
    assert_eq!(reserved, vec![12, 26, 29, 30, 45, 66, 68, 69, 71, 83]);
  }

  #[test]
  fn background_and_out_of_range_do_not_panic() {
    assert_eq!(CocoLabel::from_label_id(0).to_label_str(), "__background__");
    assert_eq!(CocoLabel::from_label_id(12).to_label_str(), "N/A");
    assert_eq!(CocoLabel::from_label_id(91).to_label_str(), "N/A");
    assert_eq!(CocoLabel::from_label_id(u32::MAX).to_label_str(), "N/A");
  }
}
