// 该文件是 Mingmu （明目） 项目的一部分。
// src/output/draw.rs - 目标检测结果可视化
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

use std::path::Path;

use ab_glyph::{FontRef, InvalidFont, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
  drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size},
  rect::Rect,
};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::model::{DetectItem, DetectResult, WithLabel};

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_PADDING: i32 = 2;
const LINE_WIDTH: i32 = 3;
const BOX_COLOR: [u8; 3] = [255, 0, 0]; // 红色
const TEXT_COLOR: [u8; 3] = [255, 255, 255];

pub const DEFAULT_THRESHOLD: f32 = 0.5;

static DEFAULT_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

#[derive(Error, Debug)]
pub enum DrawError {
  #[error("无法加载字体: {0}")]
  InvalidFont(#[from] InvalidFont),
}

pub struct Draw {
  font: FontRef<'static>,
  font_size: f32,
  line_width: i32,
  box_color: [u8; 3],
  text_color: [u8; 3],
}

impl Draw {
  pub fn new() -> Result<Self, DrawError> {
    Self::with_font(DEFAULT_FONT)
  }

  pub fn with_font(font_data: &'static [u8]) -> Result<Self, DrawError> {
    Ok(Self {
      font: FontRef::try_from_slice(font_data)?,
      font_size: LABEL_FONT_SIZE,
      line_width: LINE_WIDTH,
      box_color: BOX_COLOR,
      text_color: TEXT_COLOR,
    })
  }

  // 在图像上绘制边框与标签，bbox 为像素坐标 [x_min, y_min, x_max, y_max]
  fn draw_bbox_with_label(&self, image: &mut RgbImage, bbox: &[f32; 4], label: &str) {
    let (w, h) = (image.width() as i32, image.height() as i32);
    if w == 0 || h == 0 {
      return;
    }

    // 限制在图像附近，避免超大坐标导致无谓的描线
    let x_min = (bbox[0].round() as i32).clamp(-self.line_width, w + self.line_width);
    let y_min = (bbox[1].round() as i32).clamp(-self.line_width, h + self.line_width);
    let x_max = (bbox[2].round() as i32).clamp(-self.line_width, w + self.line_width);
    let y_max = (bbox[3].round() as i32).clamp(-self.line_width, h + self.line_width);

    if x_min > x_max || y_min > y_max {
      debug!("跳过无效边框: {:?}", bbox);
      return;
    }

    // 边框向内加粗
    for t in 0..self.line_width {
      let (left, top, right, bottom) = (x_min + t, y_min + t, x_max - t, y_max - t);
      if left > right || top > bottom {
        break;
      }
      let rect = Rect::at(left, top).of_size((right - left + 1) as u32, (bottom - top + 1) as u32);
      draw_hollow_rect_mut(image, rect, Rgb(self.box_color));
    }

    let scale = PxScale::from(self.font_size);
    let (text_width, text_height) = text_size(scale, &self.font, label);

    // 标签放在边框上方，超出顶部时贴边
    let tag_width = text_width as i32 + 2 * LABEL_PADDING;
    let tag_height = text_height as i32 + 2 * LABEL_PADDING;
    let tag_x = x_min.clamp(0, w - 1);
    let tag_y = (y_min - tag_height).max(0);

    let rect = Rect::at(tag_x, tag_y).of_size(tag_width.max(1) as u32, tag_height.max(1) as u32);
    draw_filled_rect_mut(image, rect, Rgb(self.box_color));
    draw_text_mut(
      image,
      Rgb(self.text_color),
      tag_x + LABEL_PADDING,
      tag_y + LABEL_PADDING,
      scale,
      &self.font,
      label,
    );
  }
}

/// 按置信度阈值筛选检测结果并绘制
pub struct Annotator {
  threshold: f32,
  draw: Draw,
}

impl Annotator {
  pub fn new(draw: Draw) -> Self {
    Self {
      threshold: DEFAULT_THRESHOLD,
      draw,
    }
  }

  pub fn with_threshold(mut self, threshold: f32) -> Self {
    self.threshold = threshold;
    self
  }

  pub fn threshold(&self) -> f32 {
    self.threshold
  }

  /// 置信度不低于阈值的检测项，保持模型输出顺序；NaN 视为不达标
  pub fn retained<'r, T>(
    &self,
    result: &'r DetectResult<T>,
  ) -> impl Iterator<Item = &'r DetectItem<T>> + 'r {
    let threshold = self.threshold;
    result
      .items
      .iter()
      .filter(move |item| item.score >= threshold)
  }

  /// 在图像上绘制保留的检测项，返回保留数量
  pub fn annotate<T: WithLabel>(&self, image: &mut RgbImage, result: &DetectResult<T>) -> usize {
    let mut detected = 0;
    for DetectItem { kind, score, bbox } in self.retained(result) {
      let label = format!("{} ({:.2})", kind.to_label_str(), score);
      debug!("绘制 {} at {:?}", label, bbox);
      self.draw.draw_bbox_with_label(image, bbox, &label);
      detected += 1;
    }
    detected
  }
}

/// 以 JSON 形式记录保留的检测项
pub struct Record;

impl Record {
  pub fn record<T: WithLabel>(
    &self,
    annotator: &Annotator,
    result: &DetectResult<T>,
    path: &Path,
  ) -> Result<(), std::io::Error> {
    let records: Vec<_> = annotator
      .retained(result)
      .map(|item| {
        json!({
          "label": item.kind.to_label_str(),
          "label_id": item.kind.to_label_id(),
          "score": item.score,
          "bbox": item.bbox,
        })
      })
      .collect();

    let text = serde_json::to_string_pretty(&records)?;
    std::fs::write(path.with_extension("json"), text)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::CocoLabel;

  const RED: Rgb<u8> = Rgb([255, 0, 0]);
  const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

  fn result(items: &[([f32; 4], u32, f32)]) -> DetectResult<CocoLabel> {
    let items: Vec<_> = items
      .iter()
      .map(|&(bbox, label, score)| DetectItem {
        kind: CocoLabel::from_label_id(label),
        score,
        bbox,
      })
      .collect();
    DetectResult {
      items: items.into_boxed_slice(),
    }
  }

  fn annotator(threshold: f32) -> Annotator {
    Annotator::new(Draw::new().expect("embedded font")).with_threshold(threshold)
  }

  #[test]
  fn score_equal_to_threshold_is_kept() {
    let result = result(&[([10.0, 10.0, 50.0, 50.0], 1, 0.5)]);
    let mut image = RgbImage::new(100, 100);
    assert_eq!(annotator(0.5).annotate(&mut image, &result), 1);
  }

  #[test]
  fn score_below_threshold_is_skipped_and_not_counted() {
    let result = result(&[
      ([10.0, 10.0, 50.0, 50.0], 1, 0.49),
      ([60.0, 60.0, 90.0, 90.0], 3, 0.8),
    ]);
    let mut image = RgbImage::new(100, 100);
    assert_eq!(annotator(0.5).annotate(&mut image, &result), 1);
    assert_eq!(image.get_pixel(10, 40), &BLACK);
    assert_eq!(image.get_pixel(60, 80), &RED);
  }

  #[test]
  fn nan_score_is_never_kept() {
    let result = result(&[([10.0, 10.0, 50.0, 50.0], 1, f32::NAN)]);
    let mut image = RgbImage::new(100, 100);
    assert_eq!(annotator(0.0).annotate(&mut image, &result), 0);
  }

  #[test]
  fn rectangle_is_three_pixels_wide_inward() {
    let result = result(&[([10.0, 10.0, 50.0, 50.0], 1, 0.9)]);
    let mut image = RgbImage::new(100, 100);
    annotator(0.5).annotate(&mut image, &result);

    for x in [10, 11, 12, 48, 49, 50] {
      assert_eq!(image.get_pixel(x, 40), &RED, "x = {x}");
    }
    for y in [48, 49, 50] {
      assert_eq!(image.get_pixel(30, y), &RED, "y = {y}");
    }
    assert_eq!(image.get_pixel(13, 40), &BLACK);
    assert_eq!(image.get_pixel(30, 40), &BLACK);
    assert_eq!(image.get_pixel(9, 40), &BLACK);
    assert_eq!(image.get_pixel(51, 40), &BLACK);
  }

  #[test]
  fn placeholder_labels_and_odd_boxes_do_not_panic() {
    let result = result(&[
      ([5.0, 5.0, 20.0, 20.0], 0, 0.9),
      ([5.0, 5.0, 20.0, 20.0], 12, 0.9),
      ([5.0, 5.0, 20.0, 20.0], 500, 0.9),
      ([-40.0, -40.0, 400.0, 400.0], 1, 0.9),
      ([30.0, 30.0, 10.0, 10.0], 1, 0.9),
      ([99.6, 99.6, 99.9, 99.9], 1, 0.9),
    ]);
    let mut image = RgbImage::new(100, 100);
    assert_eq!(annotator(0.5).annotate(&mut image, &result), 6);
  }

  #[test]
  fn record_lists_only_retained_items() {
    let result = result(&[
      ([10.0, 10.0, 50.0, 50.0], 1, 0.9),
      ([0.0, 0.0, 5.0, 5.0], 18, 0.2),
    ]);
    let path = std::env::temp_dir().join(format!("mingmu-record-{}.jpg", std::process::id()));
    Record
      .record(&annotator(0.5), &result, &path)
      .expect("write record");

    let json_path = path.with_extension("json");
    let text = std::fs::read_to_string(&json_path).expect("read record");
    let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
    let records = value.as_array().expect("array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["label"], "person");
    assert_eq!(records[0]["label_id"], 1);

    let _ = std::fs::remove_file(&json_path);
  }
}
