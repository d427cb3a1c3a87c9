// 该文件是 Mingmu （明目） 项目的一部分。
// src/frame.rs - RGB 帧与 NCHW 张量定义
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

use image::RgbImage;

const RGB_CHANNELS: usize = 3;
const BATCH_SIZE: usize = 1;

pub trait ToNchwTensor {
  fn to_nchw(&self, normalization: &Normalization) -> NchwTensor;
}

/// 解码后的单帧 RGB 图像
#[derive(Debug, Clone)]
pub struct RgbFrame {
  image: RgbImage,
}

impl From<RgbImage> for RgbFrame {
  fn from(image: RgbImage) -> Self {
    Self { image }
  }
}

impl RgbFrame {
  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }

  pub fn image(&self) -> &RgbImage {
    &self.image
  }

  pub fn into_image(self) -> RgbImage {
    self.image
  }
}

/// 逐通道归一化参数，先除以 255 再做 `(v - mean) / std`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
  pub mean: [f32; RGB_CHANNELS],
  pub std: [f32; RGB_CHANNELS],
}

impl Normalization {
  /// 仅缩放到 [0, 1]
  pub const UNIT: Self = Self {
    mean: [0.0, 0.0, 0.0],
    std: [1.0, 1.0, 1.0],
  };

  pub const IMAGENET: Self = Self {
    mean: [0.485, 0.456, 0.406],
    std: [0.229, 0.224, 0.225],
  };

  fn apply(&self, channel: usize, value: u8) -> f32 {
    (value as f32 / 255.0 - self.mean[channel]) / self.std[channel]
  }
}

impl Default for Normalization {
  fn default() -> Self {
    Self::UNIT
  }
}

/// 形状为 [1, 3, H, W] 的浮点张量
#[derive(Debug, Clone)]
pub struct NchwTensor {
  shape: [usize; 4],
  data: Box<[f32]>,
}

impl NchwTensor {
  pub fn shape(&self) -> [usize; 4] {
    self.shape
  }

  pub fn batch(&self) -> usize {
    self.shape[0]
  }

  pub fn channels(&self) -> usize {
    self.shape[1]
  }

  pub fn height(&self) -> usize {
    self.shape[2]
  }

  pub fn width(&self) -> usize {
    self.shape[3]
  }

  pub fn as_slice(&self) -> &[f32] {
    &self.data
  }

  pub fn into_parts(self) -> ([usize; 4], Vec<f32>) {
    (self.shape, self.data.into_vec())
  }
}

impl ToNchwTensor for RgbImage {
  fn to_nchw(&self, normalization: &Normalization) -> NchwTensor {
    let (width, height) = (self.width() as usize, self.height() as usize);
    let plane_size = width * height;
    let mut data = vec![0f32; BATCH_SIZE * RGB_CHANNELS * plane_size];

    for (x, y, pixel) in self.enumerate_pixels() {
      let idx = (y as usize) * width + (x as usize);
      for c in 0..RGB_CHANNELS {
        data[c * plane_size + idx] = normalization.apply(c, pixel[c]);
      }
    }

    NchwTensor {
      shape: [BATCH_SIZE, RGB_CHANNELS, height, width],
      data: data.into_boxed_slice(),
    }
  }
}

impl ToNchwTensor for RgbFrame {
  fn to_nchw(&self, normalization: &Normalization) -> NchwTensor {
    self.image.to_nchw(normalization)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;

  #[test]
  fn nchw_layout_has_batch_dim_and_channel_planes() {
    let mut image = RgbImage::new(2, 3);
    image.put_pixel(1, 2, Rgb([255, 0, 51]));

    let tensor = RgbFrame::from(image).to_nchw(&Normalization::UNIT);
    assert_eq!(tensor.shape(), [1, 3, 3, 2]);

    let plane = 2 * 3;
    let idx = 2 * 2 + 1;
    let data = tensor.as_slice();
    assert_eq!(data.len(), 3 * plane);
    assert_eq!(data[idx], 1.0);
    assert_eq!(data[plane + idx], 0.0);
    assert!((data[2 * plane + idx] - 0.2).abs() < 1e-6);
    assert_eq!(data[0], 0.0);
  }

  #[test]
  fn imagenet_normalization_shifts_and_scales() {
    let image = RgbImage::from_pixel(1, 1, Rgb([0, 0, 0]));
    let tensor = image.to_nchw(&Normalization::IMAGENET);
    let data = tensor.as_slice();
    assert!((data[0] - (-0.485 / 0.229)).abs() < 1e-5);
    assert!((data[1] - (-0.456 / 0.224)).abs() < 1e-5);
    assert!((data[2] - (-0.406 / 0.225)).abs() < 1e-5);
  }
}
