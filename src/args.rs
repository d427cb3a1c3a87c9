// 该文件是 Mingmu （明目） 项目的一部分。
// src/args.rs - 项目参数配置
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

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use mingmu::frame::Normalization;

/// 输入张量归一化方式
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeKind {
  /// 仅缩放到 [0, 1]（torchvision 检测模型在图内自行归一化）
  Unit,
  /// ImageNet 均值/方差
  Imagenet,
}

impl From<NormalizeKind> for Normalization {
  fn from(kind: NormalizeKind) -> Self {
    match kind {
      NormalizeKind::Unit => Normalization::UNIT,
      NormalizeKind::Imagenet => Normalization::IMAGENET,
    }
  }
}

fn parse_threshold(value: &str) -> Result<f32, String> {
  let threshold: f32 = value
    .parse()
    .map_err(|e| format!("无效的阈值 '{}': {}", value, e))?;
  if (0.0..=1.0).contains(&threshold) {
    Ok(threshold)
  } else {
    Err(format!("阈值必须在 0.0 到 1.0 之间, 实际为 {}", threshold))
  }
}

/// 明目：单张图片目标检测与标注
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// ONNX 模型文件路径（torchvision Faster R-CNN 导出，输出 boxes/labels/scores）
  #[arg(long, value_name = "FILE")]
  pub model: PathBuf,

  /// 输入来源：http(s) 图片地址或本地图片路径
  #[arg(long, value_name = "SOURCE")]
  pub input: String,

  /// 输出图片路径，格式由扩展名决定
  #[arg(long, value_name = "FILE", default_value = "output_detected.jpg")]
  pub output: PathBuf,

  /// 置信度阈值 (0.0 - 1.0)，等于阈值的结果会保留
  #[arg(long, default_value = "0.5", value_name = "THRESHOLD", value_parser = parse_threshold)]
  pub threshold: f32,

  /// 输入张量归一化方式
  #[arg(long, value_enum, default_value_t = NormalizeKind::Unit)]
  pub normalize: NormalizeKind,

  /// ONNX Runtime 线程数
  #[arg(long, default_value = "4", value_name = "COUNT")]
  pub threads: usize,

  /// 完成后在系统图片查看器中打开结果
  #[arg(long)]
  pub show: bool,

  /// 同时写出 JSON 检测记录（与输出图片同名）
  #[arg(long)]
  pub record: bool,
}
