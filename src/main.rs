// 该文件是 Mingmu （明目） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use mingmu::{
  frame::RgbFrame,
  input::InputWrapper,
  model::{CocoLabel, FasterRcnn, FasterRcnnBuilder},
  output::SaveImageFileOutput,
  task::{OneShotTask, Task},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("模型文件路径: {}", args.model.display());
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output.display());
  info!("置信度阈值: {}", args.threshold);

  let model: FasterRcnn<RgbFrame, CocoLabel> = FasterRcnnBuilder::new(&args.model)
    .intra_threads(args.threads)
    .normalization(args.normalize.into())
    .build()?;

  let input = InputWrapper::from_source(&args.input)?;
  info!("输入源已打开: {:?}", input.kind());

  let output = SaveImageFileOutput::new(&args.output)?
    .threshold(args.threshold)
    .record(args.record)
    .preview(args.show);

  let summary = OneShotTask.run_task(input.into_frames(), model, output)?;

  println!("检测到 {} 个目标", summary.retained);
  info!("结果已保存: {}", summary.path.display());

  Ok(())
}
