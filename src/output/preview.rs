// 该文件是 Mingmu （明目） 项目的一部分。
// src/output/preview.rs - 调用系统图片查看器预览结果
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

use std::{
  path::Path,
  process::{Command, Stdio},
};

use tracing::{info, warn};

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> Command {
  let mut command = Command::new("open");
  command.arg(path);
  command
}

#[cfg(target_os = "windows")]
fn viewer_command(path: &Path) -> Command {
  let mut command = Command::new("cmd");
  command.args(["/C", "start", ""]).arg(path);
  command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn viewer_command(path: &Path) -> Command {
  let mut command = Command::new("xdg-open");
  command.arg(path);
  command
}

/// 在系统默认查看器中打开图片；无图形环境时仅记录警告
pub fn open_preview(path: &Path) {
  let spawned = viewer_command(path)
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn();

  match spawned {
    Ok(_) => info!("已打开预览: {}", path.display()),
    Err(e) => warn!("无法打开预览窗口 {}: {}", path.display(), e),
  }
}
