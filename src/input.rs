// 该文件是 Mingmu （明目） 项目的一部分。
// src/input.rs - 图像输入
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

use thiserror::Error;
use tracing::{debug, error};

use crate::frame::RgbFrame;

mod read_image_file;
pub use self::read_image_file::{ImageFileInput, ImageFileInputError};

#[cfg(feature = "http_image")]
mod http_image;
#[cfg(feature = "http_image")]
pub use self::http_image::{HttpImageInput, HttpImageInputError};

const HTTP_PREFIXES: [&str; 2] = ["http://", "https://"];

#[derive(Error, Debug)]
pub enum InputError {
  #[error("Image file input error: {0}")]
  ImageFileInputError(#[from] ImageFileInputError),
  #[cfg(feature = "http_image")]
  #[error("Failed to load image from URL: {0}")]
  HttpImageInputError(#[from] HttpImageInputError),
  #[error("The provided path or URL is not valid: {0}")]
  NotFound(String),
  #[error("HTTP input is not enabled in this build: {0}")]
  HttpDisabled(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
  Http,
  File,
}

/// 根据来源字符串判断走网络还是文件系统
pub fn source_kind(source: &str) -> SourceKind {
  let source = normalize_source(source);
  if HTTP_PREFIXES.iter().any(|prefix| source.starts_with(prefix)) {
    SourceKind::Http
  } else {
    SourceKind::File
  }
}

// 去掉首尾空白以及一对包裹的尖括号，例如 `<https://...>`
fn normalize_source(source: &str) -> &str {
  let source = source.trim();
  source
    .strip_prefix('<')
    .and_then(|s| s.strip_suffix('>'))
    .map(str::trim)
    .unwrap_or(source)
}

pub enum InputWrapper {
  #[cfg(feature = "http_image")]
  HttpImage(HttpImageInput),
  ReadImageFile(ImageFileInput),
}

impl InputWrapper {
  pub fn from_source(source: &str) -> Result<Self, InputError> {
    let normalized = normalize_source(source);
    debug!("输入来源: {}", normalized);

    match source_kind(normalized) {
      SourceKind::Http => Self::from_http(normalized),
      SourceKind::File => {
        let path = Path::new(normalized);
        if !path.exists() {
          error!("输入路径不存在: {}", normalized);
          return Err(InputError::NotFound(normalized.to_string()));
        }
        Ok(InputWrapper::ReadImageFile(ImageFileInput::from_path(
          path,
        )?))
      }
    }
  }

  #[cfg(feature = "http_image")]
  fn from_http(source: &str) -> Result<Self, InputError> {
    use crate::FromUrl;

    let url = url::Url::parse(source).map_err(HttpImageInputError::from)?;
    Ok(InputWrapper::HttpImage(HttpImageInput::from_url(&url)?))
  }

  #[cfg(not(feature = "http_image"))]
  fn from_http(source: &str) -> Result<Self, InputError> {
    Err(InputError::HttpDisabled(source.to_string()))
  }

  pub fn kind(&self) -> SourceKind {
    match self {
      #[cfg(feature = "http_image")]
      InputWrapper::HttpImage(_) => SourceKind::Http,
      InputWrapper::ReadImageFile(_) => SourceKind::File,
    }
  }

  pub fn into_frames(self) -> InputWrapperIter {
    match self {
      #[cfg(feature = "http_image")]
      InputWrapper::HttpImage(input) => InputWrapperIter::HttpImage(input.into_frames()),
      InputWrapper::ReadImageFile(input) => InputWrapperIter::ReadImageFile(input.into_frames()),
    }
  }
}

pub enum InputWrapperIter {
  #[cfg(feature = "http_image")]
  HttpImage(self::http_image::HttpImageFrames),
  ReadImageFile(self::read_image_file::ImageFileFrames),
}

impl Iterator for InputWrapperIter {
  type Item = RgbFrame;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      #[cfg(feature = "http_image")]
      InputWrapperIter::HttpImage(input) => input.next(),
      InputWrapperIter::ReadImageFile(input) => input.next(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn http_prefixes_route_to_network() {
    assert_eq!(source_kind("http://example.com/a.jpg"), SourceKind::Http);
    assert_eq!(source_kind("https://example.com/a.jpg"), SourceKind::Http);
    assert_eq!(source_kind("<https://example.com/a.jpg>"), SourceKind::Http);
  }

  #[test]
  fn other_strings_route_to_filesystem() {
    assert_eq!(source_kind("photo.jpg"), SourceKind::File);
    assert_eq!(source_kind("/tmp/http://x.jpg"), SourceKind::File);
    assert_eq!(source_kind("ftp://example.com/a.jpg"), SourceKind::File);
    assert_eq!(source_kind("HTTPS-notes.png"), SourceKind::File);
  }

  #[test]
  fn missing_path_is_not_found() {
    let err = InputWrapper::from_source("definitely/not/here/mingmu.jpg")
      .err()
      .expect("missing file must fail");
    assert!(matches!(err, InputError::NotFound(ref p) if p == "definitely/not/here/mingmu.jpg"));
  }

  #[test]
  fn angle_brackets_are_stripped() {
    assert_eq!(normalize_source("  <a.png> "), "a.png");
    assert_eq!(normalize_source("<a.png"), "<a.png");
  }
}
