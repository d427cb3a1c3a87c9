// 该文件是 Mingmu （明目） 项目的一部分。
// src/input/http_image.rs - 网络图像输入
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
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::RgbFrame};

#[derive(Error, Debug)]
pub enum HttpImageInputError {
  #[error("URI scheme mismatch: {0}")]
  SchemeMismatch(String),
  #[error("invalid URL: {0}")]
  InvalidUrl(#[from] url::ParseError),
  #[error("request failed: {0}")]
  Request(#[from] reqwest::Error),
  #[error("Invalid image URL or content type (status {0})")]
  Status(u16),
  #[error("Invalid image URL or content type ({0:?})")]
  ContentType(String),
  #[error("image decode failed: {0}")]
  Decode(#[from] image::ImageError),
}

/// 通过一次阻塞 GET 请求获取的图像
pub struct HttpImageInput {
  image: Option<RgbImage>,
}

impl FromUrlWithScheme for HttpImageInput {
  const SCHEMES: &'static [&'static str] = &["http", "https"];
}

impl FromUrl for HttpImageInput {
  type Error = HttpImageInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if !Self::accepts(url) {
      error!(
        "URI scheme mismatch: expected one of {:?}, found '{}'",
        Self::SCHEMES,
        url.scheme()
      );
      return Err(HttpImageInputError::SchemeMismatch(url.scheme().to_string()));
    }

    info!("下载图像: {}", url);
    let response = reqwest::blocking::get(url.as_str())?;

    let status = response.status();
    let content_type = response
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|value| value.to_str().ok())
      .unwrap_or_default()
      .to_string();
    debug!("响应状态: {}, Content-Type: {:?}", status, content_type);

    if !status.is_success() {
      return Err(HttpImageInputError::Status(status.as_u16()));
    }
    if !content_type.contains("image") {
      return Err(HttpImageInputError::ContentType(content_type));
    }

    let body = response.bytes()?;
    debug!("下载完成: {} 字节", body.len());
    let image = image::load_from_memory(&body)?.to_rgb8();

    Ok(HttpImageInput { image: Some(image) })
  }
}

impl HttpImageInput {
  pub fn into_frames(self) -> HttpImageFrames {
    HttpImageFrames { inner: self }
  }
}

pub struct HttpImageFrames {
  inner: HttpImageInput,
}

impl Iterator for HttpImageFrames {
  type Item = RgbFrame;

  fn next(&mut self) -> Option<Self::Item> {
    self.inner.image.take().map(RgbFrame::from)
  }
}
