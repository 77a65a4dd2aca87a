// 该文件是 Zhijian （质检） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use std::{path::PathBuf, time::Duration};

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::Frame,
  input::{CaptureError, FrameSource},
  utils::{query_flag, url_to_path},
};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("Image file not found: {0}")]
  NotFound(PathBuf),
}

/// 单张图像文件输入
///
/// 默认只产生一帧；带 `?repeat` 时每次采集都重新读取文件，
/// 可作为固定工位相机的替身。
pub struct ImageFileInput {
  path: PathBuf,
  repeat: bool,
  consumed: bool,
  next_index: u64,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    let path = url_to_path(url);
    if !path.is_file() {
      return Err(ImageFileInputError::NotFound(path));
    }

    Ok(ImageFileInput {
      path,
      repeat: query_flag(url, "repeat"),
      consumed: false,
      next_index: 0,
    })
  }
}

impl FrameSource for ImageFileInput {
  fn capture(&mut self, _timeout: Duration) -> Result<Frame, CaptureError> {
    if self.consumed && !self.repeat {
      return Err(CaptureError::Exhausted);
    }
    self.consumed = true;

    debug!("读取图像文件: {}", self.path.display());
    let image = ImageReader::open(&self.path)?.decode()?.to_rgb8();

    let frame = Frame::new(image, self.next_index);
    self.next_index += 1;
    Ok(frame)
  }
}
