// 该文件是 Zhijian （质检） 项目的一部分。
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

use std::time::Duration;

use thiserror::Error;

use crate::{FromUrl, FromUrlWithScheme, frame::Frame};

mod read_image_file;
pub use self::read_image_file::{ImageFileInput, ImageFileInputError};

#[cfg(feature = "directory_input")]
mod directory_input;
#[cfg(feature = "directory_input")]
pub use self::directory_input::{DirectoryInput, DirectoryInputError};

/// 采集失败。超时与输入耗尽是不同的错误，都不代表 NOK
#[derive(Error, Debug)]
pub enum CaptureError {
  #[error("采集超时 ({0:?})")]
  Timeout(Duration),
  #[error("输入源已耗尽")]
  Exhausted,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像解码错误: {0}")]
  DecodeError(#[from] image::ImageError),
}

/// 帧来源：按需采集一帧，最多等待 `timeout`
pub trait FrameSource {
  fn capture(&mut self, timeout: Duration) -> Result<Frame, CaptureError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
  fn capture(&mut self, timeout: Duration) -> Result<Frame, CaptureError> {
    (**self).capture(timeout)
  }
}

#[derive(Error, Debug)]
pub enum InputError {
  #[error("Image file input error: {0}")]
  ImageFileInputError(#[from] ImageFileInputError),
  #[cfg(feature = "directory_input")]
  #[error("Directory input error: {0}")]
  DirectoryInputError(#[from] DirectoryInputError),
  #[error("URI scheme mismatch: {0}")]
  SchemeMismatch(String),
}

pub enum InputWrapper {
  ReadImageFile(ImageFileInput),
  #[cfg(feature = "directory_input")]
  Directory(DirectoryInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    if url.scheme() == ImageFileInput::SCHEME {
      let input = ImageFileInput::from_url(url)?;
      return Ok(InputWrapper::ReadImageFile(input));
    }
    #[cfg(feature = "directory_input")]
    if url.scheme() == DirectoryInput::SCHEME {
      let input = DirectoryInput::from_url(url)?;
      return Ok(InputWrapper::Directory(input));
    }
    Err(InputError::SchemeMismatch(url.scheme().to_string()))
  }
}

impl FrameSource for InputWrapper {
  fn capture(&mut self, timeout: Duration) -> Result<Frame, CaptureError> {
    match self {
      InputWrapper::ReadImageFile(input) => input.capture(timeout),
      #[cfg(feature = "directory_input")]
      InputWrapper::Directory(input) => input.capture(timeout),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};
  use url::Url;

  #[test]
  fn unknown_scheme_is_rejected() {
    let url = Url::parse("rtsp://camera/stream").unwrap();
    assert!(matches!(
      InputWrapper::from_url(&url),
      Err(InputError::SchemeMismatch(s)) if s == "rtsp"
    ));
  }

  #[test]
  fn wrapper_dispatches_to_image_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("part.png");
    RgbImage::from_pixel(8, 6, Rgb([1, 2, 3])).save(&path).unwrap();

    let url = Url::parse(&format!("image://{}", path.display())).unwrap();
    let mut input = InputWrapper::from_url(&url).unwrap();
    let frame = input.capture(Duration::from_millis(10)).unwrap();
    assert_eq!((frame.width(), frame.height()), (8, 6));
    assert!(matches!(
      input.capture(Duration::from_millis(10)),
      Err(CaptureError::Exhausted)
    ));
  }
}
