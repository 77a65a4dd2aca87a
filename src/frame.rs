// 该文件是 Zhijian （质检） 项目的一部分。
// src/frame.rs - 帧定义
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

use image::{ImageBuffer, Rgb, RgbImage};
use thiserror::Error;

const RGB_CHANNELS: usize = 3;

#[derive(Error, Debug)]
pub enum FrameError {
  #[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

/// 一帧三通道彩色图像
///
/// 帧本身不可变，标注总是在副本上进行。
#[derive(Debug, Clone)]
pub struct Frame {
  image: RgbImage,
  index: u64,
}

impl Frame {
  pub fn new(image: RgbImage, index: u64) -> Self {
    Self { image, index }
  }

  /// 从 BGR8 紧密排列的数据构造帧（工业相机 SDK 的常见输出格式）
  pub fn from_bgr8(width: u32, height: u32, data: &[u8], index: u64) -> Result<Self, FrameError> {
    let expected = RGB_CHANNELS * width as usize * height as usize;
    if data.len() != expected {
      return Err(FrameError::LengthMismatch {
        expected,
        actual: data.len(),
      });
    }

    let image = ImageBuffer::from_fn(width, height, |x, y| {
      let idx = (y as usize * width as usize + x as usize) * RGB_CHANNELS;
      Rgb([data[idx + 2], data[idx + 1], data[idx]])
    });

    Ok(Self { image, index })
  }

  pub fn image(&self) -> &RgbImage {
    &self.image
  }

  pub fn index(&self) -> u64 {
    self.index
  }

  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }

  /// 宽或高为零的帧无法分析
  pub fn is_empty(&self) -> bool {
    self.image.width() == 0 || self.image.height() == 0
  }
}

impl From<RgbImage> for Frame {
  fn from(image: RgbImage) -> Self {
    Frame::new(image, 0)
  }
}
