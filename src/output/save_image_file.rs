// 该文件是 Zhijian （质检） 项目的一部分。
// src/output/save_image_file.rs - 保存预览图像
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

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  inspect::Inspection,
  output::Render,
  utils::{query_value, url_to_path},
};

/// 每次检测后覆盖同一个文件，展示最新一帧的标注结果
pub struct SaveImageFileOutput {
  path: PathBuf,
  size: Option<(u32, u32)>,
}

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(image::ImageError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    let size = match (
      query_value::<u32>(uri, "width"),
      query_value::<u32>(uri, "height"),
    ) {
      (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
      _ => None,
    };

    Ok(SaveImageFileOutput {
      path: url_to_path(uri),
      size,
    })
  }
}

impl SaveImageFileOutput {
  pub fn new(path: impl AsRef<Path>) -> Self {
    Self {
      path: path.as_ref().to_path_buf(),
      size: None,
    }
  }

  pub fn with_size(mut self, width: u32, height: u32) -> Self {
    self.size = Some((width, height));
    self
  }

  fn save_image(&self, image: &image::RgbImage) -> Result<(), SaveImageFileError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent).map_err(SaveImageFileError::IoError)?;
    }

    match self.size {
      Some((width, height)) => imageops::resize(image, width, height, FilterType::Triangle)
        .save(&self.path)
        .map_err(SaveImageFileError::ImageError)?,
      None => image
        .save(&self.path)
        .map_err(SaveImageFileError::ImageError)?,
    }

    debug!("保存预览图像到文件: {}", self.path.display());

    Ok(())
  }
}

impl Render<Inspection> for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(&self, result: &Inspection) -> Result<(), Self::Error> {
    self.save_image(&result.annotated)
  }
}
