// 该文件是 Zhijian （质检） 项目的一部分。
// src/output/directory_record.rs - NOK 图像目录记录
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

use thiserror::Error;
use tracing::warn;

use crate::{
  FromUrl, FromUrlWithScheme,
  inspect::{CandidateObject, Inspection},
  output::Render,
  utils::{query_flag, url_to_path},
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 把 NOK 帧的标注图像按时间戳保存到目录
///
/// `?always` 同时保存 OK 帧，`?record` 额外写出同名 `.txt` 物体清单。
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  always: bool,
  record: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    Ok(DirectoryRecordOutput {
      directory: url_to_path(uri),
      always: query_flag(uri, "always"),
      record: query_flag(uri, "record"),
    })
  }
}

impl DirectoryRecordOutput {
  pub fn new(directory: impl AsRef<Path>) -> Self {
    Self {
      directory: directory.as_ref().to_path_buf(),
      always: false,
      record: false,
    }
  }

  pub fn with_always(mut self, always: bool) -> Self {
    self.always = always;
    self
  }

  pub fn with_record(mut self, record: bool) -> Self {
    self.record = record;
    self
  }

  // 同一秒内的多帧追加 _1、_2 后缀，不覆盖已有文件
  fn frame_path(&self, stem: &str) -> PathBuf {
    let mut path = self.directory.join(format!("{}.png", stem));
    let mut n = 1;
    while path.exists() {
      path = self.directory.join(format!("{}_{}.png", stem, n));
      n += 1;
    }
    path
  }

  fn record(objects: &[CandidateObject], path: &Path) -> Result<(), std::io::Error> {
    let records: Vec<String> = objects
      .iter()
      .map(|o| {
        format!(
          "{}, {}, {}, {}, {}, {:.1}, {}",
          o.index, o.bbox.x, o.bbox.y, o.bbox.width, o.bbox.height, o.area, o.in_zone
        )
      })
      .collect();
    std::fs::write(path.with_extension("txt"), records.join("\n"))
  }
}

impl Render<Inspection> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, result: &Inspection) -> Result<(), Self::Error> {
    if result.verdict.is_ok() && !self.always {
      return Ok(());
    }

    std::fs::create_dir_all(&self.directory)?;
    let path = self.frame_path(&result.verdict.timestamp_label());
    result.annotated.save(&path)?;
    if self.record {
      Self::record(&result.objects, &path)?;
    }

    if result.verdict.is_ok() {
      tracing::debug!("保存图像: {}", path.display());
    } else {
      warn!("保存 NOK 图像: {}", path.display());
    }
    Ok(())
  }
}
