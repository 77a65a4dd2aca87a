// 该文件是 Zhijian （质检） 项目的一部分。
// src/output/csv_log.rs - 追加写入的结果日志
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
  fs::{File, OpenOptions},
  io::Write,
  path::{Path, PathBuf},
  sync::Mutex,
};

use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  inspect::{Inspection, Verdict},
  output::Render,
  utils::url_to_path,
};

pub const CSV_HEADER: &str = "timestamp,count,status";

#[derive(Error, Debug)]
pub enum CsvLogError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("日志文件锁已损坏")]
  Poisoned,
}

/// 结果日志，只追加不回读
///
/// 每行写入后立即 `fsync`，写入失败直接返回错误。
pub struct CsvLogOutput {
  path: PathBuf,
  file: Mutex<File>,
}

impl FromUrlWithScheme for CsvLogOutput {
  const SCHEME: &'static str = "csv";
}

impl FromUrl for CsvLogOutput {
  type Error = CsvLogError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(CsvLogError::SchemeMismatch);
    }
    Self::open(url_to_path(url))
  }
}

impl CsvLogOutput {
  /// 打开（必要时创建）日志文件，空文件写入表头
  pub fn open(path: impl AsRef<Path>) -> Result<Self, CsvLogError> {
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if file.metadata()?.len() == 0 {
      file.write_all(format!("{}\n", CSV_HEADER).as_bytes())?;
      file.sync_data()?;
      info!("创建结果日志: {}", path.display());
    }

    Ok(Self {
      path,
      file: Mutex::new(file),
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn append(&self, verdict: &Verdict) -> Result<(), CsvLogError> {
    let row = format!(
      "{},{},{}\n",
      verdict.timestamp_label(),
      verdict.object_count(),
      verdict.status()
    );

    let mut file = self.file.lock().map_err(|_| CsvLogError::Poisoned)?;
    file.write_all(row.as_bytes())?;
    file.sync_data()?;
    debug!("写入结果日志: {}", row.trim_end());
    Ok(())
  }
}

impl Render<Inspection> for CsvLogOutput {
  type Error = CsvLogError;

  fn render_result(&self, result: &Inspection) -> Result<(), Self::Error> {
    self.append(&result.verdict)
  }
}
