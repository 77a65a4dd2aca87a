// 该文件是 Zhijian （质检） 项目的一部分。
// src/output.rs - 输出定义
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

use thiserror::Error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, inspect::Inspection};

pub trait Render<Output> {
  type Error;
  fn render_result(&self, result: &Output) -> Result<(), Self::Error>;
}

mod console;
pub use self::console::ConsoleOutput;

mod csv_log;
pub use self::csv_log::{CSV_HEADER, CsvLogError, CsvLogOutput};

#[cfg(feature = "save_image_file")]
mod save_image_file;
#[cfg(feature = "save_image_file")]
pub use self::save_image_file::{SaveImageFileError, SaveImageFileOutput};

#[cfg(feature = "directory_record")]
mod directory_record;
#[cfg(feature = "directory_record")]
pub use self::directory_record::{DirectoryRecordOutput, DirectoryRecordOutputError};

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("结果日志错误: {0}")]
  CsvLogError(#[from] CsvLogError),
  #[cfg(feature = "save_image_file")]
  #[error("保存图像文件错误: {0}")]
  SaveImageFileError(#[from] SaveImageFileError),
  #[cfg(feature = "directory_record")]
  #[error("目录记录输出错误: {0}")]
  DirectoryRecordOutputError(#[from] DirectoryRecordOutputError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

pub enum OutputWrapper {
  Console(ConsoleOutput),
  CsvLog(CsvLogOutput),
  #[cfg(feature = "save_image_file")]
  SaveImageFile(SaveImageFileOutput),
  #[cfg(feature = "directory_record")]
  DirectoryRecord(DirectoryRecordOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      ConsoleOutput::SCHEME => {
        let output = ConsoleOutput::from_url(url).map_err(|e| -> OutputError { match e {} })?;
        Ok(OutputWrapper::Console(output))
      }
      CsvLogOutput::SCHEME => {
        let output = CsvLogOutput::from_url(url)?;
        Ok(OutputWrapper::CsvLog(output))
      }
      #[cfg(feature = "save_image_file")]
      SaveImageFileOutput::SCHEME => {
        let output = SaveImageFileOutput::from_url(url)?;
        Ok(OutputWrapper::SaveImageFile(output))
      }
      #[cfg(feature = "directory_record")]
      DirectoryRecordOutput::SCHEME => {
        let output = DirectoryRecordOutput::from_url(url)?;
        Ok(OutputWrapper::DirectoryRecord(output))
      }
      scheme => Err(OutputError::SchemeMismatch(scheme.to_string())),
    }
  }
}

impl Render<Inspection> for OutputWrapper {
  type Error = OutputError;

  fn render_result(&self, result: &Inspection) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::Console(output) => output
        .render_result(result)
        .map_err(|e| -> OutputError { match e {} }),
      OutputWrapper::CsvLog(output) => output.render_result(result).map_err(OutputError::from),
      #[cfg(feature = "save_image_file")]
      OutputWrapper::SaveImageFile(output) => {
        output.render_result(result).map_err(OutputError::from)
      }
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecord(output) => {
        output.render_result(result).map_err(OutputError::from)
      }
    }
  }
}

/// 多个输出按顺序依次执行，遇到第一个错误即停止
#[derive(Default)]
pub struct Outputs {
  outputs: Vec<OutputWrapper>,
}

impl Outputs {
  pub fn from_urls(urls: &[Url]) -> Result<Self, OutputError> {
    let outputs = urls
      .iter()
      .map(OutputWrapper::from_url)
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Self { outputs })
  }

  pub fn push(&mut self, output: OutputWrapper) {
    self.outputs.push(output);
  }

  pub fn len(&self) -> usize {
    self.outputs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.outputs.is_empty()
  }
}

impl Render<Inspection> for Outputs {
  type Error = OutputError;

  fn render_result(&self, result: &Inspection) -> Result<(), Self::Error> {
    for output in self.outputs.iter() {
      output.render_result(result)?;
    }
    Ok(())
  }
}
