// 该文件是 Zhijian （质检） 项目的一部分。
// src/inspect/verdict.rs - 检测结论
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

use chrono::{DateTime, Local};
use serde::Serialize;

use super::Point;

/// 日志与图像文件名使用的时间格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
  #[serde(rename = "OK")]
  Ok,
  #[serde(rename = "NOK")]
  Nok,
}

impl Status {
  pub fn as_str(&self) -> &'static str {
    match self {
      Status::Ok => "OK",
      Status::Nok => "NOK",
    }
  }
}

impl std::fmt::Display for Status {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// 判为 NOK 的原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NokReason {
  CountMismatch { expected: usize, found: usize },
  OutOfZone { index: usize, center: Point },
}

impl std::fmt::Display for NokReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      NokReason::CountMismatch { expected, found } => {
        write!(f, "数量不符: 期望 {}, 实际 {}", expected, found)
      }
      NokReason::OutOfZone { index, center } => {
        write!(f, "物体 {} 中心 ({}, {}) 不在合格区域内", index, center.x, center.y)
      }
    }
  }
}

/// 一次检测的结论，创建后不可修改
///
/// 状态由原因列表决定：列表为空即 OK。
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
  status: Status,
  object_count: usize,
  timestamp: DateTime<Local>,
  reasons: Vec<NokReason>,
}

impl Verdict {
  pub fn new(object_count: usize, reasons: Vec<NokReason>, timestamp: DateTime<Local>) -> Self {
    let status = if reasons.is_empty() {
      Status::Ok
    } else {
      Status::Nok
    };

    Self {
      status,
      object_count,
      timestamp,
      reasons,
    }
  }

  pub fn status(&self) -> Status {
    self.status
  }

  pub fn is_ok(&self) -> bool {
    self.status == Status::Ok
  }

  pub fn object_count(&self) -> usize {
    self.object_count
  }

  pub fn timestamp(&self) -> DateTime<Local> {
    self.timestamp
  }

  pub fn reasons(&self) -> &[NokReason] {
    &self.reasons
  }

  /// `2026-10-17_08-30-00` 形式的时间戳
  pub fn timestamp_label(&self) -> String {
    self.timestamp.format(TIMESTAMP_FORMAT).to_string()
  }
}
