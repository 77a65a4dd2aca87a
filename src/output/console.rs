// 该文件是 Zhijian （质检） 项目的一部分。
// src/output/console.rs - 终端结果展示
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

use std::convert::Infallible;

use tracing::{info, warn};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, inspect::Inspection, output::Render};

/// 通过日志展示每次判定，取代原先窗口上的状态栏
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleOutput;

impl FromUrlWithScheme for ConsoleOutput {
  const SCHEME: &'static str = "console";
}

impl FromUrl for ConsoleOutput {
  type Error = Infallible;

  fn from_url(_url: &Url) -> Result<Self, Self::Error> {
    Ok(ConsoleOutput)
  }
}

impl Render<Inspection> for ConsoleOutput {
  type Error = Infallible;

  fn render_result(&self, result: &Inspection) -> Result<(), Self::Error> {
    let verdict = &result.verdict;
    if verdict.is_ok() {
      info!(
        "帧 {} [{}] 状态: {}, 物体数量: {}",
        result.frame_index,
        verdict.timestamp_label(),
        verdict.status(),
        verdict.object_count()
      );
      return Ok(());
    }

    warn!(
      "帧 {} [{}] 状态: {}, 物体数量: {}",
      result.frame_index,
      verdict.timestamp_label(),
      verdict.status(),
      verdict.object_count()
    );
    for reason in verdict.reasons() {
      warn!("  - {}", reason);
    }
    for object in result.objects.iter() {
      info!(
        "  #{} 中心 ({}, {}) 面积 {:.0} 区域内: {}",
        object.index, object.center.x, object.center.y, object.area, object.in_zone
      );
    }
    Ok(())
  }
}
