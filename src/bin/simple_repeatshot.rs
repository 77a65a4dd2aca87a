// 该文件是 Zhijian （质检） 项目的一部分。
// src/bin/simple_repeatshot.rs - 重复检测同一帧，统计耗时
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use tracing::info;
use zhijian::{
  FromUrl,
  config::InspectionConfig,
  inspect::InspectionEngine,
  task::{RepeatShotTask, Task},
};

/// Zhijian 重复检测
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
  /// 重复次数
  #[arg(long, default_value = "20", value_name = "COUNT")]
  pub repeat: usize,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let input_image = zhijian::input::InputWrapper::from_url(&args.input)?;
  let engine = InspectionEngine::new(InspectionConfig::default())?;
  let output = zhijian::output::OutputWrapper::from_url(&args.output)?;

  let summary = RepeatShotTask::new(args.repeat, Duration::from_secs(5)).run_task(
    input_image,
    engine,
    output,
  )?;
  info!("检测结论: OK {}, NOK {}", summary.ok, summary.nok);

  Ok(())
}
