// 该文件是 Zhijian （质检） 项目的一部分。
// src/bin/simple_oneshot.rs - 单张图像检测
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use tracing::info;
use zhijian::{
  FromUrl,
  config::InspectionConfig,
  input::FrameSource,
  inspect::{InspectionEngine, Inspector},
  output::{ConsoleOutput, Render},
};

/// Zhijian 单张图像检测
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入图像
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 标注图像输出路径
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
  /// JSON 配置文件
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let config = match &args.config {
    Some(path) => InspectionConfig::from_json_file(path)?,
    None => InspectionConfig::default(),
  };

  let mut input_image = zhijian::input::ImageFileInput::from_url(&args.input)?;
  let engine = InspectionEngine::new(config)?;
  let output = zhijian::output::SaveImageFileOutput::from_url(&args.output)?;

  let frame = input_image.capture(Duration::from_secs(5))?;
  info!("开始检测...");
  let now = std::time::Instant::now();
  let inspection = engine.inspect(&frame)?;
  info!("检测完成，耗时: {:.2?}", now.elapsed());

  output.render_result(&inspection)?;
  ConsoleOutput.render_result(&inspection)?;

  Ok(())
}
