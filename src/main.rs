// 该文件是 Zhijian （质检） 项目的一部分。
// src/main.rs - 检测工位主程序
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
use clap::{Parser, ValueEnum};
use tracing::info;
use url::Url;

use zhijian::{
  FromUrl,
  config::{AcceptanceZone, InspectionConfig},
  draw::Draw,
  input::InputWrapper,
  inspect::InspectionEngine,
  output::Outputs,
  task::{IntervalTrigger, ManualTrigger, OneShotTrigger, StationTask, Task},
};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum TriggerKind {
  /// 只检测一帧
  Oneshot,
  /// 按固定间隔连续检测
  Interval,
  /// 每次回车检测一帧
  Manual,
}

/// Zhijian 检测工位参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源，如 image:///path/to/a.png 或 folder:///path/to/frames?watch
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径，可重复指定
  /// 默认: console: csv://output/results.csv folder://output/nok_images
  #[arg(long, value_name = "OUTPUT")]
  pub output: Vec<Url>,
  /// JSON 配置文件
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,
  /// 期望物体数量
  #[arg(long, value_name = "COUNT")]
  pub expected_count: Option<usize>,
  /// 合格区域 x_min,y_min,x_max,y_max（不含边界）
  #[arg(long, value_name = "ZONE")]
  pub zone: Option<AcceptanceZone>,
  /// 最小轮廓面积
  #[arg(long, value_name = "AREA")]
  pub min_area: Option<f64>,
  /// 标签字体文件（TrueType）
  #[cfg(feature = "label_font")]
  #[arg(long, value_name = "FONT")]
  pub label_font: Option<PathBuf>,
  /// 触发方式
  #[arg(long, value_enum, default_value = "interval")]
  pub trigger: TriggerKind,
  /// 定时触发间隔（毫秒）
  #[arg(long, default_value = "100", value_name = "MS")]
  pub interval_ms: u64,
  /// 采集超时（毫秒）
  #[arg(long, default_value = "5000", value_name = "MS")]
  pub timeout_ms: u64,
  /// 检测帧数上限
  #[arg(long, value_name = "FRAME_NUMBER")]
  pub frame_number: Option<usize>,
}

fn default_outputs() -> Result<Vec<Url>> {
  Ok(vec![
    Url::parse("console:")?,
    Url::parse("csv://output/results.csv")?,
    Url::parse("folder://output/nok_images")?,
  ])
}

fn load_config(args: &Args) -> Result<InspectionConfig> {
  let mut config = match &args.config {
    Some(path) => InspectionConfig::from_json_file(path)?,
    None => InspectionConfig::default(),
  };

  if let Some(expected_count) = args.expected_count {
    config = config.with_expected_count(expected_count);
  }
  if let Some(zone) = args.zone {
    config = config.with_zone(zone);
  }
  if let Some(min_area) = args.min_area {
    config = config.with_min_area(min_area);
  }

  config.validate()?;
  Ok(config)
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  let config = load_config(&args)?;
  let outputs = if args.output.is_empty() {
    default_outputs()?
  } else {
    args.output.clone()
  };

  info!("输入来源: {}", args.input);
  for output in outputs.iter() {
    info!("输出路径: {}", output);
  }
  info!(
    "期望数量: {}, 合格区域: {}, 最小面积: {}",
    config.expected_count, config.zone, config.min_area
  );

  #[allow(unused_mut)]
  let mut draw = Draw::default();
  #[cfg(feature = "label_font")]
  if let Some(font) = &args.label_font {
    draw = draw.with_font_file(font)?;
  }

  let source = InputWrapper::from_url(&args.input)?;
  let engine = InspectionEngine::new(config)?.with_draw(draw);
  let output = Outputs::from_urls(&outputs)?;
  let timeout = Duration::from_millis(args.timeout_ms);

  let summary = match args.trigger {
    TriggerKind::Oneshot => StationTask::new(OneShotTrigger::default(), timeout)
      .run_task(source, engine, output)?,
    TriggerKind::Interval => {
      let trigger = IntervalTrigger::new(Duration::from_millis(args.interval_ms)).with_ctrlc()?;
      StationTask::new(trigger, timeout)
        .with_frame_number(args.frame_number)
        .run_task(source, engine, output)?
    }
    TriggerKind::Manual => StationTask::new(ManualTrigger::stdin(), timeout)
      .with_frame_number(args.frame_number)
      .run_task(source, engine, output)?,
  };

  info!(
    "共检测 {} 帧: OK {}, NOK {}, 跳过 {}",
    summary.inspected(),
    summary.ok,
    summary.nok,
    summary.skipped
  );

  Ok(())
}
