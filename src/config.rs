// 该文件是 Zhijian （质检） 项目的一部分。
// src/config.rs - 检测参数配置
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

use std::{path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

// 工位默认常量
const DEFAULT_EXPECTED_COUNT: usize = 3;
const DEFAULT_ZONE: AcceptanceZone = AcceptanceZone {
  x_min: 100,
  y_min: 100,
  x_max: 400,
  y_max: 400,
};
const DEFAULT_MIN_AREA: f64 = 500.0;
// 11x11 的均值窗口
const DEFAULT_BLOCK_RADIUS: u32 = 5;
const DEFAULT_THRESHOLD_DELTA: i32 = 2;
// 5x5 高斯核对应的 sigma
const DEFAULT_BLUR_SIGMA: f32 = 1.1;
// 5x5 方形结构元素
const DEFAULT_CLOSE_RADIUS: u8 = 2;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("期望数量必须为正整数")]
  ZeroExpectedCount,
  #[error("合格区域无效: {0}")]
  InvalidZone(AcceptanceZone),
  #[error("最小面积无效: {0}")]
  InvalidMinArea(f64),
  #[error("模糊 sigma 必须为正数: {0}")]
  InvalidBlurSigma(f32),
  #[error("自适应阈值窗口半径必须大于 0")]
  ZeroBlockRadius,
  #[error("无法解析合格区域 '{0}'，格式应为 x_min,y_min,x_max,y_max")]
  ZoneParse(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("配置文件解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 合格区域，物体中心必须严格落在边界之内
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceZone {
  pub x_min: u32,
  pub y_min: u32,
  pub x_max: u32,
  pub y_max: u32,
}

impl AcceptanceZone {
  pub fn new(x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Self {
    Self {
      x_min,
      y_min,
      x_max,
      y_max,
    }
  }

  /// 开区间判定，落在边界上视为不合格
  pub fn contains(&self, x: u32, y: u32) -> bool {
    self.x_min < x && x < self.x_max && self.y_min < y && y < self.y_max
  }

  fn is_valid(&self) -> bool {
    self.x_min < self.x_max && self.y_min < self.y_max
  }
}

impl std::fmt::Display for AcceptanceZone {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "({}, {}, {}, {})",
      self.x_min, self.y_min, self.x_max, self.y_max
    )
  }
}

impl FromStr for AcceptanceZone {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let values = s
      .split(',')
      .map(|v| v.trim().parse::<u32>())
      .collect::<Result<Vec<_>, _>>()
      .map_err(|_| ConfigError::ZoneParse(s.to_string()))?;

    match values.as_slice() {
      [x_min, y_min, x_max, y_max] => Ok(Self::new(*x_min, *y_min, *x_max, *y_max)),
      _ => Err(ConfigError::ZoneParse(s.to_string())),
    }
  }
}

/// 二值化方式
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ThresholdMethod {
  /// 局部均值自适应阈值（反相）：`pixel <= mean - delta` 为前景
  AdaptiveMean { block_radius: u32, delta: i32 },
  /// 全局 Otsu 阈值（反相），仅在显式配置时使用
  Otsu,
}

impl Default for ThresholdMethod {
  fn default() -> Self {
    ThresholdMethod::AdaptiveMean {
      block_radius: DEFAULT_BLOCK_RADIUS,
      delta: DEFAULT_THRESHOLD_DELTA,
    }
  }
}

/// 检测参数，调用时显式传入，进程内不存在全局配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionConfig {
  pub expected_count: usize,
  pub zone: AcceptanceZone,
  pub min_area: f64,
  pub threshold: ThresholdMethod,
  pub blur_sigma: f32,
  pub close_radius: u8,
}

impl Default for InspectionConfig {
  fn default() -> Self {
    Self {
      expected_count: DEFAULT_EXPECTED_COUNT,
      zone: DEFAULT_ZONE,
      min_area: DEFAULT_MIN_AREA,
      threshold: ThresholdMethod::default(),
      blur_sigma: DEFAULT_BLUR_SIGMA,
      close_radius: DEFAULT_CLOSE_RADIUS,
    }
  }
}

impl InspectionConfig {
  pub fn with_expected_count(mut self, expected_count: usize) -> Self {
    self.expected_count = expected_count;
    self
  }

  pub fn with_zone(mut self, zone: AcceptanceZone) -> Self {
    self.zone = zone;
    self
  }

  pub fn with_min_area(mut self, min_area: f64) -> Self {
    self.min_area = min_area;
    self
  }

  pub fn with_threshold(mut self, threshold: ThresholdMethod) -> Self {
    self.threshold = threshold;
    self
  }

  /// 从 JSON 文件读取配置，缺省字段使用默认值
  pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    info!("读取配置文件: {}", path.display());
    let text = std::fs::read_to_string(path)?;
    let config: Self = serde_json::from_str(&text)?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.expected_count == 0 {
      return Err(ConfigError::ZeroExpectedCount);
    }
    if !self.zone.is_valid() {
      return Err(ConfigError::InvalidZone(self.zone));
    }
    if !self.min_area.is_finite() || self.min_area < 0.0 {
      return Err(ConfigError::InvalidMinArea(self.min_area));
    }
    if !self.blur_sigma.is_finite() || self.blur_sigma <= 0.0 {
      return Err(ConfigError::InvalidBlurSigma(self.blur_sigma));
    }
    if let ThresholdMethod::AdaptiveMean { block_radius: 0, .. } = self.threshold {
      return Err(ConfigError::ZeroBlockRadius);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_valid_station_constants() {
    let config = InspectionConfig::default();
    config.validate().unwrap();
    assert_eq!(config.expected_count, 3);
    assert_eq!(config.zone, AcceptanceZone::new(100, 100, 400, 400));
    assert_eq!(config.min_area, 500.0);
  }

  #[test]
  fn zone_bounds_are_exclusive() {
    let zone = AcceptanceZone::new(100, 100, 400, 400);
    assert!(zone.contains(101, 399));
    assert!(!zone.contains(100, 200));
    assert!(!zone.contains(200, 400));
    assert!(!zone.contains(50, 200));
  }

  #[test]
  fn zone_parses_from_cli_text() {
    let zone: AcceptanceZone = "10, 20,300,400".parse().unwrap();
    assert_eq!(zone, AcceptanceZone::new(10, 20, 300, 400));
    assert!("10,20,300".parse::<AcceptanceZone>().is_err());
    assert!("a,b,c,d".parse::<AcceptanceZone>().is_err());
  }

  #[test]
  fn invalid_values_are_rejected() {
    let base = InspectionConfig::default();
    assert!(matches!(
      base.clone().with_expected_count(0).validate(),
      Err(ConfigError::ZeroExpectedCount)
    ));
    assert!(matches!(
      base
        .clone()
        .with_zone(AcceptanceZone::new(300, 100, 200, 400))
        .validate(),
      Err(ConfigError::InvalidZone(_))
    ));
    assert!(matches!(
      base.clone().with_min_area(-1.0).validate(),
      Err(ConfigError::InvalidMinArea(_))
    ));
    assert!(matches!(
      base
        .clone()
        .with_threshold(ThresholdMethod::AdaptiveMean {
          block_radius: 0,
          delta: 2
        })
        .validate(),
      Err(ConfigError::ZeroBlockRadius)
    ));
    let mut blur = base;
    blur.blur_sigma = 0.0;
    assert!(matches!(
      blur.validate(),
      Err(ConfigError::InvalidBlurSigma(_))
    ));
  }

  #[test]
  fn partial_json_falls_back_to_defaults() {
    let config: InspectionConfig = serde_json::from_str(
      r#"{ "expected_count": 5, "threshold": { "method": "otsu" } }"#,
    )
    .unwrap();
    assert_eq!(config.expected_count, 5);
    assert_eq!(config.threshold, ThresholdMethod::Otsu);
    assert_eq!(config.zone, DEFAULT_ZONE);
  }

  #[test]
  fn json_file_is_validated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("station.json");
    std::fs::write(&path, r#"{ "expected_count": 0 }"#).unwrap();
    assert!(matches!(
      InspectionConfig::from_json_file(&path),
      Err(ConfigError::ZeroExpectedCount)
    ));

    std::fs::write(
      &path,
      r#"{ "zone": { "x_min": 0, "y_min": 0, "x_max": 640, "y_max": 480 } }"#,
    )
    .unwrap();
    let config = InspectionConfig::from_json_file(&path).unwrap();
    assert_eq!(config.zone, AcceptanceZone::new(0, 0, 640, 480));
  }
}
