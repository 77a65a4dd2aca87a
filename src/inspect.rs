// 该文件是 Zhijian （质检） 项目的一部分。
// src/inspect.rs - 检测判定引擎
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

//! # 检测判定引擎
//!
//! 输入一帧彩色图像和检测参数，输出标注后的图像副本与判定结论。
//! 引擎无内部状态，除读取当前时间外没有任何副作用，可在多个线程中
//! 对不同的帧并发调用。
//!
//! ```no_run
//! use zhijian::{config::InspectionConfig, frame::Frame, inspect::analyze};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let image = image::open("part.png")?.to_rgb8();
//! let (annotated, verdict) = analyze(&Frame::from(image), &InspectionConfig::default())?.into_parts();
//! println!("{} ({} 个物体)", verdict.status(), verdict.object_count());
//! annotated.save("annotated.png")?;
//! # Ok(())
//! # }
//! ```

use chrono::Local;
use image::RgbImage;
use imageproc::contours::Contour;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::{
  config::{ConfigError, InspectionConfig},
  draw::Draw,
  frame::Frame,
};

pub mod pipeline;
mod verdict;

pub use self::verdict::{NokReason, Status, TIMESTAMP_FORMAT, Verdict};

pub trait Inspector {
  type Input;
  type Output;
  type Error;

  fn inspect(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

#[derive(Error, Debug)]
pub enum InspectError {
  #[error("输入帧无效: {0}")]
  InvalidInput(String),
  #[error("检测参数无效: {0}")]
  InvalidConfig(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
  pub x: u32,
  pub y: u32,
}

/// 轴对齐包围盒，宽高包含两端像素
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
  pub x: u32,
  pub y: u32,
  pub width: u32,
  pub height: u32,
}

impl BoundingBox {
  fn from_contour(contour: &Contour<i32>) -> Option<Self> {
    let first = contour.points.first()?;
    let (mut x_min, mut y_min, mut x_max, mut y_max) = (first.x, first.y, first.x, first.y);
    for p in contour.points.iter() {
      x_min = x_min.min(p.x);
      y_min = y_min.min(p.y);
      x_max = x_max.max(p.x);
      y_max = y_max.max(p.y);
    }

    Some(Self {
      x: x_min.max(0) as u32,
      y: y_min.max(0) as u32,
      width: (x_max - x_min + 1) as u32,
      height: (y_max - y_min + 1) as u32,
    })
  }

  /// 中心点，整数除法向下取整
  pub fn center(&self) -> Point {
    Point {
      x: self.x + self.width / 2,
      y: self.y + self.height / 2,
    }
  }
}

/// 通过面积过滤的候选物体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateObject {
  /// 从 1 开始的序号，与图上标注一致
  pub index: usize,
  pub bbox: BoundingBox,
  pub area: f64,
  pub center: Point,
  pub in_zone: bool,
}

/// 一次检测的完整结果
#[derive(Debug, Clone)]
pub struct Inspection {
  pub frame_index: u64,
  pub objects: Vec<CandidateObject>,
  pub annotated: RgbImage,
  pub verdict: Verdict,
}

impl Inspection {
  pub fn into_parts(self) -> (RgbImage, Verdict) {
    (self.annotated, self.verdict)
  }
}

pub struct InspectionEngine {
  config: InspectionConfig,
  draw: Draw,
}

impl InspectionEngine {
  pub fn new(config: InspectionConfig) -> Result<Self, ConfigError> {
    config.validate()?;
    Ok(Self {
      config,
      draw: Draw::default(),
    })
  }

  pub fn with_draw(mut self, draw: Draw) -> Self {
    self.draw = draw;
    self
  }

  pub fn config(&self) -> &InspectionConfig {
    &self.config
  }
}

impl Inspector for InspectionEngine {
  type Input = Frame;
  type Output = Inspection;
  type Error = InspectError;

  fn inspect(&self, input: &Frame) -> Result<Inspection, InspectError> {
    run(input, &self.config, &self.draw)
  }
}

/// 分析一帧图像，使用默认标注样式
pub fn analyze(frame: &Frame, config: &InspectionConfig) -> Result<Inspection, InspectError> {
  config.validate()?;
  run(frame, config, &Draw::default())
}

fn run(frame: &Frame, config: &InspectionConfig, draw: &Draw) -> Result<Inspection, InspectError> {
  if frame.is_empty() {
    return Err(InspectError::InvalidInput(format!(
      "帧尺寸为 {}x{}",
      frame.width(),
      frame.height()
    )));
  }

  let binary = pipeline::binarize(frame.image(), config);
  let contours = pipeline::external_contours(&binary);
  let raw_count = contours.len();

  let objects: Vec<CandidateObject> = contours
    .iter()
    .filter_map(|contour| {
      let area = pipeline::contour_area(contour);
      if area < config.min_area {
        return None;
      }
      BoundingBox::from_contour(contour).map(|bbox| (bbox, area))
    })
    .enumerate()
    .map(|(i, (bbox, area))| {
      let center = bbox.center();
      CandidateObject {
        index: i + 1,
        bbox,
        area,
        center,
        in_zone: config.zone.contains(center.x, center.y),
      }
    })
    .collect();

  debug!(
    "帧 {}: 外轮廓 {} 个, 面积过滤后 {} 个",
    frame.index(),
    raw_count,
    objects.len()
  );

  let mut reasons: Vec<NokReason> = objects
    .iter()
    .filter(|o| !o.in_zone)
    .map(|o| NokReason::OutOfZone {
      index: o.index,
      center: o.center,
    })
    .collect();

  if objects.len() != config.expected_count {
    reasons.push(NokReason::CountMismatch {
      expected: config.expected_count,
      found: objects.len(),
    });
  }

  let annotated = draw.annotate(frame.image(), &objects);
  let verdict = Verdict::new(objects.len(), reasons, Local::now());

  Ok(Inspection {
    frame_index: frame.index(),
    objects,
    annotated,
    verdict,
  })
}
