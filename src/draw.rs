// 该文件是 Zhijian （质检） 项目的一部分。
// src/draw.rs - 检测结果标注
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

#[cfg(feature = "label_font")]
use std::path::Path;

#[cfg(feature = "label_font")]
use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
  drawing::{draw_filled_rect_mut, draw_hollow_rect_mut},
  rect::Rect,
};
use thiserror::Error;

use crate::inspect::{BoundingBox, CandidateObject};

const BOX_COLOR: [u8; 3] = [0, 255, 0]; // 绿色
const LABEL_COLOR: [u8; 3] = [0, 0, 255]; // 蓝色
const BOX_THICKNESS: u32 = 2;
// 标签底边距离边框上沿
const LABEL_OFFSET: i32 = 10;
const DIGIT_SCALE: u32 = 3;
#[cfg(feature = "label_font")]
const LABEL_FONT_SIZE: f32 = 20.0;

// 3x5 点阵数字，每行低 3 位从左到右
const DIGIT_WIDTH: u32 = 3;
const DIGIT_HEIGHT: u32 = 5;
const DIGIT_GLYPHS: [[u8; 5]; 10] = [
  [0b111, 0b101, 0b101, 0b101, 0b111],
  [0b010, 0b110, 0b010, 0b010, 0b111],
  [0b111, 0b001, 0b111, 0b100, 0b111],
  [0b111, 0b001, 0b111, 0b001, 0b111],
  [0b101, 0b101, 0b111, 0b001, 0b001],
  [0b111, 0b100, 0b111, 0b001, 0b111],
  [0b111, 0b100, 0b111, 0b101, 0b111],
  [0b111, 0b001, 0b010, 0b010, 0b010],
  [0b111, 0b101, 0b111, 0b101, 0b111],
  [0b111, 0b101, 0b111, 0b001, 0b111],
];

#[derive(Error, Debug)]
pub enum DrawError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("无法加载字体文件: {0}")]
  FontError(String),
}

/// 标注样式：包围盒加从 1 开始的序号
pub struct Draw {
  box_color: [u8; 3],
  label_color: [u8; 3],
  box_thickness: u32,
  digit_scale: u32,
  #[cfg(feature = "label_font")]
  font: Option<(FontArc, PxScale)>,
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      box_color: BOX_COLOR,
      label_color: LABEL_COLOR,
      box_thickness: BOX_THICKNESS,
      digit_scale: DIGIT_SCALE,
      #[cfg(feature = "label_font")]
      font: None,
    }
  }
}

impl Draw {
  pub fn box_color(&self) -> [u8; 3] {
    self.box_color
  }

  /// 使用 TrueType 字体绘制序号，替代内置点阵
  #[cfg(feature = "label_font")]
  pub fn with_font_file(mut self, path: impl AsRef<Path>) -> Result<Self, DrawError> {
    let data = std::fs::read(path.as_ref())?;
    let font = FontArc::try_from_vec(data).map_err(|e| DrawError::FontError(e.to_string()))?;
    self.font = Some((font, PxScale::from(LABEL_FONT_SIZE)));
    Ok(self)
  }

  /// 在输入图像的副本上绘制所有物体
  pub fn annotate(&self, image: &RgbImage, objects: &[CandidateObject]) -> RgbImage {
    let mut canvas = image.clone();
    for object in objects {
      self.draw_bbox(&mut canvas, &object.bbox);
      self.draw_label(&mut canvas, &object.bbox, &object.index.to_string());
    }
    canvas
  }

  // 边框向内加粗
  fn draw_bbox(&self, image: &mut RgbImage, bbox: &BoundingBox) {
    for t in 0..self.box_thickness {
      let width = bbox.width.saturating_sub(2 * t);
      let height = bbox.height.saturating_sub(2 * t);
      if width == 0 || height == 0 {
        break;
      }
      let rect = Rect::at((bbox.x + t) as i32, (bbox.y + t) as i32).of_size(width, height);
      draw_hollow_rect_mut(image, rect, Rgb(self.box_color));
    }
  }

  fn draw_label(&self, image: &mut RgbImage, bbox: &BoundingBox, label: &str) {
    #[cfg(feature = "label_font")]
    if let Some((font, scale)) = &self.font {
      let x = bbox.x as i32;
      let y = (bbox.y as i32 - LABEL_OFFSET - scale.y as i32).max(0);
      imageproc::drawing::draw_text_mut(image, Rgb(self.label_color), x, y, *scale, font, label);
      return;
    }

    let glyph_height = (DIGIT_HEIGHT * self.digit_scale) as i32;
    let x = bbox.x as i32;
    let y = (bbox.y as i32 - LABEL_OFFSET - glyph_height).max(0);
    self.draw_digits(image, x, y, label);
  }

  fn draw_digits(&self, image: &mut RgbImage, x: i32, y: i32, text: &str) {
    let scale = self.digit_scale;
    let advance = ((DIGIT_WIDTH + 1) * scale) as i32;

    for (i, digit) in text.chars().filter_map(|c| c.to_digit(10)).enumerate() {
      let origin_x = x + i as i32 * advance;
      for (row, bits) in DIGIT_GLYPHS[digit as usize].iter().enumerate() {
        for col in 0..DIGIT_WIDTH {
          if bits & (1 << (DIGIT_WIDTH - 1 - col)) == 0 {
            continue;
          }
          let rect = Rect::at(
            origin_x + (col * scale) as i32,
            y + (row as u32 * scale) as i32,
          )
          .of_size(scale, scale);
          draw_filled_rect_mut(image, rect, Rgb(self.label_color));
        }
      }
    }
  }
}
