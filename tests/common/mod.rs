// 该文件是 Zhijian （质检） 项目的一部分。
// tests/common/mod.rs - 测试用合成图像
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

#![allow(dead_code)]

use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_filled_rect_mut, rect::Rect};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const DARK: Rgb<u8> = Rgb([30, 30, 30]);

/// 白底上画若干个以 `centers` 为中心、边长 `side` 的暗色方块
pub fn squares(size: u32, centers: &[(i32, i32)], side: u32) -> RgbImage {
  let mut image = RgbImage::from_pixel(size, size, WHITE);
  let half = (side / 2) as i32;
  for &(cx, cy) in centers {
    draw_filled_rect_mut(
      &mut image,
      Rect::at(cx - half, cy - half).of_size(side, side),
      DARK,
    );
  }
  image
}

/// 三个物体都在区域内的标准工件
pub fn good_part() -> RgbImage {
  squares(400, &[(150, 150), (200, 200), (250, 250)], 40)
}
