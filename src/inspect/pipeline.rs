// 该文件是 Zhijian （质检） 项目的一部分。
// src/inspect/pipeline.rs - 图像处理流水线
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

//! 灰度 → 直方图均衡 → 高斯模糊 → 反相阈值 → 闭运算 → 外轮廓
//!
//! 各阶段顺序固定，阶段之间没有分支。

use image::{GrayImage, Luma, RgbImage, imageops};
use imageproc::{
  contours::{BorderType, Contour, find_contours},
  contrast::otsu_level,
  distance_transform::Norm,
  filter::gaussian_blur_f32,
  integral_image::{integral_image, sum_image_pixels},
  morphology::close,
  point::Point,
  stats::cumulative_histogram,
};

use crate::config::{InspectionConfig, ThresholdMethod};

const FOREGROUND: u8 = 255;
const BACKGROUND: u8 = 0;

/// 运行前五个阶段，得到闭运算后的二值图
pub fn binarize(image: &RgbImage, config: &InspectionConfig) -> GrayImage {
  let gray = imageops::grayscale(image);
  let equalized = equalize_histogram(&gray);
  let blurred = gaussian_blur_f32(&equalized, config.blur_sigma);

  let binary = match config.threshold {
    ThresholdMethod::AdaptiveMean {
      block_radius,
      delta,
    } => adaptive_mean_threshold_inv(&blurred, block_radius, delta),
    ThresholdMethod::Otsu => otsu_threshold_inv(&blurred),
  };

  if config.close_radius == 0 {
    binary
  } else {
    close(&binary, Norm::LInf, config.close_radius)
  }
}

/// 直方图均衡，最暗的已有灰度映射到 0，最亮的映射到 255
///
/// 查找表为 `round(255 * (cdf - cdf_min) / (total - cdf_min))`，
/// 只有一种灰度的图像原样返回。
pub fn equalize_histogram(image: &GrayImage) -> GrayImage {
  let histogram = cumulative_histogram(image);
  let cdf = &histogram.channels[0];
  let total = cdf[255] as u64;
  let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0) as u64;
  if total <= cdf_min {
    return image.clone();
  }

  let range = total - cdf_min;
  let lut: Vec<u8> = cdf
    .iter()
    .map(|&c| ((c as u64).saturating_sub(cdf_min) * 255 * 2 + range) / (2 * range))
    .map(|v| v.min(255) as u8)
    .collect();

  let mut equalized = image.clone();
  for pixel in equalized.pixels_mut() {
    pixel[0] = lut[pixel[0] as usize];
  }
  equalized
}

/// 只保留最外层轮廓，嵌套的内边界和孔洞全部忽略
///
/// 图像四周先补一圈背景再提取，贴边的前景也是外轮廓，
/// 不会把图中其余物体变成它的子轮廓。
pub fn external_contours(binary: &GrayImage) -> Vec<Contour<i32>> {
  let (width, height) = binary.dimensions();
  let mut padded = GrayImage::new(width + 2, height + 2);
  imageops::replace(&mut padded, binary, 1, 1);

  find_contours::<i32>(&padded)
    .into_iter()
    .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
    .map(|c| Contour {
      points: c.points.iter().map(|p| Point::new(p.x - 1, p.y - 1)).collect(),
      border_type: c.border_type,
      parent: c.parent,
    })
    .collect()
}

/// 轮廓点围成的多边形面积（鞋带公式）
pub fn contour_area(contour: &Contour<i32>) -> f64 {
  let points = &contour.points;
  if points.len() < 3 {
    return 0.0;
  }

  let twice_area: i64 = points
    .iter()
    .zip(points.iter().cycle().skip(1))
    .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
    .sum();

  twice_area.abs() as f64 / 2.0
}

/// 局部均值自适应阈值，反相：比邻域均值暗 `delta` 以上的像素为前景
///
/// 窗口在图像边缘处截断，均值只统计落在图像内的像素。
pub fn adaptive_mean_threshold_inv(image: &GrayImage, block_radius: u32, delta: i32) -> GrayImage {
  let (width, height) = image.dimensions();
  let integral = integral_image::<_, u64>(image);

  GrayImage::from_fn(width, height, |x, y| {
    let x0 = x.saturating_sub(block_radius);
    let y0 = y.saturating_sub(block_radius);
    let x1 = (x + block_radius).min(width - 1);
    let y1 = (y + block_radius).min(height - 1);

    let count = ((x1 - x0 + 1) as u64) * ((y1 - y0 + 1) as u64);
    let [sum] = sum_image_pixels(&integral, x0, y0, x1, y1);
    // 四舍五入到整数灰度
    let mean = ((2 * sum + count) / (2 * count)) as i32;

    let pixel = image.get_pixel(x, y)[0] as i32;
    if pixel <= mean - delta {
      Luma([FOREGROUND])
    } else {
      Luma([BACKGROUND])
    }
  })
}

/// 全局 Otsu 阈值，反相
pub fn otsu_threshold_inv(image: &GrayImage) -> GrayImage {
  let level = otsu_level(image);
  let mut binary = image.clone();
  for pixel in binary.pixels_mut() {
    pixel[0] = if pixel[0] <= level {
      FOREGROUND
    } else {
      BACKGROUND
    };
  }
  binary
}
