// 该文件是 Zhijian （质检） 项目的一部分。
// tests/inspection.rs - 判定引擎的端到端测试
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

mod common;

use image::Rgb;
use imageproc::{drawing::draw_filled_rect_mut, rect::Rect};
use zhijian::{
  config::{AcceptanceZone, InspectionConfig, ThresholdMethod},
  draw::Draw,
  frame::Frame,
  inspect::{InspectError, InspectionEngine, Inspector, NokReason, Status, analyze},
};

fn station_config() -> InspectionConfig {
  InspectionConfig::default()
    .with_expected_count(3)
    .with_zone(AcceptanceZone::new(100, 100, 400, 400))
    .with_min_area(500.0)
}

#[test]
fn three_parts_in_zone_are_ok() {
  let frame = Frame::from(common::good_part());
  let inspection = analyze(&frame, &station_config()).unwrap();

  assert_eq!(inspection.verdict.status(), Status::Ok);
  assert_eq!(inspection.verdict.object_count(), 3);
  assert!(inspection.verdict.reasons().is_empty());
  assert_eq!(inspection.objects.len(), 3);

  let expected_centers = [(150, 150), (200, 200), (250, 250)];
  for (object, (cx, cy)) in inspection.objects.iter().zip(expected_centers) {
    assert!(object.in_zone);
    assert!(object.area >= 500.0, "面积过小: {}", object.area);
    assert!((object.center.x as i32 - cx).abs() <= 2);
    assert!((object.center.y as i32 - cy).abs() <= 2);
    assert!((38..=42).contains(&object.bbox.width));

    // 每个物体都有一个绿色框
    let corner = inspection
      .annotated
      .get_pixel(object.bbox.x, object.bbox.y);
    assert_eq!(*corner, Rgb(Draw::default().box_color()));
  }
  assert_eq!(
    inspection.objects.iter().map(|o| o.index).collect::<Vec<_>>(),
    vec![1, 2, 3]
  );
}

#[test]
fn annotation_leaves_frame_untouched() {
  let image = common::good_part();
  let frame = Frame::from(image.clone());
  let inspection = analyze(&frame, &station_config()).unwrap();

  assert_eq!(frame.image(), &image);
  assert_ne!(inspection.annotated, image);
  assert_eq!(inspection.annotated.dimensions(), image.dimensions());
}

#[test]
fn missing_part_is_nok() {
  let image = common::squares(400, &[(150, 150), (250, 250)], 40);
  let inspection = analyze(&Frame::from(image), &station_config()).unwrap();

  assert_eq!(inspection.verdict.status(), Status::Nok);
  assert_eq!(inspection.verdict.object_count(), 2);
  assert_eq!(
    inspection.verdict.reasons(),
    &[NokReason::CountMismatch {
      expected: 3,
      found: 2
    }]
  );
}

#[test]
fn extra_part_is_nok() {
  let image = common::squares(400, &[(150, 150), (200, 200), (250, 250), (320, 320)], 40);
  let inspection = analyze(&Frame::from(image), &station_config()).unwrap();

  assert_eq!(inspection.verdict.status(), Status::Nok);
  assert_eq!(inspection.verdict.object_count(), 4);
}

#[test]
fn part_outside_zone_is_nok_even_with_right_count() {
  let image = common::squares(400, &[(150, 150), (60, 200), (250, 250)], 40);
  let inspection = analyze(&Frame::from(image), &station_config()).unwrap();

  assert_eq!(inspection.verdict.object_count(), 3);
  assert_eq!(inspection.verdict.status(), Status::Nok);
  let out: Vec<_> = inspection.objects.iter().filter(|o| !o.in_zone).collect();
  assert_eq!(out.len(), 1);
  assert!((out[0].center.x as i32 - 60).abs() <= 2);
  assert!(inspection.verdict.reasons().iter().all(|r| matches!(
    r,
    NokReason::OutOfZone { index, .. } if *index == out[0].index
  )));
}

#[test]
fn fragment_on_frame_edge_does_not_hide_parts() {
  let mut image = common::good_part();
  draw_filled_rect_mut(&mut image, Rect::at(0, 190).of_size(20, 20), common::DARK);
  let inspection = analyze(&Frame::from(image), &station_config()).unwrap();

  // 贴边的碎片面积不足，三个工件照常计数
  assert_eq!(inspection.verdict.object_count(), 3);
  assert_eq!(inspection.verdict.status(), Status::Ok);
  assert!(inspection.objects.iter().all(|o| o.in_zone && o.bbox.x > 100));
}

#[test]
fn specks_are_filtered_by_area() {
  let image = common::squares(400, &[(120, 120), (200, 260), (300, 150)], 5);
  let inspection = analyze(&Frame::from(image), &station_config()).unwrap();

  assert_eq!(inspection.verdict.object_count(), 0);
  assert_eq!(inspection.verdict.status(), Status::Nok);
  assert!(inspection.objects.is_empty());
  assert_eq!(inspection.annotated, common::squares(400, &[(120, 120), (200, 260), (300, 150)], 5));
}

#[test]
fn zero_expected_count_is_rejected() {
  let frame = Frame::from(common::good_part());
  let config = station_config().with_expected_count(0);
  assert!(matches!(
    analyze(&frame, &config),
    Err(InspectError::InvalidConfig(_))
  ));
}

#[test]
fn repeated_analysis_is_identical() {
  let frame = Frame::from(common::good_part());
  let engine = InspectionEngine::new(station_config()).unwrap();

  let first = engine.inspect(&frame).unwrap();
  let second = engine.inspect(&frame).unwrap();
  assert_eq!(first.objects, second.objects);
  assert_eq!(first.annotated, second.annotated);
  assert_eq!(first.verdict.status(), second.verdict.status());
}

#[test]
fn engine_is_shared_across_threads() {
  let engine = InspectionEngine::new(station_config()).unwrap();
  let ok = Frame::from(common::good_part());
  let nok = Frame::from(common::squares(400, &[(150, 150)], 40));

  std::thread::scope(|s| {
    let handles: Vec<_> = (0..4)
      .map(|i| {
        let engine = &engine;
        let frame = if i % 2 == 0 { &ok } else { &nok };
        s.spawn(move || engine.inspect(frame).unwrap().verdict.status())
      })
      .collect();

    let statuses: Vec<Status> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(statuses, vec![Status::Ok, Status::Nok, Status::Ok, Status::Nok]);
  });
}

#[test]
fn otsu_threshold_finds_the_same_parts() {
  let config = station_config().with_threshold(ThresholdMethod::Otsu);
  let inspection = analyze(&Frame::from(common::good_part()), &config).unwrap();
  assert_eq!(inspection.verdict.object_count(), 3);
  assert_eq!(inspection.verdict.status(), Status::Ok);
}

#[test]
fn bgr_buffer_matches_rgb_image() {
  let image = common::good_part();
  let bgr: Vec<u8> = image
    .pixels()
    .flat_map(|p| [p[2], p[1], p[0]])
    .collect();
  let frame = Frame::from_bgr8(400, 400, &bgr, 7).unwrap();
  let inspection = analyze(&frame, &station_config()).unwrap();
  assert_eq!(inspection.frame_index, 7);
  assert_eq!(inspection.verdict.object_count(), 3);
}
