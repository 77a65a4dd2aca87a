// 该文件是 Zhijian （质检） 项目的一部分。
// tests/station.rs - 工位循环测试
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

use std::{cell::RefCell, collections::VecDeque, time::Duration};

use image::RgbImage;
use url::Url;
use zhijian::{
  FromUrl,
  config::InspectionConfig,
  frame::Frame,
  input::{CaptureError, FrameSource, InputWrapper},
  inspect::{Inspection, InspectionEngine, Status},
  output::{CSV_HEADER, Outputs, Render},
  task::{IntervalTrigger, OneShotTrigger, RepeatShotTask, StationTask, Summary, Task},
};

const TIMEOUT: Duration = Duration::from_millis(50);

/// 预先排好的采集结果，用完即耗尽
struct ScriptedSource(VecDeque<Result<Frame, CaptureError>>);

impl FrameSource for ScriptedSource {
  fn capture(&mut self, _timeout: Duration) -> Result<Frame, CaptureError> {
    self.0.pop_front().unwrap_or(Err(CaptureError::Exhausted))
  }
}

#[derive(Default)]
struct Collect(RefCell<Vec<(u64, Status)>>);

impl Render<Inspection> for &Collect {
  type Error = std::convert::Infallible;

  fn render_result(&self, result: &Inspection) -> Result<(), Self::Error> {
    self
      .0
      .borrow_mut()
      .push((result.frame_index, result.verdict.status()));
    Ok(())
  }
}

struct FailingSink;

impl Render<Inspection> for FailingSink {
  type Error = std::io::Error;

  fn render_result(&self, _result: &Inspection) -> Result<(), Self::Error> {
    Err(std::io::Error::other("磁盘已满"))
  }
}

fn engine() -> InspectionEngine {
  InspectionEngine::new(InspectionConfig::default()).unwrap()
}

fn continuous() -> StationTask<IntervalTrigger> {
  StationTask::new(IntervalTrigger::new(Duration::ZERO), TIMEOUT)
}

#[test]
fn capture_failures_skip_the_cycle() {
  let source = ScriptedSource(VecDeque::from(vec![
    Err(CaptureError::Timeout(TIMEOUT)),
    Ok(Frame::new(common::good_part(), 1)),
    Ok(Frame::new(RgbImage::new(0, 0), 2)),
    Ok(Frame::new(common::squares(400, &[(150, 150)], 40), 3)),
  ]));
  let sink = Collect::default();

  let summary = continuous().run_task(source, engine(), &sink).unwrap();

  assert_eq!(
    summary,
    Summary {
      ok: 1,
      nok: 1,
      skipped: 2
    }
  );
  assert_eq!(summary.cycles(), 4);
  assert_eq!(
    *sink.0.borrow(),
    vec![(1, Status::Ok), (3, Status::Nok)]
  );
}

#[test]
fn frame_number_limits_the_loop() {
  let frames = (0..5)
    .map(|i| Ok(Frame::new(common::good_part(), i)))
    .collect();
  let sink = Collect::default();

  let summary = continuous()
    .with_frame_number(Some(2))
    .run_task(ScriptedSource(frames), engine(), &sink)
    .unwrap();

  assert_eq!(summary.inspected(), 2);
  assert_eq!(sink.0.borrow().len(), 2);
}

#[test]
fn one_shot_inspects_a_single_frame() {
  let frames = (0..3)
    .map(|i| Ok(Frame::new(common::good_part(), i)))
    .collect();
  let sink = Collect::default();

  let summary = StationTask::new(OneShotTrigger::default(), TIMEOUT)
    .run_task(ScriptedSource(frames), engine(), &sink)
    .unwrap();

  assert_eq!(summary.ok, 1);
  assert_eq!(*sink.0.borrow(), vec![(0, Status::Ok)]);
}

#[test]
fn sink_failure_aborts_the_task() {
  let frames = VecDeque::from(vec![Ok(Frame::new(common::good_part(), 0))]);
  let result = continuous().run_task(ScriptedSource(frames), engine(), FailingSink);
  assert!(result.is_err());
}

#[test]
fn repeat_shot_renders_once() {
  let frames = VecDeque::from(vec![Ok(Frame::new(common::good_part(), 0))]);
  let sink = Collect::default();

  let summary = RepeatShotTask::new(5, TIMEOUT)
    .run_task(ScriptedSource(frames), engine(), &sink)
    .unwrap();

  assert_eq!(summary.ok, 1);
  assert_eq!(sink.0.borrow().len(), 1);
}

#[test]
fn folder_to_csv_and_nok_images() {
  let dir = tempfile::tempdir().unwrap();
  let frames = dir.path().join("frames");
  std::fs::create_dir_all(&frames).unwrap();
  common::good_part().save(frames.join("001.png")).unwrap();
  common::squares(400, &[(150, 150), (250, 250)], 40)
    .save(frames.join("002.png"))
    .unwrap();
  common::good_part().save(frames.join("003.png")).unwrap();

  let input = Url::parse(&format!("folder://{}", frames.display())).unwrap();
  let csv = dir.path().join("output").join("results.csv");
  let nok = dir.path().join("output").join("nok_images");
  let outputs = [
    Url::parse("console:").unwrap(),
    Url::parse(&format!("csv://{}", csv.display())).unwrap(),
    Url::parse(&format!("folder://{}", nok.display())).unwrap(),
  ];

  let source = InputWrapper::from_url(&input).unwrap();
  let output = Outputs::from_urls(&outputs).unwrap();
  let summary = continuous().run_task(source, engine(), output).unwrap();

  assert_eq!(summary.ok, 2);
  assert_eq!(summary.nok, 1);

  let text = std::fs::read_to_string(&csv).unwrap();
  let lines: Vec<&str> = text.lines().collect();
  assert_eq!(lines.len(), 4);
  assert_eq!(lines[0], CSV_HEADER);
  assert!(lines[1].ends_with(",3,OK"));
  assert!(lines[2].ends_with(",2,NOK"));
  assert!(lines[3].ends_with(",3,OK"));

  let saved: Vec<_> = std::fs::read_dir(&nok)
    .unwrap()
    .map(|e| e.unwrap().path())
    .collect();
  assert_eq!(saved.len(), 1);
  assert_eq!(saved[0].extension().unwrap(), "png");
  let stem = saved[0].file_stem().unwrap().to_str().unwrap();
  assert!(lines[2].starts_with(stem));
}
