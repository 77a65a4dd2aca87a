// 该文件是 Zhijian （质检） 项目的一部分。
// src/task.rs - 检测任务循环
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

//! 触发 → 采集 → 判定 → 展示/持久化，每轮串行执行。
//!
//! 各阶段的错误分别处理：采集失败跳过本轮，输入源耗尽结束循环，
//! 无效帧跳过本轮，输出失败终止任务。

use std::{
  io::BufRead,
  sync::mpsc::{self, Receiver, RecvTimeoutError},
  thread,
  time::{Duration, Instant},
};

use tracing::{error, info, warn};

use crate::{
  frame::Frame,
  input::{CaptureError, FrameSource},
  inspect::{InspectError, Inspection, Inspector, Status},
  output::Render,
};

/// 任务统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
  pub ok: usize,
  pub nok: usize,
  pub skipped: usize,
}

impl Summary {
  pub fn inspected(&self) -> usize {
    self.ok + self.nok
  }

  pub fn cycles(&self) -> usize {
    self.inspected() + self.skipped
  }
}

pub trait Task<S, M, O>: Sized {
  type Error;
  fn run_task(self, source: S, inspector: M, output: O) -> Result<Summary, Self::Error>;
}

/// 触发器：返回 `false` 表示停止
pub trait Trigger {
  fn wait(&mut self) -> bool;
}

/// 只触发一次
#[derive(Debug, Default)]
pub struct OneShotTrigger {
  fired: bool,
}

impl Trigger for OneShotTrigger {
  fn wait(&mut self) -> bool {
    !std::mem::replace(&mut self.fired, true)
  }
}

/// 定时触发，首次立即触发
pub struct IntervalTrigger {
  interval: Duration,
  next: Option<Instant>,
  stop: Option<Receiver<()>>,
}

impl IntervalTrigger {
  pub fn new(interval: Duration) -> Self {
    Self {
      interval,
      next: None,
      stop: None,
    }
  }

  /// 收到信号后在下一次等待时停止
  pub fn with_stop_signal(mut self, stop: Receiver<()>) -> Self {
    self.stop = Some(stop);
    self
  }

  /// 安装 Ctrl-C 处理：第一次中断停止循环，30 秒内未退出则强制退出
  pub fn with_ctrlc(self) -> Result<Self, ctrlc::Error> {
    let (tx, rx) = mpsc::channel();

    ctrlc::set_handler(move || {
      info!("收到中断信号，准备退出...");
      let _ = tx.send(());
      thread::spawn(|| {
        thread::sleep(Duration::from_secs(30));
        warn!("强制退出程序");
        std::process::exit(1);
      });
    })?;

    Ok(self.with_stop_signal(rx))
  }

  fn stopped_within(&self, timeout: Duration) -> bool {
    match &self.stop {
      Some(rx) => match rx.recv_timeout(timeout) {
        Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        Err(RecvTimeoutError::Timeout) => false,
      },
      None => {
        thread::sleep(timeout);
        false
      }
    }
  }
}

impl Trigger for IntervalTrigger {
  fn wait(&mut self) -> bool {
    let now = Instant::now();
    let remaining = self
      .next
      .map(|next| next.saturating_duration_since(now))
      .unwrap_or_default();

    if self.stopped_within(remaining) {
      warn!("中断信号接收，退出任务循环");
      return false;
    }

    self.next = Some(Instant::now() + self.interval);
    true
  }
}

/// 手动触发：每读到一行触发一次，读到 `q` 或输入结束时停止
pub struct ManualTrigger<R> {
  reader: R,
}

impl<R: BufRead> ManualTrigger<R> {
  pub fn new(reader: R) -> Self {
    Self { reader }
  }
}

impl ManualTrigger<std::io::StdinLock<'static>> {
  pub fn stdin() -> Self {
    Self::new(std::io::stdin().lock())
  }
}

impl<R: BufRead> Trigger for ManualTrigger<R> {
  fn wait(&mut self) -> bool {
    info!("按回车采集一帧，输入 q 退出");
    let mut line = String::new();
    match self.reader.read_line(&mut line) {
      Ok(0) => false,
      Ok(_) => !matches!(line.trim(), "q" | "quit"),
      Err(e) => {
        error!("读取触发输入失败: {}", e);
        false
      }
    }
  }
}

/// 工位主循环
pub struct StationTask<T> {
  trigger: T,
  timeout: Duration,
  frame_number: Option<usize>,
}

impl<T: Trigger> StationTask<T> {
  pub fn new(trigger: T, timeout: Duration) -> Self {
    Self {
      trigger,
      timeout,
      frame_number: None,
    }
  }

  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }
}

impl<T, S, M, O, RE> Task<S, M, O> for StationTask<T>
where
  T: Trigger,
  S: FrameSource,
  M: Inspector<Input = Frame, Output = Inspection, Error = InspectError>,
  O: Render<Inspection, Error = RE>,
  RE: std::error::Error + Send + Sync + 'static,
{
  type Error = anyhow::Error;

  fn run_task(mut self, mut source: S, inspector: M, output: O) -> Result<Summary, Self::Error> {
    info!("开始任务...");
    let mut summary = Summary::default();

    loop {
      if let Some(n) = self.frame_number
        && summary.inspected() >= n
      {
        info!("达到指定帧数 {}, 退出任务循环", n);
        break;
      }

      if !self.trigger.wait() {
        break;
      }

      let frame = match source.capture(self.timeout) {
        Ok(frame) => frame,
        Err(CaptureError::Exhausted) => {
          info!("输入源已耗尽，退出任务循环");
          break;
        }
        Err(e) => {
          warn!("采集失败，跳过本轮: {}", e);
          summary.skipped += 1;
          continue;
        }
      };
      info!("处理第 {} 帧图像", frame.index());

      let now = Instant::now();
      let inspection = match inspector.inspect(&frame) {
        Ok(inspection) => inspection,
        Err(InspectError::InvalidInput(msg)) => {
          error!("帧 {} 无效，跳过本轮: {}", frame.index(), msg);
          summary.skipped += 1;
          continue;
        }
        Err(e) => return Err(e.into()),
      };
      let elapsed_a = now.elapsed();

      output.render_result(&inspection)?;
      let elapsed_b = now.elapsed();
      info!("检测完成，耗时: {:.2?} / {:.2?}", elapsed_a, elapsed_b);

      match inspection.verdict.status() {
        Status::Ok => summary.ok += 1,
        Status::Nok => summary.nok += 1,
      }
    }

    info!(
      "任务完成，退出: OK {}, NOK {}, 跳过 {}",
      summary.ok, summary.nok, summary.skipped
    );
    Ok(summary)
  }
}

/// 对同一帧重复检测，统计耗时并检查结果是否一致
pub struct RepeatShotTask {
  repeat: usize,
  timeout: Duration,
}

impl RepeatShotTask {
  pub fn new(repeat: usize, timeout: Duration) -> Self {
    Self {
      repeat: repeat.max(1),
      timeout,
    }
  }
}

impl<S, M, O, ME, RE> Task<S, M, O> for RepeatShotTask
where
  S: FrameSource,
  M: Inspector<Input = Frame, Output = Inspection, Error = ME>,
  O: Render<Inspection, Error = RE>,
  ME: std::error::Error + Send + Sync + 'static,
  RE: std::error::Error + Send + Sync + 'static,
{
  type Error = anyhow::Error;

  fn run_task(self, mut source: S, inspector: M, output: O) -> Result<Summary, Self::Error> {
    info!("开始任务...");
    let frame = source.capture(self.timeout)?;
    info!("输入帧获取成功，开始检测...");

    let mut times = Vec::with_capacity(self.repeat);
    let mut last: Option<Inspection> = None;
    for i in 0..self.repeat {
      let now = Instant::now();
      let inspection = inspector.inspect(&frame)?;
      let elapsed = now.elapsed();
      info!("({})检测完成，耗时: {:.2?}", i, elapsed);
      times.push(elapsed);

      if let Some(previous) = &last {
        let before = (previous.verdict.object_count(), previous.verdict.status());
        let after = (inspection.verdict.object_count(), inspection.verdict.status());
        if before != after {
          anyhow::bail!("重复检测结果不一致: {:?} -> {:?}", before, after);
        }
      }
      last = Some(inspection);
    }

    // 前两次含预热，不计入平均
    let skip = if times.len() > 2 { 2 } else { 0 };
    let measured = &times[skip..];
    warn!(
      "平均检测时间: {:.2?}",
      measured.iter().sum::<Duration>() / measured.len() as u32
    );

    let mut summary = Summary::default();
    if let Some(inspection) = last {
      output.render_result(&inspection)?;
      match inspection.verdict.status() {
        Status::Ok => summary.ok += 1,
        Status::Nok => summary.nok += 1,
      }
    }
    Ok(summary)
  }
}
