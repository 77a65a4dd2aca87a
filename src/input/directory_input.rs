// 该文件是 Zhijian （质检） 项目的一部分。
// src/input/directory_input.rs - 目录（热文件夹）输入
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

use std::{
  collections::VecDeque,
  path::{Path, PathBuf},
  thread,
  time::{Duration, Instant},
};

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::Frame,
  input::{CaptureError, FrameSource},
  utils::{query_flag, query_value, url_to_path},
};

const DEFAULT_POLL_MS: u64 = 100;
const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

#[derive(Error, Debug)]
pub enum DirectoryInputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("不是目录: {0}")]
  NotADirectory(PathBuf),
}

/// 按文件名顺序读取目录中的图像
///
/// 带 `?watch` 时作为热文件夹使用：没有新文件就轮询等待，
/// 超过采集超时返回 [`CaptureError::Timeout`]。新文件的名字必须排在
/// 已读取的文件之后，排在前面的会被忽略。
pub struct DirectoryInput {
  directory: PathBuf,
  watch: bool,
  poll_interval: Duration,
  last: Option<PathBuf>,
  pending: VecDeque<PathBuf>,
  next_index: u64,
}

impl FromUrlWithScheme for DirectoryInput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryInput {
  type Error = DirectoryInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(DirectoryInputError::SchemeMismatch);
    }

    let directory = url_to_path(url);
    if !directory.is_dir() {
      return Err(DirectoryInputError::NotADirectory(directory));
    }

    let watch = query_flag(url, "watch");
    let poll_interval =
      Duration::from_millis(query_value(url, "poll_ms").unwrap_or(DEFAULT_POLL_MS));
    info!(
      "目录输入: {} (watch: {}, poll: {:?})",
      directory.display(),
      watch,
      poll_interval
    );

    Ok(DirectoryInput {
      directory,
      watch,
      poll_interval,
      last: None,
      pending: VecDeque::new(),
      next_index: 0,
    })
  }
}

fn is_image_file(path: &Path) -> bool {
  path.is_file()
    && path
      .extension()
      .and_then(|e| e.to_str())
      .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
      .unwrap_or(false)
}

impl DirectoryInput {
  fn scan(&mut self) -> std::io::Result<()> {
    let mut fresh = Vec::new();
    for entry in std::fs::read_dir(&self.directory)? {
      let path = entry?.path();
      if is_image_file(&path) && self.last.as_ref().is_none_or(|last| &path > last) {
        fresh.push(path);
      }
    }

    fresh.sort();
    if let Some(newest) = fresh.last() {
      self.last = Some(newest.clone());
    }
    self.pending.extend(fresh);
    Ok(())
  }

  fn load(&mut self, path: &Path) -> Result<Frame, CaptureError> {
    debug!("读取图像文件: {}", path.display());
    let image = ImageReader::open(path)?.decode()?.to_rgb8();
    let frame = Frame::new(image, self.next_index);
    self.next_index += 1;
    Ok(frame)
  }
}

impl FrameSource for DirectoryInput {
  fn capture(&mut self, timeout: Duration) -> Result<Frame, CaptureError> {
    let deadline = Instant::now() + timeout;

    loop {
      if let Some(path) = self.pending.pop_front() {
        return self.load(&path);
      }

      self.scan()?;
      if !self.pending.is_empty() {
        continue;
      }

      if !self.watch {
        return Err(CaptureError::Exhausted);
      }

      let now = Instant::now();
      if now >= deadline {
        return Err(CaptureError::Timeout(timeout));
      }
      thread::sleep(self.poll_interval.min(deadline - now));
    }
  }
}
