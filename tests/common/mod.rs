// 该文件是 Rackwatch （货架守望） 项目的一部分。
// tests/common/mod.rs - 集成测试公共工具
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

use std::{
  cell::{Cell, RefCell},
  io,
  sync::Arc,
  time::Duration,
};

use chrono::{DateTime, Local, TimeZone};

use rackwatch::{
  config::TrackerConfig,
  frame::{FrameEvent, FrameSize, Sample},
  input::{InputError, OpenSampleSource, SampleSource},
  output::Persist,
  session::{CancelFlag, SessionController, SessionResult, SteppingClock},
};

pub const AUTHORIZED: &str = "79 FC 77 5A";
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

pub fn session_start() -> DateTime<Local> {
  Local.with_ymd_and_hms(2026, 5, 20, 14, 30, 0).unwrap()
}

pub fn config() -> Arc<TrackerConfig> {
  Arc::new(TrackerConfig::default().with_tags([AUTHORIZED, "53 21 04 05"]))
}

pub fn sample(x: i32, y: i32, confidence: f32) -> FrameEvent {
  FrameEvent::Sample(Sample::new(x, y, confidence))
}

/// 按脚本产出事件的输入源，每次打开都从头开始；`later` 非空时第二次起改用它
#[derive(Clone, Default)]
pub struct ScriptedSource {
  pub events: Vec<FrameEvent>,
  pub later: Vec<FrameEvent>,
  pub opened: Cell<usize>,
  pub repeat: bool,
  pub fail_after: Option<usize>,
  pub cancel_after: Option<(usize, CancelFlag)>,
  pub unavailable: bool,
}

impl ScriptedSource {
  pub fn once(events: Vec<FrameEvent>) -> Self {
    Self {
      events,
      ..Default::default()
    }
  }

  pub fn forever(event: FrameEvent) -> Self {
    Self {
      events: vec![event],
      repeat: true,
      ..Default::default()
    }
  }
}

pub struct ScriptedStream {
  events: Box<dyn Iterator<Item = FrameEvent>>,
  yielded: usize,
  fail_after: Option<usize>,
  cancel_after: Option<(usize, CancelFlag)>,
}

impl Iterator for ScriptedStream {
  type Item = Result<FrameEvent, InputError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.fail_after == Some(self.yielded) {
      return Some(Err(InputError::IoError(io::Error::other("摄像头断开"))));
    }
    let event = self.events.next()?;
    self.yielded += 1;
    if let Some((n, cancel)) = &self.cancel_after {
      if *n == self.yielded {
        cancel.cancel();
      }
    }
    Some(Ok(event))
  }
}

impl SampleSource for ScriptedStream {
  fn frame_size(&self) -> FrameSize {
    FrameSize::new(640, 480)
  }
}

impl OpenSampleSource for ScriptedSource {
  type Source = ScriptedStream;

  fn open(&self) -> Result<Self::Source, InputError> {
    if self.unavailable {
      return Err(InputError::IoError(io::Error::new(
        io::ErrorKind::NotFound,
        "无法访问摄像头",
      )));
    }
    let script = if self.opened.get() > 0 && !self.later.is_empty() {
      self.later.clone()
    } else {
      self.events.clone()
    };
    self.opened.set(self.opened.get() + 1);

    let events: Box<dyn Iterator<Item = FrameEvent>> = if self.repeat {
      Box::new(script.into_iter().cycle())
    } else {
      Box::new(script.into_iter())
    };
    Ok(ScriptedStream {
      events,
      yielded: 0,
      fail_after: self.fail_after,
      cancel_after: self.cancel_after.clone(),
    })
  }
}

/// 记录所有交付的结果，可模拟输出失败
#[derive(Default)]
pub struct RecordingOutput {
  pub results: RefCell<Vec<SessionResult>>,
  pub fail: bool,
}

impl Persist for RecordingOutput {
  type Error = io::Error;

  fn persist(&self, result: &SessionResult) -> Result<(), Self::Error> {
    self.results.borrow_mut().push(result.clone());
    if self.fail {
      return Err(io::Error::other("上传失败"));
    }
    Ok(())
  }
}

pub fn controller(
  source: ScriptedSource,
  output: RecordingOutput,
) -> SessionController<ScriptedSource, RecordingOutput, SteppingClock> {
  SessionController::new(config(), source, output)
    .with_clock(SteppingClock::new(FRAME_INTERVAL, session_start()))
}
