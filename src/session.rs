// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/session.rs - 会话状态机
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

//! # 会话控制
//!
//! 状态流转：`Idle → Recording → Finalizing → Idle`。
//!
//! - 授权标签触发会话，打开关键点输入源并按画面尺寸导出划分线
//! - 录制阶段逐帧送入 [`ZoneTracker`]，直到超时、输入耗尽、读取失败或操作员取消
//! - 结束阶段根据确认状态生成 [`SessionResult`] 并交给输出；输出失败只报告不重试
//!
//! 整个过程单线程同步执行，取消信号只在两帧之间检查。

mod clock;
mod record;

pub use self::clock::{Clock, SteppingClock, SystemClock};
pub use self::record::{SessionResult, TIMESTAMP_FORMAT};

use std::{
  fmt::Display,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use tracing::{error, info, warn};

use crate::{
  config::TrackerConfig,
  input::{OpenSampleSource, SampleSource},
  output::Persist,
  tracker::{Observation, ZoneTracker, display_zone},
};

/// 操作员取消信号，可跨线程共享（例如 Ctrl-C 处理函数）
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }

  pub fn clear(&self) {
    self.0.store(false, Ordering::SeqCst);
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
  Idle,
  Recording,
  Finalizing,
}

/// 录制阶段结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
  Timeout,
  Exhausted,
  ReadFailure,
  Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
  pub frames: usize,
  pub tracked: usize,
  pub rejected: usize,
  pub absent: usize,
}

#[derive(Debug, Clone)]
pub struct SessionReport {
  pub result: SessionResult,
  pub end: SessionEnd,
  pub stats: SessionStats,
  pub elapsed: Duration,
  /// 结果是否已成功交给输出
  pub persisted: bool,
}

#[derive(Debug, Clone)]
pub enum SessionOutcome {
  /// 标签不在授权列表中，未开始会话
  Unauthorized,
  /// 输入源无法打开，会话放弃，不产生结果
  SourceUnavailable(String),
  Completed(SessionReport),
}

pub struct SessionController<S, P, C = SystemClock> {
  config: Arc<TrackerConfig>,
  source: S,
  output: P,
  clock: C,
  cancel: CancelFlag,
  state: SessionState,
}

impl<S, P> SessionController<S, P, SystemClock> {
  pub fn new(config: Arc<TrackerConfig>, source: S, output: P) -> Self {
    Self {
      config,
      source,
      output,
      clock: SystemClock::default(),
      cancel: CancelFlag::new(),
      state: SessionState::Idle,
    }
  }
}

impl<S, P, C> SessionController<S, P, C> {
  pub fn with_clock<C2: Clock>(self, clock: C2) -> SessionController<S, P, C2> {
    SessionController {
      config: self.config,
      source: self.source,
      output: self.output,
      clock,
      cancel: self.cancel,
      state: self.state,
    }
  }

  pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
    self.cancel = cancel;
    self
  }

  pub fn cancel_flag(&self) -> CancelFlag {
    self.cancel.clone()
  }

  pub fn state(&self) -> SessionState {
    self.state
  }

  pub fn config(&self) -> &TrackerConfig {
    &self.config
  }

  pub fn output(&self) -> &P {
    &self.output
  }

  fn transition(&mut self, next: SessionState) {
    info!("会话状态: {:?} -> {:?}", self.state, next);
    self.state = next;
  }
}

impl<S, P, C> SessionController<S, P, C>
where
  S: OpenSampleSource,
  P: Persist,
  P::Error: Display,
  C: Clock,
{
  /// 处理一次读卡事件，授权时同步执行完整会话
  pub fn handle_tag(&mut self, tag: &str) -> SessionOutcome {
    info!("检测到标签: {}", tag);
    if !self.config.is_authorized(tag) {
      warn!("未授权标签: {}", tag);
      return SessionOutcome::Unauthorized;
    }

    info!(
      "授权标签，开始记录 {} 秒...",
      self.config.session_duration().as_secs()
    );
    let source = match self.source.open() {
      Ok(source) => source,
      Err(e) => {
        error!("无法打开关键点输入源: {}", e);
        return SessionOutcome::SourceUnavailable(e.to_string());
      }
    };

    self.transition(SessionState::Recording);
    self.cancel.clear();

    let started_at = self.clock.wall();
    let start = self.clock.monotonic();
    let mut tracker = ZoneTracker::new(&self.config, source.frame_size());
    info!("划分线: {:?}", tracker.thresholds());

    let (end, stats) = self.record(source, &mut tracker, start);
    let elapsed = self.clock.monotonic().saturating_sub(start);

    self.transition(SessionState::Finalizing);
    let confirmed = tracker.confirmed();
    let timestamp = started_at.format(TIMESTAMP_FORMAT).to_string();
    let result = SessionResult::new(
      tag,
      confirmed,
      started_at,
      self.config.video_file(&timestamp),
    );
    info!(
      "记录完成 ({:?}, {:.1?}): Rack Level: {} + Box {}，帧 {}，有效 {}，低置信度 {}，缺失 {}",
      end,
      elapsed,
      display_zone(confirmed.level),
      display_zone(confirmed.column),
      stats.frames,
      stats.tracked,
      stats.rejected,
      stats.absent
    );

    let persisted = match self.output.persist(&result) {
      Ok(()) => true,
      Err(e) => {
        error!("会话结果输出失败: {}", e);
        false
      }
    };

    self.transition(SessionState::Idle);
    SessionOutcome::Completed(SessionReport {
      result,
      end,
      stats,
      elapsed,
      persisted,
    })
  }

  fn record(
    &self,
    mut source: S::Source,
    tracker: &mut ZoneTracker,
    start: Duration,
  ) -> (SessionEnd, SessionStats) {
    let limit = self.config.session_duration();
    let mut stats = SessionStats::default();

    loop {
      if self.clock.monotonic().saturating_sub(start) >= limit {
        return (SessionEnd::Timeout, stats);
      }
      if self.cancel.is_cancelled() {
        warn!("操作员取消，提前结束记录");
        return (SessionEnd::Cancelled, stats);
      }

      let event = match source.next() {
        Some(Ok(event)) => event,
        Some(Err(e)) => {
          warn!("读取关键点失败，提前结束记录: {}", e);
          return (SessionEnd::ReadFailure, stats);
        }
        None => {
          warn!("关键点输入已耗尽，提前结束记录");
          return (SessionEnd::Exhausted, stats);
        }
      };

      stats.frames += 1;
      match tracker.observe(event) {
        Observation::Absent => stats.absent += 1,
        Observation::Rejected => stats.rejected += 1,
        Observation::Tracked { .. } => stats.tracked += 1,
      }
    }
  }
}
