// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/tracker.rs - 关键点区域跟踪流水线
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

//! 每帧依次经过 置信度门限 → 滑动平均 → 区域映射 → 多帧确认。

mod confirm;
mod gate;
mod smooth;
mod zone;

pub use self::confirm::{ConfirmationTracker, ConfirmedState, Debouncer};
pub use self::gate::SampleGate;
pub use self::smooth::SmoothingFilter;
pub use self::zone::{
  BoxColumn, RackLevel, ZoneClassification, ZoneIndex, ZoneThresholds, classify,
};

use tracing::debug;

use crate::{
  config::TrackerConfig,
  frame::{FrameEvent, FrameSize, Point},
};

/// 单帧处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
  /// 未检测到关键点
  Absent,
  /// 置信度不足，被门限丢弃
  Rejected,
  Tracked {
    smoothed: Point,
    raw: ZoneClassification,
    confirmed: ConfirmedState,
  },
}

/// 单个会话独占的跟踪状态
pub struct ZoneTracker {
  gate: SampleGate,
  smoother: SmoothingFilter,
  thresholds: ZoneThresholds,
  confirmation: ConfirmationTracker,
}

impl ZoneTracker {
  pub fn new(config: &TrackerConfig, size: FrameSize) -> Self {
    Self::with_thresholds(
      config,
      ZoneThresholds::for_frame(size, &config.zones, config.margin),
    )
  }

  pub fn with_thresholds(config: &TrackerConfig, thresholds: ZoneThresholds) -> Self {
    Self {
      gate: SampleGate::new(config.confidence_threshold),
      smoother: SmoothingFilter::new(config.window),
      thresholds,
      confirmation: ConfirmationTracker::new(config.confirm_frames),
    }
  }

  pub fn observe(&mut self, event: FrameEvent) -> Observation {
    let Some(position) = self.gate.admit(&event) else {
      return match event {
        FrameEvent::Absent => Observation::Absent,
        FrameEvent::Sample(_) => Observation::Rejected,
      };
    };

    let smoothed = self.smoother.accept(position);
    let raw = classify(smoothed, &self.thresholds);
    let confirmed = self.confirmation.update(raw);

    debug!(
      "Rack Level: {} + Box {} (原始 {}/{}, 平滑坐标 {},{})",
      display_zone(confirmed.level),
      display_zone(confirmed.column),
      raw.level,
      raw.column,
      smoothed.x,
      smoothed.y
    );

    Observation::Tracked {
      smoothed,
      raw,
      confirmed,
    }
  }

  pub fn confirmed(&self) -> ConfirmedState {
    self.confirmation.state()
  }

  pub fn thresholds(&self) -> &ZoneThresholds {
    &self.thresholds
  }

  pub fn window_len(&self) -> usize {
    self.smoother.len()
  }

  pub fn history_len(&self) -> (usize, usize) {
    self.confirmation.history_len()
  }
}

/// 未确认时显示为 `Unknown`
pub fn display_zone<T: ZoneIndex>(zone: Option<T>) -> String {
  zone
    .map(|z| z.index().to_string())
    .unwrap_or_else(|| "Unknown".to_string())
}
