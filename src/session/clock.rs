// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/session/clock.rs - 会话计时
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
  cell::Cell,
  time::{Duration, Instant},
};

use chrono::{DateTime, Local};

/// 会话计时来源：单调时间判定时长，墙上时间用于时间戳
pub trait Clock {
  /// 自任意固定起点以来的单调时间
  fn monotonic(&self) -> Duration;
  fn wall(&self) -> DateTime<Local>;
}

pub struct SystemClock {
  origin: Instant,
}

impl Default for SystemClock {
  fn default() -> Self {
    Self {
      origin: Instant::now(),
    }
  }
}

impl Clock for SystemClock {
  fn monotonic(&self) -> Duration {
    self.origin.elapsed()
  }

  fn wall(&self) -> DateTime<Local> {
    Local::now()
  }
}

/// 每次读取单调时间都前进固定步长，墙上时间固定，用于离线回放与测试
pub struct SteppingClock {
  now: Cell<Duration>,
  step: Duration,
  wall: DateTime<Local>,
}

impl SteppingClock {
  pub fn new(step: Duration, wall: DateTime<Local>) -> Self {
    Self {
      now: Cell::new(Duration::ZERO),
      step,
      wall,
    }
  }
}

impl Clock for SteppingClock {
  fn monotonic(&self) -> Duration {
    let now = self.now.get();
    self.now.set(now + self.step);
    now
  }

  fn wall(&self) -> DateTime<Local> {
    self.wall
  }
}
