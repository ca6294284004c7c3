// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/tracker/gate.rs - 置信度门限
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

use crate::frame::{FrameEvent, Point};

/// 丢弃低置信度样本，被拒绝的帧不进入后续任何阶段
#[derive(Debug, Clone, Copy)]
pub struct SampleGate {
  threshold: f32,
}

impl SampleGate {
  pub fn new(threshold: f32) -> Self {
    Self { threshold }
  }

  pub fn threshold(&self) -> f32 {
    self.threshold
  }

  pub fn admit(&self, event: &FrameEvent) -> Option<Point> {
    match event {
      FrameEvent::Sample(sample) if sample.confidence > self.threshold => Some(sample.position),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frame::Sample;

  #[test]
  fn threshold_is_strict() {
    let gate = SampleGate::new(0.75);
    assert_eq!(gate.admit(&Sample::new(1, 2, 0.75).into()), None);
    assert_eq!(gate.admit(&Sample::new(1, 2, 0.76).into()), Some(Point::new(1, 2)));
  }

  #[test]
  fn absent_is_rejected() {
    let gate = SampleGate::new(0.0);
    assert_eq!(gate.admit(&FrameEvent::Absent), None);
  }
}
