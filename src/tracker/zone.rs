// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/tracker/zone.rs - 货架层级与箱位划分
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

use std::fmt;

use crate::{
  config::ZoneFractions,
  frame::{FrameSize, Point},
};

/// 有编号的区域（层级 / 箱位）
pub trait ZoneIndex: Copy + Eq + fmt::Debug {
  fn index(self) -> u8;
}

/// 货架层级，0 为最低
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RackLevel {
  Low = 0,
  Middle = 1,
  High = 2,
}

/// 箱位列，0 为最左
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxColumn {
  Left = 0,
  Center = 1,
  Right = 2,
}

impl ZoneIndex for RackLevel {
  fn index(self) -> u8 {
    self as u8
  }
}

impl ZoneIndex for BoxColumn {
  fn index(self) -> u8 {
    self as u8
  }
}

impl fmt::Display for RackLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.index())
  }
}

impl fmt::Display for BoxColumn {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.index())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneClassification {
  pub level: RackLevel,
  pub column: BoxColumn,
}

/// 由帧尺寸一次性导出的划分线，会话期间不变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneThresholds {
  pub line_top: i32,
  pub line_middle: i32,
  /// 仅供画面参考，不参与层级判定
  pub line_bottom: i32,
  pub line_left: i32,
  pub line_right: i32,
  pub margin: i32,
}

impl ZoneThresholds {
  pub fn for_frame(size: FrameSize, fractions: &ZoneFractions, margin: i32) -> Self {
    let along = |extent: u32, fraction: f64| (extent as f64 * fraction) as i32;
    Self {
      line_top: along(size.height, fractions.top),
      line_middle: along(size.height, fractions.middle),
      line_bottom: along(size.height, fractions.bottom),
      line_left: along(size.width, fractions.left),
      line_right: along(size.width, fractions.right),
      margin,
    }
  }

  pub fn level(&self, y: i32) -> RackLevel {
    if y < self.line_top {
      RackLevel::High
    } else if y < self.line_middle {
      RackLevel::Middle
    } else {
      RackLevel::Low
    }
  }

  pub fn column(&self, x: i32) -> BoxColumn {
    if x < self.line_left.saturating_sub(self.margin) {
      BoxColumn::Left
    } else if x > self.line_right.saturating_add(self.margin) {
      BoxColumn::Right
    } else {
      BoxColumn::Center
    }
  }
}

/// 将平滑后的坐标映射为 (层级, 箱位)
pub fn classify(position: Point, thresholds: &ZoneThresholds) -> ZoneClassification {
  ZoneClassification {
    level: thresholds.level(position.y),
    column: thresholds.column(position.x),
  }
}
