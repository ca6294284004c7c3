// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/tracker/confirm.rs - 多帧一致确认（去抖）
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

use super::zone::{BoxColumn, RackLevel, ZoneClassification};

/// 单轴去抖器
///
/// 最近 `required` 个原始值全部相同时才更新确认值；确认值一旦设定，
/// 在同一会话内不会回到未知。用连续相同值的计数代替对历史的重复扫描。
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
  required: usize,
  last: Option<T>,
  run: usize,
  seen: usize,
  confirmed: Option<T>,
}

impl<T: Copy + Eq> Debouncer<T> {
  pub fn new(required: usize) -> Self {
    Self {
      required: required.max(1),
      last: None,
      run: 0,
      seen: 0,
      confirmed: None,
    }
  }

  pub fn push(&mut self, value: T) -> Option<T> {
    if self.last == Some(value) {
      self.run = (self.run + 1).min(self.required);
    } else {
      self.last = Some(value);
      self.run = 1;
    }
    self.seen = (self.seen + 1).min(self.required);

    if self.run == self.required {
      self.confirmed = Some(value);
    }
    self.confirmed
  }

  pub fn confirmed(&self) -> Option<T> {
    self.confirmed
  }

  /// 当前历史长度，不超过 `required`
  pub fn history_len(&self) -> usize {
    self.seen
  }

  pub fn required(&self) -> usize {
    self.required
  }
}

/// 会话的确认状态，`None` 表示尚未确认
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfirmedState {
  pub level: Option<RackLevel>,
  pub column: Option<BoxColumn>,
}

/// 层级与箱位各自独立去抖
#[derive(Debug, Clone)]
pub struct ConfirmationTracker {
  level: Debouncer<RackLevel>,
  column: Debouncer<BoxColumn>,
}

impl ConfirmationTracker {
  pub fn new(confirm_frames: usize) -> Self {
    Self {
      level: Debouncer::new(confirm_frames),
      column: Debouncer::new(confirm_frames),
    }
  }

  pub fn update(&mut self, classification: ZoneClassification) -> ConfirmedState {
    ConfirmedState {
      level: self.level.push(classification.level),
      column: self.column.push(classification.column),
    }
  }

  pub fn state(&self) -> ConfirmedState {
    ConfirmedState {
      level: self.level.confirmed(),
      column: self.column.confirmed(),
    }
  }

  pub fn history_len(&self) -> (usize, usize) {
    (self.level.history_len(), self.column.history_len())
  }
}
