// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/tracker/smooth.rs - 滑动平均平滑
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

use std::collections::VecDeque;

use crate::frame::Point;

/// 定长窗口的等权滑动平均
///
/// 窗口未满时对已有样本求均值，不做填充。
pub struct SmoothingFilter {
  window: VecDeque<Point>,
  capacity: usize,
}

impl SmoothingFilter {
  pub fn new(capacity: usize) -> Self {
    let capacity = capacity.max(1);
    Self {
      window: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  pub fn accept(&mut self, position: Point) -> Point {
    self.window.push_back(position);
    while self.window.len() > self.capacity {
      self.window.pop_front();
    }

    let n = self.window.len() as i64;
    let (sum_x, sum_y) = self
      .window
      .iter()
      .fold((0i64, 0i64), |(sx, sy), p| (sx + p.x as i64, sy + p.y as i64));

    // 与像素换算一致，向零截断
    Point::new(
      (sum_x as f64 / n as f64) as i32,
      (sum_y as f64 / n as f64) as i32,
    )
  }

  pub fn len(&self) -> usize {
    self.window.len()
  }

  pub fn is_empty(&self) -> bool {
    self.window.is_empty()
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn reset(&mut self) {
    self.window.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_sample_passthrough() {
    let mut s = SmoothingFilter::new(10);
    assert_eq!(s.accept(Point::new(17, 33)), Point::new(17, 33));
  }

  #[test]
  fn partial_window_averages_present_samples() {
    let mut s = SmoothingFilter::new(10);
    s.accept(Point::new(0, 0));
    let out = s.accept(Point::new(3, 5));
    assert_eq!(out, Point::new(1, 2));
    assert_eq!(s.len(), 2);
  }

  #[test]
  fn oldest_sample_is_evicted() {
    let mut s = SmoothingFilter::new(3);
    s.accept(Point::new(100, 100));
    s.accept(Point::new(0, 0));
    s.accept(Point::new(0, 0));
    let out = s.accept(Point::new(0, 0));
    assert_eq!(out, Point::new(0, 0));
    assert_eq!(s.len(), 3);
  }

  #[test]
  fn window_never_exceeds_capacity() {
    let mut s = SmoothingFilter::new(10);
    for i in 0..100 {
      s.accept(Point::new(i, -i));
      assert!(s.len() <= 10);
    }
    assert_eq!(s.len(), 10);
  }

  #[test]
  fn reset_clears_window() {
    let mut s = SmoothingFilter::new(4);
    s.accept(Point::new(50, 50));
    s.reset();
    assert!(s.is_empty());
    assert_eq!(s.accept(Point::new(2, 4)), Point::new(2, 4));
  }
}
