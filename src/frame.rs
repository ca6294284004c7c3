// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/frame.rs - 帧与关键点样本定义
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

use serde::Deserialize;

/// 帧尺寸（像素）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
  pub width: u32,
  pub height: u32,
}

impl FrameSize {
  pub const fn new(width: u32, height: u32) -> Self {
    Self { width, height }
  }
}

impl Default for FrameSize {
  fn default() -> Self {
    Self::new(640, 480)
  }
}

/// 像素坐标点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
  pub x: i32,
  pub y: i32,
}

impl Point {
  pub const fn new(x: i32, y: i32) -> Self {
    Self { x, y }
  }
}

/// 姿态估计输出的归一化关键点
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Landmark {
  pub x: f32,
  pub y: f32,
  #[serde(alias = "confidence")]
  pub visibility: f32,
}

impl Landmark {
  /// 换算为像素坐标样本，`mirror` 为真时先做水平翻转
  pub fn to_sample(&self, size: FrameSize, mirror: bool) -> Sample {
    let x = if mirror { 1.0 - self.x } else { self.x };
    Sample {
      position: Point::new(
        (x as f64 * size.width as f64) as i32,
        (self.y as f64 * size.height as f64) as i32,
      ),
      confidence: self.visibility,
    }
  }
}

/// 单帧观测样本（像素坐标 + 置信度）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
  pub position: Point,
  pub confidence: f32,
}

impl Sample {
  pub const fn new(x: i32, y: i32, confidence: f32) -> Self {
    Self {
      position: Point::new(x, y),
      confidence,
    }
  }
}

/// 输入源每帧产出的事件
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameEvent {
  /// 检测到目标关键点
  Sample(Sample),
  /// 本帧未检测到关键点
  Absent,
}

impl From<Sample> for FrameEvent {
  fn from(sample: Sample) -> Self {
    FrameEvent::Sample(sample)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn landmark_scales_with_truncation() {
    let landmark = Landmark {
      x: 0.5,
      y: 0.999,
      visibility: 0.9,
    };
    let sample = landmark.to_sample(FrameSize::new(640, 480), false);
    assert_eq!(sample.position, Point::new(320, 479));
    assert_eq!(sample.confidence, 0.9);
  }

  #[test]
  fn mirrored_landmark_reflects_x_only() {
    let landmark = Landmark {
      x: 0.25,
      y: 0.5,
      visibility: 1.0,
    };
    let sample = landmark.to_sample(FrameSize::new(640, 480), true);
    assert_eq!(sample.position, Point::new(480, 240));
  }

  #[test]
  fn landmark_accepts_confidence_alias() {
    let landmark: Landmark = serde_json::from_str(r#"{"x":0.1,"y":0.2,"confidence":0.8}"#).unwrap();
    assert_eq!(landmark.visibility, 0.8);
  }
}
