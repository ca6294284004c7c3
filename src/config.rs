// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/config.rs - 跟踪参数配置
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

use std::{collections::BTreeSet, path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("配置文件读取错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("配置文件解析错误: {0}")]
  ParseError(#[from] serde_json::Error),
  #[error("配置无效: {0}")]
  Invalid(String),
}

/// 边界余量上限（像素），超过任何实际画面宽度
pub const MAX_MARGIN: i32 = 8192;

/// 区域划分线（相对帧宽高的比例）
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoneFractions {
  pub top: f64,
  pub middle: f64,
  /// 仅用于操作员参考，不参与层级判定
  pub bottom: f64,
  pub left: f64,
  pub right: f64,
}

impl Default for ZoneFractions {
  fn default() -> Self {
    Self {
      top: 0.40,
      middle: 0.65,
      bottom: 0.88,
      left: 0.33,
      right: 0.66,
    }
  }
}

/// 进程级只读配置，创建后不可变
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
  /// 平滑窗口大小
  pub window: usize,
  /// 确认所需的连续一致帧数
  pub confirm_frames: usize,
  /// 置信度阈值（严格大于才接受）
  pub confidence_threshold: f32,
  pub zones: ZoneFractions,
  /// 水平判定的边界余量（像素）
  pub margin: i32,
  /// 单次会话时长（秒）
  pub session_secs: u64,
  /// 授权标签（精确匹配，区分大小写）
  pub authorized_tags: BTreeSet<String>,
  pub video_prefix: String,
  pub video_extension: String,
}

impl Default for TrackerConfig {
  fn default() -> Self {
    Self {
      window: 10,
      confirm_frames: 5,
      confidence_threshold: 0.75,
      zones: ZoneFractions::default(),
      margin: 20,
      session_secs: 30,
      authorized_tags: BTreeSet::new(),
      video_prefix: "rack_record_".to_string(),
      video_extension: "mp4".to_string(),
    }
  }
}

impl TrackerConfig {
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: TrackerConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
  }

  pub fn with_tags<I, S>(mut self, tags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.authorized_tags.extend(tags.into_iter().map(Into::into));
    self
  }

  pub fn session_duration(&self) -> Duration {
    Duration::from_secs(self.session_secs)
  }

  pub fn is_authorized(&self, tag: &str) -> bool {
    self.authorized_tags.contains(tag)
  }

  /// 根据会话时间戳生成录像文件名
  pub fn video_file(&self, timestamp: &str) -> String {
    format!("{}{}.{}", self.video_prefix, timestamp, self.video_extension)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

    if self.window == 0 {
      return invalid("window 必须大于 0");
    }
    if self.confirm_frames == 0 {
      return invalid("confirm_frames 必须大于 0");
    }
    if !(0.0..=1.0).contains(&self.confidence_threshold) {
      return invalid("confidence_threshold 必须位于 [0, 1]");
    }
    if !(0..=MAX_MARGIN).contains(&self.margin) {
      return invalid("margin 必须位于 [0, 8192]");
    }
    if self.session_secs == 0 {
      return invalid("session_secs 必须大于 0");
    }

    let z = &self.zones;
    let in_unit = |v: f64| v > 0.0 && v < 1.0;
    if ![z.top, z.middle, z.bottom, z.left, z.right]
      .into_iter()
      .all(in_unit)
    {
      return invalid("区域比例必须位于 (0, 1)");
    }
    if !(z.top < z.middle && z.middle < z.bottom) {
      return invalid("水平线比例需满足 top < middle < bottom");
    }
    if z.left >= z.right {
      return invalid("竖直线比例需满足 left < right");
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn defaults_are_valid() {
    let config = TrackerConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.session_duration(), Duration::from_secs(30));
    assert_eq!(config.video_file("20260101_120000"), "rack_record_20260101_120000.mp4");
  }

  #[test]
  fn partial_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
      file,
      r#"{{"window": 4, "authorized_tags": ["79 FC 77 5A"], "zones": {{"top": 0.3}}}}"#
    )
    .unwrap();

    let config = TrackerConfig::load(file.path()).unwrap();
    assert_eq!(config.window, 4);
    assert_eq!(config.confirm_frames, 5);
    assert_eq!(config.zones.top, 0.3);
    assert_eq!(config.zones.middle, 0.65);
    assert!(config.is_authorized("79 FC 77 5A"));
    assert!(!config.is_authorized("79 fc 77 5a"));
  }

  #[test]
  fn rejects_unordered_lines() {
    let mut config = TrackerConfig::default();
    config.zones.middle = 0.3;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = TrackerConfig::default();
    config.zones.left = 0.7;
    assert!(config.validate().is_err());
  }

  #[test]
  fn rejects_empty_window() {
    let config = TrackerConfig {
      window: 0,
      ..Default::default()
    };
    assert!(config.validate().is_err());
  }

  #[test]
  fn rejects_out_of_range_margin() {
    for margin in [-1, MAX_MARGIN + 1, i32::MAX] {
      let config = TrackerConfig {
        margin,
        ..Default::default()
      };
      assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
    let config = TrackerConfig {
      margin: MAX_MARGIN,
      ..Default::default()
    };
    assert!(config.validate().is_ok());
  }
}
