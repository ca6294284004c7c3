// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/args.rs - 跟踪参数命令行覆盖
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

use std::path::PathBuf;

use clap::Args;

use crate::config::{ConfigError, TrackerConfig};

/// 跟踪参数，命令行优先于配置文件
#[derive(Args, Debug, Clone, Default)]
pub struct TrackerArgs {
  /// JSON 配置文件路径
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// 授权卡号（精确匹配，可重复指定）
  #[arg(long = "authorized", value_name = "UID")]
  pub authorized: Vec<String>,

  /// 平滑窗口大小（默认 10）
  #[arg(long, value_name = "FRAMES")]
  pub window: Option<usize>,

  /// 确认所需的连续一致帧数（默认 5）
  #[arg(long, value_name = "FRAMES")]
  pub confirm_frames: Option<usize>,

  /// 置信度阈值 (0.0 - 1.0，默认 0.75)
  #[arg(long, value_name = "THRESHOLD")]
  pub confidence: Option<f32>,

  /// 箱位判定边界余量（像素，默认 20）
  #[arg(long, value_name = "PIXELS")]
  pub margin: Option<i32>,

  /// 会话时长（秒，默认 30）
  #[arg(long, value_name = "SECONDS")]
  pub duration: Option<u64>,
}

impl TrackerArgs {
  pub fn tracker_config(&self) -> Result<TrackerConfig, ConfigError> {
    let mut config = match &self.config {
      Some(path) => TrackerConfig::load(path)?,
      None => TrackerConfig::default(),
    };

    config = config.with_tags(self.authorized.iter().cloned());
    if let Some(window) = self.window {
      config.window = window;
    }
    if let Some(confirm_frames) = self.confirm_frames {
      config.confirm_frames = confirm_frames;
    }
    if let Some(confidence) = self.confidence {
      config.confidence_threshold = confidence;
    }
    if let Some(margin) = self.margin {
      config.margin = margin;
    }
    if let Some(duration) = self.duration {
      config.session_secs = duration;
    }

    config.validate()?;
    Ok(config)
  }
}
