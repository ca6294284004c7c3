// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/bin/replay_session.rs - 离线回放单次会话
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

use std::{sync::Arc, time::Duration};

use anyhow::{Result, bail};
use chrono::Local;
use clap::Parser;
use tracing::{info, warn};
use url::Url;

use rackwatch::{
  FromUrl,
  args::TrackerArgs,
  input::LandmarkStreamBuilder,
  output::OutputWrapper,
  session::{SessionController, SessionOutcome, SteppingClock},
  tracker::display_zone,
};

/// 用录制好的关键点流回放一次会话
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 触发会话的卡号
  #[arg(long, value_name = "UID")]
  pub tag: String,

  /// 关键点输入
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 会话结果输出
  #[arg(long, value_name = "OUTPUT", default_value = "log:")]
  pub output: Url,

  /// 按固定帧间隔推进会话时间（毫秒），缺省时使用真实时间
  #[arg(long, value_name = "MILLIS")]
  pub frame_interval: Option<u64>,

  #[command(flatten)]
  pub tracker: TrackerArgs,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("卡号: {}", args.tag);
  info!("关键点输入: {}", args.input);
  info!("输出路径: {}", args.output);

  let mut tracker = args.tracker.clone();
  if tracker.authorized.is_empty() {
    warn!("未指定授权列表，回放时默认授权 {}", args.tag);
    tracker.authorized.push(args.tag.clone());
  }
  let config = Arc::new(tracker.tracker_config()?);

  let source = LandmarkStreamBuilder::from_url(&args.input)?;
  let output = OutputWrapper::from_url(&args.output)?;
  let controller = SessionController::new(config, source, output);

  let outcome = match args.frame_interval {
    Some(millis) => controller
      .with_clock(SteppingClock::new(Duration::from_millis(millis), Local::now()))
      .handle_tag(&args.tag),
    None => {
      let mut controller = controller;
      controller.handle_tag(&args.tag)
    }
  };

  match outcome {
    SessionOutcome::Unauthorized => bail!("卡号 {} 未授权", args.tag),
    SessionOutcome::SourceUnavailable(reason) => bail!("关键点输入不可用: {}", reason),
    SessionOutcome::Completed(report) => {
      info!(
        "回放结束 ({:?}): Rack Level: {} + Box {}，共 {} 帧",
        report.end,
        display_zone(report.result.level),
        display_zone(report.result.column),
        report.stats.frames
      );
      if !report.persisted {
        bail!("会话结果输出失败");
      }
    }
  }

  Ok(())
}
