// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/main.rs - 项目主程序
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

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use url::Url;

use rackwatch::{
  FromUrl,
  args::TrackerArgs,
  input::{LandmarkStreamBuilder, TagReader},
  output::OutputWrapper,
  session::SessionController,
  task::{ListenTask, install_interrupt_handler},
};

/// Rackwatch 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 读卡器输入
  /// 支持格式:
  /// - 串口: serial:///dev/ttyUSB0
  /// - 文件: file:///path/to/reader.log
  /// - 标准输入: stdin:
  #[arg(long, value_name = "TAGS")]
  pub tags: Url,

  /// 关键点输入，每次会话开始时打开
  /// 例如 landmarks:///run/rackwatch/wrist.jsonl?width=640&height=480
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 会话结果输出（folder:///path、folder:///path?by-date 或 log:）
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,

  /// 完成指定次数会话后退出（缺省时一直监听）
  #[arg(long, value_name = "COUNT")]
  pub max_sessions: Option<usize>,

  #[command(flatten)]
  pub tracker: TrackerArgs,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("读卡器输入: {}", args.tags);
  info!("关键点输入: {}", args.input);
  info!("输出路径: {}", args.output);

  let config = Arc::new(args.tracker.tracker_config()?);
  info!("授权标签数: {}", config.authorized_tags.len());
  info!(
    "平滑窗口: {}，确认帧数: {}，置信度阈值: {}，会话时长: {} 秒",
    config.window, config.confirm_frames, config.confidence_threshold, config.session_secs
  );

  let tags = TagReader::from_url(&args.tags)?;
  let source = LandmarkStreamBuilder::from_url(&args.input)?;
  let output = OutputWrapper::from_url(&args.output)?;

  let mut controller = SessionController::new(config, source, output);
  install_interrupt_handler(controller.cancel_flag())?;

  ListenTask::default()
    .with_max_sessions(args.max_sessions)
    .run_task(tags, &mut controller)?;

  Ok(())
}
