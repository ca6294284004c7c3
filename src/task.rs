// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/task.rs - 读卡监听任务
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

use std::{fmt::Display, thread, time::Duration};

use tracing::{info, warn};

use crate::{
  input::OpenSampleSource,
  output::Persist,
  session::{CancelFlag, Clock, SessionController, SessionEnd, SessionOutcome},
};

/// 读卡事件的处理方
pub trait TagHandler {
  fn handle_tag(&mut self, tag: &str) -> SessionOutcome;
  fn cancel_flag(&self) -> CancelFlag;
}

impl<S, P, C> TagHandler for SessionController<S, P, C>
where
  S: OpenSampleSource,
  P: Persist,
  P::Error: Display,
  C: Clock,
{
  fn handle_tag(&mut self, tag: &str) -> SessionOutcome {
    SessionController::handle_tag(self, tag)
  }

  fn cancel_flag(&self) -> CancelFlag {
    SessionController::cancel_flag(self)
  }
}

/// 中断后等待会话或监听循环响应的时间
pub const INTERRUPT_GRACE: Duration = Duration::from_secs(3);

/// 安装 Ctrl-C 处理
///
/// 第一次按下请求取消；录制中的会话会在下一帧结束，随后监听继续。
/// 空闲时读卡器阻塞在读取上，取消在宽限时间后仍未被处理则正常退出。
/// 取消未被处理时再次按下则立即退出。
pub fn install_interrupt_handler(cancel: CancelFlag) -> Result<(), ctrlc::Error> {
  ctrlc::set_handler(move || {
    if cancel.is_cancelled() {
      warn!("强制退出程序");
      std::process::exit(1);
    }
    info!("收到中断信号，准备停止（再次按下 Ctrl-C 立即退出）...");
    cancel.cancel();

    let cancel = cancel.clone();
    thread::spawn(move || {
      if still_cancelled_after(&cancel, INTERRUPT_GRACE) {
        info!("空闲时收到中断，退出监听");
        std::process::exit(0);
      }
    });
  })
}

/// 等待 `grace` 后检查取消请求是否仍未被处理
pub fn still_cancelled_after(cancel: &CancelFlag, grace: Duration) -> bool {
  thread::sleep(grace);
  cancel.is_cancelled()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenSummary {
  pub tags: usize,
  pub unauthorized: usize,
  pub aborted: usize,
  pub completed: usize,
}

/// 持续读取卡号并逐个交给会话控制器，直到输入结束或空闲时收到中断
#[derive(Debug, Default)]
pub struct ListenTask {
  max_sessions: Option<usize>,
}

impl ListenTask {
  pub fn with_max_sessions(mut self, max_sessions: Option<usize>) -> Self {
    self.max_sessions = max_sessions;
    self
  }

  pub fn run_task<I, E, H>(self, tags: I, handler: &mut H) -> Result<ListenSummary, E>
  where
    I: IntoIterator<Item = Result<String, E>>,
    H: TagHandler,
  {
    info!("开始监听读卡器...");
    let cancel = handler.cancel_flag();
    let mut summary = ListenSummary::default();

    for tag in tags {
      if cancel.is_cancelled() {
        warn!("中断信号接收，退出监听循环");
        break;
      }

      let tag = tag?;
      summary.tags += 1;
      match handler.handle_tag(&tag) {
        SessionOutcome::Unauthorized => summary.unauthorized += 1,
        SessionOutcome::SourceUnavailable(_) => summary.aborted += 1,
        SessionOutcome::Completed(report) => {
          summary.completed += 1;
          // 会话内的取消只结束当次会话
          if report.end == SessionEnd::Cancelled {
            cancel.clear();
          }
        }
      }

      if self.max_sessions.is_some_and(|n| summary.completed >= n) {
        info!("已完成 {} 次会话，退出监听循环", summary.completed);
        break;
      }
    }

    info!("监听结束: {:?}", summary);
    Ok(summary)
  }
}
