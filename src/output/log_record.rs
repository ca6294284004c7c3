// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/output/log_record.rs - 日志输出
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

use tracing::info;

use crate::{FromUrlWithScheme, output::Persist, session::SessionResult};

/// 只把会话记录写进日志，适合调试与回放
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRecordOutput;

impl FromUrlWithScheme for LogRecordOutput {
  const SCHEME: &'static str = "log";
}

impl crate::FromUrl for LogRecordOutput {
  type Error = std::convert::Infallible;

  fn from_url(_url: &url::Url) -> Result<Self, Self::Error> {
    Ok(LogRecordOutput)
  }
}

impl Persist for LogRecordOutput {
  type Error = serde_json::Error;

  fn persist(&self, result: &SessionResult) -> Result<(), Self::Error> {
    info!("会话记录: {}", serde_json::to_string(result)?);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{FromUrl, tracker::ConfirmedState};
  use chrono::{Local, TimeZone};

  #[test]
  fn persists_unconfirmed_result() {
    let url = url::Url::parse("log:").unwrap();
    let output = LogRecordOutput::from_url(&url).unwrap();
    let result = SessionResult::new(
      "53 21 04 05",
      ConfirmedState::default(),
      Local.with_ymd_and_hms(2026, 1, 8, 7, 0, 0).unwrap(),
      "rack_record_20260108_070000.mp4",
    );
    assert!(output.persist(&result).is_ok());
  }
}
