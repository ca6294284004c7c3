// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

use chrono::Datelike;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;
use tracing::info;

use crate::{FromUrl, FromUrlWithScheme, output::Persist, session::SessionResult};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("序列化错误: {0}")]
  SerializeError(#[from] serde_json::Error),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 将会话元数据写为 `metadata_{时间戳}.json`
///
/// `folder:///path` 直接写入目录，`folder:///path?by-date` 按会话开始日期
/// 分到 `YYYY/MM/DD` 子目录。
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  by_date: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let by_date = uri.query_pairs().any(|(k, _)| k == "by-date");

    Ok(DirectoryRecordOutput {
      directory: PathBuf::from(uri.path()),
      by_date,
    })
  }
}

impl DirectoryRecordOutput {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    Self {
      directory: directory.into(),
      by_date: false,
    }
  }

  pub fn by_date(mut self, by_date: bool) -> Self {
    self.by_date = by_date;
    self
  }

  pub fn record_path(&self, result: &SessionResult) -> PathBuf {
    let directory = if self.by_date {
      let day = result.started_at;
      self
        .directory
        .join(day.year().to_string())
        .join(format!("{:02}", day.month()))
        .join(format!("{:02}", day.day()))
    } else {
      self.directory.clone()
    };
    directory.join(result.metadata_file())
  }
}

impl Persist for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn persist(&self, result: &SessionResult) -> Result<(), Self::Error> {
    let path = self.record_path(result);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let mut buffer = Vec::new();
    let mut serializer =
      serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    result.serialize(&mut serializer)?;
    std::fs::write(&path, buffer)?;

    info!("元数据已保存: {}", path.display());
    Ok(())
  }
}
