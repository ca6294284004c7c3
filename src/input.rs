// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/input.rs - 关键点输入与标签输入
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

use thiserror::Error;

use crate::frame::{FrameEvent, FrameSize};

mod landmark_stream;
pub use self::landmark_stream::{LandmarkStream, LandmarkStreamBuilder};

mod tag_reader;
pub use self::tag_reader::{TagReader, TagReaderError, parse_uid_line};

#[derive(Error, Debug)]
pub enum InputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("URI 参数无效: {0}")]
  InvalidQuery(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("第 {line} 行关键点数据无效: {source}")]
  Malformed {
    line: usize,
    #[source]
    source: serde_json::Error,
  },
}

/// 逐帧产出关键点事件的输入源，迭代结束即视为输入耗尽
pub trait SampleSource: Iterator<Item = Result<FrameEvent, InputError>> {
  fn frame_size(&self) -> FrameSize;
}

/// 每次会话开始时打开一个新的输入源
pub trait OpenSampleSource {
  type Source: SampleSource;

  fn open(&self) -> Result<Self::Source, InputError>;
}
