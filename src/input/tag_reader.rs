// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/input/tag_reader.rs - RFID 读卡器串口输入
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

use std::{
  fs::File,
  io::{BufRead, BufReader},
};

use thiserror::Error;
use tracing::{debug, error, warn};
use url::Url;

use crate::FromUrl;

#[derive(Error, Debug)]
pub enum TagReaderError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
}

const SERIAL_SCHEME: &str = "serial";
const FILE_SCHEME: &str = "file";
const STDIN_SCHEME: &str = "stdin";

const UID_MARKER: &str = "Card UID:";

/// 从读卡器输出的一行中提取卡号
///
/// 读卡器每张卡输出形如 `Card UID: 79 FC 77 5A ` 的一行，其余行（启动横幅、
/// `Card Type: ...`）都不含卡号。
pub fn parse_uid_line(line: &str) -> Option<&str> {
  let (_, rest) = line.split_once(UID_MARKER)?;
  let uid = rest.trim();
  (!uid.is_empty()).then_some(uid)
}

/// 按行读取读卡器输出，只产出卡号
pub struct TagReader {
  reader: Box<dyn BufRead + Send>,
  buffer: Vec<u8>,
}

impl FromUrl for TagReader {
  type Error = TagReaderError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      SERIAL_SCHEME => {
        warn!(
          "串口 {} 按普通文件打开，需事先配置好波特率（例如 `stty -F {} 115200 raw`），否则读到的内容可能是乱码",
          url.path(),
          url.path()
        );
        let file = File::open(url.path())?;
        Ok(Self::from_reader(BufReader::new(file)))
      }
      FILE_SCHEME => {
        let file = File::open(url.path())?;
        Ok(Self::from_reader(BufReader::new(file)))
      }
      STDIN_SCHEME => Ok(Self::from_reader(BufReader::new(std::io::stdin()))),
      scheme => {
        error!("URI scheme mismatch: unsupported '{}'", scheme);
        Err(TagReaderError::SchemaMismatch)
      }
    }
  }
}

impl TagReader {
  pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
    Self {
      reader: Box::new(reader),
      buffer: Vec::new(),
    }
  }
}

impl Iterator for TagReader {
  type Item = Result<String, TagReaderError>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      self.buffer.clear();
      match self.reader.read_until(b'\n', &mut self.buffer) {
        Ok(0) => return None,
        Ok(_) => {}
        Err(e) => return Some(Err(e.into())),
      }

      // 串口上可能出现残缺字节，按有损方式解码
      let line = String::from_utf8_lossy(&self.buffer);
      match parse_uid_line(&line) {
        Some(uid) => return Some(Ok(uid.to_string())),
        None => debug!("读卡器输出: {}", line.trim_end()),
      }
    }
  }
}
