// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/session/record.rs - 会话结果记录
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

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use crate::tracker::{BoxColumn, ConfirmedState, RackLevel, ZoneIndex};

/// 会话时间戳格式，同时用于文件命名
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// 会话结束时交给持久化输出的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResult {
  #[serde(rename = "Tag_ID")]
  pub tag_id: String,
  #[serde(rename = "Rack_Level", serialize_with = "serialize_zone")]
  pub level: Option<RackLevel>,
  #[serde(rename = "Box_Number", serialize_with = "serialize_zone")]
  pub column: Option<BoxColumn>,
  #[serde(rename = "Timestamp", serialize_with = "serialize_timestamp")]
  pub started_at: DateTime<Local>,
  #[serde(rename = "Video_File")]
  pub video_file: String,
}

impl SessionResult {
  pub fn new(
    tag_id: impl Into<String>,
    confirmed: ConfirmedState,
    started_at: DateTime<Local>,
    video_file: impl Into<String>,
  ) -> Self {
    Self {
      tag_id: tag_id.into(),
      level: confirmed.level,
      column: confirmed.column,
      started_at,
      video_file: video_file.into(),
    }
  }

  pub fn timestamp(&self) -> String {
    self.started_at.format(TIMESTAMP_FORMAT).to_string()
  }

  pub fn confirmed(&self) -> ConfirmedState {
    ConfirmedState {
      level: self.level,
      column: self.column,
    }
  }

  /// 元数据文件名，与录像文件共用时间戳
  pub fn metadata_file(&self) -> String {
    format!("metadata_{}.json", self.timestamp())
  }
}

fn serialize_zone<T: ZoneIndex, S: Serializer>(
  zone: &Option<T>,
  serializer: S,
) -> Result<S::Ok, S::Error> {
  match zone {
    Some(zone) => serializer.serialize_u8(zone.index()),
    None => serializer.serialize_str("Unknown"),
  }
}

fn serialize_timestamp<S: Serializer>(
  started_at: &DateTime<Local>,
  serializer: S,
) -> Result<S::Ok, S::Error> {
  serializer.collect_str(&started_at.format(TIMESTAMP_FORMAT))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use serde_json::json;

  fn started_at() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
  }

  #[test]
  fn serializes_confirmed_zones_as_integers() {
    let result = SessionResult::new(
      "79 FC 77 5A",
      ConfirmedState {
        level: Some(RackLevel::High),
        column: Some(BoxColumn::Left),
      },
      started_at(),
      "rack_record_20260314_092653.mp4",
    );
    assert_eq!(
      serde_json::to_value(&result).unwrap(),
      json!({
        "Tag_ID": "79 FC 77 5A",
        "Rack_Level": 2,
        "Box_Number": 0,
        "Timestamp": "20260314_092653",
        "Video_File": "rack_record_20260314_092653.mp4",
      })
    );
  }

  #[test]
  fn unconfirmed_zones_are_unknown() {
    let result = SessionResult::new(
      "53 21 04 05",
      ConfirmedState {
        level: None,
        column: Some(BoxColumn::Right),
      },
      started_at(),
      "v.mp4",
    );
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["Rack_Level"], json!("Unknown"));
    assert_eq!(value["Box_Number"], json!(2));
    assert_eq!(result.metadata_file(), "metadata_20260314_092653.json");
  }
}
