// 该文件是 Rackwatch （货架守望） 项目的一部分。
// src/input/landmark_stream.rs - JSON Lines 关键点流输入
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

//! # 关键点流输入
//!
//! 读取外部姿态估计进程输出的 JSON Lines 流，每行一个关键点：
//!
//! ```text
//! {"x": 0.21, "y": 0.34, "visibility": 0.92}
//! null
//! ```
//!
//! `null` 表示该帧未检测到关键点，空行忽略。
//!
//! ## URL 格式
//!
//! `landmarks:///path/to/stream.jsonl?width=640&height=480&fps=20&mirror`
//!
//! - `width` / `height`：产生关键点的画面尺寸，默认 640x480
//! - `fps`：回放节奏，按该帧率在帧之间等待；缺省时不等待
//! - `mirror`：关键点来自未翻转画面时做水平翻转
//!
//! 路径可以是 FIFO，每次会话开始时重新打开。

use std::{
  fs::File,
  io::{BufRead, BufReader},
  path::PathBuf,
  thread,
  time::{Duration, Instant},
};

use tracing::{debug, info};
use url::Url;

use super::{InputError, OpenSampleSource, SampleSource};
use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{FrameEvent, FrameSize, Landmark},
};

#[derive(Debug, Clone)]
pub struct LandmarkStreamBuilder {
  path: PathBuf,
  size: FrameSize,
  fps: Option<f64>,
  mirror: bool,
}

impl FromUrlWithScheme for LandmarkStreamBuilder {
  const SCHEME: &'static str = "landmarks";
}

impl FromUrl for LandmarkStreamBuilder {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(InputError::SchemeMismatch);
    }

    let mut builder = LandmarkStreamBuilder::new(url.path());
    for (k, v) in url.query_pairs() {
      match k.as_ref() {
        "width" => builder.size.width = parse_query(&k, &v)?,
        "height" => builder.size.height = parse_query(&k, &v)?,
        "fps" => builder.fps = Some(parse_query(&k, &v)?),
        "mirror" => builder.mirror = v.is_empty() || v == "true" || v == "1",
        _ => debug!("忽略未知参数: {}={}", k, v),
      }
    }

    if builder.size.width == 0 || builder.size.height == 0 {
      return Err(InputError::InvalidQuery("画面尺寸不能为 0".to_string()));
    }
    if builder.fps.is_some_and(|fps| !fps.is_finite() || fps <= 0.0) {
      return Err(InputError::InvalidQuery("fps 必须大于 0".to_string()));
    }

    Ok(builder)
  }
}

fn parse_query<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, InputError> {
  value
    .parse()
    .map_err(|_| InputError::InvalidQuery(format!("{}={}", key, value)))
}

impl LandmarkStreamBuilder {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      size: FrameSize::default(),
      fps: None,
      mirror: false,
    }
  }

  pub fn frame_size(mut self, size: FrameSize) -> Self {
    self.size = size;
    self
  }

  pub fn fps(mut self, fps: Option<f64>) -> Self {
    self.fps = fps;
    self
  }

  pub fn mirror(mut self, mirror: bool) -> Self {
    self.mirror = mirror;
    self
  }
}

impl OpenSampleSource for LandmarkStreamBuilder {
  type Source = LandmarkStream;

  fn open(&self) -> Result<Self::Source, InputError> {
    let pacing = self.fps.map(frame_interval).transpose()?;

    info!("打开关键点流: {}", self.path.display());
    let file = File::open(&self.path)?;
    let stream = LandmarkStream::from_reader(BufReader::new(file), self.size)
      .mirror(self.mirror)
      .pacing(pacing);
    Ok(stream)
  }
}

fn frame_interval(fps: f64) -> Result<Duration, InputError> {
  Duration::try_from_secs_f64(1.0 / fps)
    .map_err(|e| InputError::InvalidQuery(format!("fps={}: {}", fps, e)))
}

pub struct LandmarkStream {
  reader: Box<dyn BufRead + Send>,
  size: FrameSize,
  mirror: bool,
  pacing: Option<Duration>,
  last_frame: Option<Instant>,
  line: String,
  line_no: usize,
}

impl LandmarkStream {
  pub fn from_reader<R: BufRead + Send + 'static>(reader: R, size: FrameSize) -> Self {
    Self {
      reader: Box::new(reader),
      size,
      mirror: false,
      pacing: None,
      last_frame: None,
      line: String::new(),
      line_no: 0,
    }
  }

  pub fn mirror(mut self, mirror: bool) -> Self {
    self.mirror = mirror;
    self
  }

  pub fn pacing(mut self, pacing: Option<Duration>) -> Self {
    self.pacing = pacing;
    self
  }

  fn wait_for_next_frame(&mut self) {
    if let (Some(interval), Some(last)) = (self.pacing, self.last_frame) {
      let elapsed = last.elapsed();
      if elapsed < interval {
        thread::sleep(interval - elapsed);
      }
    }
    self.last_frame = Some(Instant::now());
  }
}

impl Iterator for LandmarkStream {
  type Item = Result<FrameEvent, InputError>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      self.line.clear();
      match self.reader.read_line(&mut self.line) {
        Ok(0) => return None,
        Ok(_) => {}
        Err(e) => return Some(Err(e.into())),
      }
      self.line_no += 1;

      let text = self.line.trim();
      if text.is_empty() {
        continue;
      }

      let parsed = serde_json::from_str::<Option<Landmark>>(text).map_err(|source| {
        InputError::Malformed {
          line: self.line_no,
          source,
        }
      });
      self.wait_for_next_frame();

      return Some(parsed.map(|landmark| match landmark {
        Some(landmark) => FrameEvent::Sample(landmark.to_sample(self.size, self.mirror)),
        None => FrameEvent::Absent,
      }));
    }
  }
}

impl SampleSource for LandmarkStream {
  fn frame_size(&self) -> FrameSize {
    self.size
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frame::Sample;
  use std::io::{Cursor, Write};

  fn stream(text: &str) -> LandmarkStream {
    LandmarkStream::from_reader(Cursor::new(text.to_string()), FrameSize::new(640, 480))
  }

  #[test]
  fn reads_samples_and_absent_frames() {
    let events: Vec<_> = stream("{\"x\":0.5,\"y\":0.25,\"visibility\":0.9}\n\nnull\n")
      .collect::<Result<_, _>>()
      .unwrap();
    assert_eq!(
      events,
      vec![
        FrameEvent::Sample(Sample::new(320, 120, 0.9)),
        FrameEvent::Absent
      ]
    );
  }

  #[test]
  fn malformed_line_reports_line_number() {
    let mut s = stream("null\n{\"x\":oops}\n");
    assert!(matches!(s.next(), Some(Ok(FrameEvent::Absent))));
    assert!(matches!(
      s.next(),
      Some(Err(InputError::Malformed { line: 2, .. }))
    ));
  }

  #[test]
  fn builder_from_url() {
    let url = Url::parse("landmarks:///tmp/wrist.jsonl?width=1280&height=720&fps=20&mirror").unwrap();
    let builder = LandmarkStreamBuilder::from_url(&url).unwrap();
    assert_eq!(builder.path, PathBuf::from("/tmp/wrist.jsonl"));
    assert_eq!(builder.size, FrameSize::new(1280, 720));
    assert_eq!(builder.fps, Some(20.0));
    assert!(builder.mirror);
  }

  #[test]
  fn builder_rejects_bad_query() {
    let url = Url::parse("landmarks:///tmp/wrist.jsonl?width=abc").unwrap();
    assert!(matches!(
      LandmarkStreamBuilder::from_url(&url),
      Err(InputError::InvalidQuery(_))
    ));
    let url = Url::parse("folder:///tmp").unwrap();
    assert!(matches!(
      LandmarkStreamBuilder::from_url(&url),
      Err(InputError::SchemeMismatch)
    ));

    for fps in ["NaN", "inf", "-5", "0"] {
      let url = Url::parse(&format!("landmarks:///tmp/wrist.jsonl?fps={}", fps)).unwrap();
      assert!(matches!(
        LandmarkStreamBuilder::from_url(&url),
        Err(InputError::InvalidQuery(_))
      ));
    }
  }

  #[test]
  fn open_rejects_unrepresentable_pacing() {
    let file = tempfile::NamedTempFile::new().unwrap();
    for fps in [1e-20, f64::NAN] {
      let builder = LandmarkStreamBuilder::new(file.path()).fps(Some(fps));
      assert!(matches!(builder.open(), Err(InputError::InvalidQuery(_))));
    }
    let builder = LandmarkStreamBuilder::new(file.path()).fps(Some(20.0));
    assert_eq!(builder.open().unwrap().pacing, Some(Duration::from_millis(50)));
  }

  #[test]
  fn open_missing_file_fails() {
    let builder = LandmarkStreamBuilder::new("/nonexistent/rackwatch/stream.jsonl");
    assert!(matches!(builder.open(), Err(InputError::IoError(_))));
  }

  #[test]
  fn open_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{{\"x\":0.1,\"y\":0.1,\"visibility\":0.8}}").unwrap();
    let source = LandmarkStreamBuilder::new(file.path())
      .frame_size(FrameSize::new(100, 100))
      .open()
      .unwrap();
    assert_eq!(source.frame_size(), FrameSize::new(100, 100));
    let events: Vec<_> = source.collect::<Result<_, _>>().unwrap();
    assert_eq!(events, vec![FrameEvent::Sample(Sample::new(10, 10, 0.8))]);
  }
}
