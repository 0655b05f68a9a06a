// 该文件是 Lumian （路面） 项目的一部分。
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

use std::{
  path::{Path, PathBuf},
  sync::atomic::{AtomicU32, Ordering},
};

use chrono::{DateTime, Datelike, Utc};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info};

use crate::{FromUrl, FromUrlWithScheme, output::Present, task::Assessment};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  SerializeError(#[from] serde_json::Error),
}

/// 每次评估写入一个 JSON 记录，按日期分目录存放
///
/// URL 查询参数 `always` 缺省时，没有检测框的评估不会被记录。
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  record_counter: AtomicU32,
  always: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "record";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let always = uri.query_pairs().any(|(k, _)| k == "always");
    Ok(Self::new(uri.path()).with_always(always))
  }
}

impl DirectoryRecordOutput {
  pub fn new(directory: impl AsRef<Path>) -> Self {
    Self {
      directory: directory.as_ref().to_path_buf(),
      record_counter: AtomicU32::new(0),
      always: false,
    }
  }

  pub fn with_always(mut self, always: bool) -> Self {
    self.always = always;
    self
  }

  fn record_id(&self) -> u32 {
    self.record_counter.fetch_add(1, Ordering::Relaxed) + 1
  }

  fn record_path(&self, now: &DateTime<Utc>) -> Result<PathBuf, DirectoryRecordOutputError> {
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    std::fs::create_dir_all(&directory)?;

    Ok(directory.join(format!(
      "{}-{:04X}.json",
      now.format("%H-%M-%S"),
      self.record_id()
    )))
  }
}

fn assessment_to_json(assessment: &Assessment, now: &DateTime<Utc>) -> Value {
  let detections: Vec<Value> = assessment
    .detections
    .items
    .iter()
    .map(|bbox| {
      json!({
        "x_min": bbox.x_min(),
        "y_min": bbox.y_min(),
        "x_max": bbox.x_max(),
        "y_max": bbox.y_max(),
        "confidence": bbox.confidence(),
      })
    })
    .collect();

  json!({
    "timestamp": now.to_rfc3339(),
    "detections": detections,
    "score": assessment.score,
    "severity": assessment.severity.as_str(),
    "message": assessment.severity.message(),
    "regressor_failed": assessment.regressor_failed,
  })
}

impl Present for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn present(&self, assessment: &Assessment) -> Result<(), Self::Error> {
    if !self.always && assessment.detections.is_empty() {
      debug!("没有检测框，跳过记录");
      return Ok(());
    }

    let now = Utc::now();
    let path = self.record_path(&now)?;
    let record = assessment_to_json(assessment, &now);
    std::fs::write(&path, serde_json::to_string_pretty(&record)?)?;
    info!("写入记录: {}", path.display());

    Ok(())
  }
}
