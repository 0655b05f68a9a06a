// 该文件是 Lumian （路面） 项目的一部分。
// src/model/replay.rs - 回放已记录的模型输出
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

//! 从 JSON 文件读取检测模型与回归模型的原始输出：
//!
//! ```json
//! { "detections": [0.1, 0.1, 0.5, 0.5, 1.0, 0.0], "severity": 2.3 }
//! ```
//!
//! 缺失的字段会在推理时以错误的形式返回。

use std::{marker::PhantomData, sync::Arc};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, model::Model};

#[derive(Error, Debug)]
pub enum ReplayModelError {
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
  #[error("模型加载错误: {0}")]
  ModelLoadError(#[from] std::io::Error),
  #[error("记录格式错误: {0}")]
  FormatError(#[from] serde_json::Error),
  #[error("记录字段 `{0}` 无效: {1}")]
  InvalidField(&'static str, String),
  #[error("记录中缺少字段 `{0}`")]
  MissingOutput(&'static str),
}

/// 一次推理的已记录输出
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayRecord {
  detections: Option<Vec<f32>>,
  severity: Option<f32>,
}

impl FromUrlWithScheme for ReplayRecord {
  const SCHEME: &'static str = "replay";
}

impl FromUrl for ReplayRecord {
  type Error = ReplayModelError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ReplayModelError::ModelPathError(format!(
        "模型路径必须使用 {} 方案",
        Self::SCHEME
      )));
    }

    info!("加载记录文件: {}", url.path());
    let content = std::fs::read_to_string(url.path())?;
    Self::from_json(&content)
  }
}

impl ReplayRecord {
  pub fn from_json(content: &str) -> Result<Self, ReplayModelError> {
    let value: Value = serde_json::from_str(content)?;

    let detections = match value.get("detections") {
      None | Some(Value::Null) => None,
      Some(Value::Array(items)) => Some(
        items
          .iter()
          .map(|item| {
            item.as_f64().map(|v| v as f32).ok_or_else(|| {
              ReplayModelError::InvalidField("detections", format!("非数值元素 {}", item))
            })
          })
          .collect::<Result<Vec<_>, _>>()?,
      ),
      Some(other) => {
        return Err(ReplayModelError::InvalidField(
          "detections",
          format!("期望数组, 实际为 {}", other),
        ));
      }
    };

    let severity = match value.get("severity") {
      None | Some(Value::Null) => None,
      Some(other) => Some(other.as_f64().map(|v| v as f32).ok_or_else(|| {
        ReplayModelError::InvalidField("severity", format!("期望数值, 实际为 {}", other))
      })?),
    };

    debug!(
      "记录包含 {} 个检测数值, 严重程度分数 {:?}",
      detections.as_ref().map_or(0, Vec::len),
      severity
    );

    Ok(Self {
      detections,
      severity,
    })
  }

  /// 拆分为检测模型与回归模型
  pub fn into_models<Frame>(self) -> (ReplayDetector<Frame>, ReplayRegressor<Frame>) {
    let record = Arc::new(self);
    (
      ReplayDetector {
        record: record.clone(),
        _phantom: PhantomData,
      },
      ReplayRegressor {
        record,
        _phantom: PhantomData,
      },
    )
  }
}

pub struct ReplayDetector<Frame> {
  record: Arc<ReplayRecord>,
  _phantom: PhantomData<fn(&Frame)>,
}

impl<Frame> Model for ReplayDetector<Frame> {
  type Input = Frame;
  type Output = Vec<f32>;
  type Error = ReplayModelError;

  fn infer(&self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
    self
      .record
      .detections
      .clone()
      .ok_or(ReplayModelError::MissingOutput("detections"))
  }
}

pub struct ReplayRegressor<Frame> {
  record: Arc<ReplayRecord>,
  _phantom: PhantomData<fn(&Frame)>,
}

impl<Frame> Model for ReplayRegressor<Frame> {
  type Input = Frame;
  type Output = f32;
  type Error = ReplayModelError;

  fn infer(&self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
    self
      .record
      .severity
      .ok_or(ReplayModelError::MissingOutput("severity"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_both_outputs() {
    let record =
      ReplayRecord::from_json(r#"{"detections": [0.1, 0.1, 0.5, 0.5, 1, 0], "severity": 2.5}"#)
        .unwrap();
    let (detector, regressor) = record.into_models::<()>();
    assert_eq!(
      detector.infer(&()).unwrap(),
      vec![0.1, 0.1, 0.5, 0.5, 1.0, 0.0]
    );
    assert_eq!(regressor.infer(&()).unwrap(), 2.5);
  }

  #[test]
  fn missing_fields_fail_at_inference() {
    let record = ReplayRecord::from_json(r#"{"detections": []}"#).unwrap();
    let (detector, regressor) = record.into_models::<()>();
    assert!(detector.infer(&()).unwrap().is_empty());
    assert!(matches!(
      regressor.infer(&()),
      Err(ReplayModelError::MissingOutput("severity"))
    ));
  }

  #[test]
  fn rejects_non_numeric_detections() {
    let err = ReplayRecord::from_json(r#"{"detections": [0.1, "a"]}"#).unwrap_err();
    assert!(matches!(err, ReplayModelError::InvalidField("detections", _)));

    let err = ReplayRecord::from_json(r#"{"severity": "high"}"#).unwrap_err();
    assert!(matches!(err, ReplayModelError::InvalidField("severity", _)));
  }

  #[test]
  fn rejects_foreign_scheme() {
    let url = Url::parse("image:///tmp/photo.jpg").unwrap();
    assert!(matches!(
      ReplayRecord::from_url(&url),
      Err(ReplayModelError::ModelPathError(_))
    ));
  }
}
