// 该文件是 Lumian （路面） 项目的一部分。
// src/severity.rs - 严重程度分级
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

use std::fmt;

/// 回归模型失败时使用的哨兵分数
pub const SENTINEL_SCORE: f32 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeverityLevel {
  Low,
  Moderate,
  High,
  Critical,
  Error,
}

impl SeverityLevel {
  /// 展示给用户的提示语
  pub fn message(&self) -> &'static str {
    match self {
      SeverityLevel::Low => "Low Severity. Stay cautious.",
      SeverityLevel::Moderate => "Moderate Severity. Stay alert.",
      SeverityLevel::High => "High Severity. Be very cautious.",
      SeverityLevel::Critical => "Critical Severity. Immediate action required!",
      SeverityLevel::Error => "Error calculating severity.",
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      SeverityLevel::Low => "low",
      SeverityLevel::Moderate => "moderate",
      SeverityLevel::High => "high",
      SeverityLevel::Critical => "critical",
      SeverityLevel::Error => "error",
    }
  }
}

impl fmt::Display for SeverityLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// 将回归分数映射为严重程度
///
/// 每一档包含上界：`<= 1` 为 Low，`<= 2` 为 Moderate，`<= 3` 为 High，
/// `<= 4` 为 Critical，其余（含 NaN）为 Error。
/// 负数哨兵分数同样落入 Low。
pub fn classify(score: f32) -> SeverityLevel {
  if score <= 1.0 {
    SeverityLevel::Low
  } else if score <= 2.0 {
    SeverityLevel::Moderate
  } else if score <= 3.0 {
    SeverityLevel::High
  } else if score <= 4.0 {
    SeverityLevel::Critical
  } else {
    SeverityLevel::Error
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bands_are_inclusive_on_the_upper_bound() {
    assert_eq!(classify(0.5), SeverityLevel::Low);
    assert_eq!(classify(1.0), SeverityLevel::Low);
    assert_eq!(classify(1.5), SeverityLevel::Moderate);
    assert_eq!(classify(2.0), SeverityLevel::Moderate);
    assert_eq!(classify(2.0001), SeverityLevel::High);
    assert_eq!(classify(3.0), SeverityLevel::High);
    assert_eq!(classify(4.0), SeverityLevel::Critical);
    assert_eq!(classify(5.0), SeverityLevel::Error);
  }

  #[test]
  fn sentinel_score_falls_into_low() {
    assert_eq!(classify(SENTINEL_SCORE), SeverityLevel::Low);
    assert_eq!(classify(f32::NEG_INFINITY), SeverityLevel::Low);
  }

  #[test]
  fn non_finite_scores_above_range_are_errors() {
    assert_eq!(classify(f32::INFINITY), SeverityLevel::Error);
    assert_eq!(classify(f32::NAN), SeverityLevel::Error);
  }

  #[test]
  fn messages_match_levels() {
    assert_eq!(classify(3.5).message(), "Critical Severity. Immediate action required!");
    assert_eq!(SeverityLevel::Error.to_string(), "error");
  }
}
