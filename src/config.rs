// 该文件是 Lumian （路面） 项目的一部分。
// src/config.rs - 推理参数配置
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

/// 检测置信度阈值，只接受满分检测
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 1.0;
/// NMS IoU 阈值
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceConfig {
  /// 置信度阈值，低于该值的检测被丢弃
  pub confidence_threshold: f32,
  /// NMS IoU 阈值
  pub iou_threshold: f32,
  /// 检测输出长度不完整时报错而不是截断
  pub strict_buffer: bool,
  /// 回归模型失败时将严重程度标记为 Error，而不是按哨兵分数分级
  pub flag_regressor_failure: bool,
}

impl Default for InferenceConfig {
  fn default() -> Self {
    Self {
      confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
      iou_threshold: DEFAULT_IOU_THRESHOLD,
      strict_buffer: false,
      flag_regressor_failure: false,
    }
  }
}

impl InferenceConfig {
  pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
    self.confidence_threshold = threshold;
    self
  }

  pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
    self.iou_threshold = threshold;
    self
  }

  pub fn with_strict_buffer(mut self, strict: bool) -> Self {
    self.strict_buffer = strict;
    self
  }

  pub fn with_flag_regressor_failure(mut self, flag: bool) -> Self {
    self.flag_regressor_failure = flag;
    self
  }
}

/// 推理相关的命令行参数，各程序共用
#[derive(clap::Args, Debug, Clone)]
pub struct InferenceArgs {
  /// 置信度阈值
  #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD, value_name = "THRESHOLD")]
  pub confidence: f32,

  /// NMS IOU 阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = DEFAULT_IOU_THRESHOLD, value_name = "THRESHOLD")]
  pub nms_threshold: f32,

  /// 检测输出长度不完整时报错
  #[arg(long)]
  pub strict_buffer: bool,

  /// 回归模型失败时显示错误而不是低严重程度
  #[arg(long)]
  pub flag_regressor_failure: bool,
}

impl From<&InferenceArgs> for InferenceConfig {
  fn from(args: &InferenceArgs) -> Self {
    InferenceConfig::default()
      .with_confidence_threshold(args.confidence)
      .with_iou_threshold(args.nms_threshold)
      .with_strict_buffer(args.strict_buffer)
      .with_flag_regressor_failure(args.flag_regressor_failure)
  }
}

#[cfg(test)]
mod tests {
  use clap::Parser;

  use super::*;

  #[derive(Parser)]
  struct Cli {
    #[command(flatten)]
    inference: InferenceArgs,
  }

  #[test]
  fn defaults_keep_strict_thresholds() {
    let config = InferenceConfig::default();
    assert_eq!(config.confidence_threshold, 1.0);
    assert_eq!(config.iou_threshold, 0.1);
    assert!(!config.strict_buffer);
    assert!(!config.flag_regressor_failure);
  }

  #[test]
  fn builders_override_single_fields() {
    let config = InferenceConfig::default()
      .with_confidence_threshold(0.25)
      .with_strict_buffer(true);
    assert_eq!(config.confidence_threshold, 0.25);
    assert_eq!(config.iou_threshold, DEFAULT_IOU_THRESHOLD);
    assert!(config.strict_buffer);
  }

  #[test]
  fn command_line_defaults_match_config_defaults() {
    let cli = Cli::try_parse_from(["lumian"]).unwrap();
    assert_eq!(InferenceConfig::from(&cli.inference), InferenceConfig::default());
  }

  #[test]
  fn command_line_flags_reach_config() {
    let cli = Cli::try_parse_from([
      "lumian",
      "--confidence",
      "0.5",
      "--nms-threshold",
      "0.3",
      "--strict-buffer",
      "--flag-regressor-failure",
    ])
    .unwrap();
    let config = InferenceConfig::from(&cli.inference);
    assert_eq!(config.confidence_threshold, 0.5);
    assert_eq!(config.iou_threshold, 0.3);
    assert!(config.strict_buffer);
    assert!(config.flag_regressor_failure);
  }
}
