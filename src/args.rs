// 该文件是 Lumian （路面） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::Parser;
use lumian::config::{InferenceArgs, InferenceConfig};
use url::Url;

/// Lumian 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 模型输出记录 (replay:///path/to/outputs.json)
  #[arg(long, value_name = "MODEL")]
  pub model: Url,

  /// 输入图像 (image:///path/to/photo.jpg)
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 输出图像 (image:///path/to/overlay.png)
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,

  /// 评估记录目录 (record:///path/to/dir)
  #[arg(long, value_name = "RECORD")]
  pub record: Option<Url>,

  #[command(flatten)]
  pub inference: InferenceArgs,
}

impl Args {
  pub fn inference_config(&self) -> InferenceConfig {
    InferenceConfig::from(&self.inference)
  }
}
