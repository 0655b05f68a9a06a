// 该文件是 Lumian （路面） 项目的一部分。
// src/bin/simple_continueshot.rs - 连续处理多张图像
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

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use url::Url;

use lumian::{
  FromUrl,
  config::{InferenceArgs, InferenceConfig},
  frame::PreparedImage,
  input::ImageFileInput,
  model::ReplayRecord,
  output::{DirectoryRecordOutput, LogPresenter, SaveImageFileOutput},
  task::{CancelToken, ContinuousTask, Task},
};

const MODEL_INPUT_SIZE: u32 = 224;

type Frame = PreparedImage<MODEL_INPUT_SIZE, MODEL_INPUT_SIZE>;

/// Lumian 连续处理参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 模型输出记录
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入图像，可重复指定
  #[arg(long, value_name = "SOURCE", required = true)]
  pub input: Vec<Url>,
  /// 输出目录 (image:///path/to/dir/)
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
  /// 评估记录目录
  #[arg(long, value_name = "RECORD")]
  pub record: Option<Url>,

  #[command(flatten)]
  pub inference: InferenceArgs,

  #[arg(long, value_name = "FRAME_NUMBER")]
  pub frame_number: Option<usize>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型记录路径: {}", args.model);
  info!("输入图像: {} 张", args.input.len());
  info!("输出路径: {}", args.output);

  let token = CancelToken::new();
  let handler_token = token.clone();
  ctrlc::set_handler(move || {
    warn!("收到中断信号，取消当前请求...");
    handler_token.cancel();
  })?;

  let inputs = args.input.iter().map(|url| {
    ImageFileInput::<MODEL_INPUT_SIZE, MODEL_INPUT_SIZE>::from_url(url)
      .and_then(|input| input.prepare())
  });
  let (detector, regressor) = ReplayRecord::from_url(&args.model)?.into_models::<Frame>();
  let renderer = SaveImageFileOutput::from_url(&args.output)?;
  let record = args
    .record
    .as_ref()
    .map(DirectoryRecordOutput::from_url)
    .transpose()?;

  let config = InferenceConfig::from(&args.inference);
  info!(
    "置信度阈值: {}, NMS 阈值: {}",
    config.confidence_threshold, config.iou_threshold
  );

  ContinuousTask::default()
    .with_config(config)
    .with_frame_number(args.frame_number)
    .with_cancel_token(token)
    .run_task(inputs, detector, regressor, renderer, (LogPresenter, record))?;

  Ok(())
}
