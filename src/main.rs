// 该文件是 Lumian （路面） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use lumian::{
  FromUrl,
  frame::PreparedImage,
  input::ImageFileInput,
  model::ReplayRecord,
  output::{DirectoryRecordOutput, LogPresenter, SaveImageFileOutput},
  task::{OneShotTask, Task},
};

const MODEL_INPUT_SIZE: u32 = 224;

type Frame = PreparedImage<MODEL_INPUT_SIZE, MODEL_INPUT_SIZE>;

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();
  let config = args.inference_config();

  info!("模型记录路径: {}", args.model);
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);
  info!(
    "置信度阈值: {}, NMS 阈值: {}",
    config.confidence_threshold, config.iou_threshold
  );

  let input = ImageFileInput::<MODEL_INPUT_SIZE, MODEL_INPUT_SIZE>::from_url(&args.input)?;
  let (detector, regressor) = ReplayRecord::from_url(&args.model)?.into_models::<Frame>();
  let renderer = SaveImageFileOutput::from_url(&args.output)?;
  let record = args
    .record
    .as_ref()
    .map(DirectoryRecordOutput::from_url)
    .transpose()?;

  OneShotTask::default().with_config(config).run_task(
    input.into_nhwc(),
    detector,
    regressor,
    renderer,
    (LogPresenter, record),
  )?;

  Ok(())
}
