// 该文件是 Lumian （路面） 项目的一部分。
// src/detection/decode.rs - 检测输出解码
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

use thiserror::Error;
use tracing::{debug, warn};

use crate::{detection::BBox, frame::ImageDimensions};

/// 每条检测记录的长度: [x_min, y_min, x_max, y_max, confidence, 保留]
pub const DETECTION_STRIDE: usize = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
  #[error("检测输出长度 {len} 不是步长 {stride} 的整数倍")]
  MalformedBuffer { len: usize, stride: usize },
}

fn denormalize(value: f32, scale: f32) -> i32 {
  (value * scale).round() as i32
}

fn decode_record(record: &[f32], dims: ImageDimensions) -> BBox {
  BBox::new(
    denormalize(record[0], dims.width),
    denormalize(record[1], dims.height),
    denormalize(record[2], dims.width),
    denormalize(record[3], dims.height),
    record[4],
  )
}

/// 将展平的检测输出解码为像素坐标下的候选框
///
/// 末尾不足一条记录的数据会被丢弃。只保留置信度不低于 `threshold` 的记录，
/// 输出顺序与输入一致。
pub fn decode(buffer: &[f32], dims: ImageDimensions, threshold: f32) -> Vec<BBox> {
  let records = buffer.chunks_exact(DETECTION_STRIDE);
  let remainder = records.remainder().len();
  if remainder != 0 {
    warn!(
      "检测输出长度 {} 不是 {} 的整数倍，丢弃末尾 {} 个数值",
      buffer.len(),
      DETECTION_STRIDE,
      remainder
    );
  }

  let boxes: Vec<BBox> = records
    .filter(|record| record[4] >= threshold)
    .map(|record| decode_record(record, dims))
    .collect();

  debug!(
    "解码 {} 条记录，保留 {} 个候选框 (阈值 {})",
    buffer.len() / DETECTION_STRIDE,
    boxes.len(),
    threshold
  );

  boxes
}

/// 与 [`decode`] 相同，但输出长度不完整时返回错误而非截断
pub fn decode_strict(
  buffer: &[f32],
  dims: ImageDimensions,
  threshold: f32,
) -> Result<Vec<BBox>, DecodeError> {
  if buffer.len() % DETECTION_STRIDE != 0 {
    return Err(DecodeError::MalformedBuffer {
      len: buffer.len(),
      stride: DETECTION_STRIDE,
    });
  }
  Ok(decode(buffer, dims, threshold))
}
