// 该文件是 Lumian （路面） 项目的一部分。
// src/detection.rs - 检测后处理
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

mod bbox;
mod decode;
mod nms;

pub use self::bbox::{BBox, iou};
pub use self::decode::{DETECTION_STRIDE, DecodeError, decode, decode_strict};
pub use self::nms::suppress;

/// 一次请求最终保留的检测框
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectResult {
  pub items: Box<[BBox]>,
}

impl DetectResult {
  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}

impl From<Vec<BBox>> for DetectResult {
  fn from(items: Vec<BBox>) -> Self {
    Self {
      items: items.into_boxed_slice(),
    }
  }
}
