// 该文件是 Lumian （路面） 项目的一部分。
// src/detection/nms.rs - 非极大值抑制
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

use tracing::debug;

use crate::detection::{BBox, iou};

/// 贪心非极大值抑制
///
/// 按置信度降序（稳定排序）依次接受候选框，并剔除与已接受框 IoU
/// 严格大于 `iou_threshold` 的其余候选框。输出顺序即接受顺序。
pub fn suppress(boxes: &[BBox], iou_threshold: f32) -> Vec<BBox> {
  // 按置信度降序排序，置信度相同时保持原有顺序
  let mut sorted = boxes.to_vec();
  sorted.sort_by(|a, b| b.confidence().total_cmp(&a.confidence()));

  let mut suppressed = vec![false; sorted.len()];
  let mut result = Vec::new();

  for i in 0..sorted.len() {
    if suppressed[i] {
      continue;
    }

    let best = sorted[i];
    result.push(best);

    for (j, candidate) in sorted.iter().enumerate().skip(i + 1) {
      if !suppressed[j] && iou(&best, candidate) > iou_threshold {
        suppressed[j] = true;
      }
    }
  }

  debug!(
    "NMS: {} 个候选框保留 {} 个 (IoU 阈值 {})",
    boxes.len(),
    result.len(),
    iou_threshold
  );

  result
}
