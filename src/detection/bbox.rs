// 该文件是 Lumian （路面） 项目的一部分。
// src/detection/bbox.rs - 边界框与交并比
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

/// 像素坐标下的边界框
///
/// 构造时保证 `x_max >= x_min`、`y_max >= y_min`，
/// 坐标反转的输入会被收缩为面积为零的框。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
  x_min: i32,
  y_min: i32,
  x_max: i32,
  y_max: i32,
  confidence: f32,
}

impl BBox {
  pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32, confidence: f32) -> Self {
    Self {
      x_min,
      y_min,
      x_max: x_max.max(x_min),
      y_max: y_max.max(y_min),
      confidence,
    }
  }

  pub fn x_min(&self) -> i32 {
    self.x_min
  }

  pub fn y_min(&self) -> i32 {
    self.y_min
  }

  pub fn x_max(&self) -> i32 {
    self.x_max
  }

  pub fn y_max(&self) -> i32 {
    self.y_max
  }

  pub fn confidence(&self) -> f32 {
    self.confidence
  }

  pub fn width(&self) -> i64 {
    self.x_max as i64 - self.x_min as i64
  }

  pub fn height(&self) -> i64 {
    self.y_max as i64 - self.y_min as i64
  }

  /// 面积，恒为非负
  pub fn area(&self) -> f64 {
    self.width() as f64 * self.height() as f64
  }

  /// 与另一个框的交集面积，不相交时为 0
  pub fn intersection(&self, other: &BBox) -> f64 {
    let ix0 = self.x_min.max(other.x_min) as i64;
    let iy0 = self.y_min.max(other.y_min) as i64;
    let ix1 = self.x_max.min(other.x_max) as i64;
    let iy1 = self.y_max.min(other.y_max) as i64;

    (ix1 - ix0).max(0) as f64 * (iy1 - iy0).max(0) as f64
  }
}

/// 计算两个边界框的交并比 (IoU)，结果位于 [0, 1]
pub fn iou(a: &BBox, b: &BBox) -> f32 {
  let intersection = a.intersection(b);
  let union = a.area() + b.area() - intersection;

  if union > 0.0 {
    (intersection / union) as f32
  } else {
    0.0
  }
}
