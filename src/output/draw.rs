// 该文件是 Lumian （路面） 项目的一部分。
// src/output/draw.rs - 检测结果可视化
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

use ab_glyph::{FontArc, InvalidFont, PxScale};
use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::{
  drawing::{draw_hollow_rect_mut, draw_text_mut},
  rect::Rect,
};

use crate::{
  detection::{BBox, DetectResult},
  frame::{PreparedImage, RgbFrame},
};

const LABEL_FONT_SIZE: f32 = 40.0;
// 文本底部与边框上沿的距离
const LABEL_OFFSET: i32 = 10;
const STROKE_WIDTH: i32 = 5;
const BOX_COLOR: [u8; 3] = [255, 0, 0]; // 红色

pub struct Draw {
  font: FontArc,
  font_scale: PxScale,
  stroke_width: i32,
  color: Rgb<u8>,
}

impl Draw {
  pub fn new() -> Result<Self, InvalidFont> {
    let font_data = include_bytes!("../../assets/DejaVuSans.ttf");
    let font = FontArc::try_from_slice(font_data)?;

    Ok(Self {
      font,
      font_scale: PxScale::from(LABEL_FONT_SIZE),
      stroke_width: STROKE_WIDTH,
      color: Rgb(BOX_COLOR),
    })
  }

  fn draw_bbox(&self, image: &mut RgbImage, bbox: &BBox) {
    // 裁剪到图像范围内，完全落在图像外的框不绘制
    let max_x = image.width().min(i32::MAX as u32) as i32;
    let max_y = image.height().min(i32::MAX as u32) as i32;
    let x0 = bbox.x_min().clamp(0, max_x);
    let y0 = bbox.y_min().clamp(0, max_y);
    let x1 = bbox.x_max().clamp(0, max_x);
    let y1 = bbox.y_max().clamp(0, max_y);
    if x1 <= x0 || y1 <= y0 {
      return;
    }

    // 以边框为中心加粗
    let half = self.stroke_width / 2;
    for offset in -half..(self.stroke_width - half) {
      let width = (x1 - x0) as i64 + 2 * offset as i64;
      let height = (y1 - y0) as i64 + 2 * offset as i64;
      if width <= 0 || height <= 0 {
        continue;
      }

      let rect = Rect::at(x0.saturating_sub(offset), y0.saturating_sub(offset))
        .of_size(width as u32, height as u32);
      draw_hollow_rect_mut(image, rect, self.color);
    }

    let label = format!("Confidence: {:.2}", bbox.confidence());
    let text_y = y0
      .saturating_sub(LABEL_OFFSET)
      .saturating_sub(self.font_scale.y as i32);
    draw_text_mut(
      image,
      self.color,
      x0,
      text_y,
      self.font_scale,
      &self.font,
      &label,
    );
  }

  pub fn draw_detections_on_image(&self, image: &mut RgbImage, result: &DetectResult) {
    for bbox in result.items.iter() {
      self.draw_bbox(image, bbox);
    }
  }
}

pub trait ToRgbImage {
  fn to_rgb_image(&self) -> RgbImage;
}

impl ToRgbImage for RgbFrame {
  fn to_rgb_image(&self) -> RgbImage {
    let width = self.width();
    let data = self.as_raw();

    ImageBuffer::from_fn(width, self.height(), |x, y| {
      let idx = (y as usize * width as usize + x as usize) * 3;
      Rgb([data[idx], data[idx + 1], data[idx + 2]])
    })
  }
}

impl<const W: u32, const H: u32> ToRgbImage for PreparedImage<W, H> {
  fn to_rgb_image(&self) -> RgbImage {
    self.display.to_rgb_image()
  }
}

pub trait DrawDetectionOnFrame<Frame> {
  fn draw_detection(&self, frame: &Frame, result: &DetectResult) -> RgbImage;
}

impl<Frame: ToRgbImage> DrawDetectionOnFrame<Frame> for Draw {
  fn draw_detection(&self, frame: &Frame, result: &DetectResult) -> RgbImage {
    let mut image = frame.to_rgb_image();
    self.draw_detections_on_image(&mut image, result);
    image
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn blank_frame(width: u32, height: u32) -> RgbFrame {
    RgbFrame::new(width, height, vec![0u8; (width * height * 3) as usize]).unwrap()
  }

  #[test]
  fn frame_converts_to_image() {
    let mut data = vec![0u8; 2 * 2 * 3];
    data[3..6].copy_from_slice(&[1, 2, 3]);
    let frame = RgbFrame::new(2, 2, data).unwrap();
    let image = frame.to_rgb_image();
    assert_eq!(image.get_pixel(1, 0), &Rgb([1, 2, 3]));
    assert_eq!(image.get_pixel(0, 1), &Rgb([0, 0, 0]));
  }

  #[test]
  fn draws_red_outline_on_box_edges() {
    let draw = Draw::new().unwrap();
    let frame = blank_frame(200, 200);
    let result = DetectResult::from(vec![BBox::new(80, 100, 160, 180, 0.95)]);

    let image = draw.draw_detection(&frame, &result);
    assert_eq!(image.get_pixel(80, 140), &Rgb(BOX_COLOR));
    assert_eq!(image.get_pixel(120, 180), &Rgb(BOX_COLOR));
    // 框内部不绘制
    assert_eq!(image.get_pixel(120, 140), &Rgb([0, 0, 0]));
  }

  #[test]
  fn degenerate_and_out_of_bounds_boxes_do_not_panic() {
    let draw = Draw::new().unwrap();
    let frame = blank_frame(50, 50);
    let result = DetectResult::from(vec![
      BBox::new(10, 10, 10, 10, 1.0),
      BBox::new(-100, -100, 500, 500, 1.0),
    ]);
    let image = draw.draw_detection(&frame, &result);
    assert_eq!(image.dimensions(), (50, 50));
  }

  #[test]
  fn saturated_coordinates_are_clipped_to_frame() {
    let draw = Draw::new().unwrap();
    let frame = blank_frame(50, 50);
    let boxes = crate::detection::decode(
      &[-1e30, -1e30, 0.5, 0.5, 1.0, 0.0],
      crate::frame::ImageDimensions::new(100.0, 100.0),
      1.0,
    );
    assert_eq!(boxes[0].x_min(), i32::MIN);

    let result = DetectResult::from(vec![
      boxes[0],
      BBox::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX, 1.0),
    ]);
    let image = draw.draw_detection(&frame, &result);
    // 左边框贴在图像边缘
    assert_eq!(image.get_pixel(0, 25), &Rgb(BOX_COLOR));
  }

  #[test]
  fn boxes_outside_frame_are_skipped() {
    let draw = Draw::new().unwrap();
    let frame = blank_frame(50, 50);
    let result = DetectResult::from(vec![BBox::new(200, 200, 300, 300, 1.0)]);
    let image = draw.draw_detection(&frame, &result);
    assert!(image.pixels().all(|pixel| pixel == &Rgb([0, 0, 0])));
  }
}
