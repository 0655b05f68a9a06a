// 该文件是 Lumian （路面） 项目的一部分。
// src/frame.rs - 帧定义
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

use crate::input::AsNhwcFrame;

const RGB_CHANNELS: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
  #[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

/// 用于把归一化坐标还原为像素坐标的图像尺寸
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageDimensions {
  pub width: f32,
  pub height: f32,
}

impl ImageDimensions {
  pub fn new(width: f32, height: f32) -> Self {
    Self { width, height }
  }
}

/// 可提供展示尺寸的图像
pub trait WithDimensions {
  fn dimensions(&self) -> ImageDimensions;
}

/// 模型输入帧，尺寸在编译期固定
#[derive(Debug, Clone)]
pub struct RgbNhwcFrame<const W: u32, const H: u32> {
  data: Box<[u8]>,
}

impl<const W: u32, const H: u32> TryFrom<Vec<u8>> for RgbNhwcFrame<W, H> {
  type Error = FrameError;

  fn try_from(data: Vec<u8>) -> Result<Self, Self::Error> {
    let expected = RGB_CHANNELS * W as usize * H as usize;
    if data.len() != expected {
      return Err(FrameError::LengthMismatch {
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      data: data.into_boxed_slice(),
    })
  }
}

impl<const W: u32, const H: u32> AsNhwcFrame<W, H> for RgbNhwcFrame<W, H> {
  fn as_nhwc(&self) -> &[u8] {
    &self.data
  }
}

/// 用于展示和绘制的 RGB 图像，尺寸在运行期确定
#[derive(Debug, Clone)]
pub struct RgbFrame {
  width: u32,
  height: u32,
  data: Box<[u8]>,
}

impl RgbFrame {
  pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
    let expected = RGB_CHANNELS * width as usize * height as usize;
    if data.len() != expected {
      return Err(FrameError::LengthMismatch {
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      width,
      height,
      data: data.into_boxed_slice(),
    })
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn as_raw(&self) -> &[u8] {
    &self.data
  }
}

impl WithDimensions for RgbFrame {
  fn dimensions(&self) -> ImageDimensions {
    ImageDimensions::new(self.width as f32, self.height as f32)
  }
}

/// 一次请求的预处理结果
///
/// `input` 送入两个模型，`display` 用于还原检测框坐标并绘制结果。
/// 两个推理任务只读共享同一个实例。
#[derive(Debug, Clone)]
pub struct PreparedImage<const W: u32, const H: u32> {
  pub input: RgbNhwcFrame<W, H>,
  pub display: RgbFrame,
}

impl<const W: u32, const H: u32> PreparedImage<W, H> {
  pub fn new(input: RgbNhwcFrame<W, H>, display: RgbFrame) -> Self {
    Self { input, display }
  }
}

impl<const W: u32, const H: u32> WithDimensions for PreparedImage<W, H> {
  fn dimensions(&self) -> ImageDimensions {
    self.display.dimensions()
  }
}

impl<const W: u32, const H: u32> AsNhwcFrame<W, H> for PreparedImage<W, H> {
  fn as_nhwc(&self) -> &[u8] {
    self.input.as_nhwc()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn frame_rejects_wrong_length() {
    let err = RgbNhwcFrame::<4, 2>::try_from(vec![0u8; 10]).unwrap_err();
    assert_eq!(
      err,
      FrameError::LengthMismatch {
        expected: 24,
        actual: 10
      }
    );
    assert!(RgbNhwcFrame::<4, 2>::try_from(vec![0u8; 24]).is_ok());
  }

  #[test]
  fn prepared_image_reports_display_dimensions() {
    let display = RgbFrame::new(8, 6, vec![0u8; 8 * 6 * 3]).unwrap();
    let prepared = PreparedImage::new(RgbNhwcFrame::<2, 2>::try_from(vec![0u8; 2 * 2 * 3]).unwrap(), display);
    assert_eq!(prepared.dimensions(), ImageDimensions::new(8.0, 6.0));
    assert_eq!(prepared.as_nhwc().len(), 12);
  }
}
