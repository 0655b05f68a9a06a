// 该文件是 Lumian （路面） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use image::{ImageReader, RgbImage, imageops::FilterType};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{FrameError, PreparedImage, RgbFrame, RgbNhwcFrame},
};

/// 展示图像的默认尺寸，检测框在该尺寸下还原
pub const DISPLAY_WIDTH: u32 = 1024;
pub const DISPLAY_HEIGHT: u32 = 1024;

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
  #[error("Frame error: {0}")]
  FrameError(#[from] FrameError),
}

pub struct ImageFileInput<const W: u32, const H: u32> {
  image: RgbImage,
  display_width: u32,
  display_height: u32,
}

impl<const W: u32, const H: u32> FromUrlWithScheme for ImageFileInput<W, H> {
  const SCHEME: &'static str = "image";
}

impl<const W: u32, const H: u32> FromUrl for ImageFileInput<W, H> {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    let path = url.path();
    info!("读取图像文件: {}", path);
    let image = ImageReader::open(path)?.decode()?;
    debug!("图像原始尺寸: {}x{}", image.width(), image.height());

    Ok(Self::from_image(image.into()))
  }
}

impl<const W: u32, const H: u32> ImageFileInput<W, H> {
  pub fn from_image(image: RgbImage) -> Self {
    Self {
      image,
      display_width: DISPLAY_WIDTH,
      display_height: DISPLAY_HEIGHT,
    }
  }

  pub fn with_display_size(mut self, width: u32, height: u32) -> Self {
    self.display_width = width;
    self.display_height = height;
    self
  }

  pub fn into_nhwc(self) -> ImageFileInputNhwc<W, H> {
    ImageFileInputNhwc { inner: Some(self) }
  }

  /// 缩放到展示尺寸与模型输入尺寸
  pub fn prepare(&self) -> Result<PreparedImage<W, H>, ImageFileInputError> {
    let display = image::imageops::resize(
      &self.image,
      self.display_width,
      self.display_height,
      FilterType::Triangle,
    );
    let input = image::imageops::resize(&display, W, H, FilterType::Triangle);

    let input = RgbNhwcFrame::try_from(input.into_raw())?;
    let display = RgbFrame::new(display.width(), display.height(), display.into_raw())?;
    Ok(PreparedImage::new(input, display))
  }
}

pub struct ImageFileInputNhwc<const W: u32, const H: u32> {
  inner: Option<ImageFileInput<W, H>>,
}

impl<const W: u32, const H: u32> Iterator for ImageFileInputNhwc<W, H> {
  type Item = Result<PreparedImage<W, H>, ImageFileInputError>;

  fn next(&mut self) -> Option<Self::Item> {
    self.inner.take().map(|input| input.prepare())
  }
}
