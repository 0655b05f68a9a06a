// 该文件是 Lumian （路面） 项目的一部分。
// src/output/save_image_file.rs - 保存图像文件
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

use std::{
  path::{Path, PathBuf},
  sync::atomic::{AtomicU32, Ordering},
};

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  detection::DetectResult,
  output::{
    Render,
    draw::{Draw, DrawDetectionOnFrame, ToRgbImage},
  },
};

/// 绘制检测框并保存为图像文件
///
/// 路径以 `/` 结尾时视为目录，每次渲染写入一个新的 `overlay-XXXX.png`。
pub struct SaveImageFileOutput {
  path: PathBuf,
  directory: bool,
  image_counter: AtomicU32,
  draw: Draw,
}

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("字体错误: {0}")]
  FontError(#[from] ab_glyph::InvalidFont),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    if uri.path().ends_with('/') {
      Self::directory(uri.path())
    } else {
      Self::new(uri.path())
    }
  }
}

impl SaveImageFileOutput {
  pub fn new(path: impl AsRef<Path>) -> Result<Self, SaveImageFileError> {
    Ok(SaveImageFileOutput {
      path: path.as_ref().to_path_buf(),
      directory: false,
      image_counter: AtomicU32::new(0),
      draw: Draw::new()?,
    })
  }

  pub fn directory(path: impl AsRef<Path>) -> Result<Self, SaveImageFileError> {
    let mut output = Self::new(path)?;
    output.directory = true;
    Ok(output)
  }

  fn target_path(&self) -> PathBuf {
    if self.directory {
      let id = self.image_counter.fetch_add(1, Ordering::Relaxed) + 1;
      self.path.join(format!("overlay-{:04}.png", id))
    } else {
      self.path.clone()
    }
  }

  fn save_image(&self, image: image::RgbImage) -> Result<(), SaveImageFileError> {
    let path = self.target_path();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    image.save(&path)?;
    info!("保存图像到文件: {}", path.display());

    Ok(())
  }
}

impl<Frame: ToRgbImage> Render<Frame, DetectResult> for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(&self, frame: &Frame, result: &DetectResult) -> Result<(), Self::Error> {
    let image = self.draw.draw_detection(frame, result);
    self.save_image(image)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{detection::BBox, frame::RgbFrame};

  #[test]
  fn saves_overlay_next_to_missing_parent() {
    let dir = std::env::temp_dir().join(format!("lumian-save-{}", std::process::id()));
    let path = dir.join("nested").join("overlay.png");
    let output = SaveImageFileOutput::new(&path).unwrap();

    let frame = RgbFrame::new(64, 64, vec![0u8; 64 * 64 * 3]).unwrap();
    let result = DetectResult::from(vec![BBox::new(8, 8, 40, 40, 1.0)]);
    output.render_result(&frame, &result).unwrap();

    let saved = image::open(&path).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (64, 64));
    let _ = std::fs::remove_dir_all(dir);
  }

  #[test]
  fn directory_mode_writes_numbered_files() {
    let dir = std::env::temp_dir().join(format!("lumian-save-dir-{}", std::process::id()));
    let url = Url::parse(&format!("image://{}/", dir.display())).unwrap();
    let output = SaveImageFileOutput::from_url(&url).unwrap();

    let frame = RgbFrame::new(16, 16, vec![0u8; 16 * 16 * 3]).unwrap();
    let result = DetectResult::default();
    output.render_result(&frame, &result).unwrap();
    output.render_result(&frame, &result).unwrap();

    assert!(dir.join("overlay-0001.png").exists());
    assert!(dir.join("overlay-0002.png").exists());
    let _ = std::fs::remove_dir_all(dir);
  }

  #[test]
  fn rejects_foreign_scheme() {
    let url = Url::parse("record:///tmp/out").unwrap();
    assert!(matches!(
      SaveImageFileOutput::from_url(&url),
      Err(SaveImageFileError::SchemeMismatch(_))
    ));
  }
}
