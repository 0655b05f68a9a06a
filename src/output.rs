// 该文件是 Lumian （路面） 项目的一部分。
// src/output.rs - 输出定义
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

use std::convert::Infallible;

use tracing::{info, warn};

use crate::{
  severity::SeverityLevel,
  task::{Assessment, BoxError},
};

/// 绘制检测结果
pub trait Render<Frame, Output>: Sized {
  type Error;
  fn render_result(&self, frame: &Frame, result: &Output) -> Result<(), Self::Error>;
}

/// 展示严重程度评估
pub trait Present {
  type Error;
  fn present(&self, assessment: &Assessment) -> Result<(), Self::Error>;
}

impl<T: Present> Present for &T {
  type Error = T::Error;

  fn present(&self, assessment: &Assessment) -> Result<(), Self::Error> {
    (**self).present(assessment)
  }
}

impl<T: Present> Present for Option<T> {
  type Error = T::Error;

  fn present(&self, assessment: &Assessment) -> Result<(), Self::Error> {
    match self {
      Some(presenter) => presenter.present(assessment),
      None => Ok(()),
    }
  }
}

impl<A, B> Present for (A, B)
where
  A: Present,
  A::Error: Into<BoxError>,
  B: Present,
  B::Error: Into<BoxError>,
{
  type Error = BoxError;

  fn present(&self, assessment: &Assessment) -> Result<(), Self::Error> {
    self.0.present(assessment).map_err(|e| -> BoxError { e.into() })?;
    self.1.present(assessment).map_err(|e| -> BoxError { e.into() })
  }
}

/// 将提示语写入日志
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

impl Present for LogPresenter {
  type Error = Infallible;

  fn present(&self, assessment: &Assessment) -> Result<(), Self::Error> {
    match assessment.severity {
      SeverityLevel::Error => warn!("{}", assessment.severity.message()),
      level => info!("{}", level.message()),
    }
    Ok(())
  }
}

#[cfg(feature = "save_image_file")]
pub mod draw;

#[cfg(feature = "save_image_file")]
mod save_image_file;
#[cfg(feature = "save_image_file")]
pub use self::save_image_file::{SaveImageFileError, SaveImageFileOutput};

#[cfg(feature = "directory_record")]
mod directory_record;
#[cfg(feature = "directory_record")]
pub use self::directory_record::{DirectoryRecordOutput, DirectoryRecordOutputError};
