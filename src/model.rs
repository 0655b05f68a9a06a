// 该文件是 Lumian （路面） 项目的一部分。
// src/model.rs - 模型
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

use std::marker::PhantomData;

/// 推理模型
///
/// 检测模型输出步长为 6 的展平检测结果 (`Vec<f32>`)，
/// 回归模型输出单个严重程度分数 (`f32`)。
pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 用闭包实现的模型
pub struct FnModel<I, F> {
  f: F,
  _phantom: PhantomData<fn(&I)>,
}

impl<I, F> FnModel<I, F> {
  pub fn new(f: F) -> Self {
    Self {
      f,
      _phantom: PhantomData,
    }
  }
}

impl<I, O, E, F> Model for FnModel<I, F>
where
  F: Fn(&I) -> Result<O, E>,
{
  type Input = I;
  type Output = O;
  type Error = E;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    (self.f)(input)
  }
}

impl<M: Model + ?Sized> Model for &M {
  type Input = M::Input;
  type Output = M::Output;
  type Error = M::Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    (**self).infer(input)
  }
}

mod replay;
pub use self::replay::{ReplayDetector, ReplayModelError, ReplayRecord, ReplayRegressor};
