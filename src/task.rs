// 该文件是 Lumian （路面） 项目的一部分。
// src/task.rs - 推理任务编排
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
  fmt,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc,
  },
  thread,
  time::Instant,
};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
  config::InferenceConfig,
  detection::{DecodeError, DetectResult, decode, decode_strict, suppress},
  frame::WithDimensions,
  model::Model,
  output::{Present, Render},
  severity::{SENTINEL_SCORE, SeverityLevel, classify},
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 推理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Detector,
  Regressor,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Stage::Detector => f.write_str("检测模型"),
      Stage::Regressor => f.write_str("回归模型"),
    }
  }
}

#[derive(Error, Debug)]
pub enum InferenceError {
  #[error("{stage}推理失败: {source}")]
  InferenceFailure { stage: Stage, source: BoxError },
  #[error("{stage}推理线程异常退出")]
  WorkerPanicked { stage: Stage },
  #[error("检测输出解码失败: {0}")]
  Decode(#[from] DecodeError),
  #[error("渲染失败: {0}")]
  Render(BoxError),
  #[error("展示失败: {0}")]
  Present(BoxError),
  #[error("推理任务已取消")]
  Cancelled,
  #[error("推理线程已断开")]
  Disconnected,
}

impl InferenceError {
  pub fn stage(&self) -> Option<Stage> {
    match self {
      InferenceError::InferenceFailure { stage, .. } | InferenceError::WorkerPanicked { stage } => {
        Some(*stage)
      }
      _ => None,
    }
  }
}

/// 一次请求的完整结果
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
  pub detections: DetectResult,
  pub score: f32,
  pub severity: SeverityLevel,
  /// 回归模型失败，`score` 为哨兵分数
  pub regressor_failed: bool,
}

/// 并发运行检测模型与回归模型，等待两者完成后解码、抑制并分级
///
/// 检测模型失败时整个请求失败；回归模型失败时使用哨兵分数继续。
pub fn run_inference<F, D, R>(
  image: &F,
  detector: &D,
  regressor: &R,
  config: &InferenceConfig,
) -> Result<Assessment, InferenceError>
where
  F: WithDimensions + Sync,
  D: Model<Input = F, Output = Vec<f32>> + Sync,
  D::Error: Into<BoxError> + Send,
  R: Model<Input = F, Output = f32> + Sync,
  R::Error: Into<BoxError> + Send,
{
  let now = Instant::now();
  let (detections, regression) = thread::scope(|s| {
    let detections = s.spawn(|| detector.infer(image));
    let regression = s.spawn(|| regressor.infer(image));
    (detections.join(), regression.join())
  });
  debug!("两个模型推理完成，耗时: {:.2?}", now.elapsed());

  let buffer = match detections {
    Ok(Ok(buffer)) => buffer,
    Ok(Err(e)) => {
      let source: BoxError = e.into();
      error!("检测模型推理失败: {}", source);
      return Err(InferenceError::InferenceFailure {
        stage: Stage::Detector,
        source,
      });
    }
    Err(_) => {
      error!("检测模型推理线程异常退出");
      return Err(InferenceError::WorkerPanicked {
        stage: Stage::Detector,
      });
    }
  };

  let (score, regressor_failed) = match regression {
    Ok(Ok(score)) => (score, false),
    Ok(Err(e)) => {
      let source: BoxError = e.into();
      error!("回归模型推理失败: {}，使用哨兵分数 {}", source, SENTINEL_SCORE);
      (SENTINEL_SCORE, true)
    }
    Err(_) => {
      error!("回归模型推理线程异常退出，使用哨兵分数 {}", SENTINEL_SCORE);
      (SENTINEL_SCORE, true)
    }
  };

  let dims = image.dimensions();
  let candidates = if config.strict_buffer {
    decode_strict(&buffer, dims, config.confidence_threshold)?
  } else {
    decode(&buffer, dims, config.confidence_threshold)
  };
  let boxes = suppress(&candidates, config.iou_threshold);

  let severity = if regressor_failed && config.flag_regressor_failure {
    SeverityLevel::Error
  } else {
    classify(score)
  };

  info!(
    "检测到 {} 个目标，严重程度分数 {:.2} ({})",
    boxes.len(),
    score,
    severity
  );

  Ok(Assessment {
    detections: boxes.into(),
    score,
    severity,
    regressor_failed,
  })
}

/// 取消标记，在请求被放弃时通知推理线程丢弃结果
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }
}

type Delivery<F> = (F, Result<Assessment, InferenceError>);

/// 在后台线程中运行的一次推理请求
///
/// 取消标记只在推理开始前与结束后检查，已开始的模型调用会运行到结束，
/// 其结果随后被丢弃。
pub struct InferenceTask;

impl InferenceTask {
  pub fn spawn<F, D, R>(
    image: F,
    detector: Arc<D>,
    regressor: Arc<R>,
    config: InferenceConfig,
    token: CancelToken,
  ) -> InferenceHandle<F>
  where
    F: WithDimensions + Send + Sync + 'static,
    D: Model<Input = F, Output = Vec<f32>> + Send + Sync + 'static,
    D::Error: Into<BoxError> + Send,
    R: Model<Input = F, Output = f32> + Send + Sync + 'static,
    R::Error: Into<BoxError> + Send,
  {
    let (tx, rx) = mpsc::channel::<Delivery<F>>();
    let worker_token = token.clone();

    let worker = thread::spawn(move || {
      if worker_token.is_cancelled() {
        warn!("请求已取消，跳过推理");
        return;
      }

      let result = run_inference(&image, &*detector, &*regressor, &config);
      if worker_token.is_cancelled() {
        warn!("请求已取消，丢弃推理结果");
        return;
      }
      if tx.send((image, result)).is_err() {
        warn!("结果接收端已关闭，丢弃推理结果");
      }
    });

    InferenceHandle { rx, token, worker }
  }
}

pub struct InferenceHandle<F> {
  rx: mpsc::Receiver<Delivery<F>>,
  token: CancelToken,
  worker: thread::JoinHandle<()>,
}

impl<F> InferenceHandle<F> {
  pub fn cancel(&self) {
    self.token.cancel();
  }

  /// 等待推理结果，并在当前线程上交给渲染与展示
  ///
  /// 请求已取消时不会调用渲染与展示。
  pub fn deliver<O, P>(self, renderer: &O, presenter: &P) -> Result<Assessment, InferenceError>
  where
    O: Render<F, DetectResult>,
    O::Error: Into<BoxError>,
    P: Present,
    P::Error: Into<BoxError>,
  {
    let received = self.rx.recv();
    if self.worker.join().is_err() {
      error!("推理线程异常退出");
    }

    let (image, result) = match received {
      Ok(delivery) => delivery,
      Err(_) if self.token.is_cancelled() => return Err(InferenceError::Cancelled),
      Err(_) => return Err(InferenceError::Disconnected),
    };

    if self.token.is_cancelled() {
      warn!("请求已取消，跳过渲染");
      return Err(InferenceError::Cancelled);
    }

    let assessment = result?;
    renderer
      .render_result(&image, &assessment.detections)
      .map_err(|e| InferenceError::Render(e.into()))?;
    presenter
      .present(&assessment)
      .map_err(|e| InferenceError::Present(e.into()))?;

    Ok(assessment)
  }
}

pub trait Task<I, D, R, O, P>: Sized {
  type Error;
  fn run_task(
    self,
    input: I,
    detector: D,
    regressor: R,
    renderer: O,
    presenter: P,
  ) -> Result<(), Self::Error>;
}

#[derive(Debug, Default)]
pub struct OneShotTask {
  config: InferenceConfig,
}

impl OneShotTask {
  pub fn with_config(mut self, config: InferenceConfig) -> Self {
    self.config = config;
    self
  }
}

impl<F, IE, I, D, R, O, P> Task<I, D, R, O, P> for OneShotTask
where
  F: WithDimensions + Send + Sync + 'static,
  IE: std::error::Error + Send + Sync + 'static,
  I: Iterator<Item = Result<F, IE>>,
  D: Model<Input = F, Output = Vec<f32>> + Send + Sync + 'static,
  D::Error: Into<BoxError> + Send,
  R: Model<Input = F, Output = f32> + Send + Sync + 'static,
  R::Error: Into<BoxError> + Send,
  O: Render<F, DetectResult>,
  O::Error: Into<BoxError>,
  P: Present,
  P::Error: Into<BoxError>,
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    mut input: I,
    detector: D,
    regressor: R,
    renderer: O,
    presenter: P,
  ) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入图像"))??;
    info!("输入图像获取成功，开始推理...");

    let now = Instant::now();
    let handle = InferenceTask::spawn(
      frame,
      Arc::new(detector),
      Arc::new(regressor),
      self.config,
      CancelToken::new(),
    );
    let assessment = handle.deliver(&renderer, &presenter)?;
    info!(
      "任务完成，耗时: {:.2?}, 检测框 {} 个, 严重程度 {}",
      now.elapsed(),
      assessment.detections.len(),
      assessment.severity
    );

    Ok(())
  }
}

/// 依次处理多张图像，单张图像失败不会中断任务
#[derive(Debug, Default)]
pub struct ContinuousTask {
  config: InferenceConfig,
  frame_number: Option<usize>,
  token: CancelToken,
}

impl ContinuousTask {
  pub fn with_config(mut self, config: InferenceConfig) -> Self {
    self.config = config;
    self
  }

  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
    self.token = token;
    self
  }
}

impl<F, IE, I, D, R, O, P> Task<I, D, R, O, P> for ContinuousTask
where
  F: WithDimensions + Send + Sync + 'static,
  IE: std::error::Error + Send + Sync + 'static,
  I: Iterator<Item = Result<F, IE>>,
  D: Model<Input = F, Output = Vec<f32>> + Send + Sync + 'static,
  D::Error: Into<BoxError> + Send,
  R: Model<Input = F, Output = f32> + Send + Sync + 'static,
  R::Error: Into<BoxError> + Send,
  O: Render<F, DetectResult>,
  O::Error: Into<BoxError>,
  P: Present,
  P::Error: Into<BoxError>,
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    input: I,
    detector: D,
    regressor: R,
    renderer: O,
    presenter: P,
  ) -> Result<(), Self::Error> {
    info!("开始任务...");
    let detector = Arc::new(detector);
    let regressor = Arc::new(regressor);

    let mut frame_index = 0usize;
    let mut failures = 0usize;
    for frame in input {
      if self.token.is_cancelled() {
        warn!("中断信号接收，退出任务循环");
        break;
      }

      frame_index += 1;
      info!("处理第 {} 张图像", frame_index);

      let frame = match frame {
        Ok(frame) => frame,
        Err(e) => {
          error!("读取第 {} 张图像失败: {}", frame_index, e);
          failures += 1;
          continue;
        }
      };

      let handle = InferenceTask::spawn(
        frame,
        detector.clone(),
        regressor.clone(),
        self.config,
        self.token.clone(),
      );
      match handle.deliver(&renderer, &presenter) {
        Ok(assessment) => info!(
          "第 {} 张图像: 检测框 {} 个, 严重程度 {}",
          frame_index,
          assessment.detections.len(),
          assessment.severity
        ),
        Err(InferenceError::Cancelled) => {
          warn!("请求已取消，退出任务循环");
          break;
        }
        Err(e) => {
          error!("第 {} 张图像处理失败: {}", frame_index, e);
          failures += 1;
        }
      }

      if self.frame_number.is_some_and(|n| frame_index >= n) {
        info!("达到指定图像数 {}, 退出任务循环", frame_index);
        break;
      }
    }

    info!("任务完成，共 {} 张图像，失败 {} 张", frame_index, failures);
    Ok(())
  }
}
