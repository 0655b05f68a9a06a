mod common;

use common::{RecordingPresenter, RecordingRenderer, TestError, detector, frame, regressor};
use lumian::{
  InferenceConfig, SeverityLevel,
  frame::RgbFrame,
  task::{CancelToken, ContinuousTask, OneShotTask, Task},
};

const ONE_BOX: [f32; 6] = [0.1, 0.1, 0.5, 0.5, 1.0, 0.0];

// 宽度为 13 的图像让检测模型失败
fn flaky_detector(image: &RgbFrame) -> Result<Vec<f32>, TestError> {
  if image.width() == 13 {
    Err(TestError("unsupported frame"))
  } else {
    Ok(ONE_BOX.to_vec())
  }
}

#[test]
fn one_shot_renders_first_image() {
  let renderer = RecordingRenderer::default();
  let presenter = RecordingPresenter::default();

  let input = vec![Ok::<_, TestError>(frame(100, 100)), Ok(frame(50, 50))].into_iter();
  OneShotTask::default()
    .run_task(
      input,
      detector(flaky_detector),
      regressor(|_| Ok(1.2)),
      &renderer,
      &presenter,
    )
    .unwrap();

  let rendered = renderer.rendered();
  assert_eq!(rendered.len(), 1);
  assert_eq!(rendered[0].items[0].x_max(), 50);
  assert_eq!(presenter.presented(), vec![SeverityLevel::Moderate]);
}

#[test]
fn one_shot_without_input_fails() {
  let renderer = RecordingRenderer::default();
  let presenter = RecordingPresenter::default();

  let input = std::iter::empty::<Result<RgbFrame, TestError>>();
  let result = OneShotTask::default().run_task(
    input,
    detector(flaky_detector),
    regressor(|_| Ok(1.2)),
    &renderer,
    &presenter,
  );
  assert!(result.is_err());
  assert!(renderer.rendered().is_empty());
}

#[test]
fn one_shot_propagates_detector_failure() {
  let renderer = RecordingRenderer::default();
  let presenter = RecordingPresenter::default();

  let input = std::iter::once(Ok::<_, TestError>(frame(13, 13)));
  let result = OneShotTask::default().run_task(
    input,
    detector(flaky_detector),
    regressor(|_| Ok(1.2)),
    &renderer,
    &presenter,
  );
  assert!(result.is_err());
  assert!(renderer.rendered().is_empty());
  assert!(presenter.presented().is_empty());
}

#[test]
fn continuous_skips_failed_frames() {
  let renderer = RecordingRenderer::default();
  let presenter = RecordingPresenter::default();

  let input = vec![
    Ok(frame(100, 100)),
    Err(TestError("unreadable")),
    Ok(frame(13, 13)),
    Ok(frame(200, 200)),
  ]
  .into_iter();
  ContinuousTask::default()
    .with_config(InferenceConfig::default())
    .run_task(
      input,
      detector(flaky_detector),
      regressor(|_| Ok(3.5)),
      &renderer,
      &presenter,
    )
    .unwrap();

  let rendered = renderer.rendered();
  assert_eq!(rendered.len(), 2);
  assert_eq!(rendered[1].items[0].x_max(), 100);
  assert_eq!(
    presenter.presented(),
    vec![SeverityLevel::Critical, SeverityLevel::Critical]
  );
}

#[test]
fn continuous_stops_at_frame_number() {
  let renderer = RecordingRenderer::default();
  let presenter = RecordingPresenter::default();

  let input = (0..5).map(|_| Ok::<_, TestError>(frame(20, 20)));
  ContinuousTask::default()
    .with_frame_number(Some(2))
    .run_task(
      input,
      detector(flaky_detector),
      regressor(|_| Ok(0.2)),
      &renderer,
      &presenter,
    )
    .unwrap();

  assert_eq!(renderer.rendered().len(), 2);
}

#[test]
fn continuous_honours_cancellation() {
  let renderer = RecordingRenderer::default();
  let presenter = RecordingPresenter::default();

  let token = CancelToken::new();
  token.cancel();

  let input = (0..3).map(|_| Ok::<_, TestError>(frame(20, 20)));
  ContinuousTask::default()
    .with_cancel_token(token)
    .run_task(
      input,
      detector(flaky_detector),
      regressor(|_| Ok(0.2)),
      &renderer,
      &presenter,
    )
    .unwrap();

  assert!(renderer.rendered().is_empty());
  assert!(presenter.presented().is_empty());
}
