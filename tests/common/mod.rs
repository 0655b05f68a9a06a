#![allow(dead_code)]

use std::{convert::Infallible, sync::Mutex};

use lumian::{
  Assessment, DetectResult, SeverityLevel,
  frame::RgbFrame,
  model::FnModel,
  output::{Present, Render},
};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TestError(pub &'static str);

pub fn frame(width: u32, height: u32) -> RgbFrame {
  RgbFrame::new(width, height, vec![0u8; (width * height * 3) as usize]).unwrap()
}

pub fn detector<F>(f: F) -> FnModel<RgbFrame, F>
where
  F: Fn(&RgbFrame) -> Result<Vec<f32>, TestError>,
{
  FnModel::new(f)
}

pub fn regressor<F>(f: F) -> FnModel<RgbFrame, F>
where
  F: Fn(&RgbFrame) -> Result<f32, TestError>,
{
  FnModel::new(f)
}

#[derive(Default)]
pub struct RecordingRenderer {
  rendered: Mutex<Vec<DetectResult>>,
}

impl RecordingRenderer {
  pub fn rendered(&self) -> Vec<DetectResult> {
    self.rendered.lock().unwrap().clone()
  }
}

impl Render<RgbFrame, DetectResult> for RecordingRenderer {
  type Error = Infallible;

  fn render_result(&self, _frame: &RgbFrame, result: &DetectResult) -> Result<(), Self::Error> {
    self.rendered.lock().unwrap().push(result.clone());
    Ok(())
  }
}

impl Render<RgbFrame, DetectResult> for &RecordingRenderer {
  type Error = Infallible;

  fn render_result(&self, frame: &RgbFrame, result: &DetectResult) -> Result<(), Self::Error> {
    (**self).render_result(frame, result)
  }
}

#[derive(Default)]
pub struct RecordingPresenter {
  presented: Mutex<Vec<SeverityLevel>>,
}

impl RecordingPresenter {
  pub fn presented(&self) -> Vec<SeverityLevel> {
    self.presented.lock().unwrap().clone()
  }
}

impl Present for RecordingPresenter {
  type Error = Infallible;

  fn present(&self, assessment: &Assessment) -> Result<(), Self::Error> {
    self.presented.lock().unwrap().push(assessment.severity);
    Ok(())
  }
}
