// 该文件是 Mingmu （明目） 项目的一部分。
// src/model/faster_rcnn.rs - Faster R-CNN (ONNX) 模型
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
  marker::PhantomData,
  path::{Path, PathBuf},
  sync::Mutex,
};

use ort::{
  session::{Session, builder::GraphOptimizationLevel},
  value::Tensor,
};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
  frame::{Normalization, ToNchwTensor},
  model::{DetectResult, Model, PostprocessError, WithLabel},
};

// torchvision 导出的输出顺序：boxes [N, 4]、labels [N]、scores [N]
const FASTER_RCNN_NUM_INPUTS: usize = 1;
const FASTER_RCNN_MIN_OUTPUTS: usize = 3;
const BOXES_OUTPUT: usize = 0;
const LABELS_OUTPUT: usize = 1;
const SCORES_OUTPUT: usize = 2;
const DEFAULT_INTRA_THREADS: usize = 4;

#[derive(Error, Debug)]
pub enum FasterRcnnError {
  #[error("模型文件不存在: {0}")]
  ModelNotFound(PathBuf),
  #[error("模型无效: {0}")]
  ModelInvalid(String),
  #[error("ONNX Runtime 错误: {0}")]
  OrtError(String),
  #[error("推理会话不可用")]
  SessionPoisoned,
  #[error("后处理错误: {0}")]
  PostprocessError(#[from] PostprocessError),
}

impl FasterRcnnError {
  fn ort(err: impl std::fmt::Display) -> Self {
    FasterRcnnError::OrtError(err.to_string())
  }
}

pub struct FasterRcnn<Frame, T> {
  session: Mutex<Session>,
  normalization: Normalization,
  _phantom: PhantomData<fn(&Frame) -> T>,
}

pub struct FasterRcnnBuilder {
  model_path: PathBuf,
  intra_threads: usize,
  normalization: Normalization,
}

impl FasterRcnnBuilder {
  pub fn new(model_path: impl AsRef<Path>) -> Self {
    FasterRcnnBuilder {
      model_path: model_path.as_ref().to_path_buf(),
      intra_threads: DEFAULT_INTRA_THREADS,
      normalization: Normalization::default(),
    }
  }

  pub fn intra_threads(mut self, intra_threads: usize) -> Self {
    self.intra_threads = intra_threads.max(1);
    self
  }

  pub fn normalization(mut self, normalization: Normalization) -> Self {
    self.normalization = normalization;
    self
  }

  pub fn build<Frame, T>(self) -> Result<FasterRcnn<Frame, T>, FasterRcnnError> {
    info!("加载模型文件: {}", self.model_path.display());
    if !self.model_path.is_file() {
      error!("模型文件不存在: {}", self.model_path.display());
      return Err(FasterRcnnError::ModelNotFound(self.model_path));
    }

    info!("创建 ONNX Runtime 推理会话");
    let session = Session::builder()
      .map_err(FasterRcnnError::ort)?
      .with_optimization_level(GraphOptimizationLevel::Level3)
      .map_err(FasterRcnnError::ort)?
      .with_intra_threads(self.intra_threads)
      .map_err(FasterRcnnError::ort)?
      .commit_from_file(&self.model_path)
      .map_err(FasterRcnnError::ort)?;

    let num_inputs = session.inputs.len();
    let num_outputs = session.outputs.len();
    debug!("模型输入数量: {}", num_inputs);
    debug!("模型输出数量: {}", num_outputs);

    if num_inputs != FASTER_RCNN_NUM_INPUTS {
      error!(
        "预期模型输入数量为 {}, 实际为 {}",
        FASTER_RCNN_NUM_INPUTS, num_inputs
      );
      return Err(FasterRcnnError::ModelInvalid(format!(
        "预期模型输入数量为 {}, 实际为 {}",
        FASTER_RCNN_NUM_INPUTS, num_inputs
      )));
    }

    if num_outputs < FASTER_RCNN_MIN_OUTPUTS {
      error!(
        "预期模型输出数量至少为 {}, 实际为 {}",
        FASTER_RCNN_MIN_OUTPUTS, num_outputs
      );
      return Err(FasterRcnnError::ModelInvalid(format!(
        "预期模型输出数量至少为 {}, 实际为 {}",
        FASTER_RCNN_MIN_OUTPUTS, num_outputs
      )));
    }

    info!("模型加载完成");

    Ok(FasterRcnn {
      session: Mutex::new(session),
      normalization: self.normalization,
      _phantom: PhantomData,
    })
  }
}

impl<Frame: ToNchwTensor, T: WithLabel> Model for FasterRcnn<Frame, T> {
  type Input = Frame;
  type Output = DetectResult<T>;
  type Error = FasterRcnnError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let tensor = input.to_nchw(&self.normalization);
    debug!("设置模型输入: {:?}", tensor.shape());

    let (shape, data) = tensor.into_parts();
    let shape: Vec<i64> = shape.iter().map(|&d| d as i64).collect();
    let input_tensor = Tensor::from_array((shape, data)).map_err(FasterRcnnError::ort)?;

    let mut session = self
      .session
      .lock()
      .map_err(|_| FasterRcnnError::SessionPoisoned)?;

    debug!("执行模型推理");
    let outputs = session
      .run(ort::inputs![input_tensor])
      .map_err(FasterRcnnError::ort)?;

    debug!("获取模型输出");
    let (_, boxes) = outputs[BOXES_OUTPUT]
      .try_extract_tensor::<f32>()
      .map_err(FasterRcnnError::ort)?;
    let (_, labels) = outputs[LABELS_OUTPUT]
      .try_extract_tensor::<i64>()
      .map_err(FasterRcnnError::ort)?;
    let (_, scores) = outputs[SCORES_OUTPUT]
      .try_extract_tensor::<f32>()
      .map_err(FasterRcnnError::ort)?;

    let result = DetectResult::from_parallel(boxes, labels, scores)?;
    debug!("模型输出 {} 个候选框", result.len());

    Ok(result)
  }
}
