use ndarray::Array4;
use ort::{inputs, session::Session, value::Tensor};

use crate::config::MODEL_INPUT_NAME;
use crate::error::{CascadeError, Result};

/// 模型原始输出
///
/// 第一个输出张量的形状与扁平化数据。
#[derive(Debug, Clone)]
pub struct RawOutput {
    pub shape: Vec<i64>,
    pub data: Vec<f32>,
}

/// 运行模型推理
///
/// # 参数
/// * `model` - ONNX模型Session
/// * `input` - 输入张量，形状应为(1, 3, height, width)
///
/// # 返回值
/// 返回第一个输出张量，形状为三维且批大小为1
///
/// # 错误处理
/// 推理失败或输出形状不是 `[1, a, b]` 时返回Err
pub fn run_inference(model: &mut Session, input: &Array4<f32>) -> Result<RawOutput> {
    let shape: Vec<usize> = input.shape().to_vec();
    let (data, _offset) = input.clone().into_raw_vec_and_offset();
    let input_tensor = Tensor::from_array((
        [shape[0], shape[1], shape[2], shape[3]],
        data
    ))?;
    let outputs = model.run(inputs![MODEL_INPUT_NAME => input_tensor])?;

    let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
    let shape: Vec<i64> = shape.iter().copied().collect();

    if shape.len() != 3 || shape[0] != 1 {
        return Err(CascadeError::OutputShape(shape));
    }

    Ok(RawOutput { shape, data: data.to_vec() })
}
