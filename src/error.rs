//! 错误类型

use std::path::PathBuf;

use thiserror::Error;

/// 检测、级联与标注转换过程中可能出现的错误
#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("模型运行错误: {0}")]
    Model(#[from] ort::Error),

    #[error("模型输出形状不符合预期: {0:?}")]
    OutputShape(Vec<i64>),

    #[error("图像处理错误: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("目录不存在: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("XML解析错误: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("字体加载失败: {0}")]
    Font(String),

    #[error("标注文件格式错误: {0}")]
    Annotation(String),
}

pub type Result<T> = std::result::Result<T, CascadeError>;
