//! Vision模块 - 基于YOLO的目标检测适配层
//!
//! 该模块把ONNX模型封装成统一的 [`Detector`] 接口，包括：
//! - 模型加载与类别名称读取
//! - 图像预处理
//! - 模型推理
//! - 结果后处理（坐标还原、置信度过滤、NMS）
//!
//! # 工作流程
//!
//! 1. 使用 `YoloDetector::from_file` 加载ONNX模型
//! 2. 使用 `load_image` 加载待检测图像
//! 3. 调用 `detect` 得到该图像坐标系下的检测结果

pub mod bounds;
pub mod detect;
pub mod infer;
pub mod io;
pub mod model;
pub mod posts;
pub mod prevs;

pub use bounds::{BoundingBox, Detection};
pub use detect::{Detector, YoloDetector};
pub use io::{load_image, save_image};
pub use model::load_model;
