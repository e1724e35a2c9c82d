use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
use ort::session::Session;

use crate::config::DetectorConfig;
use crate::error::Result;
use crate::vision::bounds::Detection;
use crate::vision::infer::run_inference;
use crate::vision::model::{load_model, read_class_names};
use crate::vision::posts::{PostParams, process_detections};
use crate::vision::prevs::{image_to_tensor, resize_image};

/// 目标检测能力
///
/// 给定一张图像，返回该图像坐标系下的检测结果。
/// 级联流程只依赖这个接口，不关心背后是哪个模型。
///
/// 实现可以持有内部状态，因此 `detect` 需要 `&mut self`；
/// 同一个实例不能被并发调用。
pub trait Detector {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>>;
}

impl<D: Detector + ?Sized> Detector for &mut D {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>> {
        (**self).detect(image)
    }
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>> {
        (**self).detect(image)
    }
}

/// YOLO目标检测器
///
/// 封装了完整的检测流程，包括图像预处理、模型推理和结果后处理。
///
/// # 示例
///
/// ```no_run
/// use ppe_cascade::{Detector, YoloDetector, load_image};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut detector = YoloDetector::from_file("models/person.onnx")?
///     .with_confidence_threshold(0.5);
/// let image = load_image("data/site.jpg")?;
/// let detections = detector.detect(&image)?;
/// # Ok(())
/// # }
/// ```
pub struct YoloDetector {
    /// ONNX模型会话
    model: Session,
    /// 类别ID到名称的映射
    class_names: BTreeMap<usize, String>,
    config: DetectorConfig,
}

impl YoloDetector {
    /// 用已加载的模型创建检测器，类别名称取自模型元数据
    pub fn new(model: Session, config: DetectorConfig) -> Self {
        let class_names = read_class_names(&model);
        Self { model, class_names, config }
    }

    /// 从模型文件创建检测器，使用默认超参数
    pub fn from_file(model_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_model(model_path)?, DetectorConfig::default()))
    }

    /// 设置置信度阈值 (0.0 - 1.0)
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.config.confidence_threshold = threshold;
        self
    }

    pub fn class_names(&self) -> &BTreeMap<usize, String> {
        &self.class_names
    }
}

impl Detector for YoloDetector {
    /// 完整的检测流程：从图像到检测结果
    fn detect(&mut self, img: &DynamicImage) -> Result<Vec<Detection>> {
        let DetectorConfig { input_width, input_height, confidence_threshold, nms_threshold } =
            self.config;
        let resized_img = resize_image(img, input_width as u32, input_height as u32);
        let input_tensor = image_to_tensor(&resized_img, input_height, input_width);

        let start_time = Instant::now();
        let output = run_inference(&mut self.model, &input_tensor)?;
        log::debug!("模型推理耗时: {:?}", start_time.elapsed());

        let params = PostParams {
            scale_x: img.width() as f32 / input_width as f32,
            scale_y: img.height() as f32 / input_height as f32,
            confidence_threshold,
            nms_threshold,
        };
        process_detections(&output, &params, &self.class_names)
    }
}
