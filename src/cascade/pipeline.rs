use std::time::Instant;

use image::DynamicImage;

use crate::cascade::geometry::{CropSpace, ImageSpace, PixelRect};
use crate::cascade::region::extract;
use crate::config::CascadeConfig;
use crate::error::Result;
use crate::vision::{Detection, Detector};

/// 完整图像坐标系下的一条结果，直接交给标注器绘制
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub rect: PixelRect<ImageSpace>,
    pub label: String,
    pub confidence: f32,
}

impl Finding {
    pub fn new(rect: PixelRect<ImageSpace>, label: impl Into<String>, confidence: f32) -> Self {
        Self { rect, label: label.into(), confidence }
    }

    /// 标签文本，置信度保留两位小数
    pub fn caption(&self) -> String {
        format!("{} {:.2}", self.label, self.confidence)
    }
}

/// 一张图像的级联检测结果，按检测器输出顺序排列
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeOutput {
    pub persons: Vec<Finding>,
    pub ppe: Vec<Finding>,
}

/// 两级级联检测
///
/// 1. 在整张图上检测人物，只保留人物类别
/// 2. 对每个人物裁出带边距的区域，区域为空则跳过（人物本身仍保留）
/// 3. 在区域内检测防护装备
/// 4. 把装备框从区域坐标系还原到整图坐标系，类别名和置信度不变
///
/// 任何一次检测失败都会中止这张图像的处理。
pub fn run_cascade<P, Q>(
    image: &DynamicImage,
    person_detector: &mut P,
    ppe_detector: &mut Q,
    config: &CascadeConfig,
) -> Result<CascadeOutput>
where
    P: Detector + ?Sized,
    Q: Detector + ?Sized,
{
    let start_time = Instant::now();
    let mut output = CascadeOutput::default();

    let persons: Vec<Detection> = person_detector
        .detect(image)?
        .into_iter()
        .filter(|det| det.class_id == config.person_class_id)
        .collect();

    for person in &persons {
        let person_rect = person.bbox.to_rect::<ImageSpace>();
        let label = config.person_label.as_str();
        output.persons.push(Finding::new(person_rect, label, person.confidence));

        let Some(region) = extract(image, &person_rect, config.padding) else {
            log::warn!("人物区域 {:?} 裁剪后为空，跳过装备检测", person_rect);
            continue;
        };

        for ppe in ppe_detector.detect(&region.image)? {
            let crop_rect = ppe.bbox.to_rect::<CropSpace>();
            let rect = region.to_parent(&crop_rect);
            output.ppe.push(Finding::new(rect, ppe.class_name, ppe.confidence));
        }
    }

    log::debug!(
        "级联检测完成: {} 个人物, {} 个装备, 耗时 {:?}",
        output.persons.len(),
        output.ppe.len(),
        start_time.elapsed()
    );
    Ok(output)
}

/// 持有两个检测器的级联流程
///
/// 检测器在启动时构造一次后传入，处理每张图像时复用。
pub struct Cascade<P, Q> {
    person_detector: P,
    ppe_detector: Q,
    config: CascadeConfig,
}

impl<P: Detector, Q: Detector> Cascade<P, Q> {
    pub fn new(person_detector: P, ppe_detector: Q) -> Self {
        Self { person_detector, ppe_detector, config: CascadeConfig::default() }
    }

    pub fn with_config(mut self, config: CascadeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    pub fn run(&mut self, image: &DynamicImage) -> Result<CascadeOutput> {
        run_cascade(image, &mut self.person_detector, &mut self.ppe_detector, &self.config)
    }

    pub fn into_detectors(self) -> (P, Q) {
        (self.person_detector, self.ppe_detector)
    }
}
