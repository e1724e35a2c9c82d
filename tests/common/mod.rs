#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use image::DynamicImage;
use ppe_cascade::{BoundingBox, CascadeError, Detection, Detector, Result};

/// 测试用检测器：按调用顺序返回预设结果，并记录收到的图像尺寸
#[derive(Default)]
pub struct ScriptedDetector {
    replies: Vec<Vec<Detection>>,
    repeat_last: bool,
    pub calls: Rc<RefCell<Vec<(u32, u32)>>>,
}

impl ScriptedDetector {
    pub fn new(replies: Vec<Vec<Detection>>) -> Self {
        Self { replies, ..Self::default() }
    }

    /// 每次调用都返回同一组结果
    pub fn always(reply: Vec<Detection>) -> Self {
        Self { replies: vec![reply], repeat_last: true, ..Self::default() }
    }

    pub fn calls(&self) -> Rc<RefCell<Vec<(u32, u32)>>> {
        Rc::clone(&self.calls)
    }
}

impl Detector for ScriptedDetector {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let mut calls = self.calls.borrow_mut();
        calls.push((image.width(), image.height()));
        let index = if self.repeat_last { 0 } else { calls.len() - 1 };
        Ok(self.replies.get(index).cloned().unwrap_or_default())
    }
}

/// 对指定尺寸的图像返回错误，模拟模型输入不合法
pub struct RejectSize(pub u32, pub u32, pub ScriptedDetector);

impl Detector for RejectSize {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>> {
        if (image.width(), image.height()) == (self.0, self.1) {
            return Err(CascadeError::OutputShape(vec![1, 0, 0]));
        }
        self.2.detect(image)
    }
}

pub fn det(
    coords: (f32, f32, f32, f32),
    class_id: usize,
    name: &str,
    confidence: f32,
) -> Detection {
    let (x1, y1, x2, y2) = coords;
    Detection::new(BoundingBox::new(x1, y1, x2, y2), class_id, name, confidence)
}
