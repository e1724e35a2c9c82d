use image::DynamicImage;

use crate::cascade::geometry::{CropSpace, ImageSpace, PixelRect};
use crate::cascade::mapper::to_parent;

/// 从父图像中裁出的区域
///
/// `effective` 是实际裁剪的矩形（已加边距并裁到图像范围内），
/// 之后的坐标还原必须以它为参照，而不是原始的检测框。
#[derive(Debug, Clone)]
pub struct Region {
    pub image: DynamicImage,
    pub effective: PixelRect<ImageSpace>,
}

impl Region {
    /// 子图自身的尺寸
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// 把子图坐标系下的矩形还原到父图像坐标系
    pub fn to_parent(&self, crop_box: &PixelRect<CropSpace>) -> PixelRect<ImageSpace> {
        to_parent(crop_box, &self.effective, self.dimensions())
    }
}

/// 计算加边距并裁剪到图像范围后的矩形
///
/// 结果宽或高不为正时返回 `None`。返回的矩形满足
/// `0 <= x_min < x_max <= width`，y方向同理。
pub fn padded_bounds(
    bbox: &PixelRect<ImageSpace>,
    padding: u32,
    (width, height): (u32, u32),
) -> Option<PixelRect<ImageSpace>> {
    let padding = padding as i64;
    let x_min = (bbox.x_min as i64 - padding).max(0);
    let y_min = (bbox.y_min as i64 - padding).max(0);
    let x_max = (bbox.x_max as i64 + padding).min(width as i64);
    let y_max = (bbox.y_max as i64 + padding).min(height as i64);

    if x_max <= x_min || y_max <= y_min {
        return None;
    }
    // 四个值都已落在 [0, width] / [0, height] 内，不会溢出i32
    Some(PixelRect::new(x_min as i32, y_min as i32, x_max as i32, y_max as i32))
}

/// 裁剪带边距的区域
///
/// # 参数
/// * `image` - 父图像
/// * `bbox` - 父图像坐标系下的矩形
/// * `padding` - 四周额外保留的像素
///
/// # 返回值
/// 裁剪区域为空（例如矩形完全在图像外）时返回 `None`，调用方应跳过该区域的检测
pub fn extract(image: &DynamicImage, bbox: &PixelRect<ImageSpace>, padding: u32) -> Option<Region> {
    let effective = padded_bounds(bbox, padding, (image.width(), image.height()))?;
    let sub = image.crop_imm(
        effective.x_min as u32,
        effective.y_min as u32,
        effective.width() as u32,
        effective.height() as u32,
    );
    Some(Region { image: sub, effective })
}
