use crate::cascade::geometry::{CropSpace, ImageSpace, PixelRect};

/// 把子图坐标系下的矩形还原到父图像坐标系
///
/// # 参数
/// * `crop_box` - 子图坐标系下的矩形（第二级检测器的输出）
/// * `effective` - 子图在父图像中实际对应的矩形，即裁剪时加边距并裁到边界后的矩形
/// * `crop_dimensions` - 子图自身的宽高
///
/// 横纵两个方向分别计算缩放系数 `effective跨度 / 子图尺寸`，
/// 结果为 `effective原点 + crop_box * 缩放系数`，每个坐标独立向零截断。
///
/// 子图宽或高为0时映射没有意义，所有坐标都落在 `effective` 的原点上。
pub fn to_parent(
    crop_box: &PixelRect<CropSpace>,
    effective: &PixelRect<ImageSpace>,
    crop_dimensions: (u32, u32),
) -> PixelRect<ImageSpace> {
    let (crop_width, crop_height) = crop_dimensions;
    let (origin_x, origin_y) = effective.origin();
    if crop_width == 0 || crop_height == 0 {
        return PixelRect::new(origin_x, origin_y, origin_x, origin_y);
    }

    // 缩放系数为 跨度/尺寸；先乘后除，整块子图还原时不会因舍入少一个像素
    let map = |origin: i32, value: i32, span: i64, size: u32| {
        origin.saturating_add((value as f64 * span as f64 / size as f64) as i32)
    };

    PixelRect::new(
        map(origin_x, crop_box.x_min, effective.width(), crop_width),
        map(origin_y, crop_box.y_min, effective.height(), crop_height),
        map(origin_x, crop_box.x_max, effective.width(), crop_width),
        map(origin_y, crop_box.y_max, effective.height(), crop_height),
    )
}
