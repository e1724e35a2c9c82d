use ndarray::{Array, Array4};
use image::{DynamicImage, GenericImageView, imageops::FilterType};

/// 调整图像大小以适应模型输入
///
/// 使用CatmullRom插值算法将图像调整为指定尺寸。
///
/// # 参数
/// * `img` - 原始图像
/// * `width` - 目标宽度
/// * `height` - 目标高度
///
/// # 返回值
/// 返回调整大小后的图像
pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    img.resize_exact(width, height, FilterType::CatmullRom)
}

/// 将图像转换为模型输入张量
///
/// 将图像转换为模型所需的四维张量格式，包括：
/// 1. 归一化像素值到[0, 1]范围
/// 2. 调整通道顺序为RGB
/// 3. 调整维度顺序为NCHW格式
///
/// 图像尺寸必须已经等于 `input_width` x `input_height`，超出部分会被忽略。
///
/// # 返回值
/// 返回形状为(1, 3, height, width)的四维张量
pub fn image_to_tensor(img: &DynamicImage, input_height: usize, input_width: usize) -> Array4<f32> {
    let mut tensor = Array::zeros((1, 3, input_height, input_width));

    for (x, y, pixel) in img.pixels() {
        let (x, y) = (x as usize, y as usize);
        if x >= input_width || y >= input_height {
            continue;
        }
        let [r, g, b, _] = pixel.0;

        tensor[[0, 0, y, x]] = (r as f32) / 255.0;  // R通道
        tensor[[0, 1, y, x]] = (g as f32) / 255.0;  // G通道
        tensor[[0, 2, y, x]] = (b as f32) / 255.0;  // B通道
    }

    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn tensor_is_nchw_and_normalized() {
        let mut img = RgbImage::new(4, 2);
        img.put_pixel(3, 1, Rgb([255, 0, 51]));
        let tensor = image_to_tensor(&DynamicImage::ImageRgb8(img), 2, 4);

        assert_eq!(tensor.shape(), &[1, 3, 2, 4]);
        assert_eq!(tensor[[0, 0, 1, 3]], 1.0);
        assert_eq!(tensor[[0, 1, 1, 3]], 0.0);
        assert!((tensor[[0, 2, 1, 3]] - 0.2).abs() < 1e-6);
        assert_eq!(tensor[[0, 0, 0, 0]], 0.0);
    }

    #[test]
    fn resize_hits_exact_size() {
        let img = DynamicImage::new_rgb8(1920, 1080);
        let resized = resize_image(&img, 64, 64);
        assert_eq!(resized.dimensions(), (64, 64));
    }
}
