use std::path::Path;

use image::DynamicImage;

use crate::error::{CascadeError, Result};

/// 加载图像文件
///
/// # 错误处理
/// 文件不存在或无法解码时返回Err
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CascadeError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("图像文件不存在: {}", path.display()),
        )));
    }
    Ok(image::open(path)?)
}

/// 保存图像，格式由扩展名决定
///
/// JPEG不支持透明通道，写入前先转换为RGB。
pub fn save_image(image: &DynamicImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));

    if is_jpeg {
        DynamicImage::ImageRgb8(image.to_rgb8()).save(path)?;
    } else {
        image.save(path)?;
    }
    Ok(())
}
