//! 结果可视化
//!
//! 用raqote把检测框和 `"{label} {confidence:.2}"` 标签画到图像上。

use std::path::Path;

use font_kit::family_name::FamilyName;
use font_kit::font::Font;
use font_kit::handle::Handle;
use font_kit::properties::Properties;
use font_kit::source::SystemSource;
use image::{DynamicImage, GenericImageView, RgbaImage};
use raqote::{
    DrawOptions, DrawTarget, LineJoin, PathBuilder, Point, SolidSource, Source, StrokeStyle,
};

use crate::cascade::{Finding, ImageSpace, PixelRect};
use crate::config::{LABEL_OFFSET, LABEL_SIZE, STROKE_WIDTH};
use crate::error::{CascadeError, Result};

/// 人物框颜色（绿色）
pub const PERSON_COLOR: SolidSource = SolidSource { r: 0x00, g: 0xFF, b: 0x00, a: 0xFF };
/// 装备框颜色（红色）
pub const PPE_COLOR: SolidSource = SolidSource { r: 0xFF, g: 0x00, b: 0x00, a: 0xFF };

/// 标注器，持有绘制标签所需的字体
///
/// 没有可用字体时只画框不写字。
pub struct Annotator {
    font: Option<Font>,
}

impl Annotator {
    /// 使用系统默认无衬线字体
    pub fn new() -> Self {
        let font = SystemSource::new()
            .select_best_match(&[FamilyName::SansSerif], &Properties::new())
            .map_err(|e| e.to_string())
            .and_then(|handle| handle.load().map_err(|e| e.to_string()));

        match font {
            Ok(font) => Self { font: Some(font) },
            Err(e) => {
                log::warn!("找不到系统字体，将只绘制检测框: {}", e);
                Self { font: None }
            }
        }
    }

    /// 从字体文件加载
    pub fn with_font_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let font = Handle::from_path(path.to_path_buf(), 0)
            .load()
            .map_err(|e| CascadeError::Font(format!("{}: {}", path.display(), e)))?;
        Ok(Self { font: Some(font) })
    }

    /// 不绘制文字标签
    pub fn without_labels() -> Self {
        Self { font: None }
    }

    pub fn has_labels(&self) -> bool {
        self.font.is_some()
    }

    /// 以图像内容创建画布，原图不会被修改
    pub fn canvas(&self, image: &DynamicImage) -> Canvas<'_> {
        Canvas::new(image, self.font.as_ref())
    }

    /// 在图像副本上绘制一组结果
    pub fn annotate(
        &self,
        image: &DynamicImage,
        findings: &[Finding],
        color: SolidSource,
    ) -> DynamicImage {
        let mut canvas = self.canvas(image);
        canvas.draw(findings, color);
        canvas.into_image()
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

/// 绘制画布
///
/// 可以叠加多组不同颜色的结果，最后一次性转换回图像。
pub struct Canvas<'a> {
    dt: DrawTarget,
    font: Option<&'a Font>,
    /// 原图是否带alpha通道
    has_alpha: bool,
}

impl<'a> Canvas<'a> {
    fn new(image: &DynamicImage, font: Option<&'a Font>) -> Self {
        let (img_width, img_height) = image.dimensions();
        let mut dt = DrawTarget::new(img_width as i32, img_height as i32);

        // raqote使用预乘alpha的ARGB
        let rgba_image = image.to_rgba8();
        let image_data: Vec<u32> = rgba_image.pixels().map(|pixel| {
            let [r, g, b, a] = pixel.0;
            let premultiply = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
            u32::from_le_bytes([premultiply(b), premultiply(g), premultiply(r), a])
        }).collect();

        let img = raqote::Image {
            width: img_width as i32,
            height: img_height as i32,
            data: &image_data,
        };
        dt.draw_image_at(0.0, 0.0, &img, &DrawOptions::new());

        Self { dt, font, has_alpha: image.color().has_alpha() }
    }

    /// 绘制一组结果：矩形外框加标签
    pub fn draw(&mut self, findings: &[Finding], color: SolidSource) {
        let source = Source::Solid(color);
        let image_height = self.dt.height();

        for finding in findings {
            let rect = &finding.rect;
            let mut pb = PathBuilder::new();
            pb.rect(
                rect.x_min as f32,
                rect.y_min as f32,
                rect.width() as f32,
                rect.height() as f32,
            );
            let path = pb.finish();

            self.dt.stroke(
                &path,
                &source,
                &StrokeStyle {
                    join: LineJoin::Round,
                    width: STROKE_WIDTH,
                    ..StrokeStyle::default()
                },
                &DrawOptions::default(),
            );

            if let Some(font) = self.font {
                let (x, y) = label_origin(rect, image_height);
                self.dt.draw_text(
                    font,
                    LABEL_SIZE,
                    &finding.caption(),
                    Point::new(x as f32, y as f32),
                    &source,
                    &DrawOptions::new(),
                );
            }
        }
    }

    /// 转换回图像
    ///
    /// 原图没有alpha通道时输出RGB，其余情况输出RGBA。
    pub fn into_image(self) -> DynamicImage {
        let (width, height) = (self.dt.width() as u32, self.dt.height() as u32);
        let pixels: Vec<u8> = self
            .dt
            .get_data()
            .iter()
            .flat_map(|&pixel| {
                let [b, g, r, a] = pixel.to_le_bytes();
                let unpremultiply = |c: u8| {
                    if a == 0 {
                        0
                    } else {
                        ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8
                    }
                };
                [unpremultiply(r), unpremultiply(g), unpremultiply(b), a]
            })
            .collect();

        let rgba = match RgbaImage::from_raw(width, height, pixels) {
            Some(buffer) => DynamicImage::ImageRgba8(buffer),
            None => DynamicImage::new_rgba8(width, height),
        };
        if self.has_alpha {
            rgba
        } else {
            DynamicImage::ImageRgb8(rgba.to_rgb8())
        }
    }
}

/// 标签基线位置
///
/// 默认在框左上角上方 `LABEL_OFFSET` 像素；如果这样文字会超出图像顶部，
/// 则改为框内 `(x_min, y_min + LABEL_SIZE)`。
pub fn label_origin(rect: &PixelRect<ImageSpace>, image_height: i32) -> (i32, i32) {
    let x = rect.x_min.max(0);
    let above = rect.y_min - LABEL_OFFSET;
    if above >= LABEL_SIZE as i32 && above <= image_height {
        (x, above)
    } else {
        (x, rect.y_min.max(0) + LABEL_SIZE as i32)
    }
}
