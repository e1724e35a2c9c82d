use crate::cascade::geometry::PixelRect;

/// 边界框结构
///
/// 检测器输出的浮点边界框，坐标属于传入 `detect` 的那张图像。
#[derive(Debug, Clone, Default, Copy, PartialEq)]
pub struct BoundingBox {
    /// 左上角x坐标
    pub x1: f32,
    /// 左上角y坐标
    pub y1: f32,
    /// 右下角x坐标
    pub x2: f32,
    /// 右下角y坐标
    pub y2: f32,
}

impl BoundingBox {
    /// 创建一个新的边界框
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// 由中心点和宽高创建边界框
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
        }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// 按比例缩放坐标
    pub fn scale(&self, scale_x: f32, scale_y: f32) -> Self {
        Self {
            x1: self.x1 * scale_x,
            y1: self.y1 * scale_y,
            x2: self.x2 * scale_x,
            y2: self.y2 * scale_y,
        }
    }

    /// 计算两个边界框的交并比
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x_left = self.x1.max(other.x1);
        let y_top = self.y1.max(other.y1);
        let x_right = self.x2.min(other.x2);
        let y_bottom = self.y2.min(other.y2);

        if x_right <= x_left || y_bottom <= y_top {
            return 0.0;
        }
        let inter = (x_right - x_left) * (y_bottom - y_top);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 { 0.0 } else { inter / union }
    }

    /// 转换为整数像素矩形，每个坐标向零截断
    ///
    /// 坐标空间由调用方通过类型参数指定。
    pub fn to_rect<S>(&self) -> PixelRect<S> {
        PixelRect::new(self.x1 as i32, self.y1 as i32, self.x2 as i32, self.y2 as i32)
    }
}

/// 检测结果结构
///
/// 由检测器产生，产生后不再修改。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    /// 目标的边界框
    pub bbox: BoundingBox,
    /// 类别ID
    pub class_id: usize,
    /// 类别名称
    pub class_name: String,
    /// 置信度
    pub confidence: f32,
}

impl Detection {
    /// 创建一个新的检测结果
    pub fn new(
        bbox: BoundingBox,
        class_id: usize,
        class_name: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self { bbox, class_id, class_name: class_name.into(), confidence }
    }
}
