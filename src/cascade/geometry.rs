use std::fmt;
use std::marker::PhantomData;

/// 完整输入图像的像素坐标系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageSpace;

/// 某个裁剪子图自身的像素坐标系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CropSpace;

/// 整数像素矩形 `(x_min, y_min, x_max, y_max)`
///
/// 类型参数 `S` 标记矩形所属的坐标系。不同坐标系之间只能通过
/// [`to_parent`](crate::cascade::mapper::to_parent) 转换。
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PixelRect<S = ImageSpace> {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
    space: PhantomData<S>,
}

impl<S> PixelRect<S> {
    pub const fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self { x_min, y_min, x_max, y_max, space: PhantomData }
    }

    pub fn coords(&self) -> (i32, i32, i32, i32) {
        (self.x_min, self.y_min, self.x_max, self.y_max)
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.x_min, self.y_min)
    }

    /// 宽度，退化矩形可能为负
    pub fn width(&self) -> i64 {
        self.x_max as i64 - self.x_min as i64
    }

    pub fn height(&self) -> i64 {
        self.y_max as i64 - self.y_min as i64
    }

    /// 宽或高不为正
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

impl<S> fmt::Debug for PixelRect<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let space = std::any::type_name::<S>().rsplit("::").next().unwrap_or("?");
        let (x_min, y_min, x_max, y_max) = self.coords();
        write!(f, "PixelRect<{space}>({x_min}, {y_min}, {x_max}, {y_max})")
    }
}
