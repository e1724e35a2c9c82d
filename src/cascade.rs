//! Cascade模块 - 两级级联检测
//!
//! 先在整张图上找人，再在每个人的区域里找防护装备，最后把装备框
//! 还原到整张图的坐标系。
//!
//! # 主要组件
//!
//! - [`extract`]：按边距裁剪区域并裁到图像边界
//! - [`to_parent`]：子图坐标到父图坐标的换算
//! - [`run_cascade`] / [`Cascade`]：串联两个检测器

pub mod geometry;
pub mod mapper;
pub mod pipeline;
pub mod region;

pub use geometry::{CropSpace, ImageSpace, PixelRect};
pub use mapper::to_parent;
pub use pipeline::{Cascade, CascadeOutput, Finding, run_cascade};
pub use region::{Region, extract};
