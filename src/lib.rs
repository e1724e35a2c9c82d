pub mod annotate;
pub mod batch;
pub mod cascade;
pub mod config;
pub mod error;
pub mod vision;
pub mod voc;

// 重新导出常用类型和函数
pub use annotate::{Annotator, Canvas, PERSON_COLOR, PPE_COLOR};
pub use batch::{Batch, BatchSummary, Frame, list_images, process_image, run_batch};
pub use cascade::{
    Cascade, CascadeOutput, Finding, PixelRect, Region, extract, run_cascade, to_parent,
};
pub use config::{CascadeConfig, DetectorConfig};
pub use error::{CascadeError, Result};
pub use vision::{
    BoundingBox, Detection, Detector, YoloDetector, load_image, load_model, save_image,
};
