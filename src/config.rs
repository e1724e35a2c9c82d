pub const PERSON_CLASS_ID: usize = 0;
pub const PERSON_CLASS_LABEL: &str = "Person";
pub const DEFAULT_PADDING: u32 = 20;

// 目标检测超参数配置
pub const DEFAULT_INPUT_WIDTH: usize = 640;
pub const DEFAULT_INPUT_HEIGHT: usize = 640;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;
pub const DEFAULT_NMS_THRESHOLD: f32 = 0.7;
pub const DEFAULT_INTRA_THREADS: usize = 4;
pub const MODEL_INPUT_NAME: &str = "images";

// 绘制参数
pub const STROKE_WIDTH: f32 = 2.0;
pub const LABEL_SIZE: f32 = 14.0;
pub const LABEL_OFFSET: i32 = 10;

pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// 检测器超参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    /// 模型输入宽度
    pub input_width: usize,
    /// 模型输入高度
    pub input_height: usize,
    /// 置信度阈值，低于此值的检测结果将被过滤
    pub confidence_threshold: f32,
    /// NMS阈值
    pub nms_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            input_width: DEFAULT_INPUT_WIDTH,
            input_height: DEFAULT_INPUT_HEIGHT,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            nms_threshold: DEFAULT_NMS_THRESHOLD,
        }
    }
}

/// 级联流程参数
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeConfig {
    /// 裁剪人物区域时四周额外保留的像素
    pub padding: u32,
    /// 第一级检测器中代表人物的类别ID
    pub person_class_id: usize,
    /// 输出人物结果时使用的标签
    pub person_label: String,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            person_class_id: PERSON_CLASS_ID,
            person_label: PERSON_CLASS_LABEL.to_string(),
        }
    }
}

impl CascadeConfig {
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }
}
