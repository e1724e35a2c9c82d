//! 边界框后处理模块
//!
//! 负责解析模型输出，进行坐标转换、置信度过滤和非极大值抑制(NMS)。

use std::collections::BTreeMap;

use crate::error::{CascadeError, Result};
use crate::vision::bounds::{BoundingBox, Detection};
use crate::vision::infer::RawOutput;

/// 后处理参数
///
/// `scale_x`/`scale_y` 把模型输入尺寸下的坐标换算回原始图像。
#[derive(Debug, Clone, Copy)]
pub struct PostParams {
    pub scale_x: f32,
    pub scale_y: f32,
    pub confidence_threshold: f32,
    pub nms_threshold: f32,
}

/// 处理模型输出，应用置信度和NMS阈值
///
/// 支持两种输出布局：
/// - `[1, N, 6]`：已完成NMS的逐框结果 `x1, y1, x2, y2, score, class`
/// - `[1, 4 + C, A]`：原始检测头，每个锚点 `cx, cy, w, h` 加 C 个类别分数
///
/// # 返回值
/// 按置信度降序排列、经过NMS的检测结果
pub fn process_detections(
    output: &RawOutput,
    params: &PostParams,
    class_names: &BTreeMap<usize, String>,
) -> Result<Vec<Detection>> {
    let (rows, cols) = match output.shape.as_slice() {
        &[1, rows, cols] if rows >= 0 && cols >= 0 => (rows as usize, cols as usize),
        _ => return Err(CascadeError::OutputShape(output.shape.clone())),
    };
    if output.data.len() < rows * cols {
        return Err(CascadeError::OutputShape(output.shape.clone()));
    }

    let mut detections = if cols == 6 {
        decode_rows(&output.data, rows, params, class_names)
    } else if rows >= 5 {
        decode_heads(&output.data, rows, cols, params, class_names)
    } else {
        return Err(CascadeError::OutputShape(output.shape.clone()));
    };

    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    Ok(apply_nms(detections, params.nms_threshold))
}

fn class_name(class_names: &BTreeMap<usize, String>, class_id: usize) -> String {
    class_names
        .get(&class_id)
        .cloned()
        .unwrap_or_else(|| format!("class_{class_id}"))
}

fn decode_rows(
    data: &[f32],
    num_boxes: usize,
    params: &PostParams,
    class_names: &BTreeMap<usize, String>,
) -> Vec<Detection> {
    let mut detections = Vec::with_capacity(num_boxes);

    for row in data.chunks_exact(6).take(num_boxes) {
        let confidence = row[4];
        if confidence < params.confidence_threshold {
            continue;
        }
        let class_id = row[5].max(0.0) as usize;
        let bbox = BoundingBox::new(row[0], row[1], row[2], row[3])
            .scale(params.scale_x, params.scale_y);
        let name = class_name(class_names, class_id);
        detections.push(Detection::new(bbox, class_id, name, confidence));
    }
    detections
}

fn decode_heads(
    data: &[f32],
    num_features: usize,
    num_anchors: usize,
    params: &PostParams,
    class_names: &BTreeMap<usize, String>,
) -> Vec<Detection> {
    let num_classes = num_features - 4;
    let at = |feature: usize, anchor: usize| data[feature * num_anchors + anchor];
    let mut detections = Vec::new();

    for anchor in 0..num_anchors {
        let (class_id, confidence) = (0..num_classes)
            .map(|c| (c, at(4 + c, anchor)))
            .fold((0, f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

        if confidence < params.confidence_threshold {
            continue;
        }
        let (cx, cy, w, h) = (at(0, anchor), at(1, anchor), at(2, anchor), at(3, anchor));
        let bbox = BoundingBox::from_center(cx, cy, w, h).scale(params.scale_x, params.scale_y);
        let name = class_name(class_names, class_id);
        detections.push(Detection::new(bbox, class_id, name, confidence));
    }
    detections
}

/// 应用非极大值抑制
///
/// 输入需按置信度降序排列。只在同类别之间抑制，面积为0的框直接丢弃。
pub fn apply_nms(detections: Vec<Detection>, nms_threshold: f32) -> Vec<Detection> {
    let mut suppressed = vec![false; detections.len()];
    let mut result = Vec::new();

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        if detections[i].bbox.area() <= 0.0 {
            continue;
        }

        for j in (i + 1)..detections.len() {
            if suppressed[j] || detections[j].class_id != detections[i].class_id {
                continue;
            }
            if detections[i].bbox.iou(&detections[j].bbox) >= nms_threshold {
                suppressed[j] = true;
            }
        }
        result.push(detections[i].clone());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> PostParams {
        PostParams { scale_x: 1.0, scale_y: 1.0, confidence_threshold: 0.5, nms_threshold: 0.7 }
    }

    fn names() -> BTreeMap<usize, String> {
        BTreeMap::from([(0, "person".to_string()), (1, "hat".to_string())])
    }

    #[test]
    fn decodes_end_to_end_rows() {
        let output = RawOutput {
            shape: vec![1, 3, 6],
            data: vec![
                10.0, 10.0, 50.0, 50.0, 0.9, 0.0,
                60.0, 60.0, 80.0, 80.0, 0.8, 1.0,
                0.0, 0.0, 5.0, 5.0, 0.1, 0.0,
            ],
        };
        let detections = process_detections(&output, &params(), &names()).unwrap();

        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].class_name, "person");
        assert_eq!(detections[1].class_name, "hat");
        assert_eq!(detections[1].bbox, BoundingBox::new(60.0, 60.0, 80.0, 80.0));
    }

    #[test]
    fn scales_back_to_source_image() {
        let output =
            RawOutput { shape: vec![1, 1, 6], data: vec![64.0, 64.0, 128.0, 320.0, 0.9, 0.0] };
        let p = PostParams { scale_x: 2.0, scale_y: 0.5, ..params() };
        let detections = process_detections(&output, &p, &names()).unwrap();
        assert_eq!(detections[0].bbox, BoundingBox::new(128.0, 32.0, 256.0, 160.0));
    }

    #[test]
    fn decodes_raw_heads_with_argmax_class() {
        // 6个特征（4个坐标 + 2个类别），3个锚点，按特征优先存储
        let output = RawOutput {
            shape: vec![1, 6, 3],
            data: vec![
                20.0, 100.0, 0.0, // cx
                20.0, 100.0, 0.0, // cy
                10.0, 40.0, 0.0,  // w
                10.0, 40.0, 0.0,  // h
                0.9, 0.1, 0.0,    // person
                0.2, 0.7, 0.0,    // hat
            ],
        };
        let detections = process_detections(&output, &params(), &names()).unwrap();

        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].class_id, 0);
        assert_eq!(detections[0].bbox, BoundingBox::new(15.0, 15.0, 25.0, 25.0));
        assert_eq!(detections[1].class_id, 1);
        assert!((detections[1].confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn unknown_class_gets_placeholder_name() {
        let output = RawOutput { shape: vec![1, 1, 6], data: vec![0.0, 0.0, 4.0, 4.0, 0.9, 7.0] };
        let detections = process_detections(&output, &params(), &names()).unwrap();
        assert_eq!(detections[0].class_name, "class_7");
    }

    #[test]
    fn nms_suppresses_only_same_class() {
        let detections = vec![
            Detection::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0), 0, "person", 0.9),
            Detection::new(BoundingBox::new(0.0, 0.0, 10.0, 9.5), 0, "person", 0.8),
            Detection::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0), 1, "hat", 0.7),
        ];
        let kept = apply_nms(detections, 0.7);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].confidence, 0.9);
        assert_eq!(kept[1].class_id, 1);
    }

    #[test]
    fn rejects_unexpected_shape() {
        let output = RawOutput { shape: vec![1, 3, 4], data: vec![0.0; 12] };
        assert!(matches!(
            process_detections(&output, &params(), &names()),
            Err(CascadeError::OutputShape(_))
        ));
    }
}
