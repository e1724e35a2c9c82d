//! PascalVOC 标注转换为 YOLO 格式
//!
//! 输入目录结构：
//! - `classes.txt`：每行一个类别名，行号即类别ID
//! - `labels/*.xml`：PascalVOC标注
//!
//! 每个xml输出一个同名 `.txt`，每行 `class x_center y_center width height`，
//! 坐标按图像尺寸归一化。

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use roxmltree::{Document, Node};

use crate::error::{CascadeError, Result};

/// PascalVOC 框 `(xmin, ymin, xmax, ymax)` 转为 YOLO 的 `(x_center, y_center, width, height)`
pub fn voc_to_yolo(
    (img_w, img_h): (f64, f64),
    (xmin, ymin, xmax, ymax): (f64, f64, f64, f64),
) -> (f64, f64, f64, f64) {
    let dw = 1.0 / img_w;
    let dh = 1.0 / img_h;
    (
        (xmin + xmax) / 2.0 * dw,
        (ymin + ymax) / 2.0 * dh,
        (xmax - xmin) * dw,
        (ymax - ymin) * dh,
    )
}

/// 读取类别表
pub fn read_classes(content: &str) -> HashMap<String, usize> {
    content
        .lines()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_string(), idx))
        .collect()
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn number(node: Node<'_, '_>, tag: &str) -> Result<f64> {
    let text = child(node, tag)
        .and_then(|n| n.text())
        .ok_or_else(|| CascadeError::Annotation(format!("缺少 <{tag}>")))?;
    text.trim()
        .parse::<f64>()
        .map_err(|_| CascadeError::Annotation(format!("<{tag}> 不是数字: {text}")))
}

/// 转换单个标注文件的内容
///
/// 不在类别表中的目标会被跳过。
pub fn convert_annotation(xml: &str, classes: &HashMap<String, usize>) -> Result<String> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    let size = child(root, "size").ok_or_else(|| CascadeError::Annotation("缺少 <size>".into()))?;
    let img_w = number(size, "width")?.trunc();
    let img_h = number(size, "height")?.trunc();
    if img_w <= 0.0 || img_h <= 0.0 {
        return Err(CascadeError::Annotation(format!("图像尺寸无效: {img_w}x{img_h}")));
    }

    let mut lines = String::new();
    for object in root.children().filter(|n| n.has_tag_name("object")) {
        let Some(name) = child(object, "name").and_then(|n| n.text()) else {
            continue;
        };
        let Some(&class_idx) = classes.get(name.trim()) else {
            continue;
        };
        let bndbox = child(object, "bndbox")
            .ok_or_else(|| CascadeError::Annotation(format!("目标 {name} 缺少 <bndbox>")))?;
        let coords = (
            number(bndbox, "xmin")?,
            number(bndbox, "ymin")?,
            number(bndbox, "xmax")?,
            number(bndbox, "ymax")?,
        );
        let (xc, yc, w, h) = voc_to_yolo((img_w, img_h), coords);
        lines.push_str(&format!("{class_idx} {xc:?} {yc:?} {w:?} {h:?}\n"));
    }
    Ok(lines)
}

/// 转换整个目录，返回转换的文件数
///
/// 单个文件转换失败会记录日志并跳过。
pub fn convert_annotations(input_dir: &Path, output_dir: &Path) -> Result<usize> {
    let labels_dir = input_dir.join("labels");
    if !labels_dir.is_dir() {
        return Err(CascadeError::MissingDirectory(labels_dir));
    }
    let classes = read_classes(&fs::read_to_string(input_dir.join("classes.txt"))?);
    fs::create_dir_all(output_dir)?;

    let mut converted = 0;
    let mut entries: Vec<_> = fs::read_dir(&labels_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "xml"))
        .collect();
    entries.sort();

    for xml_path in entries {
        let Some(stem) = xml_path.file_stem() else {
            continue;
        };
        let target = output_dir.join(format!("{}.txt", stem.to_string_lossy()));
        let result = fs::read_to_string(&xml_path)
            .map_err(CascadeError::from)
            .and_then(|xml| convert_annotation(&xml, &classes))
            .and_then(|lines| fs::write(&target, lines).map_err(CascadeError::from));

        match result {
            Ok(()) => converted += 1,
            Err(e) => log::warn!("转换 {} 失败: {}", xml_path.display(), e),
        }
    }

    log::info!("转换完成，YOLO标注保存在: {}", output_dir.display());
    Ok(converted)
}
