use std::collections::BTreeMap;
use std::path::Path;

use ort::session::{builder::GraphOptimizationLevel, Session};

use crate::config::DEFAULT_INTRA_THREADS;
use crate::error::Result;

/// 加载YOLO模型
///
/// 加载ONNX格式的YOLO模型，并应用优化配置。
///
/// # 参数
/// * `model_path` - 模型文件路径
///
/// # 返回值
/// 返回加载的Session对象
///
/// # 错误处理
/// 如果模型文件不存在或无法解析会返回Err
pub fn load_model(model_path: impl AsRef<Path>) -> Result<Session> {
    let model = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(DEFAULT_INTRA_THREADS)?
        .commit_from_file(model_path)?;
    Ok(model)
}

/// 从模型元数据中读取类别名称
///
/// Ultralytics 导出的ONNX模型在自定义元数据 `names` 中保存类别字典，
/// 读取失败时返回空表。
pub fn read_class_names(model: &Session) -> BTreeMap<usize, String> {
    let names = model
        .metadata()
        .ok()
        .and_then(|metadata| metadata.custom("names").ok().flatten());
    match names {
        Some(raw) => parse_class_names(&raw),
        None => {
            log::debug!("模型元数据中没有类别名称");
            BTreeMap::new()
        }
    }
}

/// 解析形如 `{0: 'person', 1: 'hat'}` 的类别字典
///
/// 无法解析的条目会被忽略。
pub fn parse_class_names(raw: &str) -> BTreeMap<usize, String> {
    let body = raw.trim().trim_start_matches('{').trim_end_matches('}');
    let mut names = BTreeMap::new();
    let mut rest = body;

    // 名称本身可能带逗号，所以按 "数字:" 的位置切分而不是直接 split(',')
    while let Some((key, after)) = rest.split_once(':') {
        let Ok(id) = key.trim().trim_start_matches(',').trim().parse::<usize>() else {
            break;
        };
        let after = after.trim_start();
        let (name, remaining) = match after.chars().next() {
            Some(quote @ ('\'' | '"')) => {
                let inner = &after[1..];
                match inner.find(quote) {
                    Some(end) => (&inner[..end], &inner[end + 1..]),
                    None => (inner, ""),
                }
            }
            _ => match after.find(',') {
                Some(end) => (&after[..end], &after[end..]),
                None => (after, ""),
            },
        };
        names.insert(id, name.trim().to_string());
        rest = remaining;
    }
    names
}
