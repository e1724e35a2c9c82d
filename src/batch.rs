//! 批量处理
//!
//! 逐张读取目录中的图像，运行级联检测并写出标注后的结果。单张图像失败
//! 只记录日志，不影响其余图像。

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use image::DynamicImage;

use crate::annotate::{Annotator, PERSON_COLOR, PPE_COLOR};
use crate::cascade::{Cascade, CascadeOutput};
use crate::config::IMAGE_EXTENSIONS;
use crate::error::{CascadeError, Result};
use crate::vision::{Detector, load_image, save_image};

/// 列出目录中的图像文件（jpg/jpeg/png，不区分大小写），按文件名排序
pub fn list_images(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(CascadeError::MissingDirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// 单张图像的处理结果
#[derive(Debug, Clone)]
pub struct Frame {
    pub output: CascadeOutput,
    pub annotated: DynamicImage,
}

/// 处理单张图像：解码、级联检测、绘制
pub fn process_image<P: Detector, Q: Detector>(
    path: &Path,
    cascade: &mut Cascade<P, Q>,
    annotator: &Annotator,
) -> Result<Frame> {
    let image = load_image(path)?;
    let output = cascade.run(&image)?;

    let mut canvas = annotator.canvas(&image);
    canvas.draw(&output.persons, PERSON_COLOR);
    canvas.draw(&output.ppe, PPE_COLOR);

    Ok(Frame { output, annotated: canvas.into_image() })
}

/// 一批待处理的图像
///
/// [`frames`](Batch::frames) 每次调用都会从头开始，惰性地逐张产出结果，
/// 调用方可以自行决定是写盘、汇总还是只取其中几张。
pub struct Batch<'a, P, Q> {
    cascade: &'a mut Cascade<P, Q>,
    annotator: &'a Annotator,
    files: Vec<PathBuf>,
}

impl<'a, P: Detector, Q: Detector> Batch<'a, P, Q> {
    pub fn new(
        cascade: &'a mut Cascade<P, Q>,
        annotator: &'a Annotator,
        files: Vec<PathBuf>,
    ) -> Self {
        Self { cascade, annotator, files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn frames(&mut self) -> Frames<'_, P, Q> {
        Frames {
            cascade: &mut *self.cascade,
            annotator: self.annotator,
            files: self.files.iter(),
        }
    }
}

/// [`Batch::frames`] 返回的迭代器
pub struct Frames<'b, P, Q> {
    cascade: &'b mut Cascade<P, Q>,
    annotator: &'b Annotator,
    files: std::slice::Iter<'b, PathBuf>,
}

impl<P: Detector, Q: Detector> Iterator for Frames<'_, P, Q> {
    type Item = (PathBuf, Result<Frame>);

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.next()?;
        let frame = process_image(path, self.cascade, self.annotator);
        Some((path.clone(), frame))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.files.size_hint()
    }
}

/// 批处理统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// 目录中找到的图像数
    pub total: usize,
    /// 成功写出的图像数
    pub written: usize,
    /// 处理或写出失败的图像数
    pub failed: usize,
    /// 是否因停止信号提前结束
    pub stopped: bool,
}

/// 处理整个目录
///
/// 输出目录不存在时自动创建，同名文件会被覆盖。每张图像之前检查一次 `stop`，
/// 置位后在当前图像完成后结束。
///
/// # 错误处理
/// 只有输入目录不存在、无法创建输出目录等启动阶段错误会返回Err
pub fn run_batch<P: Detector, Q: Detector>(
    input_dir: &Path,
    output_dir: &Path,
    cascade: &mut Cascade<P, Q>,
    annotator: &Annotator,
    stop: &AtomicBool,
) -> Result<BatchSummary> {
    let files = list_images(input_dir)?;
    fs::create_dir_all(output_dir)?;

    let mut summary = BatchSummary { total: files.len(), ..BatchSummary::default() };
    let mut batch = Batch::new(cascade, annotator, files);
    let mut frames = batch.frames();
    let start_time = Instant::now();
    let mut index = 0;

    loop {
        if stop.load(Ordering::SeqCst) {
            log::warn!("收到停止信号，剩余 {} 张图像未处理", summary.total - index);
            summary.stopped = true;
            break;
        }
        let Some((path, frame)) = frames.next() else {
            break;
        };
        index += 1;

        let Some(name) = path.file_name() else {
            continue;
        };
        log::info!("[{}/{}] {}", index, summary.total, name.to_string_lossy());

        let written = frame.and_then(|frame| {
            let (persons, ppe) = (frame.output.persons.len(), frame.output.ppe.len());
            log::debug!("{} 个人物, {} 个装备", persons, ppe);
            save_image(&frame.annotated, output_dir.join(name))
        });
        match written {
            Ok(()) => summary.written += 1,
            Err(e) => {
                log::warn!("处理 {} 失败: {}", path.display(), e);
                summary.failed += 1;
            }
        }
    }

    log::info!(
        "处理完成: 共写出 {} 张图像, 失败 {} 张, 耗时 {:?}",
        summary.written,
        summary.failed,
        start_time.elapsed()
    );
    Ok(summary)
}
