//! ppe_detect - 对目录中的图像执行人物与防护装备级联检测

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, bail};
use clap::Parser;
use ppe_cascade::config::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_NMS_THRESHOLD, DEFAULT_PADDING};
use ppe_cascade::{
    Annotator, BatchSummary, Cascade, CascadeConfig, DetectorConfig, YoloDetector, load_model,
    run_batch,
};
use tokio::task::JoinError;

#[derive(Parser, Debug)]
#[command(author, version, about = "人物与防护装备(PPE)级联检测")]
struct Args {
    /// 输入图像目录
    #[arg(long = "input_folder")]
    input_folder: PathBuf,
    /// 标注结果输出目录
    #[arg(long = "output_folder")]
    output_folder: PathBuf,
    /// 人物检测模型路径
    #[arg(long = "person_model")]
    person_model: PathBuf,
    /// 防护装备检测模型路径
    #[arg(long = "ppe_model")]
    ppe_model: PathBuf,
    /// 裁剪人物区域时的边距（像素）
    #[arg(long, env = "PPE_PADDING", default_value_t = DEFAULT_PADDING)]
    padding: u32,
    /// 置信度阈值
    #[arg(long, env = "PPE_CONFIDENCE", default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    confidence: f32,
    /// NMS的IoU阈值
    #[arg(long, env = "PPE_IOU", default_value_t = DEFAULT_NMS_THRESHOLD)]
    iou: f32,
    /// 标签字体文件，不指定时使用系统字体
    #[arg(long, env = "PPE_FONT")]
    font: Option<PathBuf>,
}

fn load_detector(path: &Path, config: DetectorConfig) -> Result<YoloDetector> {
    let model = load_model(path).with_context(|| format!("无法加载模型 {}", path.display()))?;
    let detector = YoloDetector::new(model, config);
    log::info!("已加载模型 {} ({} 个类别)", path.display(), detector.class_names().len());
    Ok(detector)
}

fn run(args: Args, stop: &AtomicBool) -> Result<BatchSummary> {
    if !args.input_folder.is_dir() {
        bail!("输入目录不存在: {}", args.input_folder.display());
    }

    let detector_config = DetectorConfig {
        confidence_threshold: args.confidence,
        nms_threshold: args.iou,
        ..DetectorConfig::default()
    };
    let person = load_detector(&args.person_model, detector_config)?;
    let ppe = load_detector(&args.ppe_model, detector_config)?;

    let annotator = match &args.font {
        Some(path) => Annotator::with_font_file(path)?,
        None => Annotator::new(),
    };

    let config = CascadeConfig::default().with_padding(args.padding);
    let mut cascade = Cascade::new(person, ppe).with_config(config);
    let summary =
        run_batch(&args.input_folder, &args.output_folder, &mut cascade, &annotator, stop)?;
    Ok(summary)
}

/// 等待批处理结束
///
/// 第一次中断置位 `stop`，让批处理在当前图像完成后结束；
/// 第二次中断不再等待，返回 `None`。
async fn supervise<J, F>(
    job: J,
    stop: &AtomicBool,
    mut interrupt: impl FnMut() -> F,
) -> Result<Option<BatchSummary>>
where
    J: Future<Output = std::result::Result<Result<BatchSummary>, JoinError>>,
    F: Future<Output = ()>,
{
    tokio::pin!(job);

    tokio::select! {
        result = &mut job => return Ok(Some(result??)),
        _ = interrupt() => {
            log::warn!("收到 Ctrl-C，当前图像完成后停止，再次按下立即退出");
            stop.store(true, Ordering::SeqCst);
        }
    }

    tokio::select! {
        result = &mut job => Ok(Some(result??)),
        _ = interrupt() => {
            log::warn!("再次收到 Ctrl-C，立即退出");
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let stop = Arc::new(AtomicBool::new(false));
    let worker_stop = Arc::clone(&stop);
    // 推理是阻塞调用，放到专门的线程上
    let job = tokio::task::spawn_blocking(move || run(args, &worker_stop));
    let interrupt = || async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("无法监听 Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    match supervise(job, &stop, interrupt).await? {
        Some(summary) => {
            log::info!("已写入 {} / {} 张图像", summary.written, summary.total);
            Ok(())
        }
        None => process::exit(130),
    }
}
