//! voc2yolo - PascalVOC 标注批量转换为 YOLO 格式

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ppe_cascade::voc::convert_annotations;

#[derive(Parser, Debug)]
#[command(author, version, about = "PascalVOC to YOLO Format Converter")]
struct Args {
    /// 包含 classes.txt 与 labels/ 的标注目录
    input_dir: PathBuf,
    /// YOLO标注输出目录
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let converted = convert_annotations(&args.input_dir, &args.output_dir)
        .with_context(|| format!("无法转换 {}", args.input_dir.display()))?;
    log::info!("共转换 {} 个标注文件", converted);
    Ok(())
}
