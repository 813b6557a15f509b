//! 程序入口：初始化日志，把扫描/回写事件流打印到终端
//!
//! 用法:
//!   dpath_fanyi scan <目录> <映射.yaml>
//!   dpath_fanyi pending <映射.yaml>
//!   dpath_fanyi translate <映射.yaml> <程序> [参数...]
//!   dpath_fanyi apply <映射.yaml> [输出目录]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing_subscriber::fmt::SubscriberBuilder;

use dpath_fanyi::model::batcher::CommandTranslator;
use dpath_fanyi::model::config::FanyiConfig;
use dpath_fanyi::model::entry::{load_mapping, save_mapping};
use dpath_fanyi::vm::bridge::*;

const USAGE: &str = "用法: dpath_fanyi scan <目录> <映射.yaml> | pending <映射.yaml> | translate <映射.yaml> <程序> [参数...] | apply <映射.yaml> [输出目录]";

fn run_scan(root: PathBuf, mapping: PathBuf, config: &FanyiConfig) -> Result<()> {
    tracing::info!("{} {}", STATUS_SCANNING, root.display());
    for event in spawn_scan(root, config.extension.clone()) {
        match event {
            ScanEvent::Progress(p) => tracing::info!("进度 {:.0}%", p * 100.0),
            ScanEvent::Warning(w) => tracing::warn!("{}", w),
            ScanEvent::Finished(entries) => {
                save_mapping(&mapping, &entries)
                    .with_context(|| format!("保存映射失败: {}", mapping.display()))?;
                tracing::info!("{}：{} 条待翻译", STATUS_SCANNED, entries.len());
                return Ok(());
            }
            ScanEvent::Aborted(msg) => bail!(msg),
        }
    }
    bail!("扫描任务意外结束")
}

fn run_pending(mapping: PathBuf) -> Result<()> {
    let entries = load_mapping(&mapping).with_context(|| format!("读取映射失败: {}", mapping.display()))?;
    let pending: Vec<_> = entries.iter().filter(|e| e.is_pending()).collect();
    for entry in &pending {
        println!("{}\t{}", entry.address, entry.source);
    }
    tracing::info!("待翻译 {} / {}", pending.len(), entries.len());
    Ok(())
}

/// 只发送待翻译条目，结果写回映射文件；有批次失败时仍先保存已成功的部分
fn run_translate(mapping: PathBuf, translator: CommandTranslator, config: &FanyiConfig) -> Result<()> {
    let entries = load_mapping(&mapping).with_context(|| format!("读取映射失败: {}", mapping.display()))?;
    tracing::info!("{} 批大小 {}", STATUS_TRANSLATING, config.batch_size);
    for event in spawn_translate(entries, translator, config.batch_size, true) {
        match event {
            TranslateEvent::Progress(p) => tracing::info!("进度 {:.0}%", p * 100.0),
            TranslateEvent::Finished(entries, report) => {
                save_mapping(&mapping, &entries)
                    .with_context(|| format!("保存映射失败: {}", mapping.display()))?;
                for failure in &report.failures {
                    tracing::warn!("条目 {:?} 翻译失败: {}", failure.range, failure.error);
                }
                tracing::info!("翻译 {} 条，失败批次 {}", report.translated, report.failures.len());
                if !report.failures.is_empty() {
                    bail!("{} 个批次翻译失败，可重新运行 translate 重试", report.failures.len());
                }
                return Ok(());
            }
        }
    }
    bail!("翻译任务意外结束")
}

fn run_apply(mapping: PathBuf, output_dir: Option<PathBuf>, config: &FanyiConfig) -> Result<()> {
    let entries = load_mapping(&mapping).with_context(|| format!("读取映射失败: {}", mapping.display()))?;
    let mut options = config.apply_options();
    if output_dir.is_some() {
        options.output_dir = output_dir;
    }
    tracing::info!("{} {} 条", STATUS_APPLYING, entries.len());
    for event in spawn_apply(entries, options) {
        match event {
            ApplyEvent::Progress(p) => tracing::debug!("进度 {:.0}%", p * 100.0),
            ApplyEvent::Finished(report) => {
                for failure in &report.failures {
                    tracing::warn!("{}", failure);
                }
                tracing::info!(
                    "{}：写入 {}，跳过 {}，失败 {}",
                    STATUS_APPLIED,
                    report.written.len(),
                    report.skipped.len(),
                    report.failures.len()
                );
                if !report.is_clean() {
                    bail!("{} 条记录回写失败", report.failures.len());
                }
                return Ok(());
            }
        }
    }
    bail!("回写任务意外结束")
}

fn main() -> Result<()> {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let config = FanyiConfig::from_env();
    tracing::info!("{}", STATUS_READY);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["scan", root, mapping] => run_scan(root.into(), mapping.into(), &config),
        ["pending", mapping] => run_pending(mapping.into()),
        ["translate", mapping, program, rest @ ..] => {
            let translator = CommandTranslator::new(*program, rest.iter().map(|a| a.to_string()).collect());
            run_translate(mapping.into(), translator, &config)
        }
        ["apply", mapping] => run_apply(mapping.into(), None, &config),
        ["apply", mapping, out] => run_apply(mapping.into(), Some(out.into()), &config),
        _ => bail!(USAGE),
    }
}
