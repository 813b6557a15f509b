//! 回写：按结构化地址把译文写回原位置
//!
//! 每条记录都重新读取并解析目标文件，修改一个叶子后整份写回。
//! 同一文件的多条记录依次读写，后一次读到的是前一次写入后的内容。

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::model::address::{Address, Segment};
use crate::model::entry::TranslationEntry;
use crate::model::error::FanyiError;
use crate::utils::fs::{read_json_file, write_json_file};

/// 回写选项
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// 指定后所有写入都落在该目录下的同名文件，原文件保持不变
    pub output_dir: Option<PathBuf>,
    /// 跳过译文为空的条目，避免把原文清空
    pub skip_untranslated: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            skip_untranslated: true,
        }
    }
}

#[derive(Debug)]
pub struct ApplyFailure {
    pub address: Address,
    pub error: FanyiError,
}

impl std::fmt::Display for ApplyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "回写失败 {}: {}", self.address, self.error)
    }
}

/// 一次批量回写的结果
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub written: Vec<Address>,
    pub skipped: Vec<Address>,
    pub failures: Vec<ApplyFailure>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 一条记录实际读取与写入的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub read_from: PathBuf,
    pub write_to: PathBuf,
}

/// 决定实际读写的文件
///
/// 指定输出目录时总是写入 `输出目录/文件名`；该文件已存在就读它，否则读原文件，
/// 原文件永远不会被改写。未指定输出目录时就地读写原文件。
pub fn resolve_target(location: &Path, output_dir: Option<&Path>) -> Target {
    if let (Some(dir), Some(name)) = (output_dir, location.file_name()) {
        let redirected = dir.join(name);
        let read_from = if redirected.is_file() {
            redirected.clone()
        } else {
            location.to_path_buf()
        };
        return Target {
            read_from,
            write_to: redirected,
        };
    }
    Target {
        read_from: location.to_path_buf(),
        write_to: location.to_path_buf(),
    }
}

/// 按 dpath 逐段取可变引用；每一段都必须已经存在
fn descend<'a>(
    mut cur: &'a mut Value,
    dpath: &[Segment],
    location: &Path,
) -> Result<&'a mut Value, FanyiError> {
    for (depth, segment) in dpath.iter().enumerate() {
        cur = match (cur, segment) {
            (Value::Object(map), Segment::Key(key)) => {
                map.get_mut(key).ok_or_else(|| FanyiError::KeyNotFound {
                    location: location.to_path_buf(),
                    key: key.clone(),
                    depth,
                })?
            }
            (Value::Array(items), Segment::Index(index)) => {
                let len = items.len();
                items.get_mut(*index).ok_or_else(|| FanyiError::IndexOutOfRange {
                    location: location.to_path_buf(),
                    index: *index,
                    len,
                    depth,
                })?
            }
            _ => {
                return Err(FanyiError::NotAContainer {
                    location: location.to_path_buf(),
                    segment: segment.clone(),
                    depth,
                })
            }
        };
    }
    Ok(cur)
}

/// 在内存中的文档上替换一个叶子，其余部分保持不变
pub fn reinsert(
    document: &mut Value,
    dpath: &[Segment],
    value: &str,
    location: &Path,
) -> Result<(), FanyiError> {
    if dpath.is_empty() {
        return Err(FanyiError::EmptyPath {
            location: location.to_path_buf(),
        });
    }
    let slot = descend(document, dpath, location)?;
    *slot = Value::String(value.to_string());
    Ok(())
}

/// 回写单条记录，返回实际写入的文件
pub fn apply_entry(entry: &TranslationEntry, output_dir: Option<&Path>) -> Result<PathBuf, FanyiError> {
    let Target { read_from, write_to } = resolve_target(entry.address.location(), output_dir);
    let mut data = read_json_file(&read_from)?;
    reinsert(&mut data, &entry.address.dpath, &entry.translated, &read_from)?;
    write_json_file(&write_to, &data)?;
    tracing::info!("写入 {} -> {}", entry.address, write_to.display());
    Ok(write_to)
}

/// 依次回写所有记录；单条失败只记录在报告里，不影响其余记录
pub fn apply_all<P>(entries: &[TranslationEntry], options: &ApplyOptions, mut on_progress: P) -> ApplyReport
where
    P: FnMut(f32),
{
    let mut report = ApplyReport::default();
    let total = entries.len().max(1) as f32;
    let output_dir = options.output_dir.as_deref();

    for (i, entry) in entries.iter().enumerate() {
        if options.skip_untranslated && entry.is_pending() {
            tracing::debug!("跳过未翻译条目 {}", entry.address);
            report.skipped.push(entry.address.clone());
        } else {
            match apply_entry(entry, output_dir) {
                Ok(_) => report.written.push(entry.address.clone()),
                Err(error) => {
                    let failure = ApplyFailure {
                        address: entry.address.clone(),
                        error,
                    };
                    tracing::warn!("{}", failure);
                    report.failures.push(failure);
                }
            }
        }
        on_progress((i + 1) as f32 / total);
    }

    tracing::info!(
        "回写完成：写入 {}，跳过 {}，失败 {}",
        report.written.len(),
        report.skipped.len(),
        report.failures.len()
    );
    report
}
