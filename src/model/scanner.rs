//! 扫描：遍历目录下所有 JSON 文件，收集待翻译字符串
//!
//! 先数一遍文件总数再逐个处理；单个文件失败只产生警告，不会中断扫描。

use std::path::{Path, PathBuf};

use crate::model::address::Address;
use crate::model::entry::TranslationEntry;
use crate::model::error::FanyiError;
use crate::model::script::may_contain_target_script;
use crate::model::walker::walk;
use crate::utils::fs::{find_json_files, parse_json, read_text};

pub const DEFAULT_EXTENSION: &str = "json";

/// 扫描期间可恢复的错误：出错的文件与原因
#[derive(Debug)]
pub struct ScanWarning {
    pub file: Option<PathBuf>,
    pub error: FanyiError,
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file {
            Some(file) => write!(f, "跳过 {}: {}", file.display(), self.error),
            None => write!(f, "跳过: {}", self.error),
        }
    }
}

/// 处理单个文件；预过滤未命中时返回空列表
fn scan_file(file: &Path) -> Result<Vec<(Address, String)>, FanyiError> {
    let text = read_text(file)?;
    if !may_contain_target_script(&text) {
        return Ok(Vec::new());
    }
    let data = parse_json(file, &text)?;
    Ok(walk(&data)
        .map(|(dpath, value)| (Address::new(file, dpath), value.to_string()))
        .collect())
}

/// 扫描 `root` 下所有扩展名为 `extension` 的文件
///
/// 每处理完一个文件（无论成败）调用一次 `on_progress(已处理数 / 总数)`。
/// 计数与遍历之间目录发生变化时，进度可能超过 1.0 或达不到 1.0。
pub fn scan_with_extension<P, W>(
    root: &Path,
    extension: &str,
    mut on_progress: P,
    mut on_warning: W,
) -> Result<Vec<(Address, String)>, FanyiError>
where
    P: FnMut(f32),
    W: FnMut(ScanWarning),
{
    if !root.is_dir() {
        return Err(FanyiError::NotADirectory(root.to_path_buf()));
    }
    tracing::info!("开始扫描 {}", root.display());
    let total = find_json_files(root, extension).count();
    let mut processed = 0usize;
    let mut result = Vec::new();

    for file in find_json_files(root, extension) {
        let outcome = match file {
            Ok(file) => {
                tracing::info!("扫描 {}", file.display());
                scan_file(&file).map_err(|error| ScanWarning {
                    file: Some(file),
                    error,
                })
            }
            Err(err) => Err(ScanWarning {
                file: err.path().map(Path::to_path_buf),
                error: err.into(),
            }),
        };
        match outcome {
            Ok(found) => result.extend(found),
            Err(warning) => {
                tracing::warn!("{}", warning);
                on_warning(warning);
            }
        }

        processed += 1;
        on_progress(processed as f32 / total.max(1) as f32);
    }

    tracing::info!("扫描完成：{} 个文件，{} 条字符串", processed, result.len());
    Ok(result)
}

/// 扫描 `root` 下所有 `*.json` 文件
pub fn scan<P, W>(root: &Path, on_progress: P, on_warning: W) -> Result<Vec<(Address, String)>, FanyiError>
where
    P: FnMut(f32),
    W: FnMut(ScanWarning),
{
    scan_with_extension(root, DEFAULT_EXTENSION, on_progress, on_warning)
}

/// 扫描并直接生成译文为空的翻译条目
pub fn scan_entries<P, W>(
    root: &Path,
    on_progress: P,
    on_warning: W,
) -> Result<Vec<TranslationEntry>, FanyiError>
where
    P: FnMut(f32),
    W: FnMut(ScanWarning),
{
    Ok(scan(root, on_progress, on_warning)?
        .into_iter()
        .map(|(address, source)| TranslationEntry::new(address, source))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::address::Segment;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let p = dir.join(name);
        if let Some(parent) = p.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&p, content).unwrap();
        p
    }

    #[test]
    fn test_scan_example_document() {
        let dir = tempdir().unwrap();
        let file = write(
            dir.path(),
            "ui.json",
            r#"{"title": "こんにちは", "items": [{"name": "寿司"}, {"name": "OK"}]}"#,
        );

        let found = scan(dir.path(), |_| {}, |w| panic!("不应有警告: {}", w)).unwrap();
        assert_eq!(
            found,
            vec![
                (Address::new(&file, vec!["title".into()]), "こんにちは".to_string()),
                (
                    Address::new(&file, vec![Segment::from("items"), 0.into(), "name".into()]),
                    "寿司".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_malformed_file_is_isolated() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.json", r#"{"k": "あ"}"#);
        write(dir.path(), "sub/b.json", r#"{"k": ["い", "う"]}"#);
        write(dir.path(), "sub/c.json", r#"{"k": "え", "#);

        let mut warnings = Vec::new();
        let mut progress = Vec::new();
        let found = scan(dir.path(), |p| progress.push(p), |w| warnings.push(w)).unwrap();

        assert_eq!(found.len(), 3);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0].error, FanyiError::Parse { .. }));
        assert!(warnings[0].to_string().contains("c.json"));
        assert_eq!(progress.len(), 3);
        assert_eq!(progress.last().copied(), Some(1.0));
    }

    #[test]
    fn test_prefiltered_files_still_advance_progress() {
        let dir = tempdir().unwrap();
        write(dir.path(), "plain.json", r#"{"k": "english only"}"#);
        // 不含目标文字时连解析都跳过，损坏也不会告警
        write(dir.path(), "broken_plain.json", r#"{"k": "#);

        let mut warnings = 0;
        let mut progress = Vec::new();
        let found = scan(dir.path(), |p| progress.push(p), |_| warnings += 1).unwrap();
        assert!(found.is_empty());
        assert_eq!(warnings, 0);
        assert_eq!(progress.len(), 2);
    }

    #[test]
    fn test_escaped_characters_are_found() {
        let dir = tempdir().unwrap();
        write(dir.path(), "esc.json", r#"{"k": "\u3053\u3093"}"#);
        let found = scan(dir.path(), |_| {}, |_| {}).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, "こん");
    }

    #[test]
    fn test_non_json_extension_ignored() {
        let dir = tempdir().unwrap();
        write(dir.path(), "notes.txt", r#"{"k": "あ"}"#);
        let mut progress = Vec::new();
        let found = scan(dir.path(), |p| progress.push(p), |_| {}).unwrap();
        assert!(found.is_empty());
        assert!(progress.is_empty());
    }

    #[test]
    fn test_scan_entries_start_pending() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.json", r#"["あ", "い"]"#);
        let entries = scan_entries(dir.path(), |_| {}, |_| {}).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(TranslationEntry::is_pending));
    }

    #[test]
    fn test_root_must_be_directory() {
        let dir = tempdir().unwrap();
        let file = write(dir.path(), "a.json", "{}");
        let err = scan(&file, |_| {}, |_| {}).unwrap_err();
        assert!(matches!(err, FanyiError::NotADirectory(_)));
    }
}
