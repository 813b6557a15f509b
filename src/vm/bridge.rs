//! VM桥接层：在后台线程运行扫描/翻译/回写，通过通道向前端推送进度事件
//!
//! 每次调用返回一个新的 `Receiver`，事件序列有限，以 `Finished` 或 `Aborted` 结束。
//! 前端丢弃 `Receiver` 即可放弃后续事件，任务本身会跑完。

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use crate::model::batcher::{translate_entries, translate_pending, BatchReport, Translator};
use crate::model::entry::TranslationEntry;
use crate::model::reinsert::{apply_all, ApplyOptions, ApplyReport};
use crate::model::scanner::{scan_with_extension, ScanWarning};

// === 常量定义（消除魔法值） ===
pub const STATUS_READY: &str = "就绪";
pub const STATUS_SCANNING: &str = "正在扫描...";
pub const STATUS_SCANNED: &str = "扫描完成";
pub const STATUS_TRANSLATING: &str = "正在翻译...";
pub const STATUS_APPLYING: &str = "正在回写...";
pub const STATUS_APPLIED: &str = "回写完成";
pub const STATUS_ERROR_PREFIX: &str = "错误: ";

#[derive(Debug)]
pub enum ScanEvent {
    Progress(f32),
    Warning(ScanWarning),
    Finished(Vec<TranslationEntry>),
    Aborted(String),
}

#[derive(Debug)]
pub enum TranslateEvent {
    Progress(f32),
    Finished(Vec<TranslationEntry>, BatchReport),
}

#[derive(Debug)]
pub enum ApplyEvent {
    Progress(f32),
    Finished(ApplyReport),
}

/// 后台扫描 `root`
pub fn spawn_scan(root: PathBuf, extension: String) -> Receiver<ScanEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // 接收端已丢弃时发送失败，直接忽略
        let result = scan_with_extension(
            &root,
            &extension,
            |p| {
                let _ = tx.send(ScanEvent::Progress(p));
            },
            |w| {
                let _ = tx.send(ScanEvent::Warning(w));
            },
        );
        let last = match result {
            Ok(found) => ScanEvent::Finished(
                found
                    .into_iter()
                    .map(|(address, source)| TranslationEntry::new(address, source))
                    .collect(),
            ),
            Err(e) => {
                tracing::error!("扫描中止: {}", e);
                ScanEvent::Aborted(format!("{}{}", STATUS_ERROR_PREFIX, e))
            }
        };
        let _ = tx.send(last);
    });
    rx
}

/// 后台批量翻译；`pending_only` 为真时只发送尚未翻译的条目
pub fn spawn_translate<T>(
    mut entries: Vec<TranslationEntry>,
    translator: T,
    batch_size: usize,
    pending_only: bool,
) -> Receiver<TranslateEvent>
where
    T: Translator + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let progress = |p| {
            let _ = tx.send(TranslateEvent::Progress(p));
        };
        let report = if pending_only {
            translate_pending(&mut entries, &translator, batch_size, progress)
        } else {
            translate_entries(&mut entries, &translator, batch_size, progress)
        };
        let _ = tx.send(TranslateEvent::Finished(entries, report));
    });
    rx
}

/// 后台回写
pub fn spawn_apply(entries: Vec<TranslationEntry>, options: ApplyOptions) -> Receiver<ApplyEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let report = apply_all(&entries, &options, |p| {
            let _ = tx.send(ApplyEvent::Progress(p));
        });
        let _ = tx.send(ApplyEvent::Finished(report));
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::error::TranslateError;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_scan_event_stream() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), r#"{"k": "あ"}"#).unwrap();
        std::fs::write(dir.path().join("b.json"), r#"{"k": "い""#).unwrap();

        let events: Vec<ScanEvent> = spawn_scan(dir.path().to_path_buf(), "json".into()).iter().collect();
        let progress = events.iter().filter(|e| matches!(e, ScanEvent::Progress(_))).count();
        let warnings = events.iter().filter(|e| matches!(e, ScanEvent::Warning(_))).count();
        assert_eq!(progress, 2);
        assert_eq!(warnings, 1);
        match events.last() {
            Some(ScanEvent::Finished(entries)) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].source, "あ");
            }
            other => panic!("最后一个事件应为 Finished: {:?}", other),
        }
    }

    #[test]
    fn test_scan_missing_root_aborts() {
        let dir = tempdir().unwrap();
        let events: Vec<ScanEvent> =
            spawn_scan(dir.path().join("nope"), "json".into()).iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ScanEvent::Aborted(msg) if msg.starts_with(STATUS_ERROR_PREFIX)));
    }

    #[test]
    fn test_translate_then_apply_streams() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.json");
        std::fs::write(&file, r#"{"k": "あ", "l": ["い"]}"#).unwrap();

        let entries = match spawn_scan(dir.path().to_path_buf(), "json".into()).iter().last() {
            Some(ScanEvent::Finished(entries)) => entries,
            other => panic!("扫描失败: {:?}", other),
        };

        let translator = |batch: &[String]| -> Result<Vec<String>, TranslateError> {
            Ok(batch.iter().map(|s| format!("{}!", s)).collect())
        };
        let (entries, report) = match spawn_translate(entries, translator, 1, true).iter().last() {
            Some(TranslateEvent::Finished(entries, report)) => (entries, report),
            other => panic!("翻译失败: {:?}", other),
        };
        assert_eq!(report.translated, 2);

        let events: Vec<ApplyEvent> = spawn_apply(entries, ApplyOptions::default()).iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events.last(), Some(ApplyEvent::Finished(r)) if r.is_clean() && r.written.len() == 2));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(written, json!({"k": "あ!", "l": ["い!"]}));
    }
}
