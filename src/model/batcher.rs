//! 批量翻译：把源文本切成批次交给翻译协作方，再按下标映射回原位置
//!
//! 协作方只需满足"一批进、一批出、顺序不变"。失败的批次保留原译文，
//! 对应条目仍是待翻译状态，可以用 `translate_pending` 单独重试。

use std::io::Write;
use std::ops::Range;
use std::process::{Command, Stdio};

use serde_json::Value;

use crate::model::entry::TranslationEntry;
use crate::model::error::TranslateError;

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// 翻译协作方
pub trait Translator {
    /// 翻译一批文本，返回与输入等长且顺序一致的译文
    fn translate_batch(&self, sources: &[String]) -> Result<Vec<String>, TranslateError>;
}

impl<F> Translator for F
where
    F: Fn(&[String]) -> Result<Vec<String>, TranslateError>,
{
    fn translate_batch(&self, sources: &[String]) -> Result<Vec<String>, TranslateError> {
        self(sources)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// 在输入列表中的下标范围
    pub range: Range<usize>,
    pub error: TranslateError,
}

/// `batch_translate` 的结果：每个位置要么有译文，要么所在批次失败
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<Option<String>>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 逐批翻译 `sources`
///
/// 每个成功批次完成后调用 `on_batch(译文, 该批起始下标)`。
pub fn batch_translate<T, F>(
    sources: &[String],
    translator: &T,
    batch_size: usize,
    mut on_batch: F,
) -> BatchOutcome
where
    T: Translator + ?Sized,
    F: FnMut(&[String], usize),
{
    let batch_size = batch_size.max(1);
    let mut outcome = BatchOutcome {
        results: vec![None; sources.len()],
        failures: Vec::new(),
    };

    for (n, chunk) in sources.chunks(batch_size).enumerate() {
        let start = n * batch_size;
        let range = start..start + chunk.len();
        let translated = translator.translate_batch(chunk).and_then(|out| {
            if out.len() == chunk.len() {
                Ok(out)
            } else {
                Err(TranslateError::LengthMismatch {
                    expected: chunk.len(),
                    actual: out.len(),
                })
            }
        });
        match translated {
            Ok(out) => {
                tracing::info!("批次 {:?} 翻译完成", range);
                on_batch(&out, start);
                for (slot, text) in outcome.results[range].iter_mut().zip(out) {
                    *slot = Some(text);
                }
            }
            Err(error) => {
                tracing::warn!("批次 {:?} 翻译失败: {}", range, error);
                outcome.failures.push(BatchFailure { range, error });
            }
        }
    }
    outcome
}

/// 翻译结果汇总，失败范围是相对于本次提交的条目下标
#[derive(Debug, Default)]
pub struct BatchReport {
    pub translated: usize,
    pub failures: Vec<BatchFailure>,
}

fn fill_entries<T, F>(
    entries: &mut [TranslationEntry],
    indices: &[usize],
    translator: &T,
    batch_size: usize,
    mut on_progress: F,
) -> BatchReport
where
    T: Translator + ?Sized,
    F: FnMut(f32),
{
    let sources: Vec<String> = indices.iter().map(|&i| entries[i].source.clone()).collect();
    let total = sources.len().max(1) as f32;
    let mut done = 0usize;
    let outcome = batch_translate(&sources, translator, batch_size, |out, _| {
        done += out.len();
        on_progress(done as f32 / total);
    });

    let mut report = BatchReport {
        translated: 0,
        failures: outcome.failures,
    };
    for (&i, text) in indices.iter().zip(outcome.results) {
        if let Some(text) = text {
            entries[i].translated = text;
            report.translated += 1;
        }
    }
    for failure in &mut report.failures {
        let range = &failure.range;
        failure.range = indices[range.start]..indices[range.end - 1] + 1;
    }
    report
}

/// 只翻译 `indices` 指定的条目（例如界面上选中的几行）
///
/// 下标按列表顺序发送，重复与越界的下标会被忽略。返回的失败范围按原列表下标给出。
pub fn translate_selected<T, F>(
    entries: &mut [TranslationEntry],
    indices: &[usize],
    translator: &T,
    batch_size: usize,
    on_progress: F,
) -> BatchReport
where
    T: Translator + ?Sized,
    F: FnMut(f32),
{
    let mut valid: Vec<usize> = indices.iter().copied().filter(|&i| i < entries.len()).collect();
    if valid.len() != indices.len() {
        tracing::warn!("忽略 {} 个越界下标", indices.len() - valid.len());
    }
    // 失败范围的映射依赖下标递增
    valid.sort_unstable();
    valid.dedup();
    fill_entries(entries, &valid, translator, batch_size, on_progress)
}

/// 翻译全部条目，覆盖已有译文
pub fn translate_entries<T, F>(
    entries: &mut [TranslationEntry],
    translator: &T,
    batch_size: usize,
    on_progress: F,
) -> BatchReport
where
    T: Translator + ?Sized,
    F: FnMut(f32),
{
    let indices: Vec<usize> = (0..entries.len()).collect();
    fill_entries(entries, &indices, translator, batch_size, on_progress)
}

/// 只翻译仍待翻译（译文为空）的条目
///
/// 返回的失败范围按原列表下标给出，范围内可能夹着已翻译的条目。
pub fn translate_pending<T, F>(
    entries: &mut [TranslationEntry],
    translator: &T,
    batch_size: usize,
    on_progress: F,
) -> BatchReport
where
    T: Translator + ?Sized,
    F: FnMut(f32),
{
    let indices: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_pending())
        .map(|(i, _)| i)
        .collect();
    tracing::info!("待翻译条目 {} / {}", indices.len(), entries.len());
    fill_entries(entries, &indices, translator, batch_size, on_progress)
}

/// 通过外部命令翻译：请求体写入标准输入，从标准输出读取响应体
///
/// 任何能读 `{"input": [...]}`、写 `{"output": [...]}` 的程序都可以作为协作方。
#[derive(Debug, Clone)]
pub struct CommandTranslator {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTranslator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Translator for CommandTranslator {
    fn translate_batch(&self, sources: &[String]) -> Result<Vec<String>, TranslateError> {
        let transport = |e: std::io::Error| TranslateError::Transport(format!("{}: {}", self.program, e));
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(transport)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(request_payload(sources).as_bytes()).map_err(transport)?;
        }
        let output = child.wait_with_output().map_err(transport)?;
        if !output.status.success() {
            return Err(TranslateError::Transport(format!(
                "{} 退出状态 {}",
                self.program, output.status
            )));
        }
        parse_output_payload(&String::from_utf8_lossy(&output.stdout))
    }
}

/// 协作方请求体：`{"input": [...]}`，非 ASCII 字符原样保留
pub fn request_payload(sources: &[String]) -> String {
    serde_json::json!({ "input": sources }).to_string()
}

/// 解析协作方响应体 `{"output": [...]}`；字段缺失或不是字符串数组时整批失败
pub fn parse_output_payload(body: &str) -> Result<Vec<String>, TranslateError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| TranslateError::MalformedResponse(format!("响应不是JSON: {}", e)))?;
    let output = value
        .get("output")
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::MalformedResponse("缺少 output 数组".into()))?;
    output
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| TranslateError::MalformedResponse(format!("output 中含非字符串: {}", v)))
        })
        .collect()
}
