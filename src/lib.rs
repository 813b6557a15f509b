//! JSON 文本翻译工具库
//!
//! 扫描目录中的 JSON 文件，按结构化地址提取含日文的字符串，
//! 交给外部翻译协作方批量翻译，再把译文精确写回原位置。

pub mod model;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use model::address::{Address, Segment};
pub use model::batcher::{
    batch_translate, translate_entries, translate_pending, translate_selected, BatchReport, CommandTranslator,
    Translator,
};
pub use model::config::FanyiConfig;
pub use model::entry::{load_mapping, save_mapping, TranslationEntry};
pub use model::error::{FanyiError, TranslateError};
pub use model::reinsert::{apply_all, apply_entry, ApplyOptions, ApplyReport};
pub use model::scanner::{scan, scan_entries, ScanWarning};
pub use model::script::contains_target_script;
pub use model::walker::walk;
