//! 翻译条目与映射文件（YAML）读写

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::address::Address;
use crate::model::error::FanyiError;
use crate::utils::fs::{read_text, write_text};

/// 扫描与回写之间的工作单元
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    #[serde(rename = "ori")]
    pub source: String,
    /// 初始为空，由批量翻译或手工编辑填写
    #[serde(rename = "trans", default)]
    pub translated: String,
    #[serde(rename = "path")]
    pub address: Address,
}

impl TranslationEntry {
    pub fn new(address: Address, source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translated: String::new(),
            address,
        }
    }

    /// 尚未得到译文（首次扫描后，或所在批次翻译失败）
    pub fn is_pending(&self) -> bool {
        self.translated.is_empty()
    }
}

/// 读取映射文件；记录顺序与文件中一致
pub fn load_mapping(path: &Path) -> Result<Vec<TranslationEntry>, FanyiError> {
    let text = read_text(path)?;
    let entries: Vec<TranslationEntry> =
        serde_yaml::from_str(&text).map_err(|source| FanyiError::Mapping {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!("已加载 {} 条翻译记录: {}", entries.len(), path.display());
    Ok(entries)
}

/// 保存映射文件，覆盖已有内容
pub fn save_mapping(path: &Path, entries: &[TranslationEntry]) -> Result<(), FanyiError> {
    let text = serde_yaml::to_string(entries).map_err(|source| FanyiError::Mapping {
        path: path.to_path_buf(),
        source,
    })?;
    write_text(path, &text)?;
    tracing::info!("已保存 {} 条翻译记录: {}", entries.len(), path.display());
    Ok(())
}
