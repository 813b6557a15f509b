//! 错误类型：扫描、回写与映射文件共用一个枚举，翻译协作方单独一个

use std::path::PathBuf;

use thiserror::Error;

use crate::model::address::Segment;

#[derive(Error, Debug)]
pub enum FanyiError {
    #[error("IO失败 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON解析失败 {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("映射文件错误 {path}: {source}")]
    Mapping {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("键不存在 {location}: 第{depth}层缺少键 {key:?}")]
    KeyNotFound {
        location: PathBuf,
        key: String,
        depth: usize,
    },
    #[error("索引越界 {location}: 第{depth}层索引 {index} 超出长度 {len}")]
    IndexOutOfRange {
        location: PathBuf,
        index: usize,
        len: usize,
        depth: usize,
    },
    #[error("无法下钻 {location}: 第{depth}层的值不能用 {segment} 索引")]
    NotAContainer {
        location: PathBuf,
        segment: Segment,
        depth: usize,
    },
    #[error("空路径 {location}: dpath 不能为空")]
    EmptyPath { location: PathBuf },
    #[error("不是目录: {0}")]
    NotADirectory(PathBuf),
    #[error("目录遍历失败: {0}")]
    Walk(#[from] walkdir::Error),
}

/// 翻译协作方（远端服务）错误，只影响所在批次
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("传输失败: {0}")]
    Transport(String),
    #[error("响应格式错误: {0}")]
    MalformedResponse(String),
    #[error("译文数量不符: 期望 {expected}，实际 {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}
