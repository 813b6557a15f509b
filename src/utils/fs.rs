//! IO helper: 文本/JSON 读写与目录枚举，所有错误都带上文件路径

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde_json::Value;
use walkdir::WalkDir;

use crate::model::error::FanyiError;

fn io_err(p: &Path) -> impl FnOnce(std::io::Error) -> FanyiError + '_ {
    move |source| FanyiError::Io {
        path: p.to_path_buf(),
        source,
    }
}

/// 以 UTF-8 读取整个文件
pub fn read_text(p: &Path) -> Result<String, FanyiError> {
    std::fs::read_to_string(p).map_err(io_err(p))
}

/// 写入文本文件（覆盖）
pub fn write_text(p: &Path, text: &str) -> Result<(), FanyiError> {
    std::fs::write(p, text).map_err(io_err(p))
}

/// 将已读入的文本解析为JSON
pub fn parse_json(p: &Path, text: &str) -> Result<Value, FanyiError> {
    serde_json::from_str(text).map_err(|source| FanyiError::Parse {
        path: p.to_path_buf(),
        source,
    })
}

/// 从文件读取JSON数据
pub fn read_json_file(p: &Path) -> Result<Value, FanyiError> {
    let text = read_text(p)?;
    parse_json(p, &text)
}

/// 将JSON数据保存到文件：两空格缩进，非 ASCII 字符原样输出
pub fn write_json_file(p: &Path, value: &Value) -> Result<(), FanyiError> {
    let f = File::create(p).map_err(io_err(p))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, value)
        .map_err(std::io::Error::from)
        .map_err(io_err(p))?;
    w.flush().map_err(io_err(p))?;
    Ok(())
}

/// 递归枚举目录下扩展名为 `extension` 的文件，顺序取决于文件系统
pub fn find_json_files<'a>(
    root: &Path,
    extension: &'a str,
) -> impl Iterator<Item = Result<PathBuf, walkdir::Error>> + 'a {
    WalkDir::new(root).into_iter().filter_map(move |entry| match entry {
        Ok(e) => {
            let matches = e.file_type().is_file()
                && e.path().extension().is_some_and(|ext| ext == extension);
            matches.then(|| Ok(e.into_path()))
        }
        Err(err) => Some(Err(err)),
    })
}
