//! 结构化地址：文件位置 + 文档内路径（键/索引序列）

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// 路径中的一段：对象键或数组索引
///
/// 反序列化时先尝试整数，YAML 中带引号的 `'0'` 仍然是键。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    Index(usize),
    Key(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => f.write_str(k),
            Segment::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// 一个标量字符串在某个 JSON 文件中的唯一位置
///
/// 相等、哈希与排序都是结构化的：先比较文件位置，再按字典序比较 dpath。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "path")]
    pub location: PathBuf,
    pub dpath: Vec<Segment>,
}

impl Address {
    pub fn new(location: impl Into<PathBuf>, dpath: Vec<Segment>) -> Self {
        Self {
            location: location.into(),
            dpath,
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// 形如 `a.b.0` 的路径标签；键中含 `.` 时有歧义，只用于显示
    pub fn dpath_label(&self) -> String {
        self.dpath
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// RFC 9535 风格的 JSONPath 标签，字段含特殊字符时使用 bracket-notation
    pub fn json_path(&self) -> String {
        let mut path = String::from("$");
        for segment in &self.dpath {
            match segment {
                Segment::Index(i) => path.push_str(&format!("[{}]", i)),
                Segment::Key(k) if is_plain_key(k) => {
                    path.push('.');
                    path.push_str(k);
                }
                Segment::Key(k) => path.push_str(&format!("['{}']", k.replace('\'', "\\'"))),
            }
        }
        path
    }
}

fn is_plain_key(k: &str) -> bool {
    !k.is_empty()
        && !k.starts_with(|c: char| c.is_ascii_digit())
        && k.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.location.display(), self.dpath_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn addr(file: &str, dpath: Vec<Segment>) -> Address {
        Address::new(file, dpath)
    }

    #[test]
    fn test_display_label() {
        let a = addr("data/a.json", vec!["items".into(), 0.into(), "name".into()]);
        assert_eq!(a.to_string(), "data/a.json:items.0.name");
    }

    #[test]
    fn test_display_is_lossy_for_dotted_keys() {
        let dotted = addr("a.json", vec!["x.y".into()]);
        let nested = addr("a.json", vec!["x".into(), "y".into()]);
        assert_eq!(dotted.to_string(), nested.to_string());
        assert_ne!(dotted, nested, "结构化相等不能受显示标签影响");
    }

    #[test]
    fn test_key_and_index_are_distinct() {
        let key = addr("a.json", vec!["list".into(), Segment::Key("0".into())]);
        let index = addr("a.json", vec!["list".into(), Segment::Index(0)]);
        assert_ne!(key, index);

        let set: HashSet<_> = [key.clone(), index.clone(), key.clone()].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_ordering_by_location_then_dpath() {
        let mut list = vec![
            addr("b.json", vec!["a".into()]),
            addr("a.json", vec!["z".into()]),
            addr("a.json", vec!["a".into(), "b".into()]),
            addr("a.json", vec!["a".into()]),
        ];
        list.sort();
        let labels: Vec<String> = list.iter().map(|a| a.to_string()).collect();
        assert_eq!(labels, vec!["a.json:a", "a.json:a.b", "a.json:z", "b.json:a"]);
    }

    #[test]
    fn test_json_path_label() {
        let a = addr(
            "a.json",
            vec!["items".into(), 2.into(), "key with spaces".into(), "it's".into()],
        );
        assert_eq!(a.json_path(), "$.items[2]['key with spaces']['it\\'s']");
    }
}
