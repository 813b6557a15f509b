//! 文档遍历：深度优先枚举所有含目标文字的字符串叶子
//!
//! 迭代器是惰性的，内部用显式栈代替递归，深层嵌套不会耗尽调用栈。

use serde_json::{map, Value};

use crate::model::address::Segment;
use crate::model::script::contains_target_script;

enum Frame<'a> {
    Object(map::Iter<'a>),
    Array(std::iter::Enumerate<std::slice::Iter<'a, Value>>),
}

impl<'a> Frame<'a> {
    fn of(value: &'a Value) -> Option<Self> {
        match value {
            Value::Object(m) => Some(Frame::Object(m.iter())),
            Value::Array(a) => Some(Frame::Array(a.iter().enumerate())),
            _ => None,
        }
    }
}

/// `walk` 返回的迭代器，产出 `(dpath, 叶子值)`
pub struct Walk<'a> {
    root: Option<&'a Value>,
    stack: Vec<Frame<'a>>,
    /// 当前所在容器的路径，长度始终等于 `stack.len() - 1`
    path: Vec<Segment>,
}

/// 从根开始遍历；对象按键的迭代顺序，数组按下标升序
///
/// 根本身是字符串时不产出任何结果（dpath 不能为空）。同一输入再次调用会得到相同序列。
pub fn walk(root: &Value) -> Walk<'_> {
    Walk {
        root: Some(root),
        stack: Vec::new(),
        path: Vec::new(),
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (Vec<Segment>, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            self.stack.extend(Frame::of(root));
        }
        loop {
            // serde_json 的对象键只能是字符串，不存在需要跳过的键类型
            let child = match self.stack.last_mut()? {
                Frame::Object(it) => it.next().map(|(k, v)| (Segment::Key(k.clone()), v)),
                Frame::Array(it) => it.next().map(|(i, v)| (Segment::Index(i), v)),
            };
            let Some((segment, value)) = child else {
                self.stack.pop();
                self.path.pop();
                continue;
            };
            match value {
                Value::String(s) if contains_target_script(s) => {
                    let mut dpath = self.path.clone();
                    dpath.push(segment);
                    tracing::debug!("找到目标文字 {:?} = {}", dpath, s);
                    return Some((dpath, s.as_str()));
                }
                Value::Object(_) | Value::Array(_) => {
                    self.path.push(segment);
                    self.stack.extend(Frame::of(value));
                }
                _ => {}
            }
        }
    }
}

/// 按 dpath 逐段下钻，路径不再成立时返回 None
pub fn resolve<'a>(root: &'a Value, dpath: &[Segment]) -> Option<&'a Value> {
    dpath.iter().try_fold(root, |cur, segment| match (cur, segment) {
        (Value::Object(m), Segment::Key(k)) => m.get(k),
        (Value::Array(a), Segment::Index(i)) => a.get(*i),
        _ => None,
    })
}
