//! 目标文字判定：文件预过滤与叶子筛选共用同一个谓词

use std::ops::RangeInclusive;

/// CJK 标点、平假名、片假名、CJK 扩展A、CJK 统一表意文字、兼容表意文字、半角片假名
const TARGET_RANGES: [RangeInclusive<char>; 7] = [
    '\u{3000}'..='\u{303F}',
    '\u{3040}'..='\u{309F}',
    '\u{30A0}'..='\u{30FF}',
    '\u{3400}'..='\u{4DBF}',
    '\u{4E00}'..='\u{9FFF}',
    '\u{F900}'..='\u{FAFF}',
    '\u{FF66}'..='\u{FF9F}',
];

pub fn is_target_char(c: char) -> bool {
    TARGET_RANGES.iter().any(|r| r.contains(&c))
}

/// 字符串中是否至少含有一个目标文字码位
pub fn contains_target_script(text: &str) -> bool {
    text.chars().any(is_target_char)
}

/// 文件级预过滤：原始文本里既没有目标文字，也没有 `\u` 转义时可以跳过解析
pub(crate) fn may_contain_target_script(raw: &str) -> bool {
    contains_target_script(raw) || raw.contains("\\u")
}
