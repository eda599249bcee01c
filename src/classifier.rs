//! Markdown 行分类模块
//!
//! 翻译前先确定每一行的结构类型，只翻译内容部分，标题层级和列表标记保持不变。

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-=*_#\s]+$").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(#+)\s+(\S.*?)\s*$").unwrap());
static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([-*+]|\d+[.)])\s+(\S.*?)\s*$").unwrap());
static PLAIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\S.*?)\s*$").unwrap());

/// 行的结构类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// 空行或只有空白
    Blank,
    /// 只由分隔符号组成，如 `---`、`***`、`===`
    Separator,
    /// 标题，`level` 为 `#` 的个数
    Heading { level: usize, content: &'a str },
    /// 列表项，`marker` 为原样保留的 `-`、`*`、`+`、`1.` 或 `1)`
    ListItem { marker: &'a str, content: &'a str },
    /// 其他文本，整行内容作为一个翻译单元
    Plain { content: &'a str },
}

/// 分类后的一行，记录内容在原行中的位置以便替换
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    pub raw: &'a str,
    pub kind: LineKind<'a>,
    content_start: usize,
}

/// 对一行进行分类，按 空行 → 分隔线 → 标题 → 列表项 → 普通文本 的顺序匹配
pub fn classify(line: &str) -> ClassifiedLine<'_> {
    if line.trim().is_empty() {
        return ClassifiedLine::without_content(line, LineKind::Blank);
    }
    if SEPARATOR.is_match(line) {
        return ClassifiedLine::without_content(line, LineKind::Separator);
    }
    if let Some((hashes, content)) = two_groups(&HEADING, line) {
        return ClassifiedLine {
            raw: line,
            kind: LineKind::Heading {
                level: hashes.len(),
                content: content.as_str(),
            },
            content_start: content.start(),
        };
    }
    if let Some((marker, content)) = two_groups(&LIST_ITEM, line) {
        return ClassifiedLine {
            raw: line,
            kind: LineKind::ListItem {
                marker: marker.as_str(),
                content: content.as_str(),
            },
            content_start: content.start(),
        };
    }
    match PLAIN.captures(line).and_then(|caps| caps.get(1)) {
        Some(content) => ClassifiedLine {
            raw: line,
            kind: LineKind::Plain {
                content: content.as_str(),
            },
            content_start: content.start(),
        },
        None => ClassifiedLine::without_content(line, LineKind::Blank),
    }
}

fn two_groups<'a>(pattern: &Regex, line: &'a str) -> Option<(regex::Match<'a>, regex::Match<'a>)> {
    let caps = pattern.captures(line)?;
    Some((caps.get(1)?, caps.get(2)?))
}

impl<'a> ClassifiedLine<'a> {
    fn without_content(raw: &'a str, kind: LineKind<'a>) -> Self {
        Self {
            raw,
            kind,
            content_start: 0,
        }
    }

    /// 需要翻译的内容，空行和分隔线返回 `None`
    pub fn content(&self) -> Option<&'a str> {
        match self.kind {
            LineKind::Blank | LineKind::Separator => None,
            LineKind::Heading { content, .. }
            | LineKind::ListItem { content, .. }
            | LineKind::Plain { content } => Some(content),
        }
    }

    /// 用译文替换内容部分，缩进、标记和行尾空白保持原样
    pub fn with_content(&self, translated: &str) -> String {
        match self.content() {
            Some(content) => {
                let end = self.content_start + content.len();
                format!(
                    "{}{}{}",
                    &self.raw[..self.content_start],
                    translated,
                    &self.raw[end..]
                )
            }
            None => self.raw.to_string(),
        }
    }
}
