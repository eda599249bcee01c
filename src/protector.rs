//! 代码片段保护模块
//!
//! 在翻译前把围栏代码块和行内代码替换成带序号的占位符，翻译完成后再原样还原。
//! 还原是整篇文档级别的：只要有一个占位符丢失或重复，整个还原就失败。

use crate::error::{Result, TranslationError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static FENCED_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`\n]+`").unwrap());

const MARKER_BASE: &str = "__SPAN_";

/// 受保护片段的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// ```` ``` ```` 围栏代码块，可跨多行
    Fenced,
    /// `` ` `` 行内代码，不跨行
    Inline,
}

/// 一个不参与翻译的片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedSpan {
    /// 占位符序号，同时也是片段在正文中的先后顺序
    pub index: usize,
    pub kind: SpanKind,
    /// 片段在原始正文中的字节范围
    pub range: Range<usize>,
    /// 片段原文，包括分隔符
    pub content: String,
}

/// 替换掉代码片段后的正文
#[derive(Debug, Clone)]
pub struct ProtectedBody {
    text: String,
    spans: Vec<ProtectedSpan>,
    marker: String,
    token_pattern: Regex,
}

/// 识别正文中的代码片段并替换为占位符
///
/// 先识别围栏代码块（到最近的闭合分隔符为止），再在剩余文本中识别行内代码。
/// 没有闭合的围栏不视为代码块，按普通文本处理。
pub fn protect(body: &str) -> ProtectedBody {
    let marker = choose_marker(body);
    let token_pattern = Regex::new(&format!(r"{}(\d+)__", regex::escape(&marker))).unwrap();

    let ranges = find_code_spans(body);
    let mut text = String::with_capacity(body.len());
    let mut spans = Vec::with_capacity(ranges.len());
    let mut last_end = 0;

    for (index, (kind, range)) in ranges.into_iter().enumerate() {
        text.push_str(&body[last_end..range.start]);
        text.push_str(&format!("{}{}__", marker, index));
        last_end = range.end;
        spans.push(ProtectedSpan {
            index,
            kind,
            content: body[range.clone()].to_string(),
            range,
        });
    }
    text.push_str(&body[last_end..]);

    ProtectedBody {
        text,
        spans,
        marker,
        token_pattern,
    }
}

/// 选择一个在正文中不存在的占位符前缀
fn choose_marker(body: &str) -> String {
    let mut marker = MARKER_BASE.to_string();
    while body.contains(&marker) {
        marker.insert(2, 'X');
    }
    marker
}

fn find_code_spans(body: &str) -> Vec<(SpanKind, Range<usize>)> {
    let fenced: Vec<Range<usize>> = FENCED_CODE.find_iter(body).map(|m| m.range()).collect();

    let mut spans = Vec::new();
    let mut gap_start = 0;
    for fence in fenced.iter().cloned().chain(std::iter::once(body.len()..body.len())) {
        let gap = &body[gap_start..fence.start];
        for m in INLINE_CODE.find_iter(gap) {
            spans.push((SpanKind::Inline, gap_start + m.start()..gap_start + m.end()));
        }
        if !fence.is_empty() {
            spans.push((SpanKind::Fenced, fence.clone()));
        }
        gap_start = fence.end;
    }
    spans
}

impl ProtectedBody {
    /// 替换后的正文
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[ProtectedSpan] {
        &self.spans
    }

    /// 第 `index` 个片段的占位符
    pub fn token(&self, index: usize) -> String {
        format!("{}{}__", self.marker, index)
    }

    /// 按出现顺序列出一段文本中的占位符序号
    pub fn placeholders_in(&self, text: &str) -> Vec<usize> {
        self.token_pattern
            .captures_iter(text)
            .filter_map(|caps| caps[1].parse().ok())
            .collect()
    }

    /// 去掉占位符后的文本，用于判断一行是否还有需要翻译的内容
    pub fn strip_placeholders(&self, text: &str) -> String {
        self.token_pattern.replace_all(text, "").into_owned()
    }

    /// 把占位符还原为片段原文
    ///
    /// 每个片段的占位符必须恰好出现一次，且不能出现未知序号，否则返回
    /// `TranslationError::SpanRestore`，不做部分还原。
    pub fn restore(&self, translated: &str) -> Result<String> {
        let mut seen = vec![0usize; self.spans.len()];
        for index in self.placeholders_in(translated) {
            match seen.get_mut(index) {
                Some(count) => *count += 1,
                None => return Err(TranslationError::SpanRestore { index }),
            }
        }
        if let Some(index) = seen.iter().position(|&count| count != 1) {
            return Err(TranslationError::SpanRestore { index });
        }

        let restored = self.token_pattern.replace_all(translated, |caps: &regex::Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| self.spans.get(index))
                .map(|span| span.content.clone())
                .unwrap_or_else(|| caps[0].to_string())
        });
        Ok(restored.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(body: &str) {
        let protected = protect(body);
        assert_eq!(protected.restore(protected.text()).unwrap(), body);
    }

    #[test]
    fn restores_bodies_byte_for_byte() {
        round_trip("");
        round_trip("no code at all\n");
        round_trip("Run `foo.sh` to start.\n");
        round_trip("```bash\nnpm install\n```\n\nThen `npm test`.");
        round_trip("```\n`inline` inside fence\n```\n`a` and `b`\n```js\nx\n```");
        round_trip("  ```\n  indented   \n  ```  \r\ntrailing\r\n");
        round_trip("unicode `列表` 和 ```\n代码\n``` 结束");
    }

    /// 由片段拼出的所有三段以内的正文
    fn generated_bodies() -> Vec<String> {
        const FRAGMENTS: &[&str] = &[
            "text ",
            "`a`",
            "`",
            "``",
            "```",
            "``x``",
            "```sh\necho `hi`\n```",
            "\n",
            "\r\n",
            "__SPAN_0__",
            "__XSPAN_1__",
            "列表",
        ];

        let mut bodies = vec![String::new()];
        let mut frontier = vec![String::new()];
        for _ in 0..3 {
            frontier = frontier
                .iter()
                .flat_map(|prefix| FRAGMENTS.iter().map(move |f| format!("{}{}", prefix, f)))
                .collect();
            bodies.extend(frontier.iter().cloned());
        }
        bodies
    }

    #[test]
    fn generated_bodies_round_trip() {
        let bodies = generated_bodies();
        assert_eq!(bodies.len(), 1 + 12 + 144 + 1728);

        for body in &bodies {
            let protected = protect(body);
            assert_eq!(protected.restore(protected.text()).unwrap(), *body, "body: {:?}", body);

            let mut last_end = 0;
            for (i, span) in protected.spans().iter().enumerate() {
                assert_eq!(span.index, i);
                assert!(span.range.start >= last_end, "overlap in {:?}", body);
                assert_eq!(&body[span.range.clone()], span.content);
                assert!(!protected.strip_placeholders(protected.text()).contains(&protected.token(i)));
                last_end = span.range.end;
            }
            assert_eq!(
                protected.placeholders_in(protected.text()),
                (0..protected.spans().len()).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn fenced_blocks_take_priority_over_inline() {
        let protected = protect("a ```x `y` z``` b `c`");
        let kinds: Vec<SpanKind> = protected.spans().iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SpanKind::Fenced, SpanKind::Inline]);
        assert_eq!(protected.spans()[0].content, "```x `y` z```");
        assert_eq!(protected.spans()[1].content, "`c`");
        assert_eq!(protected.text(), "a __SPAN_0__ b __SPAN_1__");
    }

    #[test]
    fn spans_record_original_offsets() {
        let body = "see `cfg` and ```\nrun\n```";
        let protected = protect(body);
        for span in protected.spans() {
            assert_eq!(&body[span.range.clone()], span.content);
        }
        assert!(protected.spans()[0].range.end <= protected.spans()[1].range.start);
    }

    #[test]
    fn unterminated_fence_stays_plain_text() {
        let body = "intro\n```python\nprint('hi')\nstill `code`?";
        let protected = protect(body);
        assert_eq!(protected.spans().len(), 1);
        assert_eq!(protected.spans()[0].kind, SpanKind::Inline);
        assert!(protected.text().contains("```python\nprint('hi')"));
        assert_eq!(protected.restore(protected.text()).unwrap(), body);
    }

    #[test]
    fn marker_avoids_text_already_in_body() {
        let body = "literal __SPAN_0__ text with `code`";
        let protected = protect(body);
        assert_eq!(protected.token(0), "__XSPAN_0__");
        assert_eq!(protected.placeholders_in(protected.text()), vec![0]);
        assert_eq!(protected.restore(protected.text()).unwrap(), body);
    }

    #[test]
    fn restore_rejects_missing_placeholder() {
        let protected = protect("`a` then `b`");
        let damaged = protected.text().replace(&protected.token(1), "");
        let err = protected.restore(&damaged).unwrap_err();
        assert!(matches!(err, TranslationError::SpanRestore { index: 1 }));
    }

    #[test]
    fn restore_rejects_duplicated_or_unknown_placeholder() {
        let protected = protect("`a`");
        let doubled = format!("{} {}", protected.text(), protected.token(0));
        assert!(protected.restore(&doubled).is_err());

        let unknown = format!("{} {}", protected.text(), protected.token(7));
        assert!(matches!(
            protected.restore(&unknown),
            Err(TranslationError::SpanRestore { index: 7 })
        ));
    }

    #[test]
    fn restore_accepts_translated_surroundings() {
        let protected = protect("Run `foo.sh` to start.");
        let translated = format!("运行 {} 以启动。", protected.token(0));
        assert_eq!(protected.restore(&translated).unwrap(), "运行 `foo.sh` 以启动。");
    }

    #[test]
    fn strip_placeholders_leaves_only_prose() {
        let protected = protect("`a` and `b`");
        assert_eq!(protected.strip_placeholders(protected.text()), " and ");
    }
}
