//! 文档翻译模块
//!
//! 把一篇技能文档的名称、描述、分类和 Markdown 正文翻译成目标语言。
//! 正文按行处理：代码片段先被占位符替换，每行分类后只翻译内容部分，
//! 最后再还原代码片段。任何一行翻译出问题都只影响这一行。

use log::{debug, warn};
use std::collections::BTreeMap;

use crate::backend::{translate_text, TranslationBackend};
use crate::classifier::classify;
use crate::config::TranslationLibConfig;
use crate::document::{Document, TranslatedDocument};
use crate::protector::{protect, ProtectedBody};

/// 默认的分类翻译表
pub fn default_categories() -> BTreeMap<String, String> {
    [
        ("development", "开发工具"),
        ("workflow", "工作流"),
        ("testing", "测试"),
        ("documentation", "文档"),
        ("backend", "后端"),
        ("frontend", "前端"),
        ("data", "数据"),
        ("security", "安全"),
        ("devops", "DevOps"),
        ("tools", "工具"),
        ("design", "设计"),
        ("productivity", "生产力"),
    ]
    .into_iter()
    .map(|(en, zh)| (en.to_string(), zh.to_string()))
    .collect()
}

/// 文档翻译器
///
/// # 示例
///
/// ```rust
/// use skill_translator::{DictionaryBackend, DocumentTranslator};
///
/// # tokio_test::block_on(async {
/// let translator = DocumentTranslator::default();
/// let mut backend = DictionaryBackend::builtin();
///
/// let body = translator.translate_body("## Usage\nRun `foo.sh`.", &mut backend).await;
/// assert_eq!(body, "## 使用方法\n运行 `foo.sh`.");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct DocumentTranslator {
    categories: BTreeMap<String, String>,
    suffix: String,
}

impl Default for DocumentTranslator {
    fn default() -> Self {
        Self::new(default_categories(), "zh")
    }
}

impl DocumentTranslator {
    pub fn new(categories: BTreeMap<String, String>, suffix: &str) -> Self {
        let categories = categories
            .into_iter()
            .map(|(en, zh)| (en.trim().to_lowercase(), zh))
            .collect();
        Self {
            categories,
            suffix: suffix.to_string(),
        }
    }

    pub fn from_config(config: &TranslationLibConfig) -> Self {
        Self::new(config.categories.clone(), &config.translation.field_suffix)
    }

    /// 分类只查表，不在表中的分类原样保留
    pub fn translate_category(&self, category: &str) -> String {
        self.categories
            .get(&category.trim().to_lowercase())
            .cloned()
            .unwrap_or_else(|| category.to_string())
    }

    /// 翻译一篇文档；缺失的字段跳过，不会失败
    ///
    /// 名称先按 id、再按名称本身查后端的固定译名，都没有时才交给后端翻译。
    /// 名称和描述与正文走同一套代码保护流程。
    pub async fn translate(
        &self,
        document: &Document,
        backend: &mut dyn TranslationBackend,
    ) -> TranslatedDocument {
        let mut translated = TranslatedDocument::new(document.clone(), &self.suffix);

        if let Some(name) = &document.name {
            let known = backend
                .known_name(&document.id)
                .or_else(|| backend.known_name(name));
            translated.name = Some(match known {
                Some(known) => known,
                None => self.translate_body(name, backend).await,
            });
        }
        if let Some(description) = &document.description {
            translated.description = Some(self.translate_body(description, backend).await);
        }
        if let Some(category) = &document.category {
            translated.category = Some(self.translate_category(category));
        }
        if let Some(body) = &document.body {
            translated.body = Some(self.translate_body(body, backend).await);
        }

        translated
    }

    /// 翻译 Markdown 正文，代码片段、标题层级、列表标记和行数保持不变
    pub async fn translate_body(&self, body: &str, backend: &mut dyn TranslationBackend) -> String {
        let protected = protect(body);
        debug!("Protected {} code spans", protected.spans().len());

        let mut lines = Vec::new();
        for line in protected.text().split('\n') {
            lines.push(self.translate_line(line, &protected, backend).await);
        }

        match protected.restore(&lines.join("\n")) {
            Ok(restored) => restored,
            Err(e) => {
                warn!("Failed to restore protected spans ({}), keeping original body", e);
                body.to_string()
            }
        }
    }

    async fn translate_line(
        &self,
        line: &str,
        protected: &ProtectedBody,
        backend: &mut dyn TranslationBackend,
    ) -> String {
        let classified = classify(line);
        let Some(content) = classified.content() else {
            return line.to_string();
        };

        // 只剩占位符和标点的行没有可翻译的内容
        if !protected.strip_placeholders(content).chars().any(char::is_alphabetic) {
            return line.to_string();
        }

        let translated = translate_text(backend, content).await;
        if !keeps_structure(protected, content, &translated) {
            warn!("Translation altered placeholders or line breaks, keeping original line");
            return line.to_string();
        }
        classified.with_content(&translated)
    }
}

/// 译文必须保留原行的全部占位符（允许调整顺序），且不能引入换行
fn keeps_structure(protected: &ProtectedBody, original: &str, translated: &str) -> bool {
    if translated.contains('\n') || translated.contains('\r') {
        return false;
    }
    let mut expected = protected.placeholders_in(original);
    let mut actual = protected.placeholders_in(translated);
    expected.sort_unstable();
    actual.sort_unstable();
    expected == actual
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DictionaryBackend;
    use async_trait::async_trait;
    use serde_json::json;

    /// 把文本转成大写，用来观察哪些部分被送去翻译
    struct Shouting;

    #[async_trait]
    impl TranslationBackend for Shouting {
        fn name(&self) -> &str {
            "shouting"
        }

        async fn translate_span(&mut self, text: &str) -> String {
            text.to_uppercase()
        }
    }

    /// 返回固定内容的后端
    struct Fixed(&'static str);

    #[async_trait]
    impl TranslationBackend for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn translate_span(&mut self, _text: &str) -> String {
            self.0.to_string()
        }
    }

    fn usage_dictionary() -> DictionaryBackend {
        let mut phrases = BTreeMap::new();
        phrases.insert("Usage".to_string(), "使用".to_string());
        DictionaryBackend::empty().with_phrases(&phrases)
    }

    #[tokio::test]
    async fn heading_translated_and_inline_code_untouched() {
        let translator = DocumentTranslator::default();
        let mut backend = usage_dictionary();
        let body = "## Usage\nRun `foo.sh` to start.\n";

        let translated = translator.translate_body(body, &mut backend).await;
        assert_eq!(translated, "## 使用\nRun `foo.sh` to start.\n");
    }

    #[tokio::test]
    async fn fenced_code_is_never_sent_to_backend() {
        let translator = DocumentTranslator::default();
        let body = "# title\n\n```bash\necho hello\n```\n- item `x`\n1. step\n---\n";

        let translated = translator.translate_body(body, &mut Shouting).await;
        assert_eq!(
            translated,
            "# TITLE\n\n```bash\necho hello\n```\n- ITEM `x`\n1. STEP\n---\n"
        );
    }

    #[tokio::test]
    async fn line_count_is_preserved() {
        let translator = DocumentTranslator::default();
        let body = "a\n\n```\nb\n\nc\n```\n  - d\r\ne";
        let translated = translator.translate_body(body, &mut Shouting).await;
        assert_eq!(translated.split('\n').count(), body.split('\n').count());
        assert_eq!(translated, "A\n\n```\nb\n\nc\n```\n  - D\r\nE");
    }

    #[tokio::test]
    async fn dropped_placeholder_keeps_original_line() {
        let translator = DocumentTranslator::default();
        let body = "Run `cargo test` now\nplain line";
        let translated = translator.translate_body(body, &mut Fixed("没有占位符")).await;
        assert_eq!(translated, "Run `cargo test` now\n没有占位符");
    }

    #[tokio::test]
    async fn introduced_line_breaks_are_rejected() {
        let translator = DocumentTranslator::default();
        let translated = translator.translate_body("one line", &mut Fixed("two\nlines")).await;
        assert_eq!(translated, "one line");
    }

    #[tokio::test]
    async fn unterminated_fence_is_translated_as_text() {
        let translator = DocumentTranslator::default();
        let translated = translator.translate_body("```\nopen fence", &mut Shouting).await;
        assert_eq!(translated, "```\nOPEN FENCE");
    }

    #[tokio::test]
    async fn document_fields_and_category_table() {
        let translator = DocumentTranslator::default();
        let mut backend = DictionaryBackend::builtin();
        let document = Document::from_record(json!({
            "id": "code-review",
            "name": "code-review",
            "description": "Review code before merging",
            "category": "Development",
            "body": "## Overview\nCreate a `Makefile`."
        }));

        let translated = translator.translate(&document, &mut backend).await;
        assert_eq!(translated.name.as_deref(), Some("代码审查"));
        assert_eq!(translated.description.as_deref(), Some("审查 代码 before merging"));
        assert_eq!(translated.category.as_deref(), Some("开发工具"));
        assert_eq!(translated.body.as_deref(), Some("## 概述\n创建 a `Makefile`."));
    }

    #[tokio::test]
    async fn inline_code_in_description_is_protected() {
        let translator = DocumentTranslator::default();
        let mut backend = DictionaryBackend::builtin();
        let document = Document::from_record(json!({
            "id": "deploy-check",
            "name": "Run `test` first",
            "description": "Run `test` before you deploy"
        }));

        let translated = translator.translate(&document, &mut backend).await;
        assert_eq!(translated.description.as_deref(), Some("运行 `test` before you 部署"));
        assert_eq!(translated.name.as_deref(), Some("运行 `test` first"));
        assert_eq!(
            translator.translate_body("Run `test` before you deploy", &mut backend).await,
            "运行 `test` before you 部署"
        );
    }

    #[tokio::test]
    async fn known_name_looked_up_by_id_then_name() {
        let translator = DocumentTranslator::default();
        let mut backend = DictionaryBackend::builtin();

        let by_id = Document::from_record(json!({ "id": "skill-creator", "name": "Skill Creator Guide" }));
        let translated = translator.translate(&by_id, &mut backend).await;
        assert_eq!(translated.name.as_deref(), Some("技能创建器"));

        let by_name = Document::from_record(json!({ "id": "my-review", "name": "Code Review" }));
        let translated = translator.translate(&by_name, &mut backend).await;
        assert_eq!(translated.name.as_deref(), Some("代码审查"));

        let unknown = Document::from_record(json!({ "id": "helper", "name": "Review Helper" }));
        let translated = translator.translate(&unknown, &mut backend).await;
        assert_eq!(translated.name.as_deref(), Some("审查 Helper"));
    }

    #[tokio::test]
    async fn name_table_does_not_leak_into_body() {
        let translator = DocumentTranslator::default();
        let mut backend = DictionaryBackend::builtin();
        let body = translator.translate_body("# PDF\n- docx\nxlsx", &mut backend).await;
        assert_eq!(body, "# PDF\n- docx\nxlsx");
    }

    #[tokio::test]
    async fn unknown_category_passes_through() {
        let translator = DocumentTranslator::default();
        let document = Document::from_record(json!({ "id": "x", "category": "Marketing" }));
        let translated = translator.translate(&document, &mut Shouting).await;
        assert_eq!(translated.category.as_deref(), Some("Marketing"));
        assert_eq!(translated.name, None);
        assert_eq!(translated.body, None);
    }
}
