//! 离线字典后端
//!
//! 不需要网络，按以下顺序处理一段文本：
//! 1. 标题表：整段文本匹配常见章节标题，如 `Overview`、`Step 2`
//! 2. 短语表：按短语长度从长到短替换，忽略大小写，只在词边界处匹配
//!
//! 技能名称表只用于文档的名称字段，按 id 查找（忽略大小写，空格视为 `-`），
//! 见 [`TranslationBackend::known_name`]。

use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeMap;

use super::TranslationBackend;
use crate::error::{Result, TranslationError};

const NAME_TRANSLATIONS: &[(&str, &str)] = &[
    ("algorithmic-art", "算法艺术"),
    ("artifacts-builder", "Artifacts 构建器"),
    ("ask-questions-if-underspecified", "自动追问澄清"),
    ("backend-development", "后端开发"),
    ("brand-guidelines", "品牌指南"),
    ("canvas-design", "Canvas 设计"),
    ("changelog-generator", "更新日志生成器"),
    ("code-documentation", "代码文档"),
    ("code-refactoring", "代码重构"),
    ("code-review", "代码审查"),
    ("competitive-ads-extractor", "竞品广告提取器"),
    ("content-research-writer", "内容研究写作"),
    ("database-design", "数据库设计"),
    ("developer-growth-analysis", "开发者增长分析"),
    ("doc-coauthoring", "文档协作"),
    ("docx", "Word 文档处理"),
    ("domain-name-brainstormer", "域名头脑风暴"),
    ("expo-app-design", "Expo 应用设计"),
    ("expo-deployment", "Expo 部署"),
    ("file-organizer", "文件整理器"),
    ("frontend-design", "前端设计"),
    ("image-enhancer", "图像增强"),
    ("internal-comms", "内部沟通"),
    ("invoice-organizer", "发票整理器"),
    ("javascript-typescript", "JavaScript/TypeScript"),
    ("jira-issues", "Jira 问题管理"),
    ("job-application", "求职申请"),
    ("lead-research-assistant", "潜客研究助手"),
    ("llm-application-dev", "LLM 应用开发"),
    ("mcp-builder", "MCP 构建器"),
    ("meeting-insights-analyzer", "会议洞察分析"),
    ("pdf", "PDF 处理"),
    ("pptx", "PPT 处理"),
    ("python-development", "Python 开发"),
    ("qa-regression", "QA 回归测试"),
    ("raffle-winner-picker", "抽奖器"),
    ("react-best-practices", "React 最佳实践"),
    ("skill-creator", "技能创建器"),
    ("slack-gif-creator", "Slack GIF 制作"),
    ("theme-factory", "主题工厂"),
    ("upgrading-expo", "升级 Expo"),
    ("vercel-deploy", "Vercel 部署"),
    ("video-downloader", "视频下载器"),
    ("web-design-guidelines", "网页设计指南"),
    ("webapp-testing", "Web 应用测试"),
    ("web-artifacts-builder", "Web Artifacts 构建器"),
    ("xlsx", "Excel 处理"),
];

/// 章节标题，整段匹配，`$1` 引用捕获组
const HEADING_TRANSLATIONS: &[(&str, &str)] = &[
    ("Overview", "概述"),
    ("Introduction", "介绍"),
    ("Description", "描述"),
    ("Capabilities", "核心能力"),
    ("Features", "功能特性"),
    ("Usage", "使用方法"),
    ("Examples", "示例代码"),
    ("Instructions", "详细说明"),
    ("Requirements", "环境要求"),
    ("Installation", "安装步骤"),
    ("Configuration", "配置选项"),
    ("Parameters", "参数列表"),
    ("Output", "输出格式"),
    ("Workflow", "工作流程"),
    ("Best Practices", "最佳实践"),
    ("Notes", "注意事项"),
    ("Tips", "实用技巧"),
    ("Prerequisites", "先决条件"),
    (r"Step\s+(\d+)", "第 $1 步"),
];

const PHRASE_TRANSLATIONS: &[(&str, &str)] = &[
    // 引导语
    ("Use this skill when", "适用于以下场景"),
    ("This skill allows you to", "此技能允许你"),
    ("You can use this to", "你可以用它来"),
    ("Make sure to", "请确保"),
    ("For example", "例如"),
    ("In this case", "在这种情况下"),
    ("The following", "以下"),
    ("Please note", "请注意"),
    // 动作
    ("Create", "创建"),
    ("Generate", "生成"),
    ("Build", "构建"),
    ("Design", "设计"),
    ("Automate", "自动化"),
    ("Analyze", "分析"),
    ("Extract", "提取"),
    ("Convert", "转换"),
    ("Upload", "上传"),
    ("Download", "下载"),
    ("Install", "安装"),
    ("Run", "运行"),
    ("Test", "测试"),
    ("Debug", "调试"),
    ("Deploy", "部署"),
    ("Review", "审查"),
    ("Refactor", "重构"),
    ("Optimize", "优化"),
    // 名词
    ("Application", "应用"),
    ("Project", "项目"),
    ("Component", "组件"),
    ("Function", "函数"),
    ("Method", "方法"),
    ("Variable", "变量"),
    ("Database", "数据库"),
    ("Server", "服务器"),
    ("Client", "客户端"),
    ("Frontend", "前端"),
    ("Backend", "后端"),
    ("Interface", "接口"),
    ("User", "用户"),
    ("Request", "请求"),
    ("Response", "响应"),
    ("Error", "错误"),
    ("Success", "成功"),
    ("File", "文件"),
    ("Folder", "文件夹"),
    ("Directory", "目录"),
    ("Image", "图片"),
    ("Video", "视频"),
    ("Audio", "音频"),
    ("Text", "文本"),
    ("Code", "代码"),
    ("Data", "数据"),
    ("Configuration", "配置"),
    ("Settings", "设置"),
    ("Options", "选项"),
    ("Parameters", "参数"),
    ("Arguments", "参数"),
    ("Result", "结果"),
    ("Output", "输出"),
    ("Input", "输入"),
    ("Example", "示例"),
    ("Template", "模板"),
    ("Library", "库"),
    ("Framework", "框架"),
    ("Tool", "工具"),
    ("Script", "脚本"),
    ("Command", "命令"),
    ("using", "使用"),
];

/// 离线字典翻译后端
///
/// 结果完全由词表决定，永远不会失败；不含任何已知短语的文本原样返回。
pub struct DictionaryBackend {
    names: BTreeMap<String, String>,
    headings: Vec<(Regex, String)>,
    phrases: BTreeMap<String, String>,
    compiled: Vec<(Regex, String)>,
}

impl DictionaryBackend {
    /// 不带任何词表的后端
    pub fn empty() -> Self {
        Self {
            names: BTreeMap::new(),
            headings: Vec::new(),
            phrases: BTreeMap::new(),
            compiled: Vec::new(),
        }
    }

    /// 使用内置的名称、标题和短语表
    pub fn builtin() -> Self {
        let mut backend = Self::empty();
        backend.names = NAME_TRANSLATIONS
            .iter()
            .map(|(id, zh)| (id.to_string(), zh.to_string()))
            .collect();
        backend.headings = HEADING_TRANSLATIONS
            .iter()
            .filter_map(|(pattern, zh)| heading_pattern(pattern).ok().map(|re| (re, zh.to_string())))
            .collect();
        backend.phrases = PHRASE_TRANSLATIONS
            .iter()
            .map(|(en, zh)| (en.to_lowercase(), zh.to_string()))
            .collect();
        backend.compile_phrases();
        backend
    }

    /// 追加或覆盖短语
    pub fn with_phrases(mut self, phrases: &BTreeMap<String, String>) -> Self {
        for (en, zh) in phrases {
            let key = en.trim().to_lowercase();
            if !key.is_empty() {
                self.phrases.insert(key, zh.clone());
            }
        }
        self.compile_phrases();
        self
    }

    /// 追加或覆盖技能名称
    pub fn with_names(mut self, names: &BTreeMap<String, String>) -> Self {
        for (id, zh) in names {
            self.names.insert(normalize_name(id), zh.clone());
        }
        self
    }

    /// 追加一个章节标题，`pattern` 为正则，需匹配整段文本
    pub fn with_heading(mut self, pattern: &str, translation: &str) -> Result<Self> {
        let re = heading_pattern(pattern)
            .map_err(|e| TranslationError::Config(format!("invalid heading pattern '{}': {}", pattern, e)))?;
        self.headings.push((re, translation.to_string()));
        Ok(self)
    }

    /// 按短语长度降序编译正则，长短语先于其子串匹配
    fn compile_phrases(&mut self) {
        let mut ordered: Vec<(&String, &String)> = self.phrases.iter().collect();
        ordered.sort_by(|a, b| {
            b.0.chars()
                .count()
                .cmp(&a.0.chars().count())
                .then_with(|| a.0.cmp(b.0))
        });

        self.compiled = ordered
            .into_iter()
            .map(|(en, zh)| (phrase_pattern(en), zh.clone()))
            .collect();
    }

    /// 同步翻译，供 `translate_span` 和测试使用
    pub fn translate_str(&self, text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return text.to_string();
        }

        for (pattern, replacement) in &self.headings {
            if pattern.is_match(trimmed) {
                let translated = pattern.replace(trimmed, replacement.as_str());
                return rewrap(text, trimmed, &translated);
            }
        }

        let mut result = text.to_string();
        for (pattern, replacement) in &self.compiled {
            if pattern.is_match(&result) {
                result = pattern
                    .replace_all(&result, regex::NoExpand(replacement))
                    .into_owned();
            }
        }
        result
    }
}

impl Default for DictionaryBackend {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait]
impl TranslationBackend for DictionaryBackend {
    fn name(&self) -> &str {
        "dictionary"
    }

    fn known_name(&self, id: &str) -> Option<String> {
        self.names.get(&normalize_name(id)).cloned()
    }

    async fn translate_span(&mut self, text: &str) -> String {
        self.translate_str(text)
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

fn heading_pattern(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)^(?:{})$", pattern))
}

/// 只在词边界处匹配：短语首尾是单词字符时才加 `\b`
fn phrase_pattern(phrase: &str) -> Regex {
    let starts_word = phrase.chars().next().is_some_and(is_word_char);
    let ends_word = phrase.chars().last().is_some_and(is_word_char);
    let pattern = format!(
        "(?i){}{}{}",
        if starts_word { r"\b" } else { "" },
        regex::escape(phrase),
        if ends_word { r"\b" } else { "" },
    );
    Regex::new(&pattern).unwrap()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// 保留原文首尾的空白
fn rewrap(original: &str, trimmed: &str, translated: &str) -> String {
    let start = original.len() - original.trim_start().len();
    let end = start + trimmed.len();
    format!("{}{}{}", &original[..start], translated, &original[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_by_id() {
        let backend = DictionaryBackend::builtin();
        assert_eq!(backend.known_name("skill-creator").as_deref(), Some("技能创建器"));
        assert_eq!(backend.known_name("Skill Creator").as_deref(), Some("技能创建器"));
        assert_eq!(backend.known_name("PDF").as_deref(), Some("PDF 处理"));
        assert_eq!(backend.known_name("Skill Creator Guide"), None);
    }

    #[test]
    fn running_text_never_uses_the_name_table() {
        let backend = DictionaryBackend::builtin();
        assert_eq!(backend.translate_str("PDF"), "PDF");
        assert_eq!(backend.translate_str("docx"), "docx");
        assert_eq!(backend.translate_str(" xlsx "), " xlsx ");
    }

    #[test]
    fn headings_match_whole_text_only() {
        let backend = DictionaryBackend::builtin();
        assert_eq!(backend.translate_str("Overview"), "概述");
        assert_eq!(backend.translate_str("best practices"), "最佳实践");
        assert_eq!(backend.translate_str("Step 3"), "第 3 步");
        assert_eq!(backend.translate_str(" Usage "), " 使用方法 ");
        // 不是整段匹配时落到短语表
        assert_eq!(backend.translate_str("Output file"), "输出 文件");
    }

    #[test]
    fn longer_phrases_win_over_substrings() {
        let backend = DictionaryBackend::builtin();
        assert_eq!(
            backend.translate_str("Use this skill when you need a report."),
            "适用于以下场景 you need a report."
        );
        assert_eq!(backend.translate_str("For example, run it."), "例如, 运行 it.");
    }

    #[test]
    fn never_touches_word_internal_substrings() {
        let backend = DictionaryBackend::builtin();
        assert_eq!(backend.translate_str("Running tests"), "Running tests");
        assert_eq!(backend.translate_str("codebase users"), "codebase users");
        assert_eq!(backend.translate_str("__SPAN_0__ code"), "__SPAN_0__ 代码");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let backend = DictionaryBackend::builtin();
        assert_eq!(backend.translate_str("create a DATABASE"), "创建 a 数据库");
    }

    #[test]
    fn unknown_text_is_unchanged() {
        let backend = DictionaryBackend::builtin();
        let text = "Nothing recognised here.";
        assert_eq!(backend.translate_str(text), text);
        assert_eq!(backend.translate_str(&backend.translate_str(text)), text);
    }

    #[test]
    fn extra_phrases_extend_builtin_table() {
        let mut extra = BTreeMap::new();
        extra.insert("pull request".to_string(), "拉取请求".to_string());
        let backend = DictionaryBackend::builtin().with_phrases(&extra);
        assert_eq!(backend.translate_str("Open a pull request"), "Open a 拉取请求");
    }

    #[test]
    fn replacement_text_is_literal() {
        let mut extra = BTreeMap::new();
        extra.insert("price".to_string(), "$1 价格".to_string());
        let backend = DictionaryBackend::empty().with_phrases(&extra);
        assert_eq!(backend.translate_str("price"), "$1 价格");
    }

    #[test]
    fn custom_heading_patterns() {
        let backend = DictionaryBackend::empty()
            .with_heading(r"Phase\s+(\d+)", "第 $1 阶段")
            .unwrap();
        assert_eq!(backend.translate_str("phase 3"), "第 3 阶段");
        assert!(DictionaryBackend::empty().with_heading("(unclosed", "x").is_err());
    }
}
