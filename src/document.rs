//! 技能文档数据结构
//!
//! 文档以原始 JSON 记录的形式保存，字段在加载时尽力解析：缺失或类型不对的字段
//! 只会被当作不存在，不影响其他字段和其他文档。写出时保留原记录的全部内容。

use crate::error::Result;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// 一个技能描述文档
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    /// Markdown 正文
    pub body: Option<String>,
    /// 来源仓库
    pub source: Option<String>,
    pub html_url: Option<String>,
    record: Value,
}

impl Document {
    /// 从原始 JSON 记录构造文档，不会失败
    pub fn from_record(record: Value) -> Self {
        let string_field = |key: &str| record.get(key).and_then(Value::as_str).map(str::to_string);

        let id = match record.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => String::new(),
        };
        let tags = record
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            id,
            name: string_field("name"),
            description: string_field("description"),
            category: string_field("category"),
            tags,
            body: string_field("body"),
            source: string_field("source"),
            html_url: string_field("html_url"),
            record,
        }
    }

    /// 原始记录
    pub fn record(&self) -> &Value {
        &self.record
    }

    /// 日志中使用的名称
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.record.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Document::from_record)
    }
}

/// 翻译后的文档：原文档加上各字段的译文
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedDocument {
    pub original: Document,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub body: Option<String>,
    suffix: String,
}

impl TranslatedDocument {
    pub fn new(original: Document, suffix: &str) -> Self {
        Self {
            original,
            name: None,
            description: None,
            category: None,
            body: None,
            suffix: suffix.to_string(),
        }
    }

    /// 译文字段名，如 `body_zh`
    pub fn field_name(&self, field: &str) -> String {
        format!("{}_{}", field, self.suffix)
    }

    /// 原记录加上译文字段，旧的译文字段会被覆盖
    pub fn to_record(&self) -> Value {
        let Value::Object(original) = self.original.record() else {
            return self.original.record().clone();
        };

        let mut record: Map<String, Value> = original.clone();
        let fields = [
            ("name", &self.name),
            ("description", &self.description),
            ("category", &self.category),
            ("body", &self.body),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                record.insert(self.field_name(field), Value::String(value.clone()));
            }
        }
        Value::Object(record)
    }
}

impl Serialize for TranslatedDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}

/// 读取输入文件（JSON 数组）
///
/// 文件不存在或不是 JSON 数组时返回错误；数组中的单条记录不会导致失败。
pub fn load_documents<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let content = fs::read_to_string(path.as_ref())?;
    let records: Vec<Value> = serde_json::from_str(&content)?;
    let documents: Vec<Document> = records.into_iter().map(Document::from_record).collect();

    for (i, document) in documents.iter().enumerate() {
        if !document.record().is_object() {
            warn!("Record #{} is not a JSON object, it will be passed through untouched", i + 1);
        } else if document.body.is_none() {
            warn!("Document '{}' has no body", document.label());
        }
    }
    Ok(documents)
}
