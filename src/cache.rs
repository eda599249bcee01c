//! 翻译缓存模块
//!
//! 以原文为键保存已经获得的译文，避免中断后重新运行时重复请求。
//! 缓存文件是一个 JSON 对象（原文 -> 译文），启动时尽力读取，损坏或缺失都视为空缓存。

use crate::error::Result;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 缓存命中统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// 持久化的翻译缓存
#[derive(Debug, Default)]
pub struct CacheStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
    hits: usize,
    misses: usize,
}

impl CacheStore {
    /// 不落盘的缓存
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// 从文件加载缓存，文件不存在或无法解析时返回空缓存
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let entries = match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(entries) => {
                    debug!("Loaded {} cached translations from {}", entries.len(), path.display());
                    entries
                }
                Err(e) => {
                    warn!("Cache file {} is unreadable ({}), starting empty", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read cache file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            path: Some(path.to_path_buf()),
            entries,
            hits: 0,
            misses: 0,
        }
    }

    /// 精确匹配查找
    pub fn get(&mut self, source: &str) -> Option<String> {
        match self.entries.get(source) {
            Some(translation) => {
                self.hits += 1;
                debug!("Cache hit for '{}'", truncate_text(source, 30));
                Some(translation.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// 写入一条译文，同一原文只保留最新的一条
    pub fn insert(&mut self, source: &str, translation: &str) {
        self.entries.insert(source.to_string(), translation.to_string());
    }

    /// 把缓存写回文件；内存缓存直接返回
    ///
    /// 先写临时文件再重命名，避免中途被打断时留下半个 JSON。
    pub fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_json_atomically(path, &self.entries)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

/// 以 pretty JSON 写入文件，先写同目录临时文件再重命名
pub(crate) fn write_json_atomically<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// 截断过长的文本用于日志输出
pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
