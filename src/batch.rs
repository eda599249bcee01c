//! 批量翻译模块
//!
//! 按输入顺序逐篇翻译文档，每翻译固定数量的文档就把"已翻译部分 + 未翻译部分"
//! 写到输出文件，输出文件在任何时刻都是完整、合法的 JSON。

use log::{info, warn};
use serde_json::Value;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::backend::TranslationBackend;
use crate::cache::write_json_atomically;
use crate::config::TranslationLibConfig;
use crate::document::{Document, TranslatedDocument};
use crate::error::Result;
use crate::translator::DocumentTranslator;

/// 一次批量翻译的结果
#[derive(Debug)]
pub struct BatchOutcome {
    /// 已完成翻译的文档，按输入顺序
    pub translated: Vec<TranslatedDocument>,
    /// 输入文档总数
    pub total: usize,
    /// 是否被中断
    pub interrupted: bool,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        !self.interrupted && self.translated.len() == self.total
    }
}

/// 批量翻译执行器
#[derive(Debug, Clone)]
pub struct BatchRunner {
    translator: DocumentTranslator,
    output: PathBuf,
    checkpoint_size: usize,
}

impl BatchRunner {
    pub fn new<P: Into<PathBuf>>(translator: DocumentTranslator, output: P) -> Self {
        Self {
            translator,
            output: output.into(),
            checkpoint_size: 5,
        }
    }

    pub fn from_config(config: &TranslationLibConfig) -> Self {
        Self::new(DocumentTranslator::from_config(config), &config.paths.output)
            .with_checkpoint_size(config.batch.checkpoint_size)
    }

    pub fn with_checkpoint_size(mut self, checkpoint_size: usize) -> Self {
        self.checkpoint_size = checkpoint_size.max(1);
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// 翻译全部文档
    pub async fn run_all(
        &self,
        documents: &[Document],
        backend: &mut dyn TranslationBackend,
    ) -> Result<BatchOutcome> {
        self.run_until(documents, backend, std::future::pending()).await
    }

    /// 翻译全部文档，`shutdown` 完成时停止
    ///
    /// 中断时正在翻译的文档被放弃，已完成的部分连同未翻译的部分一起写入输出文件。
    /// 只有输出文件完全无法写入时才返回错误。
    pub async fn run_until<F>(
        &self,
        documents: &[Document],
        backend: &mut dyn TranslationBackend,
        shutdown: F,
    ) -> Result<BatchOutcome>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let total = documents.len();
        // 先写一次未翻译的输入，确认输出位置可写
        self.write_checkpoint(&[], documents)?;

        let mut translated = Vec::with_capacity(total);
        let mut interrupted = false;

        for (i, document) in documents.iter().enumerate() {
            info!("[{}/{}] 处理: {}", i + 1, total, document.label());

            let result = tokio::select! {
                biased;
                _ = &mut shutdown => None,
                doc = self.translator.translate(document, backend) => Some(doc),
            };

            match result {
                Some(doc) => translated.push(doc),
                None => {
                    warn!("用户中断，保存已翻译内容 ({}/{})", translated.len(), total);
                    interrupted = true;
                    break;
                }
            }

            let done = i + 1;
            if done % self.checkpoint_size == 0 && done < total {
                match self.write_checkpoint(&translated, &documents[done..]) {
                    Ok(()) => info!("进度已保存 ({}/{})", done, total),
                    Err(e) => warn!("Failed to write checkpoint to {}: {}", self.output.display(), e),
                }
            }
        }

        self.write_checkpoint(&translated, &documents[translated.len()..])?;
        if !interrupted {
            info!("全部完成，已写入 {} 篇文档到 {}", total, self.output.display());
        }

        Ok(BatchOutcome {
            translated,
            total,
            interrupted,
        })
    }

    /// 写入已翻译的前缀和未翻译的剩余部分
    fn write_checkpoint(&self, translated: &[TranslatedDocument], remainder: &[Document]) -> Result<()> {
        let records: Vec<Value> = translated
            .iter()
            .map(TranslatedDocument::to_record)
            .chain(remainder.iter().map(|doc| doc.record().clone()))
            .collect();

        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        write_json_atomically(&self.output, &records)
    }
}
