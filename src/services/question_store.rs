//! 题目存储服务 - 业务能力层
//!
//! 只负责"保存一道题"能力，不关心流程

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{AppError, AppResult, StorageError};
use crate::models::EnrichedQuestion;

/// 持久化接口
///
/// 每条完整题目调用一次；任何失败（校验、写入）都视为同一类失败。
#[async_trait]
pub trait QuestionSink: Send + Sync {
    async fn save(&self, question: &EnrichedQuestion) -> AppResult<()>;
}

/// 追加写入 JSON Lines 文件
///
/// 职责：
/// - 每条题目一行 JSON
/// - 写入串行化，多个任务并发保存时行不会交错
/// - 答案 / 解析缺失时写入占位值
pub struct JsonlSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn validate(question: &EnrichedQuestion) -> AppResult<()> {
        if question.stub.question.trim().is_empty() {
            return Err(StorageError::Validation {
                reason: format!("question text is empty ({})", question.stub.detail_link),
            }
            .into());
        }
        if question.subject.trim().is_empty() {
            return Err(StorageError::Validation {
                reason: "subject is empty".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl QuestionSink for JsonlSink {
    async fn save(&self, question: &EnrichedQuestion) -> AppResult<()> {
        Self::validate(question)?;

        let mut line = serde_json::to_string(&question.to_stored(Utc::now()))?;
        line.push('\n');

        let path = self.path.display().to_string();
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::write_failed(&path, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| AppError::write_failed(&path, e))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| AppError::write_failed(&path, e))?;
        file.flush()
            .await
            .map_err(|e| AppError::write_failed(&path, e))?;

        debug!("已写入 {} ({} 字节)", path, line.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DetailOutcome, ExamType, QuestionCategory, QuestionStub, StoredQuestion,
    };
    use std::sync::Arc;

    fn question(text: &str) -> EnrichedQuestion {
        EnrichedQuestion::new(
            QuestionStub {
                question: text.to_string(),
                options: vec!["A. 1".to_string(), "B. 2".to_string()],
                detail_link: "https://myschool.ng/classroom/mathematics/7".to_string(),
                exam_type: ExamType::Waec,
                year: "2015".to_string(),
            },
            DetailOutcome {
                answer: Some("B".to_string()),
                explanation: None,
            },
            "Mathematics",
            QuestionCategory::Objective,
        )
    }

    #[tokio::test]
    async fn appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlSink::new(dir.path().join("nested/questions.jsonl"));

        tokio_test::assert_ok!(sink.save(&question("1 + 1 = ?")).await);
        tokio_test::assert_ok!(sink.save(&question("2 - 1 = ?")).await);

        let content = tokio::fs::read_to_string(sink.path()).await.unwrap();
        let records: Vec<StoredQuestion> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].question, "1 + 1 = ?");
        assert_eq!(records[0].answer, "B");
        assert_eq!(records[0].explanation, "No explanation");
        assert_eq!(records[1].question, "2 - 1 = ?");
    }

    #[tokio::test]
    async fn rejects_empty_question() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlSink::new(dir.path().join("questions.jsonl"));

        let err = sink.save(&question("   ")).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Storage(StorageError::Validation { .. })
        ));
        assert!(!sink.path().exists());
    }

    #[tokio::test]
    async fn concurrent_saves_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(JsonlSink::new(dir.path().join("questions.jsonl")));

        let mut handles = Vec::new();
        for i in 0..20 {
            let sink = sink.clone();
            handles.push(tokio::spawn(async move {
                sink.save(&question(&format!("Question {i}"))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let content = tokio::fs::read_to_string(sink.path()).await.unwrap();
        assert_eq!(content.lines().count(), 20);
        for line in content.lines() {
            serde_json::from_str::<StoredQuestion>(line).unwrap();
        }
    }
}
