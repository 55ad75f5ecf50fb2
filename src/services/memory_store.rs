//! 内存题目存储
//!
//! 不落盘，用于测试和一次性的解析预览。

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::models::QuestionRecord;
use crate::services::store::QuestionStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    questions: Mutex<HashMap<String, QuestionRecord>>,
    topics: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用一组已知分类代码创建
    pub fn with_topics<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            questions: Mutex::default(),
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }

    /// 预先放入一个题目
    pub async fn insert(&self, record: QuestionRecord) {
        self.questions.lock().await.insert(record.id.clone(), record);
    }

    pub async fn get(&self, id: &str) -> Option<QuestionRecord> {
        self.questions.lock().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.questions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.questions.lock().await.is_empty()
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn existing_positions(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, Option<i64>>, StoreError> {
        let questions = self.questions.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| {
                questions
                    .get(id)
                    .map(|record| (id.clone(), record.source_position))
            })
            .collect())
    }

    async fn update_source_position(
        &self,
        id: &str,
        source_position: Option<i64>,
    ) -> Result<(), StoreError> {
        let mut questions = self.questions.lock().await;
        let record = questions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        record.source_position = source_position;
        debug!("题目 {} 序号更新为 {:?}", id, source_position);
        Ok(())
    }

    async fn known_topics(&self, topic_ids: &[String]) -> Result<HashSet<String>, StoreError> {
        Ok(topic_ids
            .iter()
            .filter(|id| self.topics.contains(*id))
            .cloned()
            .collect())
    }

    async fn create_question(&self, record: QuestionRecord) -> Result<(), StoreError> {
        debug!("保存题目 {}", record.id);
        self.questions.lock().await.insert(record.id.clone(), record);
        Ok(())
    }
}
