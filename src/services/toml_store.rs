//! TOML 文件题目存储
//!
//! 每个题目保存为 `questions/<id>.toml`，已知分类代码放在根目录的 `topics.toml`：
//!
//! ```toml
//! topics = ["2.1", "3.4"]
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::QuestionRecord;
use crate::services::store::QuestionStore;

const TOPICS_FILE: &str = "topics.toml";
const QUESTIONS_DIR: &str = "questions";

#[derive(Debug, Default, Deserialize)]
struct TopicsFile {
    #[serde(default)]
    topics: Vec<String>,
}

pub struct TomlStore {
    folder: PathBuf,
}

impl TomlStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// 题目文件所在目录，与 `topics.toml` 分开
    pub fn questions_folder(&self) -> PathBuf {
        self.folder.join(QUESTIONS_DIR)
    }

    /// 题目文件路径（ID 中的路径分隔符替换为 `_`）
    fn question_path(&self, id: &str) -> PathBuf {
        let file_name: String = id
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.questions_folder().join(format!("{}.toml", file_name))
    }

    /// 读取单个题目，文件不存在时返回 `None`
    pub async fn load(&self, id: &str) -> Result<Option<QuestionRecord>, StoreError> {
        let path = self.question_path(id);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::io(path.display().to_string(), e))?;
        let record = toml::from_str(&content).map_err(|e| StoreError::Deserialize {
            path: path.display().to_string(),
            source: e,
        })?;

        Ok(Some(record))
    }

    async fn save(&self, record: &QuestionRecord) -> Result<(), StoreError> {
        let questions_folder = self.questions_folder();
        fs::create_dir_all(&questions_folder)
            .await
            .map_err(|e| StoreError::io(questions_folder.display().to_string(), e))?;

        let content = toml::to_string_pretty(record).map_err(|e| StoreError::Serialize {
            id: record.id.clone(),
            source: e,
        })?;
        let path = self.question_path(&record.id);
        fs::write(&path, content)
            .await
            .map_err(|e| StoreError::io(path.display().to_string(), e))?;

        debug!("已写入: {}", path.display());
        Ok(())
    }

    async fn load_topics(&self) -> Result<HashSet<String>, StoreError> {
        let path = self.folder.join(TOPICS_FILE);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            warn!("⚠️ 未找到分类文件 {}，所有分类代码都将被忽略", path.display());
            return Ok(HashSet::new());
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::io(path.display().to_string(), e))?;
        let file: TopicsFile = toml::from_str(&content).map_err(|e| StoreError::Deserialize {
            path: path.display().to_string(),
            source: e,
        })?;

        info!("已加载 {} 个分类代码", file.topics.len());
        Ok(file.topics.into_iter().collect())
    }
}

#[async_trait]
impl QuestionStore for TomlStore {
    async fn existing_positions(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, Option<i64>>, StoreError> {
        let mut existing = HashMap::new();
        for id in ids {
            if let Some(record) = self.load(id).await? {
                existing.insert(id.clone(), record.source_position);
            }
        }
        Ok(existing)
    }

    async fn update_source_position(
        &self,
        id: &str,
        source_position: Option<i64>,
    ) -> Result<(), StoreError> {
        let mut record = self
            .load(id)
            .await?
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        record.source_position = source_position;
        self.save(&record).await
    }

    async fn known_topics(&self, topic_ids: &[String]) -> Result<HashSet<String>, StoreError> {
        let topics = self.load_topics().await?;
        Ok(topic_ids
            .iter()
            .filter(|id| topics.contains(*id))
            .cloned()
            .collect())
    }

    async fn create_question(&self, record: QuestionRecord) -> Result<(), StoreError> {
        self.save(&record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuestionOption, SolutionType};

    fn temp_folder(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "fipi_toml_store_{}_{}_{}",
            name,
            std::process::id(),
            chrono::Local::now().timestamp_nanos_opt().unwrap_or_default()
        ))
    }

    fn record(id: &str) -> QuestionRecord {
        QuestionRecord {
            id: id.to_string(),
            name: id.to_string(),
            prompt: "Решите уравнение".to_string(),
            body: "$x^2=4$".to_string(),
            solution_type: SolutionType::MultiChoice,
            attachments: vec!["https://ege.fipi.ru/bank/docs/1.png".to_string()],
            options: vec![QuestionOption::new("1", "$2$")],
            topic_ids: vec!["2.1".to_string()],
            exam_position: Some(5),
            source_position: Some(11),
        }
    }

    #[tokio::test]
    async fn test_create_and_load() {
        let folder = temp_folder("create");
        let store = TomlStore::new(&folder);

        store.create_question(record("40B442")).await.unwrap();
        let loaded = store.load("40B442").await.unwrap();
        assert_eq!(loaded, Some(record("40B442")));
        assert_eq!(store.load("missing").await.unwrap(), None);

        let _ = std::fs::remove_dir_all(&folder);
    }

    #[tokio::test]
    async fn test_update_source_position() {
        let folder = temp_folder("update");
        let store = TomlStore::new(&folder);
        store.create_question(record("A1")).await.unwrap();

        store.update_source_position("A1", None).await.unwrap();
        let ids = vec!["A1".to_string(), "B2".to_string()];
        let existing = store.existing_positions(&ids).await.unwrap();
        assert_eq!(existing, HashMap::from([("A1".to_string(), None)]));

        let missing = store.update_source_position("B2", Some(1)).await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));

        let _ = std::fs::remove_dir_all(&folder);
    }

    #[tokio::test]
    async fn test_known_topics_from_file() {
        let folder = temp_folder("topics");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join(TOPICS_FILE), "topics = [\"2.1\", \"3.4\"]\n").unwrap();
        let store = TomlStore::new(&folder);

        let ids = vec!["2.1".to_string(), "7.7".to_string()];
        let known = store.known_topics(&ids).await.unwrap();
        assert_eq!(known, HashSet::from(["2.1".to_string()]));

        let _ = std::fs::remove_dir_all(&folder);
    }

    #[tokio::test]
    async fn test_question_named_topics_keeps_topic_file() {
        let folder = temp_folder("topics_id");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join(TOPICS_FILE), "topics = [\"2.1\"]\n").unwrap();
        let store = TomlStore::new(&folder);

        // ID 恰好是 "topics" 的题目不能覆盖分类文件
        store.create_question(record("topics")).await.unwrap();
        assert!(store.questions_folder().join("topics.toml").exists());
        assert_eq!(store.load("topics").await.unwrap(), Some(record("topics")));

        let known = store.known_topics(&["2.1".to_string()]).await.unwrap();
        assert_eq!(known, HashSet::from(["2.1".to_string()]));

        let _ = std::fs::remove_dir_all(&folder);
    }

    #[tokio::test]
    async fn test_missing_topics_file_knows_nothing() {
        let store = TomlStore::new(temp_folder("no_topics"));
        let known = store.known_topics(&["2.1".to_string()]).await.unwrap();
        assert!(known.is_empty());
    }
}
