//! 题目存储接口 - 业务能力层
//!
//! 只描述"存储能做什么"，不关心页面和解析流程。
//! 同一页面的写入会并发调用，每次调用只涉及一个题目 ID。

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use crate::error::StoreError;
use crate::models::QuestionRecord;

#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// 查询已存在的题目
    ///
    /// # 返回
    /// 已存在题目的 ID → 当前保存的列表序号；不存在的 ID 不出现在结果中
    async fn existing_positions(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, Option<i64>>, StoreError>;

    /// 只更新已有题目的列表序号
    async fn update_source_position(
        &self,
        id: &str,
        source_position: Option<i64>,
    ) -> Result<(), StoreError>;

    /// 过滤出存储中已知的分类代码
    async fn known_topics(&self, topic_ids: &[String]) -> Result<HashSet<String>, StoreError>;

    /// 保存一个新题目
    async fn create_question(&self, record: QuestionRecord) -> Result<(), StoreError>;
}
