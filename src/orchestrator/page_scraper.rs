//! 单页处理器 - 编排层
//!
//! ## 职责
//!
//! 处理一个已下载的列表页：找出所有题目块/信息块对，逐个解析，
//! 再与存储对比决定新增还是只更新列表序号。
//!
//! ## 处理流程
//!
//! 1. **顺序解析**：每对块使用独立的 `ParsingContext`，任意一块失败只跳过这一对
//! 2. **查重**：按题目 ID 查询存储中已有的题目
//! 3. **并发写入**：同一页的新增/更新用 `join_all` 并发执行，单个失败只计数

use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::{AppResult, ParseError, StoreError};
use crate::models::{ParsedQuestion, QuestionRecord};
use crate::parsing::{find_block_pairs, parse_iblock, parse_qblock, ParsingContext, RawNode};
use crate::services::QuestionStore;
use crate::utils::truncate_text;

/// 页面请求参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// 页码（从 0 开始）
    pub page_index: usize,
    pub page_size: usize,
    /// 按分类筛选的页面，题目顺序与总列表无关
    pub topic_filter: Option<String>,
    pub grade: Option<String>,
}

impl PageRequest {
    /// 第 `ordinal` 个题目（从 1 开始）在总列表中的序号
    ///
    /// 溢出时返回 `None`。
    pub fn source_position(&self, ordinal: usize) -> Option<i64> {
        if self.topic_filter.is_some() {
            return None;
        }
        let position = self
            .page_index
            .checked_mul(self.page_size)?
            .checked_add(ordinal)?;
        i64::try_from(position).ok()
    }
}

/// 单页处理统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeStats {
    /// 页面上的题目块数量
    pub found: usize,
    pub parsed: usize,
    pub skipped: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// 写入存储失败的数量
    pub failed: usize,
}

impl ScrapeStats {
    pub fn merge(&mut self, other: &ScrapeStats) {
        self.found += other.found;
        self.parsed += other.parsed;
        self.skipped += other.skipped;
        self.created += other.created;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.failed += other.failed;
    }
}

/// 单个题目的写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOutcome {
    Created,
    Updated,
    Unchanged,
}

pub struct PageScraper {
    store: Arc<dyn QuestionStore>,
    exam_positions: RangeInclusive<i32>,
}

impl PageScraper {
    pub fn new(store: Arc<dyn QuestionStore>, max_exam_position: i32) -> Self {
        Self {
            store,
            exam_positions: 1..=max_exam_position,
        }
    }

    /// 解析并保存一个页面
    pub async fn scrape(&self, html: &str, request: &PageRequest) -> AppResult<ScrapeStats> {
        let (questions, found) = parse_page(html, request);
        let mut stats = ScrapeStats {
            found,
            parsed: questions.len(),
            skipped: found - questions.len(),
            ..Default::default()
        };

        if questions.is_empty() {
            warn!("⚠️ 页面 {} 没有可保存的题目", request.page_index + 1);
            return Ok(stats);
        }

        let ids: Vec<String> = questions.iter().map(|q| q.id().to_string()).collect();
        let existing = self.store.existing_positions(&ids).await?;

        let writes = questions.into_iter().map(|question| {
            let stored = existing.get(question.id()).copied();
            self.persist(question, stored)
        });

        for (id, outcome) in join_all(writes).await {
            match outcome {
                Ok(WriteOutcome::Created) => stats.created += 1,
                Ok(WriteOutcome::Updated) => stats.updated += 1,
                Ok(WriteOutcome::Unchanged) => stats.unchanged += 1,
                Err(e) => {
                    error!("[题目 {}] ❌ 写入失败: {}", id, e);
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }

    /// 新题目完整保存；已有题目只在序号缺失或变化时更新序号
    async fn persist(
        &self,
        question: ParsedQuestion,
        stored: Option<Option<i64>>,
    ) -> (String, Result<WriteOutcome, StoreError>) {
        let id = question.id().to_string();
        let outcome = match stored {
            Some(current) => {
                let position = question.source_position;
                if position.is_none() || position == current {
                    Ok(WriteOutcome::Unchanged)
                } else {
                    debug!("[题目 {}] 序号 {:?} → {:?}", id, current, position);
                    self.store
                        .update_source_position(&id, position)
                        .await
                        .map(|_| WriteOutcome::Updated)
                }
            }
            None => match self.build_record(question).await {
                Ok(record) => self
                    .store
                    .create_question(record)
                    .await
                    .map(|_| WriteOutcome::Created),
                Err(e) => Err(e),
            },
        };
        (id, outcome)
    }

    /// 组装入库记录：过滤未知分类代码，校验考试位置
    async fn build_record(&self, question: ParsedQuestion) -> Result<QuestionRecord, StoreError> {
        let ParsedQuestion {
            qblock,
            iblock,
            source_position,
        } = question;

        let known = self.store.known_topics(&iblock.topic_ids).await?;
        let topic_ids = resolve_topics(&qblock.id, iblock.topic_ids, &known);

        let exam_position = qblock.exam_position.filter(|position| {
            let allowed = self.exam_positions.contains(position);
            if !allowed {
                warn!("[题目 {}] 考试位置 {} 不在允许范围内，忽略", qblock.id, position);
            }
            allowed
        });

        Ok(QuestionRecord {
            id: qblock.id,
            name: iblock.name,
            prompt: qblock.prompt,
            body: qblock.body,
            solution_type: iblock.solution_type,
            attachments: qblock.attachments,
            topic_ids,
            exam_position,
            source_position,
            options: qblock.options,
        })
    }
}

/// 保留存储中已知的分类代码（保持原顺序），未知的记录警告
fn resolve_topics(id: &str, topic_ids: Vec<String>, known: &HashSet<String>) -> Vec<String> {
    topic_ids
        .into_iter()
        .filter(|topic| {
            let is_known = known.contains(topic);
            if !is_known {
                warn!("[题目 {}] 未知的分类代码 {}，跳过", id, topic);
            }
            is_known
        })
        .collect()
}

/// 解析页面上所有题目
///
/// # 返回
/// (解析成功的题目, 页面上题目块的总数)
pub fn parse_page(html: &str, request: &PageRequest) -> (Vec<ParsedQuestion>, usize) {
    let root = RawNode::parse_html(html);
    let pairs = find_block_pairs(&root);
    let found = pairs.len();

    let mut questions = Vec::new();
    let mut seen = HashMap::new();
    for (index, (qblock, iblock)) in pairs.into_iter().enumerate() {
        let ordinal = index + 1;
        match parse_pair(qblock, iblock, request.grade.as_deref()) {
            Ok(Some(mut question)) => {
                if let Some(previous) = seen.insert(question.id().to_string(), ordinal) {
                    warn!(
                        "[题目 {}] 在第 {} 个位置重复出现（首次为第 {} 个），跳过",
                        question.id(),
                        ordinal,
                        previous
                    );
                    continue;
                }
                question.source_position = request.source_position(ordinal);
                debug!("✓ {}", question);
                questions.push(question);
            }
            Ok(None) => {
                info!("⏭ 第 {} 个题目块缺少必需内容，跳过", ordinal);
            }
            Err(e) => {
                warn!(
                    "⏭ 第 {} 个题目块解析失败，跳过: {}",
                    ordinal,
                    truncate_text(&e.to_string(), 200)
                );
            }
        }
    }

    (questions, found)
}

/// 解析一对题目块/信息块，任意一块缺失都返回 `None`
fn parse_pair(
    qblock: &RawNode,
    iblock: Option<&RawNode>,
    grade: Option<&str>,
) -> Result<Option<ParsedQuestion>, ParseError> {
    let mut ctx = ParsingContext::new(grade.map(str::to_string));
    let Some(parsed_qblock) = parse_qblock(qblock, &mut ctx)? else {
        return Ok(None);
    };
    let Some(parsed_iblock) = iblock.map(parse_iblock).transpose()?.flatten() else {
        debug!("[题目 {}] 缺少信息块", parsed_qblock.id);
        return Ok(None);
    };

    Ok(Some(ParsedQuestion {
        qblock: parsed_qblock,
        iblock: parsed_iblock,
        source_position: None,
    }))
}
