//! 题目校验 - 业务能力层
//!
//! 把解析出的未校验题目归一化为最终的 QuizQuestion。
//!
//! ## 职责
//! - 题型收敛到四个合法变体，未知题型归为简答题
//! - 选项形状规则：只有选择题保留 options
//! - 缺失文本补空字符串，内容质量由下游过滤
//! - 重置全新的调度字段
//!
//! 校验器只管形状安全，从不丢弃题目。

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::models::question::{QuestionType, QuizQuestion, RawQuestion};
use crate::utils::logging::truncate_text;

/// 选择题的最少选项数
const MIN_CHOICE_OPTIONS: usize = 3;
/// 选择题的最多选项数
const MAX_CHOICE_OPTIONS: usize = 4;

/// 校验上下文
///
/// 携带题目归属信息和本次生成路径的调度默认值。
#[derive(Debug, Clone)]
pub struct ValidationContext {
    pub folder_id: String,
    pub user_id: String,
    /// 无法确定来源时使用的笔记 id（可为空）
    pub fallback_note_id: String,
    /// 初始复习间隔天数（云端路径 0，本地路径 1）
    pub initial_interval_days: i64,
    pub now: DateTime<Utc>,
}

impl ValidationContext {
    pub fn new(folder_id: &str, user_id: &str, fallback_note_id: &str, initial_interval_days: i64) -> Self {
        Self {
            folder_id: folder_id.to_string(),
            user_id: user_id.to_string(),
            fallback_note_id: fallback_note_id.to_string(),
            initial_interval_days,
            now: Utc::now(),
        }
    }

    /// 固定校验时刻（测试用，保证确定性）
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// 校验并归一化单个题目
///
/// 纯函数，总是产出一个 QuizQuestion，没有拒绝路径。
pub fn validate_question(raw: RawQuestion, ctx: &ValidationContext) -> QuizQuestion {
    let question_type =
        QuestionType::from_str(&raw.question_type).unwrap_or(QuestionType::ShortAnswer);

    let options = normalize_options(raw.options, question_type, &raw.question);

    let id = if raw.id.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        raw.id
    };

    let note_id = if raw.note_id.is_empty() {
        ctx.fallback_note_id.clone()
    } else {
        raw.note_id
    };

    QuizQuestion {
        id,
        folder_id: ctx.folder_id.clone(),
        user_id: ctx.user_id.clone(),
        note_id,
        question: raw.question,
        answer: raw.answer,
        question_type,
        options,
        // 调度字段一律重置为全新状态，生成即到期
        ease_factor: 2.5,
        interval: ctx.initial_interval_days,
        last_reviewed: None,
        next_review_date: ctx.now,
    }
}

/// 批量校验
pub fn validate_all(raws: Vec<RawQuestion>, ctx: &ValidationContext) -> Vec<QuizQuestion> {
    raws.into_iter().map(|raw| validate_question(raw, ctx)).collect()
}

/// 选项形状规则
///
/// 非选择题一律丢弃 options；选择题保留，数量不在 3-4 之间
/// 只告警不纠正（宁可保留可疑选项也不让流水线中断）。
fn normalize_options(
    options: Option<Vec<String>>,
    question_type: QuestionType,
    question_text: &str,
) -> Option<Vec<String>> {
    if question_type != QuestionType::MultipleChoice {
        return None;
    }

    match options {
        Some(opts) => {
            if opts.len() < MIN_CHOICE_OPTIONS || opts.len() > MAX_CHOICE_OPTIONS {
                warn!(
                    "⚠️ 选择题选项数异常 ({} 个): {}",
                    opts.len(),
                    truncate_text(question_text, 40)
                );
            }
            Some(opts)
        }
        None => {
            warn!("⚠️ 选择题缺少选项: {}", truncate_text(question_text, 40));
            None
        }
    }
}
