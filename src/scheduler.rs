//! 复习调度 - SM-2 族算法
//!
//! 根据一次作答结果计算题目的下一个熟练度、间隔和到期时间。
//!
//! ## 职责
//! - `schedule` 是纯函数：同样的输入永远得到同样的输出，从不失败
//! - 越界的输入（信心、耗时、存量间隔）一律截断，不拒绝
//! - 题目只在 "到期" 和 "已排期" 两个状态之间流转，
//!   `schedule` 是唯一的状态转移，总是转回 "已排期"

use chrono::{DateTime, Duration, Utc};

use crate::models::outcome::QuestionResult;
use crate::models::question::QuizQuestion;

/// 熟练度下限
pub const MIN_EASE_FACTOR: f32 = 1.3;

/// 复习间隔上限（天），约十年。间隔封顶后日期加法不会越界
pub const MAX_INTERVAL_DAYS: i64 = 3650;

/// 答错时熟练度的固定衰减
const WRONG_EASE_PENALTY: f32 = 0.2;

// 信心到熟练度调整的映射系数。方向是契约：高信心快答增益最大，
// 低信心即使答对也轻微压低熟练度；具体数值是标定结果。
const CONFIDENCE_GAIN: f32 = 0.15;
const CONFIDENCE_BIAS: f32 = -0.05;
const FAST_ANSWER_BONUS: f32 = 0.05;
/// 快答基准秒数，难题按难度放宽窗口
const FAST_ANSWER_BASE_SECS: f32 = 10.0;

/// 一次作答后的调度字段更新
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingUpdate {
    pub ease_factor: f32,
    /// 距下次复习的天数
    pub interval: i64,
    pub last_reviewed: DateTime<Utc>,
    pub next_review_date: DateTime<Utc>,
}

/// 计算一次作答后的调度字段
///
/// # 参数
/// - `question`: 当前题目（读取现有的熟练度和间隔）
/// - `result`: 本次作答结果
/// - `now`: 调度时刻，显式传入保证可测试
///
/// # 返回
/// 返回新的调度字段，不修改题目本身
pub fn schedule(
    question: &QuizQuestion,
    result: &QuestionResult,
    now: DateTime<Utc>,
) -> SchedulingUpdate {
    let (ease_factor, interval) = if result.correct {
        // 间隔用调整前的熟练度计算，至少推后一天；
        // 存量间隔和增长结果都封顶，持久化回读的数据不设上限
        let prior_interval = question.interval.clamp(0, MAX_INTERVAL_DAYS);
        let grown = ((prior_interval as f32) * question.ease_factor).round() as i64;
        let interval = grown.clamp(1, MAX_INTERVAL_DAYS);
        let ease = (question.ease_factor + ease_adjustment(result)).max(MIN_EASE_FACTOR);
        (ease, interval)
    } else {
        // 答错重回一天，熟练度衰减但不破下限
        let ease = (question.ease_factor - WRONG_EASE_PENALTY).max(MIN_EASE_FACTOR);
        (ease, 1)
    };

    SchedulingUpdate {
        ease_factor,
        interval,
        last_reviewed: now,
        next_review_date: now + Duration::days(interval),
    }
}

/// 把调度更新写回题目
pub fn apply_update(question: &mut QuizQuestion, update: &SchedulingUpdate) {
    question.ease_factor = update.ease_factor;
    question.interval = update.interval;
    question.last_reviewed = Some(update.last_reviewed);
    question.next_review_date = update.next_review_date;
}

/// 记录一次作答并就地更新题目的调度字段
///
/// 调用方拿到返回的更新值负责持久化。
pub fn record_outcome(question: &mut QuizQuestion, result: &QuestionResult) -> SchedulingUpdate {
    let update = schedule(question, result, Utc::now());
    apply_update(question, &update);
    update
}

/// 信心与答速到熟练度调整的映射
fn ease_adjustment(result: &QuestionResult) -> f32 {
    let confidence = result.confidence.clamp(0.0, 1.0);
    let difficulty = result.difficulty.clamp(0.0, 1.0);
    let response_secs = result.response_time_secs.max(0.0);

    let mut adjustment = CONFIDENCE_GAIN * confidence + CONFIDENCE_BIAS;
    if response_secs <= FAST_ANSWER_BASE_SECS * (1.0 + difficulty) {
        adjustment += FAST_ANSWER_BONUS;
    }
    adjustment
}
