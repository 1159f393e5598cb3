//! 响应解析 - 业务能力层
//!
//! 从 LLM 返回的原始文本中提取题目记录。
//!
//! ## 职责
//! - strict 路径：定位 JSON 数组并结构化解码
//! - fallback 路径：按行配对的启发式降级解析
//! - 对任何畸形输入都不报错，最差返回空列表
//!
//! 两条路径是两个纯函数，由 `parse_response` 组合，
//! 选择哪条路径只在解码结果上判断一次。

use crate::models::note::Note;
use crate::models::question::RawQuestion;
use regex::Regex;
use tracing::debug;
use uuid::Uuid;

/// 本次解析走的路径
///
/// `Fallback` 是质量信号：说明提供商没有按约定返回 JSON，
/// 提供商会记数并告警，但不会让调用失败。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// JSON 数组解码成功
    Strict,
    /// 行配对降级
    Fallback,
}

/// 降级路径最多产出的题目数
///
/// LLM 返回无结构长文时限制最坏情况下的处理量。
pub const FALLBACK_MAX_QUESTIONS: usize = 10;

/// 解析 LLM 原始响应为未校验题目列表
///
/// # 参数
/// - `raw_text`: LLM 返回的原始文本
/// - `source_notes`: 本次出题的来源笔记，第一条的 id 作为缺省 note_id
///
/// # 返回
/// 返回 (题目列表, 解析路径)，永远不会失败
pub fn parse_response(raw_text: &str, source_notes: &[Note]) -> (Vec<RawQuestion>, ParseMode) {
    let default_note_id = source_notes.first().map(|n| n.id.as_str()).unwrap_or("");

    match parse_strict(raw_text) {
        Some(mut questions) => {
            for q in &mut questions {
                if q.id.is_empty() {
                    q.id = Uuid::new_v4().to_string();
                }
                if q.note_id.is_empty() {
                    q.note_id = default_note_id.to_string();
                }
            }
            debug!("JSON 解析成功，共 {} 道题", questions.len());
            (questions, ParseMode::Strict)
        }
        None => {
            let questions = parse_fallback(raw_text, default_note_id);
            debug!("降级解析，共 {} 道题", questions.len());
            (questions, ParseMode::Fallback)
        }
    }
}

/// strict 路径：提取第一个 JSON 数组并结构化解码
///
/// 贪婪匹配最外层的 `[ ... ]`，要求解码为对象数组；
/// 找不到数组或解码失败都返回 None，交给降级路径。
fn parse_strict(raw_text: &str) -> Option<Vec<RawQuestion>> {
    let re = Regex::new(r"(?s)\[.*\]").ok()?;
    let span = re.find(raw_text)?;

    serde_json::from_str::<Vec<RawQuestion>>(span.as_str()).ok()
}

/// fallback 路径：非空行按 (题目, 答案) 配对
///
/// 去掉题目前的序号标记（如 "1. "）和答案前的 "A: " 标记，
/// 落单的最后一行丢弃，产出上限 [`FALLBACK_MAX_QUESTIONS`]。
fn parse_fallback(raw_text: &str, default_note_id: &str) -> Vec<RawQuestion> {
    let lines: Vec<&str> = raw_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut questions = Vec::new();
    for pair in lines.chunks(2) {
        if pair.len() < 2 || questions.len() >= FALLBACK_MAX_QUESTIONS {
            break;
        }

        questions.push(RawQuestion {
            id: Uuid::new_v4().to_string(),
            question: strip_ordinal(pair[0]),
            answer: strip_answer_marker(pair[1]),
            question_type: "shortAnswer".to_string(),
            options: None,
            note_id: default_note_id.to_string(),
        });
    }

    questions
}

/// 去掉行首的序号标记（"<数字>. "）
fn strip_ordinal(line: &str) -> String {
    if let Ok(re) = Regex::new(r"^\d+\.\s*") {
        re.replace(line, "").to_string()
    } else {
        line.to_string()
    }
}

/// 去掉行首的答案标记（"A: "）
fn strip_answer_marker(line: &str) -> String {
    line.strip_prefix("A: ").unwrap_or(line).to_string()
}
