use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 题型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionType {
    /// 填空题
    FillInBlank,
    /// 简答题
    ShortAnswer,
    /// 选择题
    MultipleChoice,
    /// 判断题
    TrueFalse,
}

impl QuestionType {
    /// 获取序列化用的标准名称
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::FillInBlank => "fillInBlank",
            QuestionType::ShortAnswer => "shortAnswer",
            QuestionType::MultipleChoice => "multipleChoice",
            QuestionType::TrueFalse => "trueFalse",
        }
    }

    /// 尝试从字符串解析题型（精确匹配）
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "fillInBlank" => Some(QuestionType::FillInBlank),
            "shortAnswer" => Some(QuestionType::ShortAnswer),
            "multipleChoice" => Some(QuestionType::MultipleChoice),
            "trueFalse" => Some(QuestionType::TrueFalse),
            _ => None,
        }
    }

    /// 所有合法题型
    pub fn all() -> [QuestionType; 4] {
        [
            QuestionType::FillInBlank,
            QuestionType::ShortAnswer,
            QuestionType::MultipleChoice,
            QuestionType::TrueFalse,
        ]
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 解析阶段的未校验题目
///
/// 所有字段都允许缺失，形状安全由校验器负责。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default, rename = "type")]
    pub question_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub note_id: String,
}

fn default_ease_factor() -> f32 {
    2.5
}

/// 生成完成的测验题目
///
/// 文本内容生成后不可变；调度字段只能由复习调度器更新。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub folder_id: String,
    pub user_id: String,
    /// 来源笔记 id（无法确定来源时为空字符串）
    pub note_id: String,
    pub question: String,
    pub answer: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// 仅选择题携带（3-4 个选项，含正确答案）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f32,
    /// 距下次复习的天数
    #[serde(default)]
    pub interval: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
    pub next_review_date: DateTime<Utc>,
}

impl QuizQuestion {
    /// 是否已到期待复习
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_review_date
    }
}
