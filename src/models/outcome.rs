use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 单题作答结果（喂给复习调度器的输入）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: String,
    pub correct: bool,
    #[serde(default)]
    pub user_answer: String,
    /// 作答耗时（秒）
    #[serde(default)]
    pub response_time_secs: f32,
    /// 自评信心 0-1，越界值由调度器截断
    #[serde(default)]
    pub confidence: f32,
    /// 题目既有难度信号 0-1
    #[serde(default)]
    pub difficulty: f32,
}

/// 一次测验的汇总结果
///
/// 由调用方（持久化层）构造和持有，核心只负责提供
/// 生成的题目和更新后的调度字段。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub folder_id: String,
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub total_questions: usize,
    pub correct_count: usize,
    pub results: Vec<QuestionResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_result_defaults() {
        let r: QuestionResult =
            serde_json::from_str(r#"{"questionId": "q-1", "correct": true}"#).unwrap();
        assert!(r.correct);
        assert_eq!(r.user_answer, "");
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.difficulty, 0.0);
    }

    #[test]
    fn test_quiz_result_field_names() {
        let result = QuizResult {
            folder_id: "f-1".to_string(),
            user_id: "u-1".to_string(),
            date: Utc::now(),
            total_questions: 2,
            correct_count: 1,
            results: vec![],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"folderId\""));
        assert!(json.contains("\"totalQuestions\""));
        assert!(json.contains("\"correctCount\""));
    }
}
