//! 出题提示词构造
//!
//! 两个提供商共用同一份提示词：输出格式约定 + 笔记投影。

use crate::models::note::{Note, NoteForPrompt};

/// 构建出题提示词
///
/// # 参数
/// - `notes`: 来源笔记（只投影 id / title / content 进提示词）
/// - `max_questions`: 出题数上限
///
/// # 返回
/// 返回完整的提示词字符串
pub fn build_generation_prompt(notes: &[Note], max_questions: usize) -> String {
    let projections: Vec<NoteForPrompt> = notes.iter().map(NoteForPrompt::from).collect();
    let notes_json = serde_json::to_string_pretty(&projections).unwrap_or_default();

    format!(
        r#"你是一个出题助手。请根据下面的学习笔记生成最多 {} 道测验题。

【输出格式要求】
- 只返回一个 JSON 数组，不要返回数组之外的任何文字
- 数组中每个元素是一个对象，字段如下：
  - "question": 题目文本
  - "answer": 正确答案文本
  - "type": 题型，只能是 "fillInBlank"、"shortAnswer"、"multipleChoice"、"trueFalse" 之一
  - "options": 仅当 type 为 "multipleChoice" 时提供，3-4 个选项的数组，必须包含正确答案
  - "note_id": 题目来源笔记的 id

【出题要求】
1. 题目必须基于笔记内容，不要编造笔记之外的知识
2. 题型尽量多样，填空、简答、选择、判断混合出题
3. 选择题必须有 3-4 个选项，且正确答案在选项中
4. 判断题的 answer 只能是 "true" 或 "false"

【输出示例】
[
  {{"question": "细胞的基本单位是什么?", "answer": "细胞", "type": "shortAnswer", "note_id": "n-1"}},
  {{"question": "DNA 主要位于哪里?", "answer": "细胞核", "type": "multipleChoice", "options": ["细胞核", "细胞壁", "液泡"], "note_id": "n-1"}}
]

【学习笔记】
{}"#,
        max_questions, notes_json
    )
}
