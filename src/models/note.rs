use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 学习笔记（外部输入，核心只读）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub folder_id: String,
    #[serde(default)]
    pub user_id: String,
    pub title: String,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// 用于出题提示词的笔记投影
///
/// 只携带 id / title / content，笔记的归属信息和时间戳
/// 永远不会进入提示词。
#[derive(Debug, Clone, Serialize)]
pub struct NoteForPrompt {
    pub id: String,
    pub title: String,
    pub content: String,
}

impl From<&Note> for NoteForPrompt {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
        }
    }
}

/// 一套待出题的笔记集（对应一个 TOML 文件）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteSet {
    pub name: String,
    pub folder_id: String,
    pub user_id: String,
    pub notes: Vec<Note>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

impl NoteSet {
    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }

    /// 把集合级归属补写到未标归属的笔记
    ///
    /// 笔记显式写明的归属保持不变，只填补空字段。
    pub fn with_inherited_ownership(mut self) -> Self {
        for note in &mut self.notes {
            if note.folder_id.is_empty() {
                note.folder_id = self.folder_id.clone();
            }
            if note.user_id.is_empty() {
                note.user_id = self.user_id.clone();
            }
        }
        self
    }
}
