//! 生成提供商层
//!
//! ## 职责
//!
//! 本层封装各个出题后端的调用细节，向编排层暴露统一能力：
//!
//! - `check_availability()` - 可用性探测，永远不报错
//! - `generate(notes, max_questions)` - 出一套题，单请求无重试
//!
//! ## 模块划分
//!
//! ### `gemini` - 云端 REST 提供商（需要 API Key，30 秒超时）
//! ### `ollama` - 本地守护进程提供商（探测 + 模型列表，60 秒超时）
//! ### `prompt` - 两个后端共用的提示词构造
//!
//! ## 设计原则
//!
//! 1. **封闭枚举**：提供商集合是封闭的，编排器按优先级对 `Provider` 显式派发
//! 2. **实例不可变**：端点/模型/凭据在构造时固定，调用之间无共享可变状态
//! 3. **失败分类**：不可用 / 缺凭据 / 上游错误由错误类型区分，编排器据此跳过

pub mod gemini;
pub mod ollama;
pub mod prompt;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use prompt::build_generation_prompt;

use crate::error::AppResult;
use crate::models::note::Note;
use crate::models::question::QuizQuestion;
use crate::services::validator::ValidationContext;

/// 提供商种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// 云端 Gemini
    Gemini,
    /// 本地 Ollama
    Ollama,
}

impl ProviderKind {
    /// 获取标准名称
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// 尝试从字符串解析提供商种类（忽略大小写和首尾空白）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Some(ProviderKind::Gemini),
            "ollama" => Some(ProviderKind::Ollama),
            _ => None,
        }
    }

    /// 所有支持的提供商
    pub fn all() -> [ProviderKind; 2] {
        [ProviderKind::Gemini, ProviderKind::Ollama]
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 生成提供商（封闭枚举）
#[derive(Debug)]
pub enum Provider {
    Gemini(GeminiProvider),
    Ollama(OllamaProvider),
}

impl Provider {
    /// 提供商种类
    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::Gemini(_) => ProviderKind::Gemini,
            Provider::Ollama(_) => ProviderKind::Ollama,
        }
    }

    /// 可用性探测，永远不报错
    pub async fn check_availability(&self) -> bool {
        match self {
            Provider::Gemini(p) => p.check_availability().await,
            Provider::Ollama(p) => p.check_availability().await,
        }
    }

    /// 根据笔记生成测验题
    pub async fn generate(
        &self,
        notes: &[Note],
        max_questions: usize,
    ) -> AppResult<Vec<QuizQuestion>> {
        match self {
            Provider::Gemini(p) => p.generate(notes, max_questions).await,
            Provider::Ollama(p) => p.generate(notes, max_questions).await,
        }
    }

    /// 降级解析发生的次数
    pub fn degraded_parse_count(&self) -> u64 {
        match self {
            Provider::Gemini(p) => p.degraded_parse_count(),
            Provider::Ollama(p) => p.degraded_parse_count(),
        }
    }
}

/// 从来源笔记推导校验上下文
///
/// 归属信息和缺省 note_id 取第一条笔记，调度初始间隔
/// 由各提供商的生成路径决定。
pub(crate) fn validation_context_for(notes: &[Note], initial_interval_days: i64) -> ValidationContext {
    let first = notes.first();
    ValidationContext::new(
        first.map(|n| n.folder_id.as_str()).unwrap_or(""),
        first.map(|n| n.user_id.as_str()).unwrap_or(""),
        first.map(|n| n.id.as_str()).unwrap_or(""),
        initial_interval_days,
    )
}
