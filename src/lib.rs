//! # Note Quiz Gen
//!
//! 一个把学习笔记转换为间隔重复测验的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 模型层（Models）
//! - `models/` - 领域数据结构与加载器
//! - `Note` / `NoteSet` - 学习笔记与 TOML 笔记集
//! - `QuizQuestion` / `RawQuestion` - 校验前后的题目
//! - `QuestionResult` - 一次作答的结果
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，与提供商无关
//! - `parser` - 模型输出解析（严格 JSON 优先，行配对兜底）
//! - `validator` - 题目归一化（题型收敛、选项规则、调度重置）
//!
//! ### ③ 提供商层（Providers）
//! - `providers/` - 各 LLM 后端的请求构造和响应解码
//! - `GeminiProvider` - 云端 Gemini 接口
//! - `OllamaProvider` - 本地 Ollama 接口
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/generator` - 按优先级依次尝试提供商
//! - `orchestrator/batch_runner` - 批量处理笔记集，管理并发和落盘
//!
//! 复习调度算法（`scheduler`）独立于流水线，在作答后更新题目。
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod providers;
pub mod scheduler;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Note, NoteForPrompt, NoteSet, QuestionResult, QuizQuestion, QuizResult, RawQuestion};
pub use models::question::QuestionType;
pub use orchestrator::{App, QuizGenerator};
pub use providers::{Provider, ProviderKind};
pub use scheduler::{record_outcome, schedule, SchedulingUpdate};
pub use services::{parse_response, validate_question, ParseMode, ValidationContext};
