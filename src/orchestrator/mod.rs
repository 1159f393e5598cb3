//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责流程调度和批量处理，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `generator` - 出题编排器
//! - 解析提供商优先级配置
//! - 裁剪笔记输入（条数、字数上限）
//! - 按优先级依次尝试提供商，失败时切换下一个
//! - 汇总降级解析计数
//!
//! ### `batch_runner` - 批量处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载笔记集（Vec<NoteSet>）
//! - 控制并发数量（Semaphore）
//! - 生成结果落盘（JSON 文件）
//! - 输出全局统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_runner (处理 Vec<NoteSet>)
//!     ↓
//! generator (处理单套 Vec<Note>)
//!     ↓
//! providers (提供商层：gemini / ollama)
//!     ↓
//! services (能力层：parser / validator)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_runner 管批量，generator 管单套
//! 2. **向下依赖**：编排层 → providers → services
//! 3. **失败可降级**：单个提供商失败不中断流程，尝试下一个
//! 4. **库内无副作用**：文件写入只发生在 batch_runner

pub mod batch_runner;
pub mod generator;

// 重新导出主要类型
pub use batch_runner::App;
pub use generator::QuizGenerator;
