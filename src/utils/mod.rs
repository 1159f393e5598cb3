//! 工具模块
//!
//! 提供日志等横切能力的辅助函数

pub mod logging;
