//! 工具模块 - 通用工具函数和类型
//!
//! - [`AppError`] - HTTP 层错误类型
//! - 日志、时间、输入校验

pub mod error;
pub mod logger;
pub mod result;
pub mod time;
pub mod validation;

pub use error::{AppError, ErrorBody};
pub use result::AppResult;
