use thiserror::Error;

use crate::floor::{DirectoryError, FloorError};

/// 启动 / 运行期错误
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("楼面平面图加载失败: {0}")]
    FloorPlan(#[from] DirectoryError),

    #[error("引擎初始化失败: {0}")]
    Floor(#[from] FloorError),

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ServerError>;
