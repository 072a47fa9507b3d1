//! Tableside Server - 服务请求与桌台归属协调
//!
//! # 架构概述
//!
//! 客人端渠道创建服务请求 (呼叫服务员、结账、协助)，员工设备轮询请求列表
//! 并接单 / 完成 / 取消。每张桌台在某个班次日期内至多归属一名员工；
//! 在别人的桌台上接单时，设备先收到接管确认，再由员工选择
//! "只处理此请求" 或 "接管整张桌台"。
//!
//! # 模块结构
//!
//! ```text
//! tableside-server/src/
//! ├── core/     # 配置、状态、服务器、后台任务
//! ├── auth/     # JWT 认证、权限
//! ├── floor/    # 协调引擎 (请求、分配、冲突、接管)
//! ├── api/      # HTTP 路由和处理器
//! └── utils/    # 错误、日志、时间、校验
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod floor;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use floor::{FloorEngine, FloorPlan};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境
///
/// 1. 加载 `.env` (不存在时忽略)
/// 2. 创建 `{WORK_DIR}/logs`
/// 3. 初始化日志 (控制台或按天滚动文件)
pub fn setup_environment() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/tableside".into());
    let log_dir = std::path::Path::new(&work_dir).join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_to_file = std::env::var("LOG_TO_FILE").is_ok_and(|v| v == "1" || v == "true");
    init_logger_with_file(
        log_level.as_deref(),
        log_to_file.then(|| log_dir.to_str()).flatten(),
    );

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
  _        _     _                _     _
 | |_ __ _| |__ | | ___  ___  ___(_) __| | ___
 | __/ _` | '_ \| |/ _ \/ __|/ __| |/ _` |/ _ \
 | || (_| | |_) | |  __/\__ \ (__| | (_| |  __/
  \__\__,_|_.__/|_|\___||___/\___|_|\__,_|\___|
    "#
    );
}
