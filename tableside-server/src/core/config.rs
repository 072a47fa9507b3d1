use std::path::PathBuf;

use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::utils::time;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/tableside | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | TIMEZONE | Europe/Rome | 门店时区 |
/// | BUSINESS_DAY_CUTOFF | 04:00 | 营业日分界 (班次日期) |
/// | FLOOR_PLAN_FILE | - | 楼面平面图 JSON |
/// | LOG_LEVEL | info | 日志级别 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 关闭超时(毫秒) |
///
/// JWT 相关见 [`JwtConfig`]。
///
/// ```ignore
/// WORK_DIR=/data/tableside HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 门店时区
    pub timezone: Tz,
    /// 营业日分界时间
    pub business_day_cutoff: NaiveTime,
    /// 楼面平面图文件 (未设置时为空平面图)
    pub floor_plan_file: Option<String>,
    /// 日志级别
    pub log_level: String,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/tableside".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|tz| {
                    tz.parse::<Tz>()
                        .inspect_err(|e| tracing::warn!("Invalid TIMEZONE '{}': {}", tz, e))
                        .ok()
                })
                .unwrap_or(chrono_tz::Europe::Rome),
            business_day_cutoff: time::parse_cutoff(
                &std::env::var("BUSINESS_DAY_CUTOFF").unwrap_or_else(|_| "04:00".into()),
            ),
            floor_plan_file: std::env::var("FLOOR_PLAN_FILE")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            shutdown_timeout_ms: std::env::var("SHUTDOWN_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库文件路径: `{work_dir}/database/tableside.redb`
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir)
            .join("database")
            .join("tableside.redb")
    }

    /// 日志目录: `{work_dir}/logs`
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_under_work_dir() {
        let config = Config::with_overrides("/tmp/tableside-test", 0);
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/tableside-test/database/tableside.redb")
        );
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/tableside-test/logs"));
    }
}
