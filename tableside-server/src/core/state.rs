use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result};
use crate::floor::{
    BusinessClock, Directory, FloorEngine, FloorPlan, FloorStorage, ShiftRolloverScheduler,
};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，作为 axum 的 `State`。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | floor | Arc<FloorEngine> | 楼面协调引擎 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub floor: Arc<FloorEngine>,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    pub fn new(config: Config, floor: Arc<FloorEngine>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            floor,
            jwt_service,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 创建 `{work_dir}/database`
    /// 2. 加载楼面平面图 (`FLOOR_PLAN_FILE`)
    /// 3. 打开 redb 并把请求 / 分配载入内存
    pub fn initialize(config: &Config) -> Result<Self> {
        let db_path = config.database_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let directory: Arc<dyn Directory> = match &config.floor_plan_file {
            Some(path) => {
                let plan = FloorPlan::load(path)?;
                tracing::info!(tables = plan.table_count(), path = %path, "Floor plan loaded");
                Arc::new(plan)
            }
            None => {
                tracing::warn!("FLOOR_PLAN_FILE not set, no tables are known");
                Arc::new(FloorPlan::new())
            }
        };

        let storage = FloorStorage::open(&db_path).map_err(crate::floor::FloorError::from)?;
        tracing::info!(path = %db_path.display(), "Database opened");

        let clock = BusinessClock::new(config.timezone, config.business_day_cutoff);
        let floor = FloorEngine::open(storage, directory, clock)?;

        Ok(Self::new(
            config.clone(),
            Arc::new(floor),
            Arc::new(JwtService::with_config(config.jwt.clone())),
        ))
    }

    /// 启动后台任务
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let scheduler = ShiftRolloverScheduler::new(self.floor.clone(), tasks.shutdown_token());
        tasks.spawn("shift_rollover", TaskKind::Periodic, scheduler.run());

        tasks.log_summary();
        tasks
    }
}
