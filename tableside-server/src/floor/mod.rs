//! 楼面协调引擎 (Floor coordination engine)
//!
//! Service requests, table ownership and the takeover handshake between
//! staff devices.
//!
//! # 模块结构
//!
//! ```text
//! floor/
//! ├── storage.rs      # redb 持久化 + 审计日志
//! ├── directory.rs    # 楼面平面图 (桌台 / 区域 / 员工名)
//! ├── requests.rs     # Request Store + 状态机
//! ├── assignments.rs  # Assignment Registry (按 location + shift date 分组)
//! ├── conflict.rs     # Conflict Resolver (纯函数)
//! ├── takeover.rs     # Takeover Negotiator (纯函数)
//! ├── engine.rs       # 组合上述部分，持锁提交
//! └── rollover.rs     # 营业日 cutoff 清理过期分配
//! ```

pub mod assignments;
pub mod conflict;
pub mod directory;
pub mod engine;
pub mod error;
pub mod requests;
pub mod rollover;
pub mod storage;
pub mod takeover;


pub use assignments::{AssignmentRegistry, Roster, RosterKey};
pub use conflict::Resolution;
pub use directory::{Directory, DirectoryError, FloorPlan, TableInfo};
pub use engine::{BusinessClock, FloorEngine, Performed};
pub use error::{FloorError, FloorResult};
pub use requests::RequestStore;
pub use rollover::ShiftRolloverScheduler;
pub use storage::{FloorStorage, StorageError};
pub use takeover::Settlement;
