// 冷却事件模块
// 包含作用范围、冷却记录、注册表、备份与定时任务

pub mod models;
pub mod persistence;
pub mod registry;
pub mod rule;
pub mod scheduler;
pub mod scope;

// 重新导出常用类型和函数
pub use models::{CooldownRecord, CooldownSnapshot, CooldownStatus};
pub use persistence::{RestoreOutcome, SnapshotStore};
pub use registry::{CooldownEvents, CooldownRegistry, record_matches};
pub use rule::{CooldownRule, is_cooled_down};
pub use scheduler::CooldownScheduler;
pub use scope::{Scope, ScopeId, ScopeKind};
