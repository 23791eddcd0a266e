use config::Config;
use cooldown::{CooldownRegistry, SnapshotStore};

pub mod config;
pub mod cooldown;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod utils;

pub use error::{CooldownError, CooldownResult};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub registry: CooldownRegistry,
    pub store: SnapshotStore,
}

impl AppState {
    /// 以空注册表组装应用状态，备份文件取自配置
    pub fn new(config: Config) -> Self {
        let store = SnapshotStore::new(config.backup_file.clone());
        Self {
            config,
            registry: CooldownRegistry::new(),
            store,
        }
    }
}
