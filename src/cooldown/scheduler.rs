use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use super::persistence::SnapshotStore;
use super::registry::CooldownRegistry;

/// 定时清理过期记录与定时备份
///
/// 两个任务各自独立，启动时立即执行一次，之后按周期执行。
/// 任务在自己的循环里串行执行，不会与下一次触发重叠，错过的触发直接跳过。
pub struct CooldownScheduler {
    stop_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl CooldownScheduler {
    pub fn start(
        registry: CooldownRegistry,
        store: SnapshotStore,
        autoremove_period: Duration,
        autobackup_period: Duration,
    ) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);

        let remove_registry = registry.clone();
        let mut remove_stop = stop_rx.clone();
        let remove_handle = tokio::spawn(async move {
            let mut ticker = interval(autoremove_period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        remove_registry.remove_expired();
                    }
                    _ = remove_stop.changed() => break,
                }
            }
        });

        let mut backup_stop = stop_rx;
        let backup_handle = tokio::spawn(async move {
            let mut ticker = interval(autobackup_period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                // 只在等待下一次触发时响应停止信号，进行中的备份总会写完
                tokio::select! {
                    _ = ticker.tick() => {
                        store.backup_or_log(&registry).await;
                    }
                    _ = backup_stop.changed() => break,
                }
            }
        });

        tracing::info!(
            autoremove_secs = autoremove_period.as_secs(),
            autobackup_secs = autobackup_period.as_secs(),
            "Scheduler started"
        );

        Self {
            stop_tx,
            handles: vec![remove_handle, backup_handle],
        }
    }

    /// 通知定时任务停止并等待其退出
    pub async fn shutdown(self) {
        // 接收端已全部退出时发送失败，此时无需处理
        let _ = self.stop_tx.send(true);
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Scheduler task failed");
            }
        }
        tracing::info!("Scheduler stopped");
    }

    /// 退出流程：停止定时任务后做最后一次备份
    pub async fn shutdown_and_backup(self, store: &SnapshotStore, registry: &CooldownRegistry) {
        self.shutdown().await;
        store.backup_or_log(registry).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooldown::{CooldownRecord, CooldownSnapshot, Scope};

    fn expired_snapshot() -> CooldownSnapshot {
        let mut snapshot = CooldownSnapshot::new();
        snapshot.insert(
            "draw".to_string(),
            vec![CooldownRecord {
                group: 1,
                user: 2,
                expired_time: 0,
            }],
        );
        snapshot
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_and_backup_run_eagerly_on_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("cooldown_backup.json"));
        let registry = CooldownRegistry::new();
        registry.replace(expired_snapshot());

        let scheduler = CooldownScheduler::start(
            registry.clone(),
            store.clone(),
            Duration::from_secs(3600),
            Duration::from_secs(600),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(registry.snapshot().is_empty());
        assert!(store.path().exists());
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_repeats_on_its_interval() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("cooldown_backup.json"));
        let registry = CooldownRegistry::new();

        let scheduler = CooldownScheduler::start(
            registry.clone(),
            store,
            Duration::from_secs(60),
            Duration::from_secs(600),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;

        registry.replace(expired_snapshot());
        registry.set("keep", 86_400, Scope::Global);
        tokio::time::sleep(Duration::from_secs(61)).await;

        let snapshot = registry.snapshot();
        assert!(!snapshot.contains_key("draw"));
        assert!(snapshot.contains_key("keep"));
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_writes_records_set_after_last_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("cooldown_backup.json"));
        let registry = CooldownRegistry::new();

        let scheduler = CooldownScheduler::start(
            registry.clone(),
            store.clone(),
            Duration::from_secs(3600),
            Duration::from_secs(600),
        );
        // 等待启动时的那次备份落盘
        while !store.path().exists() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        registry.set("draw", 600, Scope::Normal { group: 1, user: 2 });
        scheduler.shutdown_and_backup(&store, &registry).await;

        let restored = CooldownRegistry::new();
        store.restore(&restored).await.unwrap();
        assert!(
            restored
                .get("draw", Scope::Normal { group: 1, user: 2 }, true)
                .status
        );
    }
}
