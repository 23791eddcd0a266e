use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tokio::sync::Mutex;

use super::models::CooldownSnapshot;
use super::registry::CooldownRegistry;
use crate::error::{CooldownError, CooldownResult};

/// 恢复结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored { tokens: usize, records: usize },
    /// 备份文件不存在，首次运行时属于正常情况
    Missing,
}

/// JSON 快照备份
///
/// 每次都读写完整的注册表。写入先落到 `.tmp` 文件再重命名，
/// 中途中断不会损坏已有的备份。克隆出的句柄共用同一把写锁，
/// 定时备份、手动备份和退出备份不会同时写 `.tmp` 文件。
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 从备份文件恢复，整体替换内存中的数据
    pub async fn restore(&self, registry: &CooldownRegistry) -> CooldownResult<RestoreOutcome> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "Backup file {} does not exist, skip restoring",
                    self.path.display()
                );
                return Ok(RestoreOutcome::Missing);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: CooldownSnapshot =
            serde_json::from_str(&contents).map_err(|source| CooldownError::MalformedSnapshot {
                path: self.path.clone(),
                source,
            })?;

        let outcome = RestoreOutcome::Restored {
            tokens: snapshot.len(),
            records: snapshot.values().map(Vec::len).sum(),
        };
        registry.replace(snapshot);

        tracing::debug!(?outcome, "Restored data from file {}", self.path.display());
        Ok(outcome)
    }

    /// 备份完整注册表，注册表的锁只在复制数据时持有
    pub async fn backup(&self, registry: &CooldownRegistry) -> CooldownResult<()> {
        // 先拿写锁再复制数据，后完成的写入总是更新的快照
        let _guard = self.write_lock.lock().await;
        let snapshot = registry.snapshot();
        let json = serde_json::to_string_pretty(&snapshot).map_err(CooldownError::Serialize)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, json).await?;
        fs::rename(&tmp_path, &self.path).await?;

        tracing::debug!("Backed up cooldown data to file {}", self.path.display());
        Ok(())
    }

    /// 定时任务和退出时使用：失败只记录日志，等待下一次备份
    pub async fn backup_or_log(&self, registry: &CooldownRegistry) {
        if let Err(e) = self.backup(registry).await {
            tracing::error!(error = %e, "Failed to back up cooldown data to {}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooldown::{CooldownRecord, Scope};

    #[tokio::test]
    async fn backup_then_restore_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested/cache/cooldown_backup.json"));

        let registry = CooldownRegistry::new();
        registry.set("draw", 60, Scope::Normal { group: 1, user: 2 });
        registry.set("draw", 600, Scope::Global);
        registry.set("sign", 60, Scope::User { user: 3 });
        store.backup(&registry).await.unwrap();

        let restored = CooldownRegistry::new();
        restored.set("stale", 60, Scope::Global);
        let outcome = store.restore(&restored).await.unwrap();

        assert_eq!(
            outcome,
            RestoreOutcome::Restored {
                tokens: 2,
                records: 3
            }
        );
        assert_eq!(restored.snapshot(), registry.snapshot());
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_backups_do_not_clobber_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("cooldown_backup.json"));
        let registry = CooldownRegistry::new();
        for user in 1..=50 {
            registry.set("draw", 600, Scope::User { user });
        }

        for _ in 0..20 {
            let tasks: Vec<_> = (0..3)
                .map(|_| {
                    let store = store.clone();
                    let registry = registry.clone();
                    tokio::spawn(async move { store.backup(&registry).await })
                })
                .collect();
            for task in tasks {
                task.await.unwrap().unwrap();
            }
        }

        let restored = CooldownRegistry::new();
        store.restore(&restored).await.unwrap();
        assert_eq!(restored.snapshot(), registry.snapshot());
    }

    #[tokio::test]
    async fn missing_file_leaves_registry_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("absent.json"));

        let registry = CooldownRegistry::new();
        registry.set("draw", 60, Scope::Global);

        assert_eq!(
            store.restore(&registry).await.unwrap(),
            RestoreOutcome::Missing
        );
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn malformed_file_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"draw\": [ {\"group\": 1,").unwrap();

        let store = SnapshotStore::new(&path);
        let err = store.restore(&CooldownRegistry::new()).await.unwrap_err();
        assert!(matches!(err, CooldownError::MalformedSnapshot { .. }));
    }

    #[tokio::test]
    async fn restore_reads_snapshot_wire_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cooldown_backup.json");
        std::fs::write(
            &path,
            r#"{
    "draw": [
        {"group": 100, "user": 200, "expired_time": 1700000060},
        {"group": 0, "user": null, "expired_time": 1700000300}
    ]
}"#,
        )
        .unwrap();

        let registry = CooldownRegistry::new();
        SnapshotStore::new(&path).restore(&registry).await.unwrap();

        let snapshot = registry.snapshot();
        assert_eq!(
            snapshot["draw"],
            vec![
                CooldownRecord {
                    group: 100,
                    user: 200,
                    expired_time: 1_700_000_060
                },
                CooldownRecord {
                    group: 0,
                    user: 0,
                    expired_time: 1_700_000_300
                },
            ]
        );
    }

    #[tokio::test]
    async fn backup_failure_is_reported_not_panicked() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "").unwrap();

        let store = SnapshotStore::new(blocker.join("cooldown_backup.json"));
        let registry = CooldownRegistry::new();

        assert!(store.backup(&registry).await.is_err());
        store.backup_or_log(&registry).await;
    }
}
