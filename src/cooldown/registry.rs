use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::models::{CooldownRecord, CooldownSnapshot, CooldownStatus};
use super::scope::{Scope, ScopeId};

/// 当前 Unix 时间戳（秒）
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// 冷却事件表，所有与时间相关的操作都显式接收 `now`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CooldownEvents {
    events: CooldownSnapshot,
}

impl CooldownEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(events: CooldownSnapshot) -> Self {
        Self { events }
    }

    pub fn snapshot(&self) -> CooldownSnapshot {
        self.events.clone()
    }

    #[cfg(test)]
    pub(crate) fn records(&self, token: &str) -> Option<&[CooldownRecord]> {
        self.events.get(token).map(Vec::as_slice)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    /// 添加/更新冷却事件，同一 `(group, user)` 只保留一条记录
    pub fn set_at(&mut self, token: &str, duration_secs: u64, scope: Scope, now: i64) {
        let (group, user) = scope.pair();
        let duration = i64::try_from(duration_secs).unwrap_or(i64::MAX);
        let record = CooldownRecord {
            group,
            user,
            expired_time: now.saturating_add(duration),
        };

        let records = self.events.entry(token.to_string()).or_default();
        if let Some(existing) = records.iter_mut().find(|r| r.pair() == (group, user)) {
            existing.expired_time = record.expired_time;
            tracing::debug!(token, ?record, "Cooldown event updated");
            return;
        }

        tracing::debug!(token, ?record, "Cooldown event set");
        records.push(record);
    }

    /// 获取冷却事件状态
    ///
    /// 多条记录同时命中时，`remaining` 取扫描顺序中最后一条命中的记录，
    /// 而不是剩余时间最长的那条。
    pub fn get_at(
        &self,
        token: &str,
        scope: Scope,
        ignore_priority: bool,
        now: i64,
    ) -> CooldownStatus {
        let query = scope.pair();
        let mut status = CooldownStatus::default();

        for record in self.events.get(token).into_iter().flatten() {
            let remaining = record.remaining_at(now);
            if remaining >= 0 && record_matches(record, query, ignore_priority) {
                status = CooldownStatus {
                    status: true,
                    remaining,
                };
            }
        }

        status
    }

    /// 移除第一条 `(group, user)` 完全一致的记录，不存在时什么也不做
    pub fn del(&mut self, token: &str, scope: Scope) -> bool {
        let pair = scope.pair();
        let Some(records) = self.events.get_mut(token) else {
            return false;
        };
        let Some(index) = records.iter().position(|r| r.pair() == pair) else {
            return false;
        };

        let record = records.remove(index);
        tracing::info!(token, ?record, "Cooldown event removed manually");
        true
    }

    /// 移除所有过期记录以及因此变空的事件标签，返回移除的记录数
    pub fn remove_expired_at(&mut self, now: i64) -> usize {
        let mut count = 0;
        for records in self.events.values_mut() {
            let before = records.len();
            records.retain(|r| r.remaining_at(now) > 0);
            count += before - records.len();
        }
        self.events.retain(|_, records| !records.is_empty());

        tracing::debug!(
            "Automatically removed expired cooldown records: {} {} removed",
            count,
            if count == 1 { "record" } else { "records" }
        );
        count
    }
}

/// 优先级匹配规则
///
/// 记录按 `(group, user)` 归为四类：全局（均为 0）、群组（群组一致且用户为 0）、
/// 一般（群组和用户均一致）、用户（群组为 0 且用户一致）。
/// 默认模式下任意一类命中即视为冷却中，与查询本身的类型无关，
/// 因此全局冷却会覆盖所有范围，群组冷却会覆盖该群内所有用户。
/// `ignore_priority` 时只有一般记录计入。
pub fn record_matches(
    record: &CooldownRecord,
    (group, user): (ScopeId, ScopeId),
    ignore_priority: bool,
) -> bool {
    let is_global = record.group == 0 && record.user == 0;
    let is_group = record.group == group && record.user == 0;
    let is_normal = record.group == group && record.user == user;
    let is_user = record.group == 0 && record.user == user;

    if ignore_priority {
        is_normal
    } else {
        is_global || is_group || is_normal || is_user
    }
}

/// 进程内唯一的冷却事件注册表句柄，克隆后共享同一份数据
#[derive(Clone, Default)]
pub struct CooldownRegistry {
    inner: Arc<Mutex<CooldownEvents>>,
}

impl CooldownRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // 表操作不会在修改途中 panic，锁中毒时继续使用内部数据
    fn lock(&self) -> MutexGuard<'_, CooldownEvents> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, token: &str, duration_secs: u64, scope: Scope) {
        self.lock().set_at(token, duration_secs, scope, now());
    }

    pub fn get(&self, token: &str, scope: Scope, ignore_priority: bool) -> CooldownStatus {
        self.lock().get_at(token, scope, ignore_priority, now())
    }

    pub fn del(&self, token: &str, scope: Scope) -> bool {
        self.lock().del(token, scope)
    }

    pub fn remove_expired(&self) -> usize {
        self.lock().remove_expired_at(now())
    }

    /// 在锁内复制整张表，调用方在锁外做序列化和写盘
    pub fn snapshot(&self) -> CooldownSnapshot {
        self.lock().snapshot()
    }

    /// 用快照整体替换内存中的数据
    pub fn replace(&self, snapshot: CooldownSnapshot) {
        *self.lock() = CooldownEvents::from_snapshot(snapshot);
    }
}
