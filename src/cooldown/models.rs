use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::scope::ScopeId;

/// 单条冷却记录，同时也是备份文件中的数据格式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownRecord {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub group: ScopeId,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub user: ScopeId,
    pub expired_time: i64, // Unix timestamp
}

impl CooldownRecord {
    pub fn pair(&self) -> (ScopeId, ScopeId) {
        (self.group, self.user)
    }

    /// 剩余秒数，已过期时为负
    pub fn remaining_at(&self, now: i64) -> i64 {
        self.expired_time - now
    }
}

/// 冷却状态查询结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownStatus {
    /// 冷却是否正在生效
    pub status: bool,
    /// 冷却剩余时间（秒），未生效时为 0
    pub remaining: i64,
}

/// 备份快照：事件标签 -> 冷却记录列表
pub type CooldownSnapshot = BTreeMap<String, Vec<CooldownRecord>>;

// 旧版备份中未设置的 ID 可能写成 null
fn null_as_zero<'de, D>(deserializer: D) -> Result<ScopeId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ScopeId>::deserialize(deserializer)?.unwrap_or(0))
}
