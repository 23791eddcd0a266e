use serde::{Deserialize, Serialize};

use crate::cooldown::{Scope, ScopeId, ScopeKind};
use crate::error::CooldownResult;
use crate::utils::TimePreset;

/// 把请求中的事件类型和 ID 组装为作用范围，事件类型默认为 `normal`
fn parse_scope(
    kind: Option<&str>,
    group: Option<ScopeId>,
    user: Option<ScopeId>,
) -> CooldownResult<Scope> {
    let kind = match kind {
        Some(raw) => raw.parse::<ScopeKind>()?,
        None => ScopeKind::default(),
    };
    Ok(Scope::from_parts(kind, group, user))
}

#[derive(Debug, Deserialize)]
pub struct SetCooldownRequest {
    pub token: String,
    /// 冷却持续时间（秒）
    pub duration: u64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub group: Option<ScopeId>,
    pub user: Option<ScopeId>,
}

impl SetCooldownRequest {
    pub fn scope(&self) -> CooldownResult<Scope> {
        parse_scope(self.kind.as_deref(), self.group, self.user)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetCooldownResponse {
    pub token: String,
    pub duration: u64,
}

#[derive(Debug, Deserialize)]
pub struct GetCooldownQuery {
    pub token: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub group: Option<ScopeId>,
    pub user: Option<ScopeId>,
    #[serde(default)]
    pub ignore_priority: bool,
    pub preset: Option<String>,
}

impl GetCooldownQuery {
    pub fn scope(&self) -> CooldownResult<Scope> {
        parse_scope(self.kind.as_deref(), self.group, self.user)
    }

    pub fn preset(&self) -> CooldownResult<TimePreset> {
        match self.preset.as_deref() {
            Some(raw) => raw.parse(),
            None => Ok(TimePreset::default()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CooldownStatusResponse {
    pub status: bool,
    pub remaining: i64,
    /// 按 `preset` 格式化的剩余时间
    pub remaining_text: String,
}

#[derive(Debug, Deserialize)]
pub struct DelCooldownRequest {
    pub token: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub group: Option<ScopeId>,
    pub user: Option<ScopeId>,
}

impl DelCooldownRequest {
    pub fn scope(&self) -> CooldownResult<Scope> {
        parse_scope(self.kind.as_deref(), self.group, self.user)
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckCooldownQuery {
    pub token: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub group: Option<ScopeId>,
    pub user: Option<ScopeId>,
    #[serde(default)]
    pub ignore_priority: bool,
}

impl CheckCooldownQuery {
    pub fn scope(&self) -> CooldownResult<Scope> {
        parse_scope(self.kind.as_deref(), self.group, self.user)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckCooldownResponse {
    /// 冷却已结束，可以继续处理
    pub cooled_down: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemovedResponse {
    pub removed: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackupResponse {
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CooldownError;

    #[test]
    fn missing_type_defaults_to_normal() {
        let req: SetCooldownRequest =
            serde_json::from_str(r#"{"token": "draw", "duration": 60, "group": 1, "user": 2}"#)
                .unwrap();
        assert_eq!(req.scope().unwrap(), Scope::Normal { group: 1, user: 2 });
    }

    #[test]
    fn unknown_type_is_a_validation_error() {
        let req: DelCooldownRequest =
            serde_json::from_str(r#"{"token": "draw", "type": "channel"}"#).unwrap();
        let err = req.scope().unwrap_err();
        assert!(matches!(err, CooldownError::InvalidScope(_)));
        assert!(err.is_validation());
    }
}
