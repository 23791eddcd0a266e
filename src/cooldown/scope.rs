use std::fmt;
use std::str::FromStr;

use crate::error::CooldownError;

/// 群组或用户 ID，0 表示未设置
pub type ScopeId = i64;

/// 冷却事件作用范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// 全局冷却事件
    Global,
    /// 群组冷却事件
    Group { group: ScopeId },
    /// 一般冷却事件，同时限定群组和用户
    Normal { group: ScopeId, user: ScopeId },
    /// 用户冷却事件
    User { user: ScopeId },
}

impl Scope {
    /// 按类型组装作用范围，缺失的 ID 视为 0
    pub fn from_parts(kind: ScopeKind, group: Option<ScopeId>, user: Option<ScopeId>) -> Self {
        let group = group.unwrap_or(0);
        let user = user.unwrap_or(0);
        match kind {
            ScopeKind::Global => Scope::Global,
            ScopeKind::Group => Scope::Group { group },
            ScopeKind::Normal => Scope::Normal { group, user },
            ScopeKind::User => Scope::User { user },
        }
    }

    /// 实际参与匹配的 `(group, user)`
    pub fn pair(&self) -> (ScopeId, ScopeId) {
        match *self {
            Scope::Global => (0, 0),
            Scope::Group { group } => (group, 0),
            Scope::Normal { group, user } => (group, user),
            Scope::User { user } => (0, user),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        match self {
            Scope::Global => ScopeKind::Global,
            Scope::Group { .. } => ScopeKind::Group,
            Scope::Normal { .. } => ScopeKind::Normal,
            Scope::User { .. } => ScopeKind::User,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (group, user) = self.pair();
        write!(f, "{}(group={}, user={})", self.kind(), group, user)
    }
}

/// 字符串形式的事件类型，只在调用边界解析一次
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Global,
    Group,
    #[default]
    Normal,
    User,
}

impl FromStr for ScopeKind {
    type Err = CooldownError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(ScopeKind::Global),
            "group" => Ok(ScopeKind::Group),
            "normal" => Ok(ScopeKind::Normal),
            "user" => Ok(ScopeKind::User),
            other => Err(CooldownError::InvalidScope(other.to_string())),
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScopeKind::Global => "global",
            ScopeKind::Group => "group",
            ScopeKind::Normal => "normal",
            ScopeKind::User => "user",
        };
        f.write_str(name)
    }
}
