use super::registry::CooldownRegistry;
use super::scope::Scope;

/// 检查冷却是否已经结束的规则
#[derive(Clone)]
pub struct CooldownRule {
    registry: CooldownRegistry,
    token: String,
    scope: Scope,
    ignore_priority: bool,
}

/// 创建规则：冷却仍在生效时为 `false`，反之为 `true`
pub fn is_cooled_down(
    registry: &CooldownRegistry,
    token: impl Into<String>,
    scope: Scope,
) -> CooldownRule {
    CooldownRule {
        registry: registry.clone(),
        token: token.into(),
        scope,
        ignore_priority: false,
    }
}

impl CooldownRule {
    /// 忽略事件优先级，只有群组和用户都一致的记录才会阻止通过
    pub fn ignore_priority(mut self, ignore_priority: bool) -> Self {
        self.ignore_priority = ignore_priority;
        self
    }

    pub fn check(&self) -> bool {
        !self
            .registry
            .get(&self.token, self.scope, self.ignore_priority)
            .status
    }

    /// 转换为宿主过滤层可直接调用的谓词，上下文参数不参与判断
    pub fn into_predicate<C>(self) -> impl Fn(&C) -> bool + Clone + Send + Sync {
        move |_: &C| self.check()
    }
}
