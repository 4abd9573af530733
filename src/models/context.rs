/// 调用方的组织可见范围谓词
///
/// 鉴权决策在上游完成，这里只消费一个不透明的归属过滤条件；
/// 范围外的资源与不存在的资源对调用方不可区分。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// 不限（管理员视角）
    All,
    /// 只能看到指定用户创建的资源
    OwnedBy(i64),
}

/// 一次调用携带的用户上下文
#[derive(Debug, Clone, Copy)]
pub struct UserContext {
    pub user_id: i64,
    pub scope: Scope,
    /// 响应中是否暴露正确答案（由上游按角色决定）
    pub include_answers: bool,
}

impl UserContext {
    pub fn admin(user_id: i64) -> Self {
        Self {
            user_id,
            scope: Scope::All,
            include_answers: true,
        }
    }

    pub fn restricted(user_id: i64) -> Self {
        Self {
            user_id,
            scope: Scope::OwnedBy(user_id),
            include_answers: false,
        }
    }
}
