//! Permission Definitions
//!
//! ## 设计原则
//! - 基础操作（开台、点单、改状态、收款）无需权限，登录即可使用
//! - 管理与敏感操作单独授权

/// 桌台管理（新增/删除桌台）
pub const TABLES_MANAGE: &str = "tables:manage";
/// 退款
pub const ORDERS_REFUND: &str = "orders:refund";
/// 更正小票（现金/备注）
pub const RECEIPTS_CORRECT: &str = "receipts:correct";
/// 报表查看
pub const REPORTS_VIEW: &str = "reports:view";

/// 可配置权限列表
pub const ALL_PERMISSIONS: &[&str] = &[TABLES_MANAGE, ORDERS_REFUND, RECEIPTS_CORRECT, REPORTS_VIEW];

/// 经理角色默认权限（全部可配置权限）
pub const DEFAULT_MANAGER_PERMISSIONS: &[&str] = ALL_PERMISSIONS;

/// 收银员默认权限
pub const DEFAULT_CASHIER_PERMISSIONS: &[&str] = &[RECEIPTS_CORRECT];

/// 令牌未携带权限时按角色补全
///
/// admin 不需要列表，`CurrentUser::has_permission` 直接放行。
pub fn default_permissions_for_role(role: &str) -> &'static [&'static str] {
    match role {
        "manager" => DEFAULT_MANAGER_PERMISSIONS,
        "cashier" => DEFAULT_CASHIER_PERMISSIONS,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults() {
        assert!(default_permissions_for_role("manager").contains(&ORDERS_REFUND));
        assert_eq!(default_permissions_for_role("cashier"), &[RECEIPTS_CORRECT]);
        assert!(default_permissions_for_role("waiter").is_empty());
    }
}
