//! Permission Definitions
//!
//! | 权限 | 说明 |
//! |------|------|
//! | `requests:read` | 查看服务请求 / 历史 |
//! | `requests:create` | 客人端渠道创建请求 |
//! | `requests:act` | 接单 / 完成 / 取消 |
//! | `assignments:read` | 查看桌台分配 / 桌台归属 |
//! | `assignments:self` | 自助认领桌台或区域 |
//! | `assignments:manage` | 经理分配 / 撤销 |

pub const REQUESTS_READ: &str = "requests:read";
pub const REQUESTS_CREATE: &str = "requests:create";
pub const REQUESTS_ACT: &str = "requests:act";
pub const ASSIGNMENTS_READ: &str = "assignments:read";
pub const ASSIGNMENTS_SELF: &str = "assignments:self";
pub const ASSIGNMENTS_MANAGE: &str = "assignments:manage";

/// 服务员默认权限
pub const DEFAULT_WAITER_PERMISSIONS: &[&str] = &[
    REQUESTS_READ,
    REQUESTS_ACT,
    ASSIGNMENTS_READ,
    ASSIGNMENTS_SELF,
];

/// 经理默认权限
pub const DEFAULT_MANAGER_PERMISSIONS: &[&str] = &["requests:*", "assignments:*"];

/// 客人端渠道 (扫码点呼叫等) 只能创建请求
pub const DEFAULT_GUEST_CHANNEL_PERMISSIONS: &[&str] = &[REQUESTS_CREATE];

/// Get permissions for a role name
pub fn get_default_permissions(role_name: &str) -> Vec<String> {
    let permissions = match role_name {
        "admin" => &["all"][..],
        "manager" => DEFAULT_MANAGER_PERMISSIONS,
        "waiter" => DEFAULT_WAITER_PERMISSIONS,
        "guest_channel" => DEFAULT_GUEST_CHANNEL_PERMISSIONS,
        _ => &[],
    };
    permissions.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CurrentUser;

    fn with_role(role: &str) -> CurrentUser {
        CurrentUser {
            id: 1,
            display_name: "Anna".to_string(),
            role: role.to_string(),
            permissions: get_default_permissions(role),
        }
    }

    #[test]
    fn waiter_cannot_manage_assignments() {
        let waiter = with_role("waiter");
        assert!(waiter.has_permission(REQUESTS_ACT));
        assert!(waiter.has_permission(ASSIGNMENTS_SELF));
        assert!(!waiter.has_permission(ASSIGNMENTS_MANAGE));
        assert!(!waiter.has_permission(REQUESTS_CREATE));
    }

    #[test]
    fn manager_wildcards_cover_everything() {
        let manager = with_role("manager");
        for permission in [
            REQUESTS_READ,
            REQUESTS_CREATE,
            REQUESTS_ACT,
            ASSIGNMENTS_READ,
            ASSIGNMENTS_SELF,
            ASSIGNMENTS_MANAGE,
        ] {
            assert!(manager.has_permission(permission), "{permission}");
        }
    }

    #[test]
    fn guest_channel_only_creates() {
        let guest = with_role("guest_channel");
        assert!(guest.has_permission(REQUESTS_CREATE));
        assert!(!guest.has_permission(REQUESTS_READ));
        assert!(with_role("unknown").permissions.is_empty());
    }
}
