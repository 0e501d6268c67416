use serde::{Deserialize, Serialize};

use stockroom_core::UserId;

use crate::Role;

/// A fully resolved caller for authorization decisions.
///
/// Built from validated token claims; the core trusts this classification and
/// never re-authenticates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn supplier(user_id: UserId) -> Self {
        Self::new(user_id, Role::Supplier)
    }

    pub fn consumer(user_id: UserId) -> Self {
        Self::new(user_id, Role::Consumer)
    }

    pub fn is_supplier(&self) -> bool {
        self.role == Role::Supplier
    }
}
