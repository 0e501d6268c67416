use thiserror::Error;

use crate::{Permission, Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{role}' lacks permission '{permission}'")]
    Forbidden { role: Role, permission: Permission },
}

/// Command-side authorization contract (checked at the command boundary).
///
/// Implement this on commands that require a permission. Services enforce it
/// before touching any reference the command carries.
pub trait CommandAuthorization {
    fn required_permission(&self) -> Permission;
}

/// Authorize a principal for a single permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: Permission) -> Result<(), AuthzError> {
    if principal.role.grants(required) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %principal.user_id,
            role = %principal.role,
            permission = %required,
            "authorization denied"
        );
        Err(AuthzError::Forbidden {
            role: principal.role,
            permission: required,
        })
    }
}

/// Authorize a principal for the permission a command declares.
pub fn authorize_command<C: CommandAuthorization>(
    principal: &Principal,
    command: &C,
) -> Result<(), AuthzError> {
    authorize(principal, command.required_permission())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::UserId;

    struct Supply;

    impl CommandAuthorization for Supply {
        fn required_permission(&self) -> Permission {
            Permission::SupplyStock
        }
    }

    #[test]
    fn supplier_may_supply() {
        let principal = Principal::supplier(UserId::new());
        assert!(authorize_command(&principal, &Supply).is_ok());
    }

    #[test]
    fn consumer_may_not_supply() {
        let principal = Principal::consumer(UserId::new());
        let err = authorize_command(&principal, &Supply).unwrap_err();
        assert_eq!(
            err,
            AuthzError::Forbidden {
                role: Role::Consumer,
                permission: Permission::SupplyStock,
            }
        );
        assert_eq!(
            err.to_string(),
            "forbidden: role 'consumer' lacks permission 'stock.supply'"
        );
    }

    #[test]
    fn supplier_may_not_consume() {
        let principal = Principal::supplier(UserId::new());
        assert!(authorize(&principal, Permission::ConsumeStock).is_err());
    }
}
