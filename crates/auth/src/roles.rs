use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Permission;

/// Caller role.
///
/// Closed set: every authenticated caller is exactly one of these, and the
/// role is fixed by the token for the lifetime of a request. Decoding goes
/// through [`FromStr`], so a token naming any other role is rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Role {
    /// Owns warehouses, registers products, supplies stock.
    Supplier,
    /// Draws stock from any warehouse.
    Consumer,
}

const SUPPLIER_PERMISSIONS: &[Permission] = &[
    Permission::CreateWarehouse,
    Permission::CreateProduct,
    Permission::SupplyStock,
    Permission::ReadStock,
];

const CONSUMER_PERMISSIONS: &[Permission] = &[Permission::ConsumeStock, Permission::ReadStock];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Supplier => "supplier",
            Role::Consumer => "consumer",
        }
    }

    /// Permissions granted by this role.
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Supplier => SUPPLIER_PERMISSIONS,
            Role::Consumer => CONSUMER_PERMISSIONS,
        }
    }

    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "supplier" => Ok(Role::Supplier),
            "consumer" => Ok(Role::Consumer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
