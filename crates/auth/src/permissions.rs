/// Permission identifier.
///
/// Permissions are what handlers and services check; roles only decide which
/// permissions a caller holds (see [`crate::Role::permissions`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Permission {
    CreateWarehouse,
    CreateProduct,
    SupplyStock,
    ConsumeStock,
    ReadStock,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CreateWarehouse => "warehouses.create",
            Permission::CreateProduct => "products.create",
            Permission::SupplyStock => "stock.supply",
            Permission::ConsumeStock => "stock.consume",
            Permission::ReadStock => "stock.read",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
