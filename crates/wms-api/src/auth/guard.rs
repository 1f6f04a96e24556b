//! Role based permission checks.
//!
//! A user's effective permissions are those of their primary role plus those
//! of every additional role assigned in `user_roles`. Handlers state what they
//! need with [`AuthUser::require`] (or a [`PermissionGuard`]); a request
//! proceeds only when every required permission is granted.

use std::{collections::BTreeSet, fmt};

use sqlx::PgPool;
use wms_core::permissions::{effective_permissions, missing_permissions};
use wms_db::{
    models::User,
    repositories::{role as role_repo, user as user_repo},
};

use super::AuthUser;
use crate::error::ApiError;

macro_rules! permissions {
    ($($variant:ident => $code:literal,)+) => {
        /// Permission codes seeded by the migrations, `<resource>.<action>`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Permission {
            $($variant,)+
        }

        impl Permission {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }
        }
    };
}

permissions! {
    CustomersRead => "customers.read",
    CustomersCreate => "customers.create",
    CustomersUpdate => "customers.update",
    CustomersDelete => "customers.delete",
    CustomerGroupsRead => "customer_groups.read",
    CustomerGroupsCreate => "customer_groups.create",
    CustomerGroupsUpdate => "customer_groups.update",
    CustomerGroupsDelete => "customer_groups.delete",
    ProductsRead => "products.read",
    ProductsCreate => "products.create",
    ProductsUpdate => "products.update",
    ProductsDelete => "products.delete",
    WarehousesRead => "warehouses.read",
    WarehousesCreate => "warehouses.create",
    WarehousesUpdate => "warehouses.update",
    WarehousesDelete => "warehouses.delete",
    InventoryRead => "inventory.read",
    InventoryCreate => "inventory.create",
    InventoryUpdate => "inventory.update",
    InventoryDelete => "inventory.delete",
    InventoryAdjust => "inventory.adjust",
    InvoicesRead => "invoices.read",
    InvoicesCreate => "invoices.create",
    InvoicesUpdate => "invoices.update",
    InvoicesDelete => "invoices.delete",
    InvoicesPay => "invoices.pay",
    InvoicesCancel => "invoices.cancel",
    RolesRead => "roles.read",
    RolesCreate => "roles.create",
    RolesUpdate => "roles.update",
    RolesDelete => "roles.delete",
    UsersRead => "users.read",
    UsersCreate => "users.create",
    UsersUpdate => "users.update",
    UsersDelete => "users.delete",
    FacebookRead => "facebook.read",
    FacebookCreate => "facebook.create",
    FacebookUpdate => "facebook.update",
    FacebookDelete => "facebook.delete",
    FacebookSync => "facebook.sync",
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful permission check.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub user: User,
    pub permissions: BTreeSet<String>,
}

pub struct PermissionGuard<'a> {
    pool: &'a PgPool,
    auth_user: &'a AuthUser,
}

impl fmt::Debug for PermissionGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionGuard")
            .field("user_id", &self.auth_user.user_id)
            .finish_non_exhaustive()
    }
}

impl<'a> PermissionGuard<'a> {
    pub const fn new(pool: &'a PgPool, auth_user: &'a AuthUser) -> Self {
        Self { pool, auth_user }
    }

    /// Load the user's effective permissions without requiring any.
    pub async fn load(&self) -> Result<Authorized, ApiError> {
        let user_id = self.auth_user.user_id;

        let Some(user) = user_repo::find_by_id(self.pool, user_id).await? else {
            return Err(ApiError::Auth("User no longer exists".to_string()));
        };

        if !user.is_active {
            return Err(ApiError::Forbidden("User account is disabled".to_string()));
        }

        let primary = role_repo::primary_permission_codes(self.pool, user_id).await?;
        let additional = role_repo::additional_permission_codes(self.pool, user_id).await?;

        Ok(Authorized {
            user,
            permissions: effective_permissions(primary, additional),
        })
    }

    /// Fail with 403 naming every required permission the user lacks.
    pub async fn require(&self, required: &[Permission]) -> Result<Authorized, ApiError> {
        let authorized = self.load().await?;

        let required = required.iter().map(|p| p.as_str()).collect::<Vec<_>>();
        let missing = missing_permissions(&required, &authorized.permissions);

        if !missing.is_empty() {
            tracing::debug!(
                user_id = %self.auth_user.user_id,
                missing = ?missing,
                "Permission denied"
            );
            return Err(ApiError::Forbidden(format!(
                "Missing permissions: {}",
                missing.join(", ")
            )));
        }

        Ok(authorized)
    }
}

impl AuthUser {
    /// Shorthand for `PermissionGuard::new(pool, self).require(required)`.
    pub async fn require(
        &self,
        pool: &PgPool,
        required: &[Permission],
    ) -> Result<Authorized, ApiError> {
        PermissionGuard::new(pool, self).require(required).await
    }
}
