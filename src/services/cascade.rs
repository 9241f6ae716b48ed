//! Deletes that reach past a single row.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::database::{DatabaseError, Tables};

/// Remove an admin, then the shop it ran if no other admin is left on it.
/// Rows affected counts the admin and, when retired, the shop.
///
/// The shop row is locked before the admin goes, so two admins of the same
/// shop deleted at once cannot both see the other as remaining.
pub async fn delete_admin(tables: &mut dyn Tables, admin_id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
    let admin = tables
        .find_admin(admin_id)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Admin"))?;

    let shop_id = match admin.shop_id {
        Some(shop_id) if tables.lock_shop(shop_id).await? => Some(shop_id),
        _ => None,
    };

    let mut rows = tables.delete_admin(admin.id, at).await?;

    if let Some(shop_id) = shop_id {
        let remaining = tables.count_admins_for_shop(shop_id).await?;
        debug!(%shop_id, remaining, "Admins left on shop");
        if remaining == 0 {
            rows += retire_shop(tables, shop_id, at).await?;
        }
    }

    Ok(rows)
}

/// Soft-delete a shop, clear it from its admins and take its products off
/// sale. Only the shop row is counted.
pub async fn retire_shop(tables: &mut dyn Tables, shop_id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
    let rows = tables.delete_shop(shop_id, at).await?;
    if rows == 0 {
        return Ok(0);
    }

    let detached = tables.detach_admins(shop_id, at).await?;
    let products = tables.delete_products_by_shop(shop_id, at).await?;
    debug!(%shop_id, detached, products, "Retired shop");
    Ok(rows)
}
