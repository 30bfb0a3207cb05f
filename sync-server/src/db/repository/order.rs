//! Order Repository
//!
//! Commerce-side order storage: orders, line items and the per-order
//! note stream the event journal is built on. Mutations are shaped as
//! fixed statements so the engine can compose them inside one
//! transaction.

use super::{RepoError, RepoResult};
use crate::db::models::{OrderItemRow, OrderNoteRow, OrderRow};
use chrono::Utc;
use shared::order::Address;
use sqlx::SqliteConnection;

/// Yes/No meta flag encoding used by the legacy order metadata
pub fn flag_text(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// New order payload, already validated by the mutation engine
#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    pub sample: bool,
    pub reprint: bool,
    pub xqc: bool,
    pub customer_email: String,
    pub carrier: String,
    pub priority: String,
    pub address_to: Address,
    pub address_from: Address,
}

/// New line item payload with its resolved catalog product
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub external_item_id: String,
    pub product_id: i64,
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub print_files: String,
    pub preview_files: String,
}

pub struct OrderRepository;

impl OrderRepository {
    /// Insert a new externally-sourced order, returns its local ID
    pub async fn insert_order(conn: &mut SqliteConnection, order: &NewOrder) -> RepoResult<i64> {
        let to = &order.address_to;
        let from = &order.address_from;
        let result = sqlx::query(
            "INSERT INTO orders (
                status, is_external,
                sample, reprint, extra_quality_care, customer_email,
                shipping_carrier, shipping_priority,
                billing_address1, billing_address2, billing_city, billing_zip,
                billing_country, billing_region, billing_first_name,
                billing_last_name, billing_phone,
                shipping_address1, shipping_address2, shipping_city, shipping_zip,
                shipping_country, shipping_region, shipping_company,
                shipping_email, shipping_phone,
                created_at
            ) VALUES ('pending', 1, ?, ?, ?, ?, ?, ?,
                      ?, ?, ?, ?, ?, ?, ?, ?, ?,
                      ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(flag_text(order.sample))
        .bind(flag_text(order.reprint))
        .bind(flag_text(order.xqc))
        .bind(&order.customer_email)
        .bind(&order.carrier)
        .bind(&order.priority)
        .bind(text(&to.address1))
        .bind(text(&to.address2))
        .bind(text(&to.city))
        .bind(text(&to.zip))
        .bind(text(&to.country))
        .bind(text(&to.region))
        .bind(text(&to.first_name))
        .bind(text(&to.last_name))
        .bind(text(&to.phone))
        .bind(text(&from.address1))
        .bind(text(&from.address2))
        .bind(text(&from.city))
        .bind(text(&from.zip))
        .bind(text(&from.country))
        .bind(text(&from.region))
        .bind(text(&from.company))
        .bind(text(&from.email))
        .bind(text(&from.phone))
        .bind(Utc::now().to_rfc3339())
        .execute(conn)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(
        conn: &mut SqliteConnection,
        order_id: i64,
    ) -> RepoResult<Option<OrderRow>> {
        let order = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(conn)
            .await?;
        Ok(order)
    }

    /// Line items of an order, in insertion order
    pub async fn items(
        conn: &mut SqliteConnection,
        order_id: i64,
    ) -> RepoResult<Vec<OrderItemRow>> {
        let items = sqlx::query_as::<_, OrderItemRow>(
            "SELECT * FROM order_items WHERE order_id = ? ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(conn)
        .await?;
        Ok(items)
    }

    /// Attach a line item; every new item starts at status code 0 (Created)
    pub async fn insert_item(
        conn: &mut SqliteConnection,
        order_id: i64,
        item: &NewOrderItem,
    ) -> RepoResult<i64> {
        let subtotal = item.unit_price * item.quantity as f64;
        let result = sqlx::query(
            "INSERT INTO order_items (
                order_id, external_item_id, product_id, name, sku, quantity,
                unit_price, subtotal, total, status_code, print_files, preview_files
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(order_id)
        .bind(&item.external_item_id)
        .bind(item.product_id)
        .bind(&item.name)
        .bind(&item.sku)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(subtotal)
        .bind(subtotal)
        .bind(&item.print_files)
        .bind(&item.preview_files)
        .execute(conn)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn update_status(
        conn: &mut SqliteConnection,
        order_id: i64,
        status: &str,
    ) -> RepoResult<()> {
        sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status)
            .bind(order_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Overwrite the Yes/No meta flags
    pub async fn update_flags(
        conn: &mut SqliteConnection,
        order_id: i64,
        sample: bool,
        reprint: bool,
        xqc: bool,
    ) -> RepoResult<()> {
        sqlx::query(
            "UPDATE orders SET sample = ?, reprint = ?, extra_quality_care = ? WHERE id = ?",
        )
        .bind(flag_text(sample))
        .bind(flag_text(reprint))
        .bind(flag_text(xqc))
        .bind(order_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Carrier and priority are stored as two separate columns; a comma
    /// in either value cannot corrupt the other on read-back.
    pub async fn update_shipping_info(
        conn: &mut SqliteConnection,
        order_id: i64,
        carrier: &str,
        priority: &str,
    ) -> RepoResult<()> {
        sqlx::query("UPDATE orders SET shipping_carrier = ?, shipping_priority = ? WHERE id = ?")
            .bind(carrier)
            .bind(priority)
            .bind(order_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn update_billing_address(
        conn: &mut SqliteConnection,
        order_id: i64,
        address: &Address,
    ) -> RepoResult<()> {
        sqlx::query(
            "UPDATE orders SET
                billing_address1 = ?, billing_address2 = ?, billing_city = ?,
                billing_zip = ?, billing_country = ?, billing_region = ?,
                billing_first_name = ?, billing_last_name = ?, billing_phone = ?
             WHERE id = ?",
        )
        .bind(text(&address.address1))
        .bind(text(&address.address2))
        .bind(text(&address.city))
        .bind(text(&address.zip))
        .bind(text(&address.country))
        .bind(text(&address.region))
        .bind(text(&address.first_name))
        .bind(text(&address.last_name))
        .bind(text(&address.phone))
        .bind(order_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn update_shipping_address(
        conn: &mut SqliteConnection,
        order_id: i64,
        address: &Address,
    ) -> RepoResult<()> {
        sqlx::query(
            "UPDATE orders SET
                shipping_address1 = ?, shipping_address2 = ?, shipping_city = ?,
                shipping_zip = ?, shipping_country = ?, shipping_region = ?,
                shipping_company = ?, shipping_email = ?, shipping_phone = ?
             WHERE id = ?",
        )
        .bind(text(&address.address1))
        .bind(text(&address.address2))
        .bind(text(&address.city))
        .bind(text(&address.zip))
        .bind(text(&address.country))
        .bind(text(&address.region))
        .bind(text(&address.company))
        .bind(text(&address.email))
        .bind(text(&address.phone))
        .bind(order_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Replace a line item's linked product (SKU swap). Resets the file
    /// maps and puts the item back at status Created.
    pub async fn swap_item(
        conn: &mut SqliteConnection,
        item_id: i64,
        product_id: i64,
        sku: &str,
        name: &str,
        unit_price: f64,
        quantity: i64,
    ) -> RepoResult<()> {
        let subtotal = unit_price * quantity as f64;
        sqlx::query(
            "UPDATE order_items SET
                product_id = ?, sku = ?, name = ?, unit_price = ?, quantity = ?,
                subtotal = ?, total = ?, status_code = 0,
                print_files = '{}', preview_files = '{}'
             WHERE id = ?",
        )
        .bind(product_id)
        .bind(sku)
        .bind(name)
        .bind(unit_price)
        .bind(quantity)
        .bind(subtotal)
        .bind(subtotal)
        .bind(item_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn update_item_files(
        conn: &mut SqliteConnection,
        item_id: i64,
        print_files: &str,
        preview_files: &str,
    ) -> RepoResult<()> {
        sqlx::query("UPDATE order_items SET print_files = ?, preview_files = ? WHERE id = ?")
            .bind(print_files)
            .bind(preview_files)
            .bind(item_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn update_item_quantity(
        conn: &mut SqliteConnection,
        item_id: i64,
        quantity: i64,
        unit_price: f64,
    ) -> RepoResult<()> {
        let subtotal = unit_price * quantity as f64;
        sqlx::query(
            "UPDATE order_items SET quantity = ?, subtotal = ?, total = ? WHERE id = ?",
        )
        .bind(quantity)
        .bind(subtotal)
        .bind(subtotal)
        .bind(item_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn set_item_status(
        conn: &mut SqliteConnection,
        item_id: i64,
        status_code: i64,
    ) -> RepoResult<()> {
        sqlx::query("UPDATE order_items SET status_code = ? WHERE id = ?")
            .bind(status_code)
            .bind(item_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Merchant-side production progress on one line item
    pub async fn update_item_progress(
        conn: &mut SqliteConnection,
        item_id: i64,
        status_code: i64,
        tracking_number: &str,
        carrier: &str,
        notes: &str,
    ) -> RepoResult<()> {
        sqlx::query(
            "UPDATE order_items SET status_code = ?, tracking_number = ?, carrier = ?, notes = ?
             WHERE id = ?",
        )
        .bind(status_code)
        .bind(tracking_number)
        .bind(carrier)
        .bind(notes)
        .bind(item_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Re-derive the order total from its line items
    pub async fn recompute_total(conn: &mut SqliteConnection, order_id: i64) -> RepoResult<()> {
        sqlx::query(
            "UPDATE orders SET total =
                (SELECT COALESCE(SUM(total), 0) FROM order_items WHERE order_id = ?)
             WHERE id = ?",
        )
        .bind(order_id)
        .bind(order_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Append a note to the order's journal stream
    pub async fn add_note(
        conn: &mut SqliteConnection,
        order_id: i64,
        content: &str,
        is_structured: bool,
    ) -> RepoResult<i64> {
        let result = sqlx::query(
            "INSERT INTO order_notes (order_id, content, is_structured, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(content)
        .bind(is_structured)
        .bind(Utc::now().to_rfc3339())
        .execute(conn)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// All notes of an order in insertion order
    pub async fn notes(
        conn: &mut SqliteConnection,
        order_id: i64,
    ) -> RepoResult<Vec<OrderNoteRow>> {
        let notes = sqlx::query_as::<_, OrderNoteRow>(
            "SELECT * FROM order_notes WHERE order_id = ? ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(conn)
        .await?;
        Ok(notes)
    }

    /// Hard delete an order together with its items and notes
    pub async fn delete(conn: &mut SqliteConnection, order_id: i64) -> RepoResult<()> {
        sqlx::query("DELETE FROM order_notes WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *conn)
            .await?;
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(order_id)
            .execute(conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Order {} not found", order_id)));
        }
        Ok(())
    }
}
