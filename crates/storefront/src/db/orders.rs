//! Order repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use essence_core::pricing::CheckoutTotals;
use essence_core::{
    OrderId, OrderItemId, OrderStatus, PaymentMethod, Price, ProductId, UserId,
};

use super::{RepositoryError, quantity_from_db, quantity_to_db};
use crate::models::{Order, OrderItem, ShippingAddress};

const ORDER_COLUMNS: &str = "id, user_id, status, payment_method, total_amount, shipping_cost, \
                             tax_amount, shipping_address, order_notes, created_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    status: OrderStatus,
    payment_method: PaymentMethod,
    total_amount: Decimal,
    shipping_cost: Decimal,
    tax_amount: Decimal,
    shipping_address: Json<ShippingAddress>,
    order_notes: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    product_name: Option<String>,
    quantity: i32,
    unit_price: Decimal,
}

fn price(value: Decimal, what: &str) -> Result<Price, RepositoryError> {
    Price::new(value).map_err(|e| RepositoryError::DataCorruption(format!("{what}: {e}")))
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = quantity_from_db(row.quantity)?;
        let unit_price = price(row.unit_price, "order item unit price")?;
        Ok(Self {
            id: OrderItemId::new(row.id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            quantity,
            unit_price,
            line_total: unit_price * quantity,
        })
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            status: self.status,
            payment_method: self.payment_method,
            total_amount: price(self.total_amount, "order total")?,
            shipping_cost: price(self.shipping_cost, "order shipping")?,
            tax_amount: price(self.tax_amount, "order tax")?,
            shipping_address: self.shipping_address.0,
            order_notes: self.order_notes,
            created_at: self.created_at,
            items,
        })
    }
}

/// An order about to be written at checkout.
#[derive(Debug)]
pub struct NewOrder {
    pub user_id: UserId,
    pub totals: CheckoutTotals,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub order_notes: Option<String>,
    /// `(product, name, quantity, unit price)` for each line.
    pub lines: Vec<(ProductId, String, u32, Price)>,
}

/// Order count and lifetime spend for the account dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderStats {
    pub order_count: u32,
    pub total_spent: Price,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderStatsRow {
    order_count: i64,
    total_spent: Decimal,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's orders, newest first, with their items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// Get an order the user placed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.attach_items(vec![row]).await?.pop())
    }

    /// Every order, newest first (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// Change an order's status (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Order count and total spent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self, user_id: UserId) -> Result<OrderStats, RepositoryError> {
        let row = sqlx::query_as::<_, OrderStatsRow>(
            r"
            SELECT COUNT(*) AS order_count, COALESCE(SUM(total_amount), 0) AS total_spent
            FROM orders WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(OrderStats {
            order_count: u32::try_from(row.order_count).map_err(|_| {
                RepositoryError::DataCorruption(format!("order count {}", row.order_count))
            })?,
            total_spent: price(row.total_spent, "total spent")?,
        })
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT oi.id, oi.order_id, oi.product_id, p.name AS product_name,
                   oi.quantity, oi.unit_price
            FROM order_items oi
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.order_id, oi.position
            ",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        let mut items_by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for item_row in item_rows {
            let order_id = item_row.order_id;
            items_by_order
                .entry(order_id)
                .or_default()
                .push(OrderItem::try_from(item_row)?);
        }

        rows.into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }
}

/// Write an order and its items on an open transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if an insert fails.
pub async fn create_in(conn: &mut PgConnection, order: &NewOrder) -> Result<Order, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        r"
        INSERT INTO orders (
            user_id, total_amount, shipping_cost, tax_amount,
            shipping_address, payment_method, order_notes, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {ORDER_COLUMNS}
        "
    ))
    .bind(order.user_id)
    .bind(order.totals.total)
    .bind(order.totals.shipping)
    .bind(order.totals.tax)
    .bind(Json(&order.shipping_address))
    .bind(order.payment_method)
    .bind(&order.order_notes)
    .bind(OrderStatus::Pending)
    .fetch_one(&mut *conn)
    .await?;

    let mut items = Vec::with_capacity(order.lines.len());
    for (position, (product_id, name, quantity, unit_price)) in order.lines.iter().enumerate() {
        let item_id: Uuid = sqlx::query_scalar(
            r"
            INSERT INTO order_items (order_id, product_id, quantity, unit_price, position)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(row.id)
        .bind(*product_id)
        .bind(quantity_to_db(*quantity))
        .bind(*unit_price)
        .bind(i32::try_from(position).unwrap_or(i32::MAX))
        .fetch_one(&mut *conn)
        .await?;

        items.push(OrderItem {
            id: OrderItemId::new(item_id),
            product_id: *product_id,
            product_name: Some(name.clone()),
            quantity: *quantity,
            unit_price: *unit_price,
            line_total: *unit_price * *quantity,
        });
    }

    row.into_order(items)
}
