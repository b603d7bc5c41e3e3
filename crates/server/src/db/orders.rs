//! Order repository.
//!
//! Checkout inserts the order row and all of its line items in a single
//! transaction. Lifecycle status updates are compare-and-set on the expected
//! current status, so two racing writers surface as a conflict instead of a
//! silent last-write-wins.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use mercado_core::lifecycle::PaymentReview;
use mercado_core::{OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId, ProfileId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderWithItems};
use crate::services::checkout::OrderDraft;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    buyer_id: Uuid,
    delivery_id: Option<Uuid>,
    status: String,
    payment_method: String,
    payment_status: String,
    payment_proof_url: Option<String>,
    total: Decimal,
    delivery_address: String,
    address_code: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(r: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderId::new(r.id),
            buyer_id: ProfileId::new(r.buyer_id),
            delivery_id: r.delivery_id.map(ProfileId::new),
            status: r.status.parse()?,
            payment_method: r.payment_method.parse()?,
            payment_status: r.payment_status.parse()?,
            payment_proof_url: r.payment_proof_url,
            total: r.total,
            delivery_address: r.delivery_address,
            address_code: r.address_code,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    seller_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    total: Decimal,
    created_at: DateTime<Utc>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(r: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(r.id),
            order_id: OrderId::new(r.order_id),
            product_id: ProductId::new(r.product_id),
            seller_id: ProfileId::new(r.seller_id),
            quantity: r.quantity,
            unit_price: r.unit_price,
            total: r.total,
            created_at: r.created_at,
        }
    }
}

const ORDER_COLUMNS: &str = "id, buyer_id, delivery_id, status, payment_method, payment_status, \
     payment_proof_url, total, delivery_address, address_code, notes, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, order_id, product_id, seller_id, quantity, unit_price, total, created_at";

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

    /// Insert an order and its line items atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if any item references a product
    /// that no longer exists; nothing is persisted in that case.
    pub async fn create(
        &self,
        buyer_id: ProfileId,
        draft: &OrderDraft,
    ) -> Result<OrderWithItems, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO orders \
                (id, buyer_id, status, payment_method, payment_status, total, \
                 delivery_address, address_code, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {ORDER_COLUMNS}"
        );
        let order_row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(OrderId::generate())
            .bind(buyer_id)
            .bind(OrderStatus::Pending.as_str())
            .bind(draft.payment_method.as_str())
            .bind(PaymentStatus::Pending.as_str())
            .bind(draft.total)
            .bind(&draft.delivery_address)
            .bind(draft.address_code.as_deref())
            .bind(draft.notes.as_deref())
            .fetch_one(&mut *tx)
            .await?;

        let order_id = OrderId::new(order_row.id);
        let mut items = Vec::with_capacity(draft.items.len());
        for item in &draft.items {
            let sql = format!(
                "INSERT INTO order_items \
                    (id, order_id, product_id, seller_id, quantity, unit_price, total) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 RETURNING {ITEM_COLUMNS}"
            );
            let row = sqlx::query_as::<_, OrderItemRow>(&sql)
                .bind(OrderItemId::generate())
                .bind(order_id)
                .bind(item.product_id)
                .bind(item.seller_id)
                .bind(item.quantity)
                .bind(item.unit_price)
                .bind(item.total)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    if let sqlx::Error::Database(ref db_err) = e
                        && db_err.is_foreign_key_violation()
                    {
                        return RepositoryError::Conflict(
                            "a cart item references a product that no longer exists".to_owned(),
                        );
                    }
                    RepositoryError::Database(e)
                })?;
            items.push(OrderItem::from(row));
        }

        tx.commit().await?;

        Ok(OrderWithItems {
            order: Order::try_from(order_row)?,
            items,
        })
    }

    /// Get an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<OrderWithItems>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let Some(row) = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY created_at ASC"
        );
        let items = sqlx::query_as::<_, OrderItemRow>(&sql)
            .bind(id)
            .fetch_all(self.pool)
            .await?
            .into_iter()
            .map(OrderItem::from)
            .collect();

        Ok(Some(OrderWithItems {
            order: Order::try_from(row)?,
            items,
        }))
    }

    /// List a buyer's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_buyer(
        &self,
        buyer_id: ProfileId,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE buyer_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(buyer_id)
            .fetch_all(self.pool)
            .await?;

        self.attach_items(rows).await
    }

    /// List orders assigned to a courier, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_courier(
        &self,
        delivery_id: ProfileId,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE delivery_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(delivery_id)
            .fetch_all(self.pool)
            .await?;

        self.attach_items(rows).await
    }

    /// List all orders, optionally filtered by lifecycle status (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(status.map(OrderStatus::as_str))
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        self.attach_items(rows).await
    }

    /// Compare-and-set the lifecycle status.
    ///
    /// The row is only updated when its current status still equals
    /// `expected`; a miss on an existing order means another writer got
    /// there first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist, or
    /// `Stale` if its status no longer matches `expected`.
    pub async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(expected.as_str())
        .bind(next.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.stale_or_missing(id).await?);
        }

        Ok(())
    }

    /// Assign or unassign a courier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist, or
    /// `Conflict` if the courier profile doesn't exist.
    pub async fn assign_delivery(
        &self,
        id: OrderId,
        delivery_id: Option<ProfileId>,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE orders SET delivery_id = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(delivery_id)
                .execute(self.pool)
                .await
                .map_err(|e| {
                    if let sqlx::Error::Database(ref db_err) = e
                        && db_err.is_foreign_key_violation()
                    {
                        return RepositoryError::Conflict("no such courier".to_owned());
                    }
                    RepositoryError::Database(e)
                })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Apply an admin payment review as one compound UPDATE.
    ///
    /// When the review carries a lifecycle status (verification), both
    /// fields change in the same statement so they can never be observed
    /// half-written. Like `update_status`, the write is compare-and-set on
    /// the lifecycle status the admin reviewed against, so a concurrent
    /// transition (a cancellation in particular) wins over the review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist, or
    /// `Stale` if its status no longer matches `expected`.
    pub async fn apply_payment_review(
        &self,
        id: OrderId,
        expected: OrderStatus,
        review: PaymentReview,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET payment_status = $3, status = COALESCE($4, status), \
                updated_at = NOW() \
             WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(expected.as_str())
        .bind(review.payment_status.as_str())
        .bind(review.order_status.map(OrderStatus::as_str))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.stale_or_missing(id).await?);
        }

        Ok(())
    }

    /// Record an uploaded proof of payment and reset review state.
    ///
    /// Scoped to the owning buyer and compare-and-set on the lifecycle
    /// status, so a proof can't land on an order that was cancelled or
    /// delivered in the meantime.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist or
    /// belongs to another buyer, or `Stale` if its status no longer matches
    /// `expected`.
    pub async fn set_payment_proof(
        &self,
        id: OrderId,
        buyer_id: ProfileId,
        expected: OrderStatus,
        proof_url: &str,
        payment_status: PaymentStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET payment_proof_url = $4, payment_status = $5, updated_at = NOW() \
             WHERE id = $1 AND buyer_id = $2 AND status = $3",
        )
        .bind(id)
        .bind(buyer_id)
        .bind(expected.as_str())
        .bind(proof_url)
        .bind(payment_status.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.stale_or_missing(id).await?);
        }

        Ok(())
    }

    /// Distinguish a compare-and-set miss from a missing row.
    async fn stale_or_missing(&self, id: OrderId) -> Result<RepositoryError, RepositoryError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(if exists {
            RepositoryError::Stale("order status changed, reload and retry".to_owned())
        } else {
            RepositoryError::NotFound
        })
    }

    /// Fetch items for a page of orders with one query and group them.
    async fn attach_items(
        &self,
        rows: Vec<OrderRow>,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items \
             WHERE order_id = ANY($1) ORDER BY created_at ASC"
        );
        let item_rows = sqlx::query_as::<_, OrderItemRow>(&sql)
            .bind(&ids)
            .fetch_all(self.pool)
            .await?;

        let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in item_rows {
            by_order
                .entry(row.order_id)
                .or_default()
                .push(OrderItem::from(row));
        }

        rows.into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                Ok(OrderWithItems {
                    order: Order::try_from(row)?,
                    items,
                })
            })
            .collect()
    }
}
