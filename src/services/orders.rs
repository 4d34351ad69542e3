use crate::{
    db::DbPool,
    entities::order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
    },
    entities::order_item::{
        self, ActiveModel as ItemActiveModel, Entity as ItemEntity, Model as ItemModel,
    },
    entities::product::{Entity as ProductEntity, Model as ProductModel},
    errors::ServiceError,
    events::{Event, EventSender},
    services::settings::SettingsService,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OpenTableRequest {
    /// Physical table number, 1..=max_tables
    pub table: i32,
    /// Optional customer name shown on the tab
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AddItemRequest {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub amount: i32,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub table: i32,
    pub status: bool,
    pub draft: bool,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<OrderModel> for OrderResponse {
    fn from(model: OrderModel) -> Self {
        Self {
            id: model.id,
            table: model.table_number,
            status: model.status,
            draft: model.draft,
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub amount: i32,
    pub product: ProductModel,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
}

/// Table/order lifecycle engine: opening tables, draft → sent → finished
/// transitions, and the occupancy aggregate.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    settings: SettingsService,
    event_sender: Option<Arc<EventSender>>,
}

/// Filter matching the "occupied" condition: a draft order, or one sent to
/// the kitchen but not yet finished.
fn occupied_condition() -> Condition {
    Condition::any()
        .add(order::Column::Draft.eq(true))
        .add(
            Condition::all()
                .add(order::Column::Draft.eq(false))
                .add(order::Column::Status.eq(false)),
        )
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        let settings = SettingsService::new(db_pool.clone());
        Self {
            db_pool,
            settings,
            event_sender,
        }
    }

    /// Opens a table: creates a draft order after checking the table bound
    /// and the occupancy invariant. Check and insert share one transaction
    /// so two concurrent opens of the same table cannot both succeed.
    #[instrument(skip(self, request), fields(table = request.table))]
    pub async fn open_table(&self, request: OpenTableRequest) -> Result<OrderResponse, ServiceError> {
        let settings = self.settings.get_or_create().await?;
        if request.table < 1 || request.table > settings.max_tables {
            return Err(ServiceError::ValidationError(format!(
                "table must be between 1 and {}",
                settings.max_tables
            )));
        }

        let txn = self.db_pool.begin().await?;

        let occupied = OrderEntity::find()
            .filter(order::Column::TableNumber.eq(request.table))
            .filter(occupied_condition())
            .one(&txn)
            .await?;

        if occupied.is_some() {
            warn!(table = request.table, "table already open");
            return Err(ServiceError::Conflict(format!(
                "table {} is already open",
                request.table
            )));
        }

        let order_id = Uuid::new_v4();
        let now = Utc::now();
        let active = OrderActiveModel {
            id: Set(order_id),
            table_number: Set(request.table),
            status: Set(false),
            draft: Set(true),
            name: Set(request.name),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let model = OrderEntity::insert(active)
            .exec_with_returning(&txn)
            .await?;
        txn.commit().await?;

        info!(order_id = %order_id, table = model.table_number, "table opened");
        self.emit(Event::TableOpened {
            order_id,
            table: model.table_number,
        })
        .await;

        Ok(model.into())
    }

    /// Distinct table numbers currently occupied, ascending.
    #[instrument(skip(self))]
    pub async fn list_open_tables(&self) -> Result<Vec<i32>, ServiceError> {
        let tables: Vec<i32> = OrderEntity::find()
            .select_only()
            .column(order::Column::TableNumber)
            .filter(occupied_condition())
            .distinct()
            .order_by_asc(order::Column::TableNumber)
            .into_tuple()
            .all(&*self.db_pool)
            .await?;

        Ok(tables)
    }

    /// Kitchen view: sent, unfinished orders, oldest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderResponse>, ServiceError> {
        let orders = OrderEntity::find()
            .filter(order::Column::Draft.eq(false))
            .filter(order::Column::Status.eq(false))
            .order_by_asc(order::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;

        Ok(orders.into_iter().map(Into::into).collect())
    }

    /// Order plus its items with product data.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order_detail(&self, order_id: Uuid) -> Result<OrderDetailResponse, ServiceError> {
        let db = &*self.db_pool;
        let order = self.find_order(db, order_id).await?;

        let rows = ItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .find_also_related(ProductEntity)
            .order_by_asc(order_item::Column::CreatedAt)
            .all(db)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for (item, product) in rows {
            let product = product.ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "order item {} references a missing product",
                    item.id
                ))
            })?;
            items.push(OrderItemResponse {
                id: item.id,
                amount: item.amount,
                product,
            });
        }

        Ok(OrderDetailResponse {
            order: order.into(),
            items,
        })
    }

    /// Sends a draft order to the kitchen (`draft` → false).
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn send_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;
        let order = self.find_order(db, order_id).await?;

        let mut active: OrderActiveModel = order.into();
        active.draft = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await?;

        info!(order_id = %order_id, table = updated.table_number, "order sent to kitchen");
        self.emit(Event::OrderSent(order_id)).await;
        Ok(updated.into())
    }

    /// Finishes an order (`status` → true), freeing its table. Re-finishing
    /// an already-finished order is rejected.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn finish_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;
        let order = self.find_order(db, order_id).await?;

        if order.status {
            return Err(ServiceError::Conflict(
                "order is already finished".to_string(),
            ));
        }

        let mut active: OrderActiveModel = order.into();
        active.status = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await?;

        info!(order_id = %order_id, table = updated.table_number, "order finished");
        self.emit(Event::OrderFinished(order_id)).await;
        Ok(updated.into())
    }

    /// Attaches a product line to an order.
    #[instrument(skip(self, request), fields(order_id = %request.order_id, product_id = %request.product_id))]
    pub async fn add_item(&self, request: AddItemRequest) -> Result<ItemModel, ServiceError> {
        if request.amount < 1 {
            return Err(ServiceError::ValidationError(
                "amount must be a positive integer".to_string(),
            ));
        }

        let db = &*self.db_pool;
        self.find_order(db, request.order_id).await?;
        ProductEntity::find_by_id(request.product_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("product {} not found", request.product_id))
            })?;

        let item_id = Uuid::new_v4();
        let now = Utc::now();
        let active = ItemActiveModel {
            id: Set(item_id),
            amount: Set(request.amount),
            order_id: Set(request.order_id),
            product_id: Set(request.product_id),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let item = ItemEntity::insert(active).exec_with_returning(db).await?;

        self.emit(Event::ItemAdded {
            order_id: request.order_id,
            product_id: request.product_id,
            amount: request.amount,
        })
        .await;
        Ok(item)
    }

    /// Removes a single line from an order.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_item(&self, item_id: Uuid) -> Result<(), ServiceError> {
        let result = ItemEntity::delete_by_id(item_id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("item {item_id} not found")));
        }

        self.emit(Event::ItemRemoved(item_id)).await;
        Ok(())
    }

    /// Deletes an order together with its items.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        self.find_order(&txn, order_id).await?;
        ItemEntity::delete_many()
            .filter(order_item::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        OrderEntity::delete_by_id(order_id).exec(&txn).await?;

        txn.commit().await?;

        info!(order_id = %order_id, "order deleted");
        self.emit(Event::OrderDeleted(order_id)).await;
        Ok(())
    }

    async fn find_order<C: ConnectionTrait>(
        &self,
        db: &C,
        order_id: Uuid,
    ) -> Result<OrderModel, ServiceError> {
        OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {order_id} not found")))
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send domain event");
            }
        }
    }
}
