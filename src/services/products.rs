use crate::{
    db::DbPool,
    entities::category::Entity as CategoryEntity,
    entities::order,
    entities::order_item::{self, Entity as ItemEntity},
    entities::product::{
        self, ActiveModel as ProductActiveModel, Entity as ProductEntity, Model as ProductModel,
    },
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 120, message = "Product name must be 1-120 characters"))]
    pub name: String,
    pub price: Decimal,
    pub description: String,
    /// Opaque image reference; upload storage lives outside this service
    pub banner: String,
    pub category_id: Uuid,
}

/// Menu product CRUD with the open-order deletion guard.
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: CreateProductRequest) -> Result<ProductModel, ServiceError> {
        request.validate()?;
        if request.price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "price must not be negative".to_string(),
            ));
        }

        let db = &*self.db_pool;
        CategoryEntity::find_by_id(request.category_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("category {} not found", request.category_id))
            })?;

        let now = Utc::now();
        let active = ProductActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            price: Set(request.price),
            description: Set(request.description),
            banner: Set(request.banner),
            category_id: Set(request.category_id),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let model = ProductEntity::insert(active).exec_with_returning(db).await?;
        info!(product_id = %model.id, "product created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, category_id: Option<Uuid>) -> Result<Vec<ProductModel>, ServiceError> {
        let mut query = ProductEntity::find().order_by_asc(product::Column::Name);
        if let Some(category_id) = category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        Ok(query.all(&*self.db_pool).await?)
    }

    /// Deletes a product unless it still has items on an unfinished order.
    /// Historical items (on finished orders) do not block deletion.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn delete(&self, product_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        ProductEntity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("product {product_id} not found")))?;

        let active_items = ItemEntity::find()
            .filter(order_item::Column::ProductId.eq(product_id))
            .join(JoinType::InnerJoin, order_item::Relation::Order.def())
            .filter(order::Column::Status.eq(false))
            .count(&txn)
            .await?;

        if active_items > 0 {
            return Err(ServiceError::Conflict(
                "product has items on open orders".to_string(),
            ));
        }

        ProductEntity::delete_by_id(product_id).exec(&txn).await?;
        txn.commit().await?;

        info!(product_id = %product_id, "product deleted");
        Ok(())
    }
}
