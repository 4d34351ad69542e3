use crate::{
    db::DbPool,
    entities::category::{
        self, ActiveModel as CategoryActiveModel, Entity as CategoryEntity, Model as CategoryModel,
    },
    entities::order,
    entities::order_item::{self, Entity as ItemEntity},
    entities::product::{self, Entity as ProductEntity},
    errors::ServiceError,
};
use chrono::Utc;
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
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 120, message = "Category name must be 1-120 characters"))]
    pub name: String,
}

/// Category CRUD with the cascading open-order deletion guard.
#[derive(Clone)]
pub struct CategoryService {
    db_pool: Arc<DbPool>,
}

impl CategoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        request: CreateCategoryRequest,
    ) -> Result<CategoryModel, ServiceError> {
        request.validate()?;

        let now = Utc::now();
        let active = CategoryActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let model = CategoryEntity::insert(active)
            .exec_with_returning(&*self.db_pool)
            .await?;
        info!(category_id = %model.id, "category created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<CategoryModel>, ServiceError> {
        Ok(CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }

    /// Deletes a category. Rejected while any of its products has items on
    /// an unfinished order, and separately while it still has products at
    /// all; the two conflicts carry distinct messages.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn delete(&self, category_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        CategoryEntity::find_by_id(category_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("category {category_id} not found")))?;

        let active_items = ItemEntity::find()
            .join(JoinType::InnerJoin, order_item::Relation::Product.def())
            .filter(product::Column::CategoryId.eq(category_id))
            .join(JoinType::InnerJoin, order_item::Relation::Order.def())
            .filter(order::Column::Status.eq(false))
            .count(&txn)
            .await?;

        if active_items > 0 {
            return Err(ServiceError::Conflict(
                "category has items on open orders".to_string(),
            ));
        }

        let products = ProductEntity::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .count(&txn)
            .await?;

        if products > 0 {
            return Err(ServiceError::Conflict(
                "category still has associated products".to_string(),
            ));
        }

        CategoryEntity::delete_by_id(category_id).exec(&txn).await?;
        txn.commit().await?;

        info!(category_id = %category_id, "category deleted");
        Ok(())
    }
}
