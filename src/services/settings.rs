use crate::{
    db::DbPool,
    entities::restaurant_settings::{
        self, ActiveModel as SettingsActiveModel, Entity as SettingsEntity,
        Model as SettingsModel, DEFAULT_MAX_TABLES, SINGLETON_ID,
    },
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, DbErr, EntityTrait, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

#[derive(Debug, serde::Serialize, serde::Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateSettingsRequest {
    #[validate(range(min = 1, message = "max_tables must be a positive integer"))]
    pub max_tables: i32,
}

/// Manages the singleton restaurant settings row.
#[derive(Clone)]
pub struct SettingsService {
    db_pool: Arc<DbPool>,
}

impl SettingsService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Returns the settings row, creating it with defaults on first read.
    ///
    /// The insert uses on-conflict-do-nothing so concurrent first reads
    /// converge on a single row instead of racing.
    #[instrument(skip(self))]
    pub async fn get_or_create(&self) -> Result<SettingsModel, ServiceError> {
        let db = &*self.db_pool;

        if let Some(settings) = SettingsEntity::find_by_id(SINGLETON_ID).one(db).await? {
            return Ok(settings);
        }

        let now = Utc::now();
        let default_row = SettingsActiveModel {
            id: Set(SINGLETON_ID.to_string()),
            max_tables: Set(DEFAULT_MAX_TABLES),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let insert = SettingsEntity::insert(default_row)
            .on_conflict(
                OnConflict::column(restaurant_settings::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(db)
            .await;

        match insert {
            Ok(_) => info!(max_tables = DEFAULT_MAX_TABLES, "settings auto-created"),
            // Another request created the row between our read and insert.
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }

        SettingsEntity::find_by_id(SINGLETON_ID)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError("settings row missing after insert".to_string())
            })
    }

    #[instrument(skip(self, request), fields(max_tables = request.max_tables))]
    pub async fn update(
        &self,
        request: UpdateSettingsRequest,
    ) -> Result<SettingsModel, ServiceError> {
        request.validate()?;

        let current = self.get_or_create().await?;
        let mut active: SettingsActiveModel = current.into();
        active.max_tables = Set(request.max_tables);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db_pool).await?;
        info!(max_tables = updated.max_tables, "settings updated");
        Ok(updated)
    }
}
