use crate::{
    db::DbPool,
    entities::reservation::{
        self, ActiveModel as ReservationActiveModel, Entity as ReservationEntity,
        Model as ReservationModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::ReservationStatus,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateReservationRequest {
    pub date: DateTime<Utc>,
    /// Requested arrival time, e.g. "19:30"
    #[validate(length(min = 1, max = 16, message = "time is required"))]
    pub time: String,
    #[validate(range(min = 1, message = "people must be a positive integer"))]
    pub people: i32,
    pub notes: Option<String>,
}

/// Reservation state machine: PENDING → CONFIRMED | CANCELLED. Deletion
/// models "the customer has arrived" and is staff-only.
#[derive(Clone)]
pub struct ReservationService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ReservationService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(app_user_id = %app_user_id, people = request.people))]
    pub async fn create(
        &self,
        app_user_id: Uuid,
        request: CreateReservationRequest,
    ) -> Result<ReservationModel, ServiceError> {
        request.validate()?;

        let now = Utc::now();
        let active = ReservationActiveModel {
            id: Set(Uuid::new_v4()),
            app_user_id: Set(app_user_id),
            date: Set(request.date),
            time: Set(request.time),
            people: Set(request.people),
            status: Set(ReservationStatus::Pending.to_string()),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let model = ReservationEntity::insert(active)
            .exec_with_returning(&*self.db_pool)
            .await?;

        info!(reservation_id = %model.id, "reservation created");
        self.emit(Event::ReservationCreated(model.id)).await;
        Ok(model)
    }

    /// Staff view: every reservation, newest first.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ReservationModel>, ServiceError> {
        Ok(ReservationEntity::find()
            .order_by_desc(reservation::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?)
    }

    /// Customer view: the app user's own reservations, newest first.
    #[instrument(skip(self), fields(app_user_id = %app_user_id))]
    pub async fn list_for_user(
        &self,
        app_user_id: Uuid,
    ) -> Result<Vec<ReservationModel>, ServiceError> {
        Ok(ReservationEntity::find()
            .filter(reservation::Column::AppUserId.eq(app_user_id))
            .order_by_desc(reservation::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?)
    }

    /// Confirms a reservation. A cancelled reservation cannot be revived.
    #[instrument(skip(self), fields(reservation_id = %id))]
    pub async fn confirm(&self, id: Uuid) -> Result<ReservationModel, ServiceError> {
        let model = self.find(id).await?;
        let status = self.parse_status(&model)?;

        if status == ReservationStatus::Cancelled {
            return Err(ServiceError::Conflict(
                "cannot confirm a cancelled reservation".to_string(),
            ));
        }

        let updated = self.set_status(model, ReservationStatus::Confirmed).await?;
        info!(reservation_id = %id, "reservation confirmed");
        self.emit(Event::ReservationConfirmed(id)).await;
        Ok(updated)
    }

    /// Cancels a reservation from any state.
    #[instrument(skip(self), fields(reservation_id = %id))]
    pub async fn cancel(&self, id: Uuid) -> Result<ReservationModel, ServiceError> {
        let model = self.find(id).await?;
        let updated = self.set_status(model, ReservationStatus::Cancelled).await?;
        info!(reservation_id = %id, "reservation cancelled");
        self.emit(Event::ReservationCancelled(id)).await;
        Ok(updated)
    }

    /// Removes a concluded reservation (customer arrived or no-show).
    #[instrument(skip(self), fields(reservation_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = ReservationEntity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "reservation {id} not found"
            )));
        }
        info!(reservation_id = %id, "reservation deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<ReservationModel, ServiceError> {
        ReservationEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("reservation {id} not found")))
    }

    fn parse_status(&self, model: &ReservationModel) -> Result<ReservationStatus, ServiceError> {
        ReservationStatus::from_str(&model.status).map_err(|_| {
            ServiceError::InternalError(format!(
                "reservation {} has corrupt status {:?}",
                model.id, model.status
            ))
        })
    }

    async fn set_status(
        &self,
        model: ReservationModel,
        status: ReservationStatus,
    ) -> Result<ReservationModel, ServiceError> {
        let mut active: ReservationActiveModel = model.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(&*self.db_pool).await?)
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send domain event");
            }
        }
    }
}
