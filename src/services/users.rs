use crate::{
    auth::{self, AuthService},
    db::DbPool,
    entities::app_user::{
        self, ActiveModel as AppUserActiveModel, Entity as AppUserEntity, Model as AppUserModel,
    },
    entities::user::{self, ActiveModel as UserActiveModel, Entity as UserEntity, Model as UserModel},
    errors::ServiceError,
    models::Role,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 120, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be valid"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 120, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be valid"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AppUserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub token: String,
}

fn user_to_response(model: &UserModel) -> Result<UserResponse, ServiceError> {
    let role = Role::from_str(&model.role).map_err(|_| {
        ServiceError::InternalError(format!("user {} has corrupt role {:?}", model.id, model.role))
    })?;
    Ok(UserResponse {
        id: model.id,
        name: model.name.clone(),
        email: model.email.clone(),
        role,
        created_at: model.created_at,
    })
}

/// Staff account management and dashboard sessions.
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
    auth: Arc<AuthService>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>, auth: Arc<AuthService>) -> Self {
        Self { db_pool, auth }
    }

    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role))]
    pub async fn create(&self, request: CreateUserRequest) -> Result<UserResponse, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let existing = UserEntity::find()
            .filter(user::Column::Email.eq(request.email.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "email is already registered".to_string(),
            ));
        }

        let now = Utc::now();
        let active = UserActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            email: Set(request.email),
            password_hash: Set(auth::hash_password(&request.password)?),
            role: Set(request.role.to_string()),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let model = UserEntity::insert(active).exec_with_returning(db).await?;
        info!(user_id = %model.id, "staff user created");
        user_to_response(&model)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<UserResponse>, ServiceError> {
        let users = UserEntity::find()
            .order_by_asc(user::Column::Name)
            .all(&*self.db_pool)
            .await?;
        users.iter().map(user_to_response).collect()
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn detail(&self, user_id: Uuid) -> Result<UserResponse, ServiceError> {
        let model = UserEntity::find_by_id(user_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} not found")))?;
        user_to_response(&model)
    }

    /// Verifies credentials and issues a staff-audience token. Failures are
    /// deliberately indistinguishable (unknown email vs. wrong password).
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn authenticate(&self, request: LoginRequest) -> Result<SessionResponse, ServiceError> {
        let model = UserEntity::find()
            .filter(user::Column::Email.eq(request.email.as_str()))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::AuthError("invalid email or password".to_string()))?;

        if !auth::verify_password(&request.password, &model.password_hash)? {
            warn!(user_id = %model.id, "failed staff login attempt");
            return Err(ServiceError::AuthError(
                "invalid email or password".to_string(),
            ));
        }

        let response = user_to_response(&model)?;
        let token = self
            .auth
            .create_staff_token(model.id, &model.name, &model.email, response.role)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        info!(user_id = %model.id, role = %response.role, "staff session created");
        Ok(SessionResponse {
            id: response.id,
            name: response.name,
            email: response.email,
            role: Some(response.role),
            token,
        })
    }
}

/// Customer account management and app sessions.
#[derive(Clone)]
pub struct AppUserService {
    db_pool: Arc<DbPool>,
    auth: Arc<AuthService>,
}

impl AppUserService {
    pub fn new(db_pool: Arc<DbPool>, auth: Arc<AuthService>) -> Self {
        Self { db_pool, auth }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: SignupRequest) -> Result<AppUserResponse, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let existing = AppUserEntity::find()
            .filter(app_user::Column::Email.eq(request.email.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "email is already registered".to_string(),
            ));
        }

        let now = Utc::now();
        let active = AppUserActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            email: Set(request.email),
            password_hash: Set(auth::hash_password(&request.password)?),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let model: AppUserModel = AppUserEntity::insert(active).exec_with_returning(db).await?;
        info!(app_user_id = %model.id, "app user created");
        Ok(AppUserResponse {
            id: model.id,
            name: model.name,
            email: model.email,
            created_at: model.created_at,
        })
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn authenticate(&self, request: LoginRequest) -> Result<SessionResponse, ServiceError> {
        let model = AppUserEntity::find()
            .filter(app_user::Column::Email.eq(request.email.as_str()))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::AuthError("invalid email or password".to_string()))?;

        if !auth::verify_password(&request.password, &model.password_hash)? {
            warn!(app_user_id = %model.id, "failed app login attempt");
            return Err(ServiceError::AuthError(
                "invalid email or password".to_string(),
            ));
        }

        let token = self
            .auth
            .create_app_token(model.id, &model.name, &model.email)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        info!(app_user_id = %model.id, "app session created");
        Ok(SessionResponse {
            id: model.id,
            name: model.name,
            email: model.email,
            role: None,
            token,
        })
    }
}
