pub mod categories;
pub mod orders;
pub mod permissions;
pub mod products;
pub mod reservations;
pub mod sessions;
pub mod settings;
pub mod users;

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

/// Services layer assembled once at startup and shared by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<crate::services::orders::OrderService>,
    pub settings: Arc<crate::services::settings::SettingsService>,
    pub products: Arc<crate::services::products::ProductService>,
    pub categories: Arc<crate::services::categories::CategoryService>,
    pub permissions: Arc<crate::services::permissions::PermissionService>,
    pub reservations: Arc<crate::services::reservations::ReservationService>,
    pub users: Arc<crate::services::users::UserService>,
    pub app_users: Arc<crate::services::users::AppUserService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            orders: Arc::new(crate::services::orders::OrderService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            settings: Arc::new(crate::services::settings::SettingsService::new(
                db_pool.clone(),
            )),
            products: Arc::new(crate::services::products::ProductService::new(
                db_pool.clone(),
            )),
            categories: Arc::new(crate::services::categories::CategoryService::new(
                db_pool.clone(),
            )),
            permissions: Arc::new(crate::services::permissions::PermissionService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            reservations: Arc::new(crate::services::reservations::ReservationService::new(
                db_pool.clone(),
                Some(event_sender),
            )),
            users: Arc::new(crate::services::users::UserService::new(
                db_pool.clone(),
                auth_service.clone(),
            )),
            app_users: Arc::new(crate::services::users::AppUserService::new(
                db_pool,
                auth_service,
            )),
        }
    }
}
