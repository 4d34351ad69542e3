use crate::{
    db::DbPool,
    entities::role_permission::{
        self, ActiveModel as PermissionActiveModel, Entity as PermissionEntity,
        Model as PermissionModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::Role,
};
use chrono::Utc;
use lazy_static::lazy_static;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Root dashboard route; the post-login landing page for ADMIN.
pub const DASHBOARD_ROOT: &str = "/dashboard";

/// Sentinel returned when a role has no allowed route at all.
pub const UNAUTHORIZED_ROUTE: &str = "/unauthorized";

/// Canonical list of permission-guarded dashboard routes.
pub const DASHBOARD_ROUTES: [&str; 8] = [
    "/dashboard",
    "/dashboard/admin",
    "/dashboard/category",
    "/dashboard/kitchen",
    "/dashboard/order",
    "/dashboard/product",
    "/dashboard/reservations",
    "/dashboard/table",
];

lazy_static! {
    /// Default allow-set per role, used to seed the matrix on first read.
    /// ADMIN is not listed: it bypasses the table entirely.
    static ref DEFAULT_ALLOWED: Vec<(Role, HashSet<&'static str>)> = vec![
        (
            Role::Gerente,
            DASHBOARD_ROUTES
                .iter()
                .copied()
                .filter(|r| *r != "/dashboard/admin")
                .collect(),
        ),
        (
            Role::Garcom,
            ["/dashboard", "/dashboard/order", "/dashboard/table"]
                .into_iter()
                .collect(),
        ),
        (Role::Cozinha, ["/dashboard/kitchen"].into_iter().collect()),
        (Role::User, ["/dashboard"].into_iter().collect()),
    ];
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PermissionEntry {
    pub route: String,
    pub can_access: bool,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdatePermissionRequest {
    pub role: Role,
    pub route: String,
    pub can_access: bool,
}

/// Access control engine over the role-route matrix. Decisions are a pure
/// function of (role, stored matrix); this service is the single canonical
/// decision point.
#[derive(Clone)]
pub struct PermissionService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl PermissionService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Whether `role` may visit `route`. ADMIN is always allowed, without a
    /// lookup; for everyone else a missing row means "no".
    #[instrument(skip(self), fields(role = %role, route = route))]
    pub async fn check(&self, role: Role, route: &str) -> Result<bool, ServiceError> {
        if role.is_admin() {
            return Ok(true);
        }

        let row = PermissionEntity::find()
            .filter(role_permission::Column::Role.eq(role.to_string()))
            .filter(role_permission::Column::Route.eq(route))
            .one(&*self.db_pool)
            .await?;

        Ok(row.map(|r| r.can_access).unwrap_or(false))
    }

    /// First allowed route for post-login redirection: lexicographically
    /// smallest route with `can_access = true`. A deliberate, simple
    /// tie-break, not a priority ranking.
    #[instrument(skip(self), fields(role = %role))]
    pub async fn first_route(&self, role: Role) -> Result<String, ServiceError> {
        if role.is_admin() {
            return Ok(DASHBOARD_ROOT.to_string());
        }

        let row = PermissionEntity::find()
            .filter(role_permission::Column::Role.eq(role.to_string()))
            .filter(role_permission::Column::CanAccess.eq(true))
            .order_by_asc(role_permission::Column::Route)
            .one(&*self.db_pool)
            .await?;

        Ok(row
            .map(|r| r.route)
            .unwrap_or_else(|| UNAUTHORIZED_ROUTE.to_string()))
    }

    /// Full matrix grouped by role, routes ascending. Seeds the default
    /// matrix the first time it is called on an empty table.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<BTreeMap<Role, Vec<PermissionEntry>>, ServiceError> {
        self.seed_defaults_if_empty().await?;

        let rows = PermissionEntity::find()
            .order_by_asc(role_permission::Column::Role)
            .order_by_asc(role_permission::Column::Route)
            .all(&*self.db_pool)
            .await?;

        let mut grouped: BTreeMap<Role, Vec<PermissionEntry>> = BTreeMap::new();
        for row in rows {
            let Ok(role) = Role::from_str(&row.role) else {
                warn!(role = %row.role, "skipping permission row with unknown role");
                continue;
            };
            grouped.entry(role).or_default().push(PermissionEntry {
                route: row.route,
                can_access: row.can_access,
            });
        }

        Ok(grouped)
    }

    /// Flips one cell of the matrix. The row must already exist (seeded via
    /// [`Self::list`] or created explicitly).
    #[instrument(skip(self, request), fields(role = %request.role, route = %request.route))]
    pub async fn update(
        &self,
        request: UpdatePermissionRequest,
    ) -> Result<PermissionModel, ServiceError> {
        let row = PermissionEntity::find()
            .filter(role_permission::Column::Role.eq(request.role.to_string()))
            .filter(role_permission::Column::Route.eq(request.route.as_str()))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "no permission row for ({}, {})",
                    request.role, request.route
                ))
            })?;

        let mut active: PermissionActiveModel = row.into();
        active.can_access = Set(request.can_access);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&*self.db_pool).await?;

        info!(
            role = %request.role,
            route = %request.route,
            can_access = request.can_access,
            "permission updated"
        );
        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::PermissionUpdated {
                    role: request.role.to_string(),
                    route: request.route,
                    can_access: request.can_access,
                })
                .await;
        }

        Ok(updated)
    }

    /// One-time bootstrap: inserts the full (role × route) default matrix
    /// when no rows exist yet. Skip-duplicates semantics; never re-run once
    /// any row is present.
    async fn seed_defaults_if_empty(&self) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let count = PermissionEntity::find().count(db).await?;
        if count > 0 {
            return Ok(());
        }

        let now = Utc::now();
        let mut rows = Vec::new();
        for role in Role::iter() {
            let allowed = DEFAULT_ALLOWED
                .iter()
                .find(|(r, _)| *r == role)
                .map(|(_, routes)| routes);
            for route in DASHBOARD_ROUTES {
                let can_access = match allowed {
                    // ADMIN has no allow-set entry; its rows are stored as
                    // true for visibility, though check() never reads them.
                    None => true,
                    Some(routes) => routes.contains(route),
                };
                rows.push(PermissionActiveModel {
                    id: Set(Uuid::new_v4()),
                    role: Set(role.to_string()),
                    route: Set(route.to_string()),
                    can_access: Set(can_access),
                    created_at: Set(now),
                    updated_at: Set(Some(now)),
                });
            }
        }

        let insert = PermissionEntity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Route,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(db)
            .await;

        match insert {
            Ok(_) => {
                info!("seeded default permission matrix");
                Ok(())
            }
            // A concurrent caller seeded first.
            Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
