pub mod app_user;
pub mod category;
pub mod order;
pub mod order_item;
pub mod product;
pub mod reservation;
pub mod restaurant_settings;
pub mod role_permission;
pub mod user;
