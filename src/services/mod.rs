pub mod categories;
pub mod orders;
pub mod permissions;
pub mod products;
pub mod reservations;
pub mod settings;
pub mod users;
