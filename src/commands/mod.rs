pub mod auth;
pub mod backup;
pub mod inventory;
pub mod supplier;
