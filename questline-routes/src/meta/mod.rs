pub mod health;
pub mod listing;
