pub mod dashboard;
pub mod equipment;
pub mod health;
pub mod pagination;
pub mod rental;
pub mod user;
