pub mod equipment;
pub mod postgres_repository;
pub mod rental;
pub mod user;
