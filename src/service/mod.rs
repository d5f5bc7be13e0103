pub mod dashboard;
pub mod equipment;
pub mod lifecycle;
pub mod rental;
