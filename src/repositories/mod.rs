pub mod booking_repository;
pub mod driver_repository;
pub mod token_repository;
