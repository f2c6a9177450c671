pub mod booking_dto;
pub mod common_dto;
pub mod driver_dto;
pub mod queue_dto;
