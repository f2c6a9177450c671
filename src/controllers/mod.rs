pub mod accept_controller;
pub mod booking_controller;
pub mod driver_controller;
pub mod queue_controller;
