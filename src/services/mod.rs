//! Servicios del sistema
//!
//! Colaboradores externos al core transaccional: el dispatcher de
//! notificaciones y el job diario de recuperación.

pub mod notification_service;
pub mod reset_service;
