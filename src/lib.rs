//! Fleet Dispatch - backend de despacho de flota vehicular
//!
//! Ciclo de vida de solicitudes de viaje, cola de rotación de conductores,
//! protocolo de aceptación por token y clasificador de horario hábil.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
