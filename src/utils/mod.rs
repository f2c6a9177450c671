//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, el clasificador
//! de horario hábil y la generación de códigos.

pub mod codes;
pub mod errors;
pub mod offhours;
