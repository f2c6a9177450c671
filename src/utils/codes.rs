//! Generación de códigos e identificadores opacos
//!
//! Códigos de solicitud legibles para humanos y strings de token
//! de aceptación de un solo uso.

use chrono::NaiveDate;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Longitud del string opaco de un token de aceptación
const ACCEPT_TOKEN_LEN: usize = 40;

/// Generar un código de solicitud legible, p.ej. `VR-20260829-X7K2`.
pub fn generate_request_code(date: NaiveDate) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();
    format!("VR-{}-{}", date.format("%Y%m%d"), suffix)
}

/// Generar el string opaco de un token de aceptación.
pub fn generate_accept_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ACCEPT_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_request_code_format() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let code = generate_request_code(date);
        assert!(code.starts_with("VR-20260829-"));
        assert_eq!(code.len(), "VR-20260829-".len() + 4);
    }

    #[test]
    fn test_accept_token_length_and_charset() {
        let token = generate_accept_token();
        assert_eq!(token.len(), ACCEPT_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_accept_tokens_are_unique() {
        assert_ne!(generate_accept_token(), generate_accept_token());
    }
}
