//! Observation text validation.
//!
//! Observations are append-only review notes attached to a project; once
//! written they are never updated or deleted.

use crate::error::CoreError;

/// Maximum length for an observation's text content.
pub const MAX_OBSERVACION_LENGTH: usize = 5_000;

/// Validate observation text: non-blank and within the length bound.
pub fn validate_observacion(texto: &str) -> Result<(), CoreError> {
    if texto.trim().is_empty() {
        return Err(CoreError::Validation(
            "An observation must have non-empty text".to_string(),
        ));
    }
    if texto.len() > MAX_OBSERVACION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Observation text exceeds maximum length of {MAX_OBSERVACION_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_text_accepted() {
        assert!(validate_observacion("Falta justificar la metodología.").is_ok());
    }

    #[test]
    fn test_blank_text_rejected() {
        assert!(validate_observacion("").is_err());
        assert!(validate_observacion("   ").is_err());
        assert!(validate_observacion("\n\t").is_err());
    }

    #[test]
    fn test_text_at_limit_accepted() {
        let texto = "x".repeat(MAX_OBSERVACION_LENGTH);
        assert!(validate_observacion(&texto).is_ok());
    }

    #[test]
    fn test_text_over_limit_rejected() {
        let texto = "x".repeat(MAX_OBSERVACION_LENGTH + 1);
        let result = validate_observacion(&texto);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("maximum length"));
    }
}
