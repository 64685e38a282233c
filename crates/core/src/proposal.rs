//! Proposal content validation and thesis-section names.

use crate::error::CoreError;

/// Minimum length for a project title, in characters.
pub const MIN_TITULO_CHARS: usize = 5;

/// Maximum length for a project title.
pub const MAX_TITULO_CHARS: usize = 200;

/// Minimum length for a project description, in characters.
pub const MIN_DESCRIPCION_CHARS: usize = 25;

/// Maximum length for any free-text content field.
pub const MAX_CONTENIDO_CHARS: usize = 20_000;

/// Thesis sections the assistant can generate drafts for.
pub const VALID_SECCIONES: &[&str] = &[
    "planteamiento",
    "solucion_problema",
    "objetivos",
    "metodologia",
];

/// Validate a project title: trimmed length within bounds.
pub fn validate_titulo(titulo: &str) -> Result<(), CoreError> {
    let len = titulo.trim().chars().count();
    if len < MIN_TITULO_CHARS {
        return Err(CoreError::Validation(format!(
            "Title must be at least {MIN_TITULO_CHARS} characters long"
        )));
    }
    if len > MAX_TITULO_CHARS {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITULO_CHARS} characters long"
        )));
    }
    Ok(())
}

/// Validate a project description: trimmed length within bounds.
pub fn validate_descripcion(descripcion: &str) -> Result<(), CoreError> {
    let len = descripcion.trim().chars().count();
    if len < MIN_DESCRIPCION_CHARS {
        return Err(CoreError::Validation(format!(
            "Description must be at least {MIN_DESCRIPCION_CHARS} characters long"
        )));
    }
    if len > MAX_CONTENIDO_CHARS {
        return Err(CoreError::Validation(format!(
            "Description must be at most {MAX_CONTENIDO_CHARS} characters long"
        )));
    }
    Ok(())
}

/// Validate a thesis-section name used by the generation endpoints.
pub fn validate_seccion(seccion: &str) -> Result<(), CoreError> {
    if VALID_SECCIONES.contains(&seccion) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid section '{seccion}'. Must be one of: {}",
            VALID_SECCIONES.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_minimum_boundary() {
        assert!(validate_titulo("abcd").is_err());
        assert!(validate_titulo("abcde").is_ok());
        assert!(validate_titulo("Sistema de gestión académica").is_ok());
    }

    #[test]
    fn test_title_whitespace_does_not_count() {
        assert!(validate_titulo("  ab  ").is_err());
    }

    #[test]
    fn test_title_maximum_boundary() {
        assert!(validate_titulo(&"x".repeat(MAX_TITULO_CHARS)).is_ok());
        assert!(validate_titulo(&"x".repeat(MAX_TITULO_CHARS + 1)).is_err());
    }

    #[test]
    fn test_description_minimum_boundary() {
        assert!(validate_descripcion(&"x".repeat(24)).is_err());
        assert!(validate_descripcion(&"x".repeat(25)).is_ok());
    }

    #[test]
    fn test_multibyte_counts_chars_not_bytes() {
        // 25 accented characters is 50 bytes but still a valid description.
        assert!(validate_descripcion(&"á".repeat(25)).is_ok());
    }

    #[test]
    fn test_valid_secciones_accepted() {
        for seccion in VALID_SECCIONES {
            assert!(validate_seccion(seccion).is_ok());
        }
    }

    #[test]
    fn test_invalid_seccion_rejected() {
        assert!(validate_seccion("conclusiones").is_err());
        assert!(validate_seccion("").is_err());
    }
}
