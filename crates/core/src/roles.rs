//! Well-known role name constants and the role → dashboard route table.
//!
//! These must match the seed data in
//! `20260301000001_create_usuarios_table.sql`.

use crate::error::CoreError;

pub const ROL_ESTUDIANTE: &str = "estudiante";
pub const ROL_TUTOR: &str = "tutor";
pub const ROL_ADMINISTRADOR: &str = "administrador";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROL_ESTUDIANTE, ROL_TUTOR, ROL_ADMINISTRADOR];

/// Single source of truth for the role-keyed dashboard routes.
///
/// Every place that needs "which dashboard does this role land on" consults
/// this table; there is deliberately no `match` on roles anywhere else.
const DASHBOARD_ROUTES: &[(&str, &str)] = &[
    (ROL_ESTUDIANTE, "/dashboard-usuario"),
    (ROL_TUTOR, "/dashboard-tutor"),
    (ROL_ADMINISTRADOR, "/dashboard"),
];

/// Validate that a role string is one of the accepted values.
pub fn validate_rol(rol: &str) -> Result<(), CoreError> {
    if VALID_ROLES.contains(&rol) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid role '{rol}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        )))
    }
}

/// Resolve the dashboard route for a role.
///
/// Total over [`VALID_ROLES`]: every valid role maps to exactly one route.
pub fn dashboard_route(rol: &str) -> Result<&'static str, CoreError> {
    DASHBOARD_ROUTES
        .iter()
        .find(|(r, _)| *r == rol)
        .map(|(_, route)| *route)
        .ok_or_else(|| CoreError::Validation(format!("Unknown role '{rol}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_roles_accepted() {
        assert!(validate_rol(ROL_ESTUDIANTE).is_ok());
        assert!(validate_rol(ROL_TUTOR).is_ok());
        assert!(validate_rol(ROL_ADMINISTRADOR).is_ok());
    }

    #[test]
    fn test_invalid_role_rejected() {
        assert!(validate_rol("profesor").is_err());
        assert!(validate_rol("").is_err());
        assert!(validate_rol("ESTUDIANTE").is_err());
    }

    #[test]
    fn test_dashboard_mapping_is_total_over_valid_roles() {
        for rol in VALID_ROLES {
            assert!(
                dashboard_route(rol).is_ok(),
                "role '{rol}' must map to a dashboard"
            );
        }
    }

    #[test]
    fn test_each_role_gets_its_own_dashboard() {
        assert_eq!(dashboard_route(ROL_ESTUDIANTE).unwrap(), "/dashboard-usuario");
        assert_eq!(dashboard_route(ROL_TUTOR).unwrap(), "/dashboard-tutor");
        assert_eq!(dashboard_route(ROL_ADMINISTRADOR).unwrap(), "/dashboard");
    }

    #[test]
    fn test_dashboard_routes_are_distinct() {
        let mut routes: Vec<_> = VALID_ROLES
            .iter()
            .map(|r| dashboard_route(r).unwrap())
            .collect();
        routes.sort();
        routes.dedup();
        assert_eq!(routes.len(), VALID_ROLES.len());
    }

    #[test]
    fn test_unknown_role_has_no_dashboard() {
        assert!(dashboard_route("invitado").is_err());
    }
}
