//! Project lifecycle state machine.
//!
//! States: `borrador` → `enviado` → `en_revision` →
//! `{aprobado | rechazado | corregir}`, with `corregir` looping back to
//! `enviado` on student resubmission.
//!
//! [`plan_transition`] is a pure, total planning function: given the current
//! and requested states it either returns a [`TransitionPlan`] describing
//! who may perform the move, which set-once timestamp it stamps, and whether
//! an observation is required — or a [`CoreError`] explaining why the move
//! is impossible. Handlers execute plans; nothing here touches a database.

use crate::error::CoreError;
use crate::observation::validate_observacion;

pub const ESTADO_BORRADOR: &str = "borrador";
pub const ESTADO_ENVIADO: &str = "enviado";
pub const ESTADO_EN_REVISION: &str = "en_revision";
pub const ESTADO_APROBADO: &str = "aprobado";
pub const ESTADO_RECHAZADO: &str = "rechazado";
pub const ESTADO_CORREGIR: &str = "corregir";

/// All valid project states.
pub const VALID_ESTADOS: &[&str] = &[
    ESTADO_BORRADOR,
    ESTADO_ENVIADO,
    ESTADO_EN_REVISION,
    ESTADO_APROBADO,
    ESTADO_RECHAZADO,
    ESTADO_CORREGIR,
];

/// States in which the owning student may still edit content fields.
pub const ESTADOS_EDITABLES: &[&str] = &[ESTADO_BORRADOR, ESTADO_CORREGIR];

/// Who is allowed to trigger a given transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// The student that owns the project (`estudiante_id`).
    OwningStudent,
    /// The tutor assigned to the project (`tutor_id`).
    AssignedTutor,
}

/// Whether a transition accepts an observation alongside the state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationRule {
    /// Supplying observation text is a validation error.
    NotAccepted,
    /// Observation text may be supplied; blank text is treated as absent.
    Optional,
    /// Non-blank observation text must be supplied.
    Required,
}

/// Set-once timestamp columns stamped by transitions.
///
/// Each is written with `COALESCE(column, NOW())` so a re-transition never
/// resets a value that is already set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    FechaEnvio,
    FechaRevision,
    FechaAprobacion,
}

/// The outcome of planning a transition: everything the executing layer
/// needs to authorize and apply it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub from: &'static str,
    pub to: &'static str,
    pub actor: Actor,
    pub stamp: Option<Stamp>,
    pub observation: ObservationRule,
    /// `corregir` → `corregir` ("dar otra revisión"): the state write is
    /// idempotent but the observation is still appended.
    pub is_reentry: bool,
}

/// Validate that a state string is one of the accepted values.
pub fn validate_estado(estado: &str) -> Result<(), CoreError> {
    if VALID_ESTADOS.contains(&estado) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid project state '{estado}'. Must be one of: {}",
            VALID_ESTADOS.join(", ")
        )))
    }
}

/// Whether the owning student may still edit content fields in this state.
pub fn es_editable(estado: &str) -> bool {
    ESTADOS_EDITABLES.contains(&estado)
}

/// Plan the transition `from` → `to`.
///
/// Returns a [`TransitionPlan`] for every move the lifecycle table allows
/// and a [`CoreError::Conflict`] for every move it does not. Unknown state
/// strings are rejected as validation errors before the table is consulted.
pub fn plan_transition(from: &str, to: &str) -> Result<TransitionPlan, CoreError> {
    validate_estado(from)?;
    validate_estado(to)?;

    let plan = |from, to, actor, stamp, observation, is_reentry| TransitionPlan {
        from,
        to,
        actor,
        stamp,
        observation,
        is_reentry,
    };

    match (from, to) {
        // Student submits a draft, or resubmits after corrections.
        (ESTADO_BORRADOR, ESTADO_ENVIADO) | (ESTADO_CORREGIR, ESTADO_ENVIADO) => Ok(plan(
            if from == ESTADO_BORRADOR {
                ESTADO_BORRADOR
            } else {
                ESTADO_CORREGIR
            },
            ESTADO_ENVIADO,
            Actor::OwningStudent,
            Some(Stamp::FechaEnvio),
            ObservationRule::NotAccepted,
            false,
        )),

        // Tutor takes the project under review.
        (ESTADO_ENVIADO, ESTADO_EN_REVISION) => Ok(plan(
            ESTADO_ENVIADO,
            ESTADO_EN_REVISION,
            Actor::AssignedTutor,
            Some(Stamp::FechaRevision),
            ObservationRule::NotAccepted,
            false,
        )),

        // Tutor approves. Terminal.
        (ESTADO_EN_REVISION, ESTADO_APROBADO)
        | (ESTADO_CORREGIR, ESTADO_APROBADO)
        | (ESTADO_RECHAZADO, ESTADO_APROBADO) => Ok(plan(
            match from {
                ESTADO_EN_REVISION => ESTADO_EN_REVISION,
                ESTADO_CORREGIR => ESTADO_CORREGIR,
                _ => ESTADO_RECHAZADO,
            },
            ESTADO_APROBADO,
            Actor::AssignedTutor,
            Some(Stamp::FechaAprobacion),
            ObservationRule::NotAccepted,
            false,
        )),

        // Tutor rejects. Observation text is optional.
        (ESTADO_EN_REVISION, ESTADO_RECHAZADO) | (ESTADO_CORREGIR, ESTADO_RECHAZADO) => Ok(plan(
            if from == ESTADO_EN_REVISION {
                ESTADO_EN_REVISION
            } else {
                ESTADO_CORREGIR
            },
            ESTADO_RECHAZADO,
            Actor::AssignedTutor,
            None,
            ObservationRule::Optional,
            false,
        )),

        // Tutor requests corrections. Observation text is mandatory.
        (ESTADO_EN_REVISION, ESTADO_CORREGIR) => Ok(plan(
            ESTADO_EN_REVISION,
            ESTADO_CORREGIR,
            Actor::AssignedTutor,
            None,
            ObservationRule::Required,
            false,
        )),

        // "Dar otra revisión": already in corregir, append another
        // observation. The state write is a no-op.
        (ESTADO_CORREGIR, ESTADO_CORREGIR) => Ok(plan(
            ESTADO_CORREGIR,
            ESTADO_CORREGIR,
            Actor::AssignedTutor,
            None,
            ObservationRule::Required,
            true,
        )),

        _ => Err(CoreError::Conflict(format!(
            "A project in state '{from}' cannot transition to '{to}'"
        ))),
    }
}

/// Check the supplied observation text against the plan's rule.
///
/// Returns the trimmed text when an observation should be appended, `None`
/// when the transition proceeds without one. Must be called before any
/// mutation so a rejected request leaves no trace.
pub fn check_observation<'a>(
    plan: &TransitionPlan,
    text: Option<&'a str>,
) -> Result<Option<&'a str>, CoreError> {
    let trimmed = text.map(str::trim).filter(|t| !t.is_empty());

    match plan.observation {
        ObservationRule::NotAccepted => {
            if trimmed.is_some() {
                return Err(CoreError::Validation(format!(
                    "The transition to '{}' does not accept an observation",
                    plan.to
                )));
            }
            Ok(None)
        }
        ObservationRule::Optional => {
            if let Some(t) = trimmed {
                validate_observacion(t)?;
            }
            Ok(trimmed)
        }
        ObservationRule::Required => {
            let t = trimmed.ok_or_else(|| {
                CoreError::Validation(format!(
                    "The transition to '{}' requires a non-empty observation",
                    plan.to
                ))
            })?;
            validate_observacion(t)?;
            Ok(Some(t))
        }
    }
}
