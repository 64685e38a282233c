//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod archivo_repo;
pub mod audit_repo;
pub mod chat_repo;
pub mod notificacion_repo;
pub mod observacion_repo;
pub mod proyecto_repo;
pub mod sesion_repo;
pub mod usuario_repo;

pub use archivo_repo::ArchivoRepo;
pub use audit_repo::AuditRepo;
pub use chat_repo::ChatRepo;
pub use notificacion_repo::NotificacionRepo;
pub use observacion_repo::ObservacionRepo;
pub use proyecto_repo::ProyectoRepo;
pub use sesion_repo::SesionRepo;
pub use usuario_repo::UsuarioRepo;
