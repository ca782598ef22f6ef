// ============================================================================
// VIEWMODELS - Lógica de negocio de la app (sin Yew)
// ============================================================================

pub mod session_manager;
pub mod affordances;

pub use session_manager::*;
pub use affordances::*;
