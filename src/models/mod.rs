pub mod user;
pub mod auth;
pub mod session;
pub mod telegram;

pub use user::{HostUser, UserProfile};
pub use auth::{AuthRequest, AuthResponse, ErrorBody};
pub use session::{DebugInfo, Session, SessionPhase};
pub use telegram::{
    ColorScheme, HapticKind, HomeScreenStatus, Platform, PopupButton, PopupButtonKind, PopupParams,
    ThemeParams,
};
