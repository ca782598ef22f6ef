pub mod use_session;
pub mod use_host_buttons;

pub use use_session::use_session;
pub use use_host_buttons::{use_back_button, use_main_button};
