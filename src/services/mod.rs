pub mod http;
pub mod errors;
pub mod api_client;
pub mod home_screen_service;

pub use http::*;
pub use errors::*;
pub use api_client::*;
pub use home_screen_service::*;
