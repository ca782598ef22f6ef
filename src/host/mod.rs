// Bridge con el runtime del host (Telegram WebApp)

pub mod traits;
pub mod capabilities;
pub mod bridge;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use bridge::{BridgeError, HostBridge, Subscription};
pub use capabilities::CapabilityFlags;
pub use traits::{
    ButtonAction, HandlerId, HostButton, HostCallback, HostEvent, HostHandler, HostRuntime,
    NoopStyle, StyleSink, settle_on_failure,
};
