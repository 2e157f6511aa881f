mod client_session;
mod message;
mod session_registry;
mod stroke;
mod stroke_store;
mod types;

pub use client_session::*;
pub use message::*;
pub use session_registry::*;
pub use stroke::*;
pub use stroke_store::*;
pub use types::*;

pub extern crate serde;
pub extern crate serde_json;
