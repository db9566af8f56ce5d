pub mod api;
pub mod websocket;

pub use api::health_check;
pub use websocket::{parse_client_frame, websocket_handler};
