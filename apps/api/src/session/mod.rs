// Editing sessions: persistence seam, socket protocol and HTTP/WebSocket handlers
// wrapped around the layout engine.

pub mod editor;
pub mod handlers;
pub mod locks;
pub mod protocol;
pub mod store;
