// Library surface for the binary and for headless/integration tests.
pub mod cancel;
pub mod config;
pub mod duration;
pub mod guide;
pub mod input;
pub mod phase;
pub mod quotes;
pub mod render;
pub mod runtime;
pub mod session;
