pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod render;
pub mod resolve;
pub mod runtime;
pub mod typedoc;
