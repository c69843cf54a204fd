pub mod server;
pub mod stdio_transport;
pub mod tools;
pub mod types;
