pub mod clamp;
pub mod dispatcher;
pub mod input;
pub mod routes;
