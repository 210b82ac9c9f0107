// Library exports for Murmur
// This allows integration tests and external code to use Murmur modules

pub mod compose;
pub mod config;
pub mod error;
pub mod feed;
pub mod gateway;
pub mod nav;
pub mod routes;
pub mod state;
pub mod validation;
