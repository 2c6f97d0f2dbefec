pub mod auth;
pub mod config;
pub mod constants;
pub mod extractors;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;
pub mod workers;

#[cfg(test)]
mod test_support;
