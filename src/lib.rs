pub mod common;
pub mod config;
pub mod conversions;
pub mod external;
pub mod routes;
pub mod services;
pub mod submissions;

#[cfg(test)]
pub mod test_helpers;
