pub mod auth;
pub mod client;
pub mod error;
pub mod hosts;
pub mod models;

#[cfg(test)]
mod tests;

pub use auth::basic_auth_header;
pub use client::DataConnectorClient;
pub use error::{DataConnectorClientResult, DataConnectorError};
pub use models::{ODataQuery, ODataRow};
