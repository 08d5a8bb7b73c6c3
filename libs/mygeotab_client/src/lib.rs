pub mod client;
pub mod error;
pub mod models;


pub use client::MyGeotabClient;
pub use error::{MyGeotabClientResult, MyGeotabError};
pub use models::{Credentials, Device, Group};
