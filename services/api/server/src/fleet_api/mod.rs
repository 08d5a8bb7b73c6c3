pub(crate) mod api_error_v1;
pub(crate) mod core;
pub(crate) mod error_recorder;
