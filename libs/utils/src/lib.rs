pub mod serials;

pub use serials::{
    PLACEHOLDER_SERIAL, is_valid_serial, normalize_serial, normalize_serials,
    serial_set,
};
