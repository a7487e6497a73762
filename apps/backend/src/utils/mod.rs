//! Small shared utilities.

pub mod room_code;
