pub mod control_strip;
pub mod ticker;
pub mod transcript;
