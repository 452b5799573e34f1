pub mod common;
pub mod fs;
