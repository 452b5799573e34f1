pub mod reader;
pub mod types;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;
