//! CLI tests module

#[cfg(feature = "cli")]
pub mod convert_tests;
#[cfg(feature = "cli")]
pub mod validate_tests;
