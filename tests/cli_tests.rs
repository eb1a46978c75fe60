//! CLI integration tests

mod cli;
