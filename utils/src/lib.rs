//! helpers shared by the integration tests of the workspace crates
pub mod sqlx_tester;
