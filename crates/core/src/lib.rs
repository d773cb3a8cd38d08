//! symgen-core
//!
//! Generates Breakpad symbols for a binary and every shared library of the
//! build it depends on, writing them into a store addressed by module name and
//! content hash.
//!
//! All substantive logic lives here so it is testable without the external
//! tools; the CLI is a thin frontend.

pub mod config;
pub mod model;
pub mod services;
pub mod store;

pub use config::GeneratorConfig;
pub use model::{JobOutcome, Platform, SkipReason, SymbolIdentity};
pub use services::generator::{GenerateError, SymbolGenerator};
pub use services::scheduler::SchedulerReport;
pub use store::SymbolStore;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
