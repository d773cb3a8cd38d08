//! Symbol generation services.
//!
//! Leaf-first:
//! - `tools`: the process-spawning seam shared by every external tool
//! - `resolve`: dyld `@loader_path` / `@executable_path` / `@rpath` resolution
//! - `dependencies` + `backends`: per-platform shared-library listing
//! - `closure`: transitive closure over those listings
//! - `dump_syms` + `scheduler`: the worker pool filling the symbol store
//! - `generator`: end-to-end orchestration

pub mod backends;
pub mod closure;
pub mod dependencies;
pub mod dump_syms;
pub mod generator;
pub mod resolve;
pub mod scheduler;
pub mod tools;
