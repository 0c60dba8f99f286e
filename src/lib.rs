//! Gitbridge - typed version-control operations for agent tooling
//!
//! Gitbridge exposes repository operations to automated callers through a
//! provider abstraction: a typed operation contract, a capability model,
//! and a CLI-backed implementation that turns `git`'s text output into
//! stable result objects.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`provider`] - The contract, capability model, factory, and mock backend
//! - [`cli`] - The CLI-backed provider: command builder, parsers, operations
//! - [`exec`] - Process execution boundary (tagged outcomes, timeouts)
//! - [`context`] - Per-call operation context and workdir resolution
//! - [`types`] - Operation options and backend-independent results
//! - [`error`] - The closed error taxonomy and invocation classifier
//! - [`config`] - Provider-construction configuration
//!
//! # Correctness Invariants
//!
//! Gitbridge maintains the following invariants:
//!
//! 1. Callers obtain providers only through the factory's capability gate
//! 2. Every failure crosses the layer boundary as exactly one [`error::VcsError`]
//! 3. Result shapes are identical regardless of which backend produced them
//! 4. Argument vectors are never joined into shell-interpreted strings

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod provider;
pub mod types;
