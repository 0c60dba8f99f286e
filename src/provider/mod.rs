//! provider
//!
//! The provider abstraction layer.
//!
//! # Architecture
//!
//! This module is the **single doorway** to repository operations. Call
//! sites obtain a [`VcsProvider`] from the [`ProviderFactory`] and invoke
//! typed operations on it; they never construct backends directly and never
//! see backend-specific behavior. The capability model
//! ([`capabilities`]) is enforced at the factory, so a caller holding a
//! provider may rely on every capability it required.
//!
//! # Responsibilities
//!
//! - The operation contract and backend kinds ([`traits`])
//! - The capability model ([`capabilities`])
//! - Shared provider plumbing ([`base`])
//! - Provider selection, gating, and caching ([`factory`])
//! - A scripted in-memory backend for tests ([`mock`])

pub mod base;
pub mod capabilities;
pub mod factory;
pub mod mock;
pub mod traits;

pub use capabilities::{Capability, CapabilitySet};
pub use factory::{ProviderFactory, ProviderSelection};
pub use mock::MockProvider;
pub use traits::{ProviderKind, VcsProvider};
