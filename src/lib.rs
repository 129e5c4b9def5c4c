//! Scope-owned handles for plain threads.
//!
//! A [`JoinHandle`](std::thread::JoinHandle) is easy to forget: drop it and
//! its thread silently runs on, detached from the code that started it. The
//! types in this crate flip that default. A worker is owned by a value on the
//! stack, and leaving that value's scope waits for the worker first, even
//! when the scope is left by a panic. Detaching stays available, but as an
//! explicit, named decision.
//!
//! There are currently two owner types:
//! - For owning a single worker, use [`ScopedWorker`].
//! - For owning a group of workers that are resolved together, use [`WorkerSet`].
//!
//! # Features
//!
//! The following features are available on the crate:
//!
//! - `set`: Enables [`WorkerSet`].
//! - `shared`: Enables [`Shared`], the opt-in marker for handing a worker a
//!   mutable reference into caller-owned data.
//!
//! By default both features are enabled.
//! To only use one of the features, disable the default features and enable the feature you want to use.
//! For example:
//!
//! ```toml
//! [dependencies]
//! scoped-workers = {version = "...", default-features = false, features = ["set"]}
//! ```

#![warn(missing_docs)]

mod defer;
mod error;
#[cfg(feature = "set")]
mod set;
#[cfg(feature = "shared")]
mod shared;
mod worker;

pub use error::*;
#[cfg(feature = "set")]
pub use set::*;
#[cfg(feature = "shared")]
pub use shared::*;
pub use worker::*;
