//! Philo Environment Abstraction Layer
//!
//! This crate provides the abstraction allowing the dining philosophers
//! simulation to run against the **System** clock or against a **Virtual**
//! clock driven by tests.
//!
//! # Core Concept
//!
//! Everything the simulation core needs from the outside world goes
//! through one trait:
//! - Time (`now()`, `sleep()`)
//! - Threads (`spawn()`)
//!
//! Timing-sensitive logic (starvation detection, interruptible waits) can
//! then be exercised deterministically by swapping the context.
//!
//! # Example
//!
//! ```
//! use philo_env::{PhiloContext, SystemContext};
//! use std::time::Duration;
//!
//! let ctx = SystemContext::new();
//! let handle = ctx.spawn("worker", || 1 + 1).unwrap();
//! ctx.sleep(Duration::from_millis(1));
//! assert_eq!(handle.join().unwrap(), 2);
//! assert!(ctx.now() >= Duration::from_millis(1));
//! ```

mod context;
mod error;
mod system_impl;

pub use context::PhiloContext;
pub use error::EnvError;
pub use system_impl::SystemContext;
