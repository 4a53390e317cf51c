//! # statloss-core
//!
//! Shared plumbing for the statloss divergence library.
//!
//! - [`backend`]: burn backend aliases and explicit device constructors
//! - [`rng`]: [`RngKey`], a splittable seed for reproducible frequency draws
//! - [`error`]: [`LossError`] and the crate-wide [`Result`] alias
//! - [`config`]: [`EcfdConfig`], [`LossConfig`] and the CLI/TOML layer
//!
//! Every loss in `statloss-losses` is generic over a burn
//! [`Backend`](burn::tensor::backend::Backend). Nothing here pins a device:
//! callers build one and pass it down.
//!
//! ```rust
//! use statloss_core::backend::{init_cpu_device, CpuBackend};
//! use statloss_core::RngKey;
//!
//! let device = init_cpu_device();
//! let x = burn::tensor::Tensor::<CpuBackend, 2>::zeros([4, 3], &device);
//! assert_eq!(x.dims(), [4, 3]);
//!
//! let (k1, k2) = RngKey::new(42).split_two();
//! assert_ne!(k1, k2);
//! ```

#![recursion_limit = "256"] // Required for burn-wgpu

pub mod backend;
pub mod config;
pub mod error;
pub mod rng;

pub use backend::*;
pub use config::*;
pub use error::*;
pub use rng::*;
