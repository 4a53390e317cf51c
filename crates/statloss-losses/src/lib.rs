//! # statloss-losses
//!
//! Divergences and likelihoods used as differentiable training losses for
//! generative models, written against burn tensors so they run on any
//! backend and under `Autodiff`.
//!
//! | Function | Computes |
//! |----------|----------|
//! | [`normal_kl`] | KL(N(m1, e^v1) ‖ N(m2, e^v2)), elementwise with broadcasting |
//! | [`approx_standard_normal_cdf`] | tanh approximation of Φ(x) |
//! | [`discretized_gaussian_log_likelihood`] | log-mass of a 256-level bin under a Gaussian |
//! | [`ecfd_fixed`] | ECFD summed over a fixed bandwidth set |
//! | [`ecfd_optimized`] | ECFD with a learnable bandwidth tensor, divided by ‖σ‖₂ |
//! | [`gaussian_ecfd`], [`uniform_ecfd`] | ECFD by weighting distribution |
//!
//! ## Example
//!
//! ```rust
//! use burn::tensor::Tensor;
//! use statloss_core::backend::{init_cpu_device, CpuBackend};
//! use statloss_losses::normal_kl;
//!
//! let device = init_cpu_device();
//! let mean2 = Tensor::<CpuBackend, 1>::from_floats([1.0], &device);
//!
//! // Scalars are promoted onto the device of the first tensor argument.
//! let kl = normal_kl(0.0, 0.0, mean2, 0.0).unwrap();
//! let value: Vec<f32> = kl.into_data().to_vec().unwrap();
//! assert!((value[0] - 0.5).abs() < 1e-6);
//! ```
//!
//! ## Randomness
//!
//! ECFD draws fresh frequencies on every call from the [`RngKey`] it is
//! given. Equal keys and equal inputs give equal results; use
//! [`RngKey::from_entropy`] for unseeded draws.

pub mod ecfd;
pub mod frequency;
pub mod kl;
pub mod likelihood;
pub mod operand;

pub use ecfd::{ecfd, ecfd_fixed, ecfd_optimized, gaussian_ecfd, uniform_ecfd, Bandwidth};
pub use frequency::{
    sample_unit_frequencies, FrequencySampler, GaussianFrequencies, UniformFrequencies,
};
pub use kl::normal_kl;
pub use likelihood::{approx_standard_normal_cdf, discretized_gaussian_log_likelihood};
pub use operand::{broadcast_shape, Operand};

pub use statloss_core::{EcfdConfig, LossError, Result, RngKey, Weighting, DEFAULT_NUM_FREQS};
