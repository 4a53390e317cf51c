//! Empirical Characteristic Function Distance (ECFD).
//!
//! For sample batches X, Y and a frequency matrix T (`[num_freqs, dim]`):
//!
//! ```text
//! tX = T @ Xᵗ, tY = T @ Yᵗ                       [num_freqs, batch]
//! ecfd = mean_f( (mean_b cos tX - mean_b cos tY)^2
//!              + (mean_b sin tX - mean_b sin tY)^2 )
//! ```
//!
//! i.e. the squared gap between the two empirical characteristic functions,
//! averaged over random frequencies. Two entry points share that statistic:
//!
//! - [`ecfd_fixed`]: one fresh T per bandwidth in a fixed set, losses summed
//! - [`ecfd_optimized`]: T scaled by a (learnable) bandwidth tensor, loss
//!   divided by ‖σ‖₂ so σ cannot shrink to zero to game the loss
//!
//! Cost is `O(num_freqs × batch × dim × |sigmas|)`.
//!
//! ## Example
//!
//! ```rust
//! use burn::tensor::{Distribution, Tensor};
//! use statloss_core::backend::{init_cpu_device, CpuBackend};
//! use statloss_losses::{ecfd_fixed, EcfdConfig, RngKey};
//!
//! let device = init_cpu_device();
//! let x = Tensor::<CpuBackend, 2>::random([32, 4], Distribution::Normal(0.0, 1.0), &device);
//! let y = Tensor::<CpuBackend, 2>::random([48, 4], Distribution::Normal(1.0, 1.0), &device);
//!
//! let config = EcfdConfig::gaussian(64);
//! let loss = ecfd_fixed(x, y, &[0.5, 1.0], &config, RngKey::new(0), &device).unwrap();
//! assert_eq!(loss.dims(), [1]);
//! ```

use crate::frequency::sample_unit_frequencies;
use crate::operand::{broadcast_shape, Operand};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use statloss_core::config::validate_sigmas;
use statloss_core::{EcfdConfig, LossError, Result, RngKey};

/// Bandwidth specification for [`ecfd`].
pub enum Bandwidth<B: Backend> {
    /// Fixed positive scalars; one loss per sigma, summed.
    Fixed(Vec<f64>),
    /// Learnable tensor broadcastable to `[num_freqs, dim]`.
    Optimized(Tensor<B, 2>),
}

impl<B: Backend> From<Vec<f64>> for Bandwidth<B> {
    fn from(sigmas: Vec<f64>) -> Self {
        Bandwidth::Fixed(sigmas)
    }
}

impl<B: Backend> From<&[f64]> for Bandwidth<B> {
    fn from(sigmas: &[f64]) -> Self {
        Bandwidth::Fixed(sigmas.to_vec())
    }
}

impl<B: Backend> From<Tensor<B, 2>> for Bandwidth<B> {
    fn from(sigma: Tensor<B, 2>) -> Self {
        Bandwidth::Optimized(sigma)
    }
}

/// ECFD with a fixed bandwidth set.
///
/// Sigmas are processed in order; each gets its own child key from
/// `key.split(sigmas.len())` and therefore its own frequency draw. The
/// per-sigma losses are summed, not averaged.
///
/// # Arguments
/// * `x` - Samples from P, `[batch_x, ...]`, flattened to `[batch_x, dim]`
/// * `y` - Samples from Q, `[batch_y, ...]`, flattened to `[batch_y, dim]`
/// * `sigmas` - Finite positive bandwidths
/// * `config` - Frequency count, weighting and truncation
/// * `key` - Seed for the frequency draws
/// * `device` - Device the frequencies are created on (that of `x` and `y`)
///
/// # Returns
/// Non-negative loss of shape `[1]`.
pub fn ecfd_fixed<B: Backend, const D: usize>(
    x: Tensor<B, D>,
    y: Tensor<B, D>,
    sigmas: &[f64],
    config: &EcfdConfig,
    key: RngKey,
    device: &B::Device,
) -> Result<Tensor<B, 1>> {
    validate_sigmas(sigmas)?;
    let (x, y, dim) = prepare_batches(x, y, config)?;

    log::debug!(
        "ecfd_fixed: x={:?} y={:?} weighting={} num_freqs={} sigmas={:?}",
        x.dims(),
        y.dims(),
        config.weighting,
        config.num_freqs,
        sigmas
    );

    sigmas
        .iter()
        .zip(key.split(sigmas.len()))
        .map(|(&sigma, key)| {
            log::trace!("ecfd_fixed: drawing frequencies for sigma={sigma} key={}", key.seed());
            let freqs = sample_unit_frequencies::<B>(
                config.weighting,
                key,
                config.num_freqs,
                dim,
                config.truncate_frequencies,
                device,
            )
            .mul_scalar(sigma);
            characteristic_gap(x.clone(), y.clone(), freqs)
        })
        .reduce(|total, loss| total + loss)
        .ok_or_else(|| LossError::invalid("sigmas", "bandwidth set is empty"))
}

/// ECFD with a bandwidth tensor, typically a trainable parameter.
///
/// Unit frequencies are multiplied by `sigma` (broadcast to
/// `[num_freqs, dim]`, e.g. shape `[1, dim]` for a per-feature bandwidth),
/// and the statistic is divided by `‖sigma‖₂`. Gradients flow to `sigma`
/// through both the frequencies and the norm.
///
/// An all-zero `sigma` yields 0/0; keeping it away from zero is up to the
/// caller.
pub fn ecfd_optimized<B: Backend, const D: usize>(
    x: Tensor<B, D>,
    y: Tensor<B, D>,
    sigma: Tensor<B, 2>,
    config: &EcfdConfig,
    key: RngKey,
    device: &B::Device,
) -> Result<Tensor<B, 1>> {
    let (x, y, dim) = prepare_batches(x, y, config)?;

    let freq_shape = [config.num_freqs, dim];
    let sigma_shape = sigma.dims();
    if broadcast_shape(&[freq_shape, sigma_shape]) != Some(freq_shape) {
        return Err(LossError::invalid(
            "sigma",
            format!("shape {sigma_shape:?} does not broadcast to frequencies {freq_shape:?}"),
        ));
    }

    log::debug!(
        "ecfd_optimized: x={:?} y={:?} weighting={} num_freqs={} sigma={:?}",
        x.dims(),
        y.dims(),
        config.weighting,
        config.num_freqs,
        sigma_shape
    );

    let norm = sigma.clone().powi_scalar(2).sum().sqrt();
    let freqs = sample_unit_frequencies::<B>(
        config.weighting,
        key,
        config.num_freqs,
        dim,
        config.truncate_frequencies,
        device,
    ) * Operand::from(sigma).promote(freq_shape, device);

    Ok(characteristic_gap(x, y, freqs) / norm)
}

/// Dispatch on a [`Bandwidth`].
pub fn ecfd<B: Backend, const D: usize>(
    x: Tensor<B, D>,
    y: Tensor<B, D>,
    bandwidth: Bandwidth<B>,
    config: &EcfdConfig,
    key: RngKey,
    device: &B::Device,
) -> Result<Tensor<B, 1>> {
    match bandwidth {
        Bandwidth::Fixed(sigmas) => ecfd_fixed(x, y, &sigmas, config, key, device),
        Bandwidth::Optimized(sigma) => ecfd_optimized(x, y, sigma, config, key, device),
    }
}

/// ECFD with Gaussian weighting: frequencies ~ N(0, σ²).
pub fn gaussian_ecfd<B: Backend, const D: usize>(
    x: Tensor<B, D>,
    y: Tensor<B, D>,
    bandwidth: impl Into<Bandwidth<B>>,
    num_freqs: usize,
    key: RngKey,
    device: &B::Device,
) -> Result<Tensor<B, 1>> {
    ecfd(x, y, bandwidth.into(), &EcfdConfig::gaussian(num_freqs), key, device)
}

/// ECFD with uniform weighting: frequencies ~ U[-σ, σ).
pub fn uniform_ecfd<B: Backend, const D: usize>(
    x: Tensor<B, D>,
    y: Tensor<B, D>,
    bandwidth: impl Into<Bandwidth<B>>,
    num_freqs: usize,
    key: RngKey,
    device: &B::Device,
) -> Result<Tensor<B, 1>> {
    ecfd(x, y, bandwidth.into(), &EcfdConfig::uniform(num_freqs), key, device)
}

/// Flatten both batches to `[batch, dim]` and check they agree on `dim`.
fn prepare_batches<B: Backend, const D: usize>(
    x: Tensor<B, D>,
    y: Tensor<B, D>,
    config: &EcfdConfig,
) -> Result<(Tensor<B, 2>, Tensor<B, 2>, usize)> {
    config.validate()?;
    let x = flatten_batch(x, "x")?;
    let y = flatten_batch(y, "y")?;

    let [_, dim_x] = x.dims();
    let [_, dim_y] = y.dims();
    if dim_x != dim_y {
        return Err(LossError::DimensionMismatch { x: dim_x, y: dim_y });
    }
    Ok((x, y, dim_x))
}

fn flatten_batch<B: Backend, const D: usize>(
    samples: Tensor<B, D>,
    name: &'static str,
) -> Result<Tensor<B, 2>> {
    let dims = samples.dims();
    if dims.iter().any(|&d| d == 0) {
        return Err(LossError::invalid(
            name,
            format!("sample batch {dims:?} is empty"),
        ));
    }
    let batch = dims[0];
    let dim = dims[1..].iter().product::<usize>();
    Ok(samples.reshape([batch as i32, dim as i32]))
}

/// Mean squared gap between the empirical characteristic functions of `x`
/// and `y` at the rows of `freqs`.
fn characteristic_gap<B: Backend>(
    x: Tensor<B, 2>,
    y: Tensor<B, 2>,
    freqs: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let tx = freqs.clone().matmul(x.transpose()); // [F, Bx]
    let ty = freqs.matmul(y.transpose()); // [F, By]

    let cos_gap = tx.clone().cos().mean_dim(1) - ty.clone().cos().mean_dim(1);
    let sin_gap = tx.sin().mean_dim(1) - ty.sin().mean_dim(1);

    (cos_gap.powi_scalar(2) + sin_gap.powi_scalar(2)).mean()
}

#[cfg(test)]
mod tests {
    use super::*;
    use statloss_core::backend::{init_cpu_device, CpuBackend};

    fn scalar(t: Tensor<CpuBackend, 1>) -> f32 {
        t.into_data().to_vec::<f32>().expect("to vec")[0]
    }

    #[test]
    fn test_characteristic_gap_zero_frequency() {
        // cos(0) = 1 and sin(0) = 0 for both batches: no gap
        let device = init_cpu_device();
        let x = Tensor::<CpuBackend, 2>::from_floats([[1.0, 2.0], [3.0, 4.0]], &device);
        let y = Tensor::<CpuBackend, 2>::from_floats([[-5.0, 0.5]], &device);
        let freqs = Tensor::<CpuBackend, 2>::zeros([3, 2], &device);
        assert_eq!(scalar(characteristic_gap(x, y, freqs)), 0.0);
    }

    #[test]
    fn test_characteristic_gap_hand_computed() {
        // One frequency t = [1], X = {0}, Y = {pi}: cos gap 2, sin gap 0
        let device = init_cpu_device();
        let x = Tensor::<CpuBackend, 2>::from_floats([[0.0]], &device);
        let y = Tensor::<CpuBackend, 2>::from_floats([[std::f32::consts::PI]], &device);
        let freqs = Tensor::<CpuBackend, 2>::from_floats([[1.0]], &device);
        let gap = scalar(characteristic_gap(x, y, freqs));
        assert!((gap - 4.0).abs() < 1e-5, "got {gap}");
    }

    #[test]
    fn test_flatten_batch_collapses_trailing_axes() {
        let device = init_cpu_device();
        let images = Tensor::<CpuBackend, 4>::zeros([5, 3, 2, 2], &device);
        let flat = flatten_batch(images, "x").unwrap();
        assert_eq!(flat.dims(), [5, 12]);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let device = init_cpu_device();
        let x = Tensor::<CpuBackend, 2>::zeros([0, 3], &device);
        let err = flatten_batch(x, "x").unwrap_err();
        assert!(matches!(err, LossError::InvalidArgument { arg: "x", .. }));
    }
}
