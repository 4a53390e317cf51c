//! Random frequency draws for the ECFD estimator.
//!
//! Frequencies are sampled at unit scale on the host from the ChaCha8
//! stream of an [`RngKey`] and uploaded as a `[num_freqs, dim]` tensor on
//! the caller's device. Scaling by the bandwidth happens on-device so a
//! learnable sigma stays in the autodiff graph.
//!
//! | Sampler | Unit draw | After scaling by σ |
//! |---------|-----------|--------------------|
//! | [`GaussianFrequencies`] | N(0, 1) | N(0, σ²) |
//! | [`UniformFrequencies`] | U[-1, 1) | U[-σ, σ) |

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use rand::Rng;
use rand_distr::{Distribution as RandDist, StandardNormal};
use statloss_core::{RngKey, Weighting};

/// A unit-scale frequency distribution.
pub trait FrequencySampler {
    /// One unit-scale draw.
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f32;

    fn weighting(&self) -> Weighting;

    /// Draw a `[num_freqs, dim]` matrix of unit-scale frequencies.
    ///
    /// With `truncate`, each draw is truncated toward zero, which maps all
    /// of (-1, 1) to 0. Frequencies otherwise stay in floating point.
    fn sample_unit<B: Backend>(
        &self,
        key: RngKey,
        num_freqs: usize,
        dim: usize,
        truncate: bool,
        device: &B::Device,
    ) -> Tensor<B, 2> {
        let mut rng = key.stream();
        let values: Vec<f32> = (0..num_freqs * dim)
            .map(|_| {
                let v = self.draw(&mut rng);
                if truncate {
                    v.trunc()
                } else {
                    v
                }
            })
            .collect();

        Tensor::from_data(TensorData::new(values, [num_freqs, dim]), device)
    }
}

/// Standard normal frequencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianFrequencies;

impl FrequencySampler for GaussianFrequencies {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        StandardNormal.sample(rng)
    }

    fn weighting(&self) -> Weighting {
        Weighting::Gaussian
    }
}

/// Frequencies uniform on [-1, 1).
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformFrequencies;

impl FrequencySampler for UniformFrequencies {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        rng.gen_range(-1.0..1.0)
    }

    fn weighting(&self) -> Weighting {
        Weighting::Uniform
    }
}

/// Draw unit-scale frequencies from the sampler matching `weighting`.
pub fn sample_unit_frequencies<B: Backend>(
    weighting: Weighting,
    key: RngKey,
    num_freqs: usize,
    dim: usize,
    truncate: bool,
    device: &B::Device,
) -> Tensor<B, 2> {
    match weighting {
        Weighting::Gaussian => GaussianFrequencies.sample_unit(key, num_freqs, dim, truncate, device),
        Weighting::Uniform => UniformFrequencies.sample_unit(key, num_freqs, dim, truncate, device),
    }
}
