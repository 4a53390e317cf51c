//! # statloss-examples utilities
//!
//! Synthetic data shared by the demos: seeded Gaussian sample batches and
//! 8-bit data rescaled to `[-1, 1]`.

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use statloss_core::RngKey;

/// Draw `n` samples from N(shift, scale² I_d) as an `[n, d]` tensor.
pub fn gaussian_batch<B: Backend>(
    key: RngKey,
    n: usize,
    d: usize,
    shift: f32,
    scale: f32,
    device: &B::Device,
) -> Tensor<B, 2> {
    let mut rng = key.stream();
    let values: Vec<f32> = (0..n * d)
        .map(|_| {
            let z: f32 = StandardNormal.sample(&mut rng);
            shift + scale * z
        })
        .collect();
    Tensor::from_data(TensorData::new(values, [n, d]), device)
}

/// Random 8-bit levels rescaled to `[-1, 1]`, shaped `[n, d]`.
///
/// Levels are drawn around `center` (in level units, 0..=255) with the given
/// spread, then clipped to the valid range.
pub fn quantized_batch<B: Backend>(
    key: RngKey,
    n: usize,
    d: usize,
    center: f32,
    spread: f32,
    device: &B::Device,
) -> Tensor<B, 2> {
    let mut rng = key.stream();
    let values: Vec<f32> = (0..n * d)
        .map(|_| {
            let jitter: f32 = rng.gen_range(-spread..=spread);
            let level = (center + jitter).round().clamp(0.0, 255.0);
            level / 127.5 - 1.0
        })
        .collect();
    Tensor::from_data(TensorData::new(values, [n, d]), device)
}

/// Read the first element of a tensor back to the host.
pub fn first_value<B: Backend, const D: usize>(t: Tensor<B, D>) -> anyhow::Result<f32> {
    let values: Vec<f32> = t
        .into_data()
        .convert::<f32>()
        .to_vec()
        .map_err(|e| anyhow::anyhow!("tensor readback failed: {e:?}"))?;
    values
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("empty tensor"))
}

/// Convert a per-dimension negative log-likelihood in nats to bits.
pub fn nats_to_bits(nats: f32) -> f32 {
    nats / std::f32::consts::LN_2
}
