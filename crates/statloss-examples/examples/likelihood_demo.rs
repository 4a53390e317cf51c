//! Bits-per-dimension of 8-bit data under Gaussian decoders of varying width.
//!
//! Builds a batch of quantized values, scores it with the discretized
//! Gaussian log-likelihood for several decoder scales, and reports the KL
//! from a diagonal posterior to the standard normal prior alongside, the two
//! terms of a diffusion-style variational bound.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example likelihood_demo -- --batch 64 --dim 32 --seed 3
//! ```

use anyhow::Result;
use burn::tensor::Tensor;
use clap::Parser;
use statloss_core::backend::{init_cpu_device, CpuBackend};
use statloss_core::RngKey;
use statloss_examples::{first_value, gaussian_batch, nats_to_bits, quantized_batch};
use statloss_losses::{discretized_gaussian_log_likelihood, normal_kl};

#[derive(Parser)]
#[command(name = "likelihood_demo")]
#[command(author, version, about = "Discretized Gaussian likelihood and KL terms")]
struct Args {
    /// Samples per batch
    #[arg(long, default_value = "64")]
    batch: usize,

    /// Values per sample
    #[arg(long, default_value = "32")]
    dim: usize,

    /// Spread of the 8-bit data around mid-gray, in levels
    #[arg(long, default_value = "40.0")]
    spread: f32,

    /// Random seed for reproducibility
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let device = init_cpu_device();
    let (data_key, noise_key) = RngKey::new(args.seed).split_two();

    log::info!("scoring {} x {} quantized values", args.batch, args.dim);

    let x = quantized_batch::<CpuBackend>(
        data_key,
        args.batch,
        args.dim,
        127.5,
        args.spread,
        &device,
    );
    let noise = gaussian_batch::<CpuBackend>(noise_key, args.batch, args.dim, 0.0, 0.02, &device);
    // A decoder that is right up to a little noise
    let means = x.clone() + noise;

    println!("=== Discretized Gaussian likelihood ===\n");
    println!("{:>10}  {:>14}", "log_scale", "bits/dim");
    for log_scale in [-6.0f32, -4.0, -3.0, -2.0, -1.0, 0.0] {
        let log_scales = Tensor::<CpuBackend, 2>::full([args.batch, args.dim], log_scale, &device);
        let log_probs = discretized_gaussian_log_likelihood(x.clone(), means.clone(), log_scales)?;
        let nll = first_value(log_probs.neg().mean())?;
        println!("{:>10.1}  {:>14.4}", log_scale, nats_to_bits(nll));
    }

    println!("\n=== KL to the standard normal prior ===\n");
    println!("{:>10}  {:>14}", "logvar", "mean KL (nats)");
    for logvar in [-2.0f32, -1.0, 0.0, 1.0] {
        let kl = normal_kl(means.clone(), logvar, 0.0, 0.0)?;
        println!("{:>10.1}  {:>14.4}", logvar, first_value(kl.mean())?);
    }

    Ok(())
}
