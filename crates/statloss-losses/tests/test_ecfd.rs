//! Tests for the ECFD estimator: contract, determinism and statistics.

use burn::tensor::{Tensor, TensorData};
use rand_distr::{Distribution, StandardNormal};
use statloss_core::backend::{init_cpu_device, CpuAutodiffBackend, CpuBackend};
use statloss_losses::{
    ecfd, ecfd_fixed, ecfd_optimized, gaussian_ecfd, uniform_ecfd, Bandwidth, EcfdConfig,
    LossError, RngKey, Weighting,
};

type Device = <CpuBackend as burn::tensor::backend::Backend>::Device;

/// `n` draws from N(shift, I_d), reproducible from `key`.
fn gaussian_batch(key: RngKey, n: usize, d: usize, shift: f32, device: &Device) -> Tensor<CpuBackend, 2> {
    let mut rng = key.stream();
    let values: Vec<f32> = (0..n * d)
        .map(|_| {
            let z: f32 = StandardNormal.sample(&mut rng);
            z + shift
        })
        .collect();
    Tensor::from_data(TensorData::new(values, [n, d]), device)
}

fn scalar<B: burn::tensor::backend::Backend>(t: Tensor<B, 1>) -> f32 {
    t.into_data().convert::<f32>().to_vec::<f32>().expect("to vec")[0]
}

fn std_dev(values: &[f32]) -> f32 {
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n).sqrt()
}

#[test]
fn test_non_negative() {
    let device = init_cpu_device();
    for seed in 0..8 {
        let x = gaussian_batch(RngKey::new(seed), 16, 3, 0.0, &device);
        let y = gaussian_batch(RngKey::new(seed + 100), 24, 3, 0.7, &device);
        for config in [EcfdConfig::gaussian(1), EcfdConfig::uniform(5)] {
            let loss = ecfd_fixed(x.clone(), y.clone(), &[0.1, 1.0, 10.0], &config, RngKey::new(seed), &device)
                .unwrap();
            assert_eq!(loss.dims(), [1]);
            assert!(scalar(loss) >= 0.0);
        }
    }
}

#[test]
fn test_identical_batches_have_zero_distance() {
    let device = init_cpu_device();
    let x = gaussian_batch(RngKey::new(1), 32, 4, 0.0, &device);
    let loss = ecfd_fixed(x.clone(), x, &[0.5, 2.0], &EcfdConfig::gaussian(64), RngKey::new(2), &device)
        .unwrap();
    assert!(scalar(loss).abs() < 1e-6);
}

#[test]
fn test_same_distribution_is_near_zero() {
    let device = init_cpu_device();
    let x = gaussian_batch(RngKey::new(11), 512, 2, 0.0, &device);
    let y = gaussian_batch(RngKey::new(12), 512, 2, 0.0, &device);
    let shifted = gaussian_batch(RngKey::new(13), 512, 2, 3.0, &device);

    for weighting in [Weighting::Gaussian, Weighting::Uniform] {
        let config = EcfdConfig::gaussian(256).with_weighting(weighting);
        let same = scalar(ecfd_fixed(x.clone(), y.clone(), &[1.0], &config, RngKey::new(5), &device).unwrap());
        let apart =
            scalar(ecfd_fixed(x.clone(), shifted.clone(), &[1.0], &config, RngKey::new(5), &device).unwrap());

        assert!(same < 0.05, "{weighting}: same-distribution ECFD {same}");
        assert!(apart > 0.2, "{weighting}: shifted ECFD {apart}");
        assert!(apart > 10.0 * same, "{weighting}: {apart} vs {same}");
    }
}

#[test]
fn test_estimator_spread_shrinks_with_more_frequencies() {
    let device = init_cpu_device();
    let x = gaussian_batch(RngKey::new(21), 128, 2, 0.0, &device);
    let y = gaussian_batch(RngKey::new(22), 128, 2, 1.5, &device);

    let spread = |num_freqs: usize| {
        let estimates: Vec<f32> = RngKey::new(99)
            .split(16)
            .into_iter()
            .map(|key| {
                scalar(
                    ecfd_fixed(x.clone(), y.clone(), &[1.0], &EcfdConfig::gaussian(num_freqs), key, &device)
                        .unwrap(),
                )
            })
            .collect();
        std_dev(&estimates)
    };

    let coarse = spread(2);
    let fine = spread(256);
    assert!(fine < coarse, "std with 256 freqs {fine} vs 2 freqs {coarse}");
}

#[test]
fn test_deterministic_under_fixed_key() {
    let device = init_cpu_device();
    let x = gaussian_batch(RngKey::new(1), 20, 3, 0.0, &device);
    let y = gaussian_batch(RngKey::new(2), 20, 3, 1.0, &device);
    let config = EcfdConfig::uniform(16);

    let run = |key: RngKey| scalar(ecfd_fixed(x.clone(), y.clone(), &[0.5, 1.0], &config, key, &device).unwrap());

    assert_eq!(run(RngKey::new(42)), run(RngKey::new(42)));
    assert_ne!(run(RngKey::new(42)), run(RngKey::new(43)));
}

#[test]
fn test_fixed_mode_sums_per_sigma_losses() {
    let device = init_cpu_device();
    let x = gaussian_batch(RngKey::new(3), 24, 2, 0.0, &device);
    let y = gaussian_batch(RngKey::new(4), 24, 2, 0.5, &device);
    let config = EcfdConfig::gaussian(32);
    let key = RngKey::new(7);
    let (k0, k1) = key.split_two();

    let total = scalar(ecfd_fixed(x.clone(), y.clone(), &[0.5, 2.0], &config, key, &device).unwrap());
    let first = scalar(ecfd_fixed(x.clone(), y.clone(), &[0.5], &config, k0, &device).unwrap());
    let second = scalar(ecfd_fixed(x, y, &[2.0], &config, k1, &device).unwrap());

    assert!((total - (first + second)).abs() < 1e-6, "{total} vs {first} + {second}");
}

#[test]
fn test_optimized_mode_divides_by_sigma_norm() {
    let device = init_cpu_device();
    let dim = 4;
    let sigma_value = 0.8f32;
    let x = gaussian_batch(RngKey::new(5), 30, dim, 0.0, &device);
    let y = gaussian_batch(RngKey::new(6), 40, dim, 0.4, &device);
    let config = EcfdConfig::gaussian(64);
    let key = RngKey::new(8);

    let fixed = scalar(ecfd_fixed(x.clone(), y.clone(), &[sigma_value as f64], &config, key, &device).unwrap());
    let sigma = Tensor::<CpuBackend, 2>::full([1, dim], sigma_value, &device);
    let optimized = scalar(ecfd_optimized(x, y, sigma, &config, key, &device).unwrap());

    let norm = sigma_value * (dim as f32).sqrt();
    assert!(
        (optimized * norm - fixed).abs() <= 1e-5 * fixed.max(1e-3),
        "optimized {optimized} * {norm} vs fixed {fixed}"
    );
}

#[test]
fn test_optimized_sigma_receives_gradient() {
    let device = init_cpu_device();
    let x = Tensor::<CpuAutodiffBackend, 2>::from_data(
        gaussian_batch(RngKey::new(1), 32, 3, 0.0, &device).into_data(),
        &device,
    );
    let y = Tensor::<CpuAutodiffBackend, 2>::from_data(
        gaussian_batch(RngKey::new(2), 32, 3, 1.0, &device).into_data(),
        &device,
    );
    let sigma = Tensor::<CpuAutodiffBackend, 2>::from_floats([[0.5, 1.0, 1.5]], &device).require_grad();

    let loss = ecfd_optimized(x, y, sigma.clone(), &EcfdConfig::uniform(16), RngKey::new(3), &device).unwrap();
    let grads = loss.backward();
    let grad = sigma.grad(&grads).expect("sigma requires grad");

    assert_eq!(grad.dims(), [1, 3]);
    let values: Vec<f32> = grad.into_data().to_vec().expect("to vec");
    assert!(values.iter().all(|g| g.is_finite()));
    assert!(values.iter().any(|g| *g != 0.0));
}

#[test]
fn test_batches_may_differ_in_size_and_rank_is_flattened() {
    let device = init_cpu_device();
    let x = Tensor::<CpuBackend, 3>::ones([10, 2, 3], &device);
    let y = Tensor::<CpuBackend, 3>::zeros([7, 2, 3], &device);

    let loss = ecfd_fixed(x, y, &[1.0], &EcfdConfig::default(), RngKey::new(0), &device).unwrap();
    assert!(scalar(loss) > 0.0);
}

#[test]
fn test_truncated_uniform_frequencies_vanish() {
    // Every U[-1, 1) draw truncates to zero, so all frequencies are zero
    let device = init_cpu_device();
    let x = gaussian_batch(RngKey::new(1), 16, 2, 0.0, &device);
    let y = gaussian_batch(RngKey::new(2), 16, 2, 5.0, &device);
    let config = EcfdConfig::uniform(32).with_truncated_frequencies(true);

    let loss = ecfd_fixed(x, y, &[3.0], &config, RngKey::new(0), &device).unwrap();
    assert_eq!(scalar(loss), 0.0);
}

#[test]
fn test_named_wrappers_match_config_dispatch() {
    let device = init_cpu_device();
    let x = gaussian_batch(RngKey::new(1), 16, 2, 0.0, &device);
    let y = gaussian_batch(RngKey::new(2), 16, 2, 1.0, &device);
    let key = RngKey::new(4);

    let via_gaussian = scalar(gaussian_ecfd(x.clone(), y.clone(), vec![1.0, 2.0], 8, key, &device).unwrap());
    let via_config =
        scalar(ecfd_fixed(x.clone(), y.clone(), &[1.0, 2.0], &EcfdConfig::gaussian(8), key, &device).unwrap());
    assert_eq!(via_gaussian, via_config);

    let sigma = Tensor::<CpuBackend, 2>::full([1, 2], 1.0, &device);
    let via_uniform = scalar(uniform_ecfd(x.clone(), y.clone(), sigma.clone(), 8, key, &device).unwrap());
    let via_enum = scalar(
        ecfd(x, y, Bandwidth::Optimized(sigma), &EcfdConfig::uniform(8), key, &device).unwrap(),
    );
    assert_eq!(via_uniform, via_enum);
}

#[test]
fn test_argument_errors() {
    let device = init_cpu_device();
    let x = gaussian_batch(RngKey::new(1), 8, 3, 0.0, &device);
    let y = gaussian_batch(RngKey::new(2), 8, 3, 0.0, &device);
    let narrow = gaussian_batch(RngKey::new(3), 8, 2, 0.0, &device);
    let key = RngKey::new(0);
    let config = EcfdConfig::default();

    assert!(matches!(
        ecfd_fixed(x.clone(), narrow, &[1.0], &config, key, &device),
        Err(LossError::DimensionMismatch { x: 3, y: 2 })
    ));
    assert!(matches!(
        ecfd_fixed(x.clone(), y.clone(), &[1.0], &EcfdConfig::gaussian(0), key, &device),
        Err(LossError::InvalidArgument { arg: "num_freqs", .. })
    ));
    assert!(matches!(
        ecfd_fixed(x.clone(), y.clone(), &[], &config, key, &device),
        Err(LossError::InvalidArgument { arg: "sigmas", .. })
    ));
    assert!(matches!(
        ecfd_fixed(x.clone(), y.clone(), &[1.0, -0.5], &config, key, &device),
        Err(LossError::InvalidArgument { arg: "sigmas", .. })
    ));

    let bad_sigma = Tensor::<CpuBackend, 2>::ones([1, 5], &device);
    assert!(matches!(
        ecfd_optimized(x, y, bad_sigma, &config, key, &device),
        Err(LossError::InvalidArgument { arg: "sigma", .. })
    ));
}
