use burn::tensor::Tensor;
use statloss_core::backend::*;

#[test]
fn test_cpu_initialization() {
    let device = init_cpu_device();
    let tensor = Tensor::<CpuBackend, 1>::zeros([4], &device);
    assert_eq!(tensor.dims(), [4]);
}

#[test]
fn test_cpu_autodiff_tracks_gradients() {
    let device = init_cpu_device();
    let x = Tensor::<CpuAutodiffBackend, 1>::from_floats([1.0, 2.0, 3.0], &device).require_grad();
    let grads = (x.clone() * x.clone()).sum().backward();
    let grad: Vec<f32> = x
        .grad(&grads)
        .expect("x requires grad")
        .into_data()
        .to_vec()
        .expect("grad to vec");
    assert_eq!(grad, vec![2.0, 4.0, 6.0]);
}

// GPU smoke test - only runs with the gpu feature
#[cfg(feature = "gpu")]
#[test]
fn test_gpu_initialization() {
    let device = init_gpu_device();
    let tensor = Tensor::<WgpuBackend, 1>::zeros([4], &device);
    assert_eq!(tensor.dims(), [4]);
}
