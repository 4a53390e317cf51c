//! Backend aliases and device constructors.
//!
//! The losses never choose a device on their own. These helpers exist so
//! callers (tests, demos, training loops) have one obvious way to get one.

use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{Autodiff, NdArray};

/// CPU backend used by default and in tests.
pub type CpuBackend = NdArray<f32>;

/// CPU backend with gradient tracking.
pub type CpuAutodiffBackend = Autodiff<CpuBackend>;

pub fn init_cpu_device() -> NdArrayDevice {
    NdArrayDevice::Cpu
}

#[cfg(feature = "gpu")]
pub use gpu::*;

#[cfg(feature = "gpu")]
mod gpu {
    use burn::backend::wgpu::WgpuDevice;
    use burn::backend::{Autodiff, Wgpu};

    pub type WgpuBackend = Wgpu;

    pub type WgpuAutodiffBackend = Autodiff<WgpuBackend>;

    pub fn init_gpu_device() -> WgpuDevice {
        // Burn picks the platform adapter (Metal, Vulkan, DX12) for the default device
        WgpuDevice::default()
    }
}
