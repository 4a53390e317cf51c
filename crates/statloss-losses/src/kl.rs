//! KL divergence between diagonal Gaussians.
//!
//! ```text
//! KL = 0.5 * (-1 + v2 - v1 + exp(v1 - v2) + (m1 - m2)^2 * exp(-v2))
//! ```
//!
//! with `v = log(variance)`. The exponentials are not clamped: extreme
//! log-variance differences overflow and that is the caller's concern.

use crate::operand::{broadcast_shape, Operand};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use statloss_core::{LossError, Result};

/// Elementwise KL divergence KL(N(mean1, e^logvar1) ‖ N(mean2, e^logvar2)).
///
/// Any argument may be a scalar or a rank-`D` tensor, but at least one must
/// be a tensor. Scalars are promoted onto the device of the first tensor in
/// argument order (mean1, logvar1, mean2, logvar2), and every operand is
/// broadcast to the common shape, which is also the output shape.
///
/// # Errors
///
/// - [`LossError::PreconditionViolation`] if all four arguments are scalars
/// - [`LossError::ShapeMismatch`] if the tensor shapes do not broadcast
pub fn normal_kl<B: Backend, const D: usize>(
    mean1: impl Into<Operand<B, D>>,
    logvar1: impl Into<Operand<B, D>>,
    mean2: impl Into<Operand<B, D>>,
    logvar2: impl Into<Operand<B, D>>,
) -> Result<Tensor<B, D>> {
    let operands = [mean1.into(), logvar1.into(), mean2.into(), logvar2.into()];

    let device = operands
        .iter()
        .find_map(Operand::as_tensor)
        .map(|t| t.device())
        .ok_or_else(|| {
            LossError::PreconditionViolation(
                "normal_kl needs at least one tensor argument".to_string(),
            )
        })?;

    let shapes: Vec<[usize; D]> = operands.iter().filter_map(Operand::dims).collect();
    let shape = broadcast_shape(&shapes).ok_or_else(|| LossError::ShapeMismatch {
        context: "normal_kl",
        shapes: shapes.iter().map(|s| s.to_vec()).collect(),
    })?;

    let [mean1, logvar1, mean2, logvar2] = operands.map(|op| op.promote(shape, &device));

    let variance_ratio = (logvar1.clone() - logvar2.clone()).exp();
    let mean_term = (mean1 - mean2).powi_scalar(2) * logvar2.clone().neg().exp();

    Ok((logvar2 - logvar1 + variance_ratio + mean_term)
        .sub_scalar(1.0)
        .mul_scalar(0.5))
}
