//! Discretized Gaussian log-likelihood for 256-level data.
//!
//! Data is assumed to be 8-bit values rescaled to `[-1, 1]`, so each value
//! owns a bin of width `2/255`. The log-likelihood of a value is the log of
//! the Gaussian mass on its bin; the two outermost bins extend to ±∞.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use statloss_core::{LossError, Result};

/// Half the width of one quantization bin on `[-1, 1]`.
pub const BIN_HALF_WIDTH: f64 = 1.0 / 255.0;

/// Values beyond ±this are treated as the open-ended edge bins.
pub const EDGE_THRESHOLD: f64 = 0.999;

/// Floor applied to every probability before taking its log.
pub const LOG_FLOOR: f64 = 1e-12;

// sqrt(2 / pi)
const SQRT_2_OVER_PI: f64 = 0.797_884_560_802_865_4;
const CUBIC_COEFF: f64 = 0.044_715;

/// Fast approximation of the standard normal CDF:
///
/// ```text
/// Φ(x) ≈ 0.5 * (1 + tanh(sqrt(2/π) * (x + 0.044715 * x^3)))
/// ```
pub fn approx_standard_normal_cdf<B: Backend, const D: usize>(x: Tensor<B, D>) -> Tensor<B, D> {
    // x * x * x rather than powf: negative bases are undefined for pow on some backends
    let cubed = x.clone() * x.clone() * x.clone();
    (x + cubed.mul_scalar(CUBIC_COEFF))
        .mul_scalar(SQRT_2_OVER_PI)
        .tanh()
        .add_scalar(1.0)
        .mul_scalar(0.5)
}

/// Log-likelihood (in nats) of discretized data under a Gaussian.
///
/// # Arguments
/// * `x` - Targets rescaled from uint8 to `[-1, 1]`
/// * `means` - Gaussian means, same shape as `x`
/// * `log_scales` - Gaussian log standard deviations, same shape as `x`
///
/// # Returns
/// Tensor shaped like `x`. Per element:
/// - `x < -0.999`: `log Φ(plus_in)` (left edge bin)
/// - `x > 0.999`: `log(1 - Φ(min_in))` (right edge bin)
/// - otherwise: `log(Φ(plus_in) - Φ(min_in))`
///
/// where `plus_in`/`min_in` are the standardized upper/lower bin edges and
/// every probability is floored at [`LOG_FLOOR`], so the result is always
/// finite and no lower than `ln(1e-12)`.
///
/// # Errors
/// [`LossError::ShapeMismatch`] unless all three inputs share one shape.
pub fn discretized_gaussian_log_likelihood<B: Backend, const D: usize>(
    x: Tensor<B, D>,
    means: Tensor<B, D>,
    log_scales: Tensor<B, D>,
) -> Result<Tensor<B, D>> {
    let (x_dims, mean_dims, scale_dims) = (x.dims(), means.dims(), log_scales.dims());
    if x_dims != mean_dims || x_dims != scale_dims {
        return Err(LossError::ShapeMismatch {
            context: "discretized_gaussian_log_likelihood",
            shapes: vec![x_dims.to_vec(), mean_dims.to_vec(), scale_dims.to_vec()],
        });
    }

    let centered = x.clone() - means;
    let inv_stdv = log_scales.neg().exp();
    let plus_in = inv_stdv.clone() * centered.clone().add_scalar(BIN_HALF_WIDTH);
    let min_in = inv_stdv * centered.sub_scalar(BIN_HALF_WIDTH);

    let cdf_plus = approx_standard_normal_cdf(plus_in);
    let cdf_min = approx_standard_normal_cdf(min_in);

    let log_cdf_plus = cdf_plus.clone().clamp_min(LOG_FLOOR).log();
    let log_one_minus_cdf_min = cdf_min
        .clone()
        .neg()
        .add_scalar(1.0)
        .clamp_min(LOG_FLOOR)
        .log();
    let log_cdf_delta = (cdf_plus - cdf_min).clamp_min(LOG_FLOOR).log();

    let left_edge = x.clone().lower_elem(-EDGE_THRESHOLD);
    let right_edge = x.greater_elem(EDGE_THRESHOLD);

    Ok(log_cdf_delta
        .mask_where(right_edge, log_one_minus_cdf_min)
        .mask_where(left_edge, log_cdf_plus))
}
