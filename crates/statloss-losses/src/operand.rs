//! Scalar-or-tensor operands and the promotion step.
//!
//! Loss arguments that may be either a bare number or a tensor are taken as
//! [`Operand`]. Before any arithmetic, every operand is promoted to a tensor
//! of the common broadcast shape on one device, so the formulas themselves
//! only ever see equally-shaped tensors.

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor};

/// A bare real number or a rank-`D` tensor.
pub enum Operand<B: Backend, const D: usize> {
    Scalar(f64),
    Tensor(Tensor<B, D>),
}

impl<B: Backend, const D: usize> Operand<B, D> {
    pub fn as_tensor(&self) -> Option<&Tensor<B, D>> {
        match self {
            Operand::Scalar(_) => None,
            Operand::Tensor(t) => Some(t),
        }
    }

    /// Shape of a tensor operand; scalars have none.
    pub fn dims(&self) -> Option<[usize; D]> {
        self.as_tensor().map(Tensor::dims)
    }

    /// Materialize as a tensor of `shape` on `device`.
    ///
    /// Scalars are filled, tensors are expanded along their size-1 axes.
    /// `shape` must be a broadcast of this operand's own shape.
    pub fn promote(self, shape: [usize; D], device: &B::Device) -> Tensor<B, D> {
        match self {
            Operand::Scalar(value) => Tensor::full(shape, value, device),
            Operand::Tensor(t) if t.dims() == shape => t,
            Operand::Tensor(t) => t.expand(Shape::new(shape)),
        }
    }
}

impl<B: Backend, const D: usize> Clone for Operand<B, D> {
    fn clone(&self) -> Self {
        match self {
            Operand::Scalar(v) => Operand::Scalar(*v),
            Operand::Tensor(t) => Operand::Tensor(t.clone()),
        }
    }
}

impl<B: Backend, const D: usize> From<f64> for Operand<B, D> {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

impl<B: Backend, const D: usize> From<f32> for Operand<B, D> {
    fn from(value: f32) -> Self {
        Operand::Scalar(value as f64)
    }
}

impl<B: Backend, const D: usize> From<Tensor<B, D>> for Operand<B, D> {
    fn from(tensor: Tensor<B, D>) -> Self {
        Operand::Tensor(tensor)
    }
}

/// Common shape of equal-rank shapes under size-1 broadcasting.
///
/// Returns `None` when two shapes disagree on an axis where neither is 1.
/// An empty slice broadcasts to all-ones.
pub fn broadcast_shape<const D: usize>(shapes: &[[usize; D]]) -> Option<[usize; D]> {
    let mut out = [1usize; D];
    for shape in shapes {
        for (acc, &dim) in out.iter_mut().zip(shape.iter()) {
            if *acc == dim || dim == 1 {
                continue;
            }
            if *acc != 1 {
                return None;
            }
            *acc = dim;
        }
    }
    Some(out)
}
