use std::ops::{AddAssign, MulAssign, SubAssign};

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

macro_rules! impl_assign_op {
    ($trait:ident, $method:ident, $operator:expr, $op:tt) => {
        impl<'a> $trait<&'a Tensor> for Tensor {
            fn $method(&mut self, other: &'a Tensor) {
                // 两者形状须严格一致
                if !self.is_same_shape(other) {
                    panic!(
                        "{}",
                        TensorError::OperatorError {
                            operator: $operator,
                            tensor1_shape: self.shape().to_vec(),
                            tensor2_shape: other.shape().to_vec(),
                        }
                    );
                }
                self.data $op &other.data;
            }
        }

        impl $trait<f32> for Tensor {
            fn $method(&mut self, scalar: f32) {
                self.data $op scalar;
            }
        }
    };
}

impl_assign_op!(AddAssign, add_assign, Operator::AddAssign, +=);
impl_assign_op!(SubAssign, sub_assign, Operator::SubAssign, -=);
impl_assign_op!(MulAssign, mul_assign, Operator::MulAssign, *=);
