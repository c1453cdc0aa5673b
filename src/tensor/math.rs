/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 逐元素运算能力（trait），优化器只依赖于此，而不依赖具体的张量实现。
 *                 以`_`结尾的方法为原地（in-place）运算，与 PyTorch 的命名习惯一致。
 */

use ndarray::{ArrayBase, ArrayD, Zip};

use super::Tensor;

/// 稠密数值缓冲区需要提供的逐元素运算
///
/// 调用方须保证二元运算的两个操作数形状一致（优化器在`step`前已统一校验）。
pub trait ElementwiseMath: Clone {
    fn shape(&self) -> &[usize];

    /// 形状相同的全零缓冲区
    fn zeros_like(&self) -> Self;

    /// self ← alpha · self
    fn scale_(&mut self, alpha: f32);

    /// self ← self + alpha · other
    fn add_scaled_(&mut self, alpha: f32, other: &Self);

    /// self ← self + alpha · a ⊙ b
    fn add_scaled_product_(&mut self, alpha: f32, a: &Self, b: &Self);

    /// self ← self + scalar
    fn add_scalar_(&mut self, scalar: f32);

    /// self ← self ⊘ other（遵循 IEEE 754，除零得到 inf/NaN 而不是panic）
    fn div_(&mut self, other: &Self);

    /// 逐元素开平方，返回新缓冲区
    fn sqrt(&self) -> Self;

    /// 所有元素视为一个长向量时的L2范数
    fn l2_norm(&self) -> f32;
}

impl ElementwiseMath for ArrayD<f32> {
    fn shape(&self) -> &[usize] {
        ArrayBase::shape(self)
    }

    fn zeros_like(&self) -> Self {
        ArrayD::zeros(self.raw_dim())
    }

    fn scale_(&mut self, alpha: f32) {
        self.mapv_inplace(|x| x * alpha);
    }

    fn add_scaled_(&mut self, alpha: f32, other: &Self) {
        Zip::from(self)
            .and(other)
            .for_each(|x, &y| *x += alpha * y);
    }

    fn add_scaled_product_(&mut self, alpha: f32, a: &Self, b: &Self) {
        Zip::from(self)
            .and(a)
            .and(b)
            .for_each(|x, &a, &b| *x += alpha * a * b);
    }

    fn add_scalar_(&mut self, scalar: f32) {
        self.mapv_inplace(|x| x + scalar);
    }

    fn div_(&mut self, other: &Self) {
        Zip::from(self).and(other).for_each(|x, &y| *x /= y);
    }

    fn sqrt(&self) -> Self {
        self.mapv(f32::sqrt)
    }

    fn l2_norm(&self) -> f32 {
        self.iter().map(|x| x * x).sum::<f32>().sqrt()
    }
}

// Tensor 只是 ArrayD 的薄封装，直接转发，保证两种后端的数值结果完全一致
impl ElementwiseMath for Tensor {
    fn shape(&self) -> &[usize] {
        Tensor::shape(self)
    }

    fn zeros_like(&self) -> Self {
        Tensor::zeros_like(self)
    }

    fn scale_(&mut self, alpha: f32) {
        self.data.scale_(alpha);
    }

    fn add_scaled_(&mut self, alpha: f32, other: &Self) {
        self.data.add_scaled_(alpha, &other.data);
    }

    fn add_scaled_product_(&mut self, alpha: f32, a: &Self, b: &Self) {
        self.data.add_scaled_product_(alpha, &a.data, &b.data);
    }

    fn add_scalar_(&mut self, scalar: f32) {
        self.data.add_scalar_(scalar);
    }

    fn div_(&mut self, other: &Self) {
        self.data.div_(&other.data);
    }

    fn sqrt(&self) -> Self {
        Tensor::sqrt(self)
    }

    fn l2_norm(&self) -> f32 {
        Tensor::l2_norm(self)
    }
}
