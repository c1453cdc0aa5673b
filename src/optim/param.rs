/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 参数仓库：由模型（调用方）持有的参数张量及其梯度
 *
 * 优化器不持有参数本身，只持有注册时分配的句柄`ParamId`，
 * 每次`step`时再借用`ParamStore`进行原地更新。
 */

use serde::{Deserialize, Serialize};

use crate::errors::{OptimizerError, TensorError};
use crate::tensor::{ElementwiseMath, Tensor};

/// 参数句柄，在注册到`ParamStore`时分配，仓库存活期间不会复用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParamId(pub(crate) usize);

impl ParamId {
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// 梯度的存储布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientLayout {
    Dense,
    Sparse,
}

/// 稀疏梯度：只存非零元素（行主序展平后的下标 + 值）
#[derive(Debug, Clone, PartialEq)]
pub struct SparseGradient {
    shape: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f32>,
}

impl SparseGradient {
    /// `indices`与`values`长度必须一致，且每个下标都小于元素总数
    pub fn new(shape: &[usize], indices: Vec<usize>, values: Vec<f32>) -> Result<Self, TensorError> {
        let size = shape.iter().product::<usize>();
        if indices.len() != values.len() {
            return Err(TensorError::DataShapeMismatch {
                data_len: values.len(),
                shape: vec![indices.len()],
            });
        }
        if let Some(&index) = indices.iter().find(|&&i| i >= size) {
            return Err(TensorError::SparseIndexOutOfRange { index, size });
        }
        Ok(Self {
            shape: shape.to_vec(),
            indices,
            values,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// 转为稠密张量；重复下标的值会累加
    pub fn to_dense(&self) -> Tensor {
        let mut data = vec![0.; self.shape.iter().product()];
        for (&i, &v) in self.indices.iter().zip(&self.values) {
            data[i] += v;
        }
        Tensor::new(&data, &self.shape)
    }
}

/// 挂在参数上的梯度
#[derive(Debug, Clone, PartialEq)]
pub enum Gradient<T = Tensor> {
    Dense(T),
    Sparse(SparseGradient),
}

impl<T: ElementwiseMath> Gradient<T> {
    pub fn layout(&self) -> GradientLayout {
        match self {
            Self::Dense(_) => GradientLayout::Dense,
            Self::Sparse(_) => GradientLayout::Sparse,
        }
    }

    pub fn is_sparse(&self) -> bool {
        self.layout() == GradientLayout::Sparse
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Dense(g) => g.shape(),
            Self::Sparse(g) => g.shape(),
        }
    }

    pub fn as_dense(&self) -> Option<&T> {
        match self {
            Self::Dense(g) => Some(g),
            Self::Sparse(_) => None,
        }
    }
}

/// 单个可训练参数
#[derive(Debug, Clone)]
pub struct Parameter<T = Tensor> {
    name: String,
    value: T,
    grad: Option<Gradient<T>>,
}

impl<T: ElementwiseMath> Parameter<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn grad(&self) -> Option<&Gradient<T>> {
        self.grad.as_ref()
    }

    /// 同时借出名称、值（可变）与梯度（只读），供优化器原地更新
    pub(crate) fn split_mut(&mut self) -> (&str, &mut T, Option<&Gradient<T>>) {
        (&self.name, &mut self.value, self.grad.as_ref())
    }
}

/// 参数仓库（arena），按注册顺序保存所有参数
#[derive(Debug, Clone)]
pub struct ParamStore<T = Tensor> {
    params: Vec<Parameter<T>>,
}

impl<T> Default for ParamStore<T> {
    fn default() -> Self {
        Self { params: Vec::new() }
    }
}

impl<T: ElementwiseMath> ParamStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个新参数（初始无梯度），返回其句柄
    pub fn add(&mut self, name: impl Into<String>, value: T) -> ParamId {
        self.params.push(Parameter {
            name: name.into(),
            value,
            grad: None,
        });
        ParamId(self.params.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// 按注册顺序返回所有句柄
    pub fn ids(&self) -> Vec<ParamId> {
        (0..self.params.len()).map(ParamId).collect()
    }

    pub fn contains(&self, id: ParamId) -> bool {
        id.0 < self.params.len()
    }

    pub fn get(&self, id: ParamId) -> Result<&Parameter<T>, OptimizerError> {
        self.params.get(id.0).ok_or(OptimizerError::ParamNotFound(id))
    }

    pub fn get_mut(&mut self, id: ParamId) -> Result<&mut Parameter<T>, OptimizerError> {
        self.params
            .get_mut(id.0)
            .ok_or(OptimizerError::ParamNotFound(id))
    }

    pub fn value(&self, id: ParamId) -> Result<&T, OptimizerError> {
        Ok(self.get(id)?.value())
    }

    pub fn grad(&self, id: ParamId) -> Result<Option<&Gradient<T>>, OptimizerError> {
        Ok(self.get(id)?.grad())
    }

    /// 设置参数的梯度（反向传播由外部完成，这里只负责挂载）
    pub fn set_grad(&mut self, id: ParamId, grad: Gradient<T>) -> Result<(), OptimizerError> {
        self.get_mut(id)?.grad = Some(grad);
        Ok(())
    }

    /// `set_grad(id, Gradient::Dense(grad))`的简写
    pub fn set_dense_grad(&mut self, id: ParamId, grad: T) -> Result<(), OptimizerError> {
        self.set_grad(id, Gradient::Dense(grad))
    }

    pub fn clear_grad(&mut self, id: ParamId) -> Result<(), OptimizerError> {
        self.get_mut(id)?.grad = None;
        Ok(())
    }
}
