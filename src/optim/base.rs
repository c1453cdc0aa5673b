/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 优化器基础trait
 */

use super::ParamStore;
use crate::errors::OptimizerError;
use crate::tensor::ElementwiseMath;

/// 优化器核心 trait
pub trait Optimizer<T: ElementwiseMath> {
    /// 清空优化器所跟踪参数的梯度（不影响优化器自身状态）
    fn zero_grad(&self, store: &mut ParamStore<T>) -> Result<(), OptimizerError>;

    /// 参数更新（使用已计算的梯度）
    ///
    /// `PyTorch` 风格训练循环：
    /// ```ignore
    /// optimizer.zero_grad(&mut store)?;
    /// // ...前向、反向传播（外部），把梯度挂到 store 上...
    /// optimizer.step(&mut store)?; // ← 只更新参数，不做 forward/backward
    /// ```
    fn step(&mut self, store: &mut ParamStore<T>) -> Result<(), OptimizerError>;

    /// 获取（全局）学习率
    fn learning_rate(&self) -> f32;

    /// 设置全局学习率，作用于没有单独指定学习率的参数组；学习率调度由调用方在每步之前完成
    fn set_learning_rate(&mut self, lr: f32) -> Result<(), OptimizerError>;
}
