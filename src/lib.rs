//! # Only Lamb
//!
//! `only_lamb`以 PyTorch 风格用纯rust实现了[LAMB](https://arxiv.org/abs/1904.00962)优化器：
//! 按参数组管理超参数，逐参数（层）计算 trust ratio 来缩放 Adam 式的自适应步长，
//! 并把每个参数的 weight_norm、adam_norm、trust_ratio 保留下来供外部记录。
//!
//! 前向/反向传播、学习率调度、分布式梯度同步都不在本库范围内：
//! 调用方负责把梯度挂到[`optim::ParamStore`]上，再调用[`optim::Optimizer::step`]。
//!

pub mod errors;
pub mod optim;
pub mod tensor;
pub mod utils;
