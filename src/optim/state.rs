/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 每个参数的优化器状态，以及用于断点续训的状态字典
 */

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{HyperParams, LambGroup};
use crate::errors::OptimizerError;
use crate::tensor::{ElementwiseMath, Tensor};

/// 最近一次更新的诊断量
///
/// 只读的观测字段：供日志/直方图等外部使用，不会参与下一次更新的计算。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamDiagnostics {
    /// 参数的L2范数（截断到[0, 10]）
    pub weight_norm: f32,
    /// 自适应步长（含权重衰减项）的L2范数
    pub adam_norm: f32,
    /// weight_norm / adam_norm，范数退化时为1；adam 模式下仍记录未覆盖前的值
    pub trust_ratio: f32,
}

/// 单个参数的状态，首次更新时惰性创建
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterState<T = Tensor> {
    pub(crate) step_count: u64,
    /// 梯度的指数移动平均
    pub(crate) first_moment: T,
    /// 梯度平方的指数移动平均
    pub(crate) second_moment: T,
    pub(crate) diagnostics: ParamDiagnostics,
}

impl<T: ElementwiseMath> ParameterState<T> {
    /// 全零矩估计，形状与参数一致
    pub(crate) fn zeros_like(param: &T) -> Self {
        Self {
            step_count: 0,
            first_moment: param.zeros_like(),
            second_moment: param.zeros_like(),
            diagnostics: ParamDiagnostics::default(),
        }
    }

    /// 已对该参数执行的更新次数
    pub const fn step_count(&self) -> u64 {
        self.step_count
    }

    pub const fn first_moment(&self) -> &T {
        &self.first_moment
    }

    pub const fn second_moment(&self) -> &T {
        &self.second_moment
    }

    pub const fn diagnostics(&self) -> &ParamDiagnostics {
        &self.diagnostics
    }

    pub const fn weight_norm(&self) -> f32 {
        self.diagnostics.weight_norm
    }

    pub const fn adam_norm(&self) -> f32 {
        self.diagnostics.adam_norm
    }

    pub const fn trust_ratio(&self) -> f32 {
        self.diagnostics.trust_ratio
    }
}

/// 优化器的完整状态，按“参数组 → 组内顺序”排列
///
/// `states[i]`对应展开后第i个被跟踪的参数，尚未更新过的参数为`None`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambStateDict<T = Tensor> {
    pub adam_mode: bool,
    /// 全局超参数（`learning_rate()`的来源）
    pub defaults: HyperParams,
    pub groups: Vec<LambGroup>,
    pub states: Vec<Option<ParameterState<T>>>,
}

impl<T> LambStateDict<T>
where
    T: ElementwiseMath + Serialize + DeserializeOwned,
{
    /// 以 bincode 格式写入本地文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), OptimizerError> {
        let file = File::create(path).map_err(|e| OptimizerError::Serialization(e.to_string()))?;
        bincode::serialize_into(BufWriter::new(file), self)
            .map_err(|e| OptimizerError::Serialization(e.to_string()))
    }

    /// 从本地文件读取（只做反序列化，与优化器的一致性由`Lamb::load_state_dict`校验）
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, OptimizerError> {
        let file = File::open(path).map_err(|e| OptimizerError::Serialization(e.to_string()))?;
        bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| OptimizerError::Serialization(e.to_string()))
    }
}
