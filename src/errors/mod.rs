/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 错误类型：张量运算的误用（panic信息）与优化器可恢复错误（Result）
 */

use std::fmt::{self, Display};

use thiserror::Error;

use crate::optim::ParamId;

/// 张量的（自）二元运算符，仅用于拼接错误信息
#[derive(Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    AddAssign,
    SubAssign,
    MulAssign,
}
impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "相加",
            Self::Sub => "相减",
            Self::Mul => "相乘",
            Self::Div => "相除",
            Self::AddAssign => "自相加",
            Self::SubAssign => "自相减",
            Self::MulAssign => "自相乘",
        };
        write!(f, "{name}")
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },
    #[error("数据长度{data_len}与形状{shape:?}不匹配")]
    DataShapeMismatch { data_len: usize, shape: Vec<usize> },
    #[error("稀疏索引{index}越界（元素总数为{size}）")]
    SparseIndexOutOfRange { index: usize, size: usize },
    #[error("作为除数的张量中存在为零元素")]
    DivByZeroElement,
}

/// 优化器错误类型
///
/// 其中`InvalidConfiguration`只会在构造（或显式修改学习率）时出现，
/// `UnsupportedGradientLayout`只会在`step`时出现。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    #[error("超参数`{field}`的取值{value}非法")]
    InvalidConfiguration { field: String, value: f32 },
    #[error("优化器的参数列表为空")]
    EmptyParameterList,
    #[error("参数{0:?}在参数组中重复出现")]
    DuplicateParameter(ParamId),
    #[error("参数仓库中不存在参数{0:?}")]
    ParamNotFound(ParamId),
    #[error("参数组{0}不存在")]
    GroupNotFound(usize),
    #[error("参数`{name}`的梯度为稀疏布局，LAMB不支持稀疏梯度，请先转为稠密梯度")]
    UnsupportedGradientLayout { name: String },
    #[error("参数`{name}`的梯度形状{grad_shape:?}与参数形状{param_shape:?}不一致")]
    GradientShapeMismatch {
        name: String,
        param_shape: Vec<usize>,
        grad_shape: Vec<usize>,
    },
    #[error("状态字典与当前优化器不匹配：{0}")]
    StateDictMismatch(String),
    #[error("序列化/反序列化失败：{0}")]
    Serialization(String),
}

impl OptimizerError {
    pub(crate) fn invalid(field: impl Into<String>, value: f32) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            value,
        }
    }
}
