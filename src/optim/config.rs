/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : LAMB 的超参数配置与参数组
 */

use serde::{Deserialize, Serialize};

use super::ParamId;
use crate::errors::OptimizerError;

/// 全局配置（构造时确定）
///
/// 缺省值与论文实现一致：`lr=1e-3, betas=(0.9, 0.999), eps=1e-6, weight_decay=0`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LambConfig {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    pub weight_decay: f32,
    /// 为true时实际更新恒用 trust_ratio = 1（即退化为 Adam），仅用于对比实验
    pub adam_mode: bool,
}

impl Default for LambConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-6,
            weight_decay: 0.0,
            adam_mode: false,
        }
    }
}

impl LambConfig {
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            ..Self::default()
        }
    }

    pub const fn with_betas(mut self, beta1: f32, beta2: f32) -> Self {
        self.beta1 = beta1;
        self.beta2 = beta2;
        self
    }

    pub const fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub const fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    pub const fn with_adam_mode(mut self, adam_mode: bool) -> Self {
        self.adam_mode = adam_mode;
        self
    }

    /// 从 JSON 读取配置，缺失的字段取缺省值；读取后立即校验
    pub fn from_json(json: &str) -> Result<Self, OptimizerError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| OptimizerError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 校验各超参数的取值范围（NaN 视为非法）
    pub fn validate(&self) -> Result<(), OptimizerError> {
        self.hyper_params().validate("")
    }

    pub(crate) const fn hyper_params(&self) -> HyperParams {
        HyperParams {
            learning_rate: self.learning_rate,
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
            weight_decay: self.weight_decay,
        }
    }
}

/// 某个参数组最终生效的数值超参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperParams {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    pub weight_decay: f32,
}

impl HyperParams {
    /// `prefix`用于在错误信息中标出出错的参数组，如`param_groups[1].`
    pub(crate) fn validate(&self, prefix: &str) -> Result<(), OptimizerError> {
        check_learning_rate(&format!("{prefix}learning_rate"), self.learning_rate)?;
        if !(0.0..).contains(&self.epsilon) {
            return Err(OptimizerError::invalid(format!("{prefix}epsilon"), self.epsilon));
        }
        if !(0.0..1.0).contains(&self.beta1) {
            return Err(OptimizerError::invalid(format!("{prefix}beta1"), self.beta1));
        }
        if !(0.0..1.0).contains(&self.beta2) {
            return Err(OptimizerError::invalid(format!("{prefix}beta2"), self.beta2));
        }
        Ok(())
    }
}

pub(crate) fn check_learning_rate(field: &str, learning_rate: f32) -> Result<(), OptimizerError> {
    if (0.0..).contains(&learning_rate) {
        Ok(())
    } else {
        Err(OptimizerError::invalid(field, learning_rate))
    }
}

/// 参数组内可覆盖的超参数，`None`表示沿用全局配置
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupOptions {
    pub learning_rate: Option<f32>,
    pub beta1: Option<f32>,
    pub beta2: Option<f32>,
    pub epsilon: Option<f32>,
    pub weight_decay: Option<f32>,
}

impl GroupOptions {
    pub(crate) fn resolve(&self, defaults: &HyperParams) -> HyperParams {
        HyperParams {
            learning_rate: self.learning_rate.unwrap_or(defaults.learning_rate),
            beta1: self.beta1.unwrap_or(defaults.beta1),
            beta2: self.beta2.unwrap_or(defaults.beta2),
            epsilon: self.epsilon.unwrap_or(defaults.epsilon),
            weight_decay: self.weight_decay.unwrap_or(defaults.weight_decay),
        }
    }
}

/// 参数组：一组共享超参数的参数
///
/// 用于需要分组设置超参数的场景，如：
/// - 偏置与 LayerNorm 不做权重衰减
/// - 分层学习率
///
/// # 示例
/// ```ignore
/// let groups = vec![
///     ParamGroup::new(vec![w1, w2]),
///     ParamGroup::new(vec![b1, b2]).with_weight_decay(0.0),
/// ];
/// let lamb = Lamb::new(&store, groups, LambConfig::new(1e-3).with_weight_decay(0.01))?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGroup {
    pub params: Vec<ParamId>,
    pub options: GroupOptions,
}

impl ParamGroup {
    pub fn new(params: Vec<ParamId>) -> Self {
        Self {
            params,
            options: GroupOptions::default(),
        }
    }

    pub const fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.options.learning_rate = Some(learning_rate);
        self
    }

    pub const fn with_betas(mut self, beta1: f32, beta2: f32) -> Self {
        self.options.beta1 = Some(beta1);
        self.options.beta2 = Some(beta2);
        self
    }

    pub const fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.options.epsilon = Some(epsilon);
        self
    }

    pub const fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.options.weight_decay = Some(weight_decay);
        self
    }
}

impl From<Vec<ParamId>> for ParamGroup {
    fn from(params: Vec<ParamId>) -> Self {
        Self::new(params)
    }
}
