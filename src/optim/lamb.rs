/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : LAMB 优化器（Layer-wise Adaptive Moments optimizer for Batch training）
 *
 * 参考：You et al., "Large Batch Optimization for Deep Learning: Training BERT in 76 minutes"
 *       https://arxiv.org/abs/1904.00962
 */

use std::collections::HashSet;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use super::{
    Gradient, HyperParams, LambConfig, LambStateDict, Optimizer, ParamDiagnostics, ParamGroup,
    ParamId, ParamStore, ParameterState,
};
use super::config::check_learning_rate;
use crate::errors::OptimizerError;
use crate::tensor::{ElementwiseMath, Tensor};

/// 权重范数的截断上限，避免异常大的参数张量把 trust ratio 推得过大
const WEIGHT_NORM_CLAMP: f32 = 10.0;

/// 构造后生效的参数组：参数句柄 + 已合并全局配置的超参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambGroup {
    pub(crate) params: Vec<ParamId>,
    pub(crate) hyper_params: HyperParams,
    /// 为true时学习率由本组单独指定，不随全局学习率变化
    pub(crate) own_learning_rate: bool,
}

impl LambGroup {
    pub fn params(&self) -> &[ParamId] {
        &self.params
    }

    pub const fn hyper_params(&self) -> &HyperParams {
        &self.hyper_params
    }

    pub const fn has_own_learning_rate(&self) -> bool {
        self.own_learning_rate
    }
}

/// 一条诊断记录（对应某个已有状态的参数）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagnosticsEntry {
    /// 所在参数组的下标
    pub group: usize,
    pub param: ParamId,
    pub step_count: u64,
    pub diagnostics: ParamDiagnostics,
}

/// LAMB 优化器
///
/// 每个参数的更新（不做偏差修正）：
/// ```text
/// m = β1 · m + (1 - β1) · g
/// v = β2 · v + (1 - β2) · g²
/// r = m / (√v + ε) + λ · θ            （λ ≠ 0 时才加权重衰减项）
/// trust_ratio = clamp(‖θ‖, 0, 10) / ‖r‖（任一范数为0时取1）
/// θ = θ - lr · trust_ratio · r
/// ```
///
/// # 使用示例
/// ```ignore
/// let mut store = ParamStore::new();
/// let w = store.add("w", Tensor::new_random(-1.0, 1.0, &[3, 2]));
/// let mut lamb = Lamb::with_params(&store, &[w], LambConfig::new(1e-3))?;
///
/// // 训练循环
/// lamb.zero_grad(&mut store)?;
/// store.set_dense_grad(w, grad)?; // 梯度由外部反向传播得到
/// lamb.step(&mut store)?;
/// ```
#[derive(Debug, Clone)]
pub struct Lamb<T = Tensor> {
    groups: Vec<LambGroup>,
    defaults: HyperParams,
    adam_mode: bool,
    /// 按槽位（参数组顺序 → 组内顺序展开后的下标）存放的参数状态，首次更新时才创建
    states: Vec<Option<ParameterState<T>>>,
}

impl<T: ElementwiseMath> Lamb<T> {
    /// 创建 LAMB 优化器
    ///
    /// # 参数
    /// - `store`: 参数仓库，仅用于校验句柄是否存在
    /// - `groups`: 参数组（顺序即更新与诊断输出的顺序）
    /// - `config`: 全局配置，参数组中未覆盖的字段沿用此处的值
    pub fn new(
        store: &ParamStore<T>,
        groups: Vec<ParamGroup>,
        config: LambConfig,
    ) -> Result<Self, OptimizerError> {
        config.validate()?;
        let defaults = config.hyper_params();

        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(groups.len());
        for (i, group) in groups.into_iter().enumerate() {
            let hyper_params = group.options.resolve(&defaults);
            hyper_params.validate(&format!("param_groups[{i}]."))?;
            for &id in &group.params {
                if !store.contains(id) {
                    return Err(OptimizerError::ParamNotFound(id));
                }
                if !seen.insert(id) {
                    return Err(OptimizerError::DuplicateParameter(id));
                }
            }
            resolved.push(LambGroup {
                params: group.params,
                hyper_params,
                own_learning_rate: group.options.learning_rate.is_some(),
            });
        }
        if seen.is_empty() {
            return Err(OptimizerError::EmptyParameterList);
        }

        debug!(
            "LAMB 优化器已创建：{}个参数组，共{}个参数，adam_mode={}",
            resolved.len(),
            seen.len(),
            config.adam_mode
        );
        Ok(Self {
            groups: resolved,
            defaults,
            adam_mode: config.adam_mode,
            states: vec![None; seen.len()],
        })
    }

    /// 只有一个参数组时的便捷构造
    pub fn with_params(
        store: &ParamStore<T>,
        params: &[ParamId],
        config: LambConfig,
    ) -> Result<Self, OptimizerError> {
        Self::new(store, vec![ParamGroup::new(params.to_vec())], config)
    }

    /// 先调用一次`closure`（通常用于重新计算损失），再执行`step`，返回闭包的结果
    pub fn step_with_closure<R, F>(
        &mut self,
        store: &mut ParamStore<T>,
        closure: F,
    ) -> Result<R, OptimizerError>
    where
        F: FnOnce() -> R,
    {
        let output = closure();
        self.step(store)?;
        Ok(output)
    }

    pub fn param_groups(&self) -> &[LambGroup] {
        &self.groups
    }

    pub const fn adam_mode(&self) -> bool {
        self.adam_mode
    }

    /// 按固定顺序（参数组 → 组内顺序）遍历所有被跟踪的参数
    pub fn tracked_params(&self) -> impl Iterator<Item = ParamId> + '_ {
        self.groups.iter().flat_map(|g| g.params.iter().copied())
    }

    /// 获取参数的状态；未被跟踪或尚未更新过则为None
    pub fn state(&self, id: ParamId) -> Option<&ParameterState<T>> {
        let slot = self.slot_of(id)?;
        self.states[slot].as_ref()
    }

    /// 获取参数已被更新的次数；未被跟踪的参数返回None
    pub fn step_count(&self, id: ParamId) -> Option<u64> {
        let slot = self.slot_of(id)?;
        Some(self.states[slot].as_ref().map_or(0, |s| s.step_count))
    }

    /// 所有已有状态的参数的最近一次诊断量，顺序与更新顺序一致
    pub fn diagnostics(&self) -> impl Iterator<Item = DiagnosticsEntry> + '_ {
        self.groups
            .iter()
            .enumerate()
            .flat_map(|(group, g)| g.params.iter().map(move |&param| (group, param)))
            .zip(&self.states)
            .filter_map(|((group, param), state)| {
                state.as_ref().map(|s| DiagnosticsEntry {
                    group,
                    param,
                    step_count: s.step_count,
                    diagnostics: s.diagnostics,
                })
            })
    }

    /// 单独设置某个参数组的学习率；此后该组不再随`set_learning_rate`变化
    pub fn set_group_learning_rate(&mut self, group: usize, lr: f32) -> Result<(), OptimizerError> {
        let target = self
            .groups
            .get_mut(group)
            .ok_or(OptimizerError::GroupNotFound(group))?;
        check_learning_rate(&format!("param_groups[{group}].learning_rate"), lr)?;
        target.hyper_params.learning_rate = lr;
        target.own_learning_rate = true;
        Ok(())
    }

    fn slot_of(&self, id: ParamId) -> Option<usize> {
        self.tracked_params().position(|p| p == id)
    }

    /// 在修改任何参数之前统一校验，保证失败的`step`不会留下“更新了一半”的状态
    fn check_before_step(&self, store: &ParamStore<T>) -> Result<(), OptimizerError> {
        for (id, state) in self.tracked_params().zip(&self.states) {
            let param = store.get(id)?;
            let Some(grad) = param.grad() else {
                continue;
            };
            match grad {
                Gradient::Sparse(_) => {
                    warn!("参数`{}`的梯度为稀疏布局，本次 step 未做任何更新", param.name());
                    return Err(OptimizerError::UnsupportedGradientLayout {
                        name: param.name().to_string(),
                    });
                }
                Gradient::Dense(g) if g.shape() != param.value().shape() => {
                    warn!("参数`{}`的梯度形状不匹配，本次 step 未做任何更新", param.name());
                    return Err(OptimizerError::GradientShapeMismatch {
                        name: param.name().to_string(),
                        param_shape: param.value().shape().to_vec(),
                        grad_shape: g.shape().to_vec(),
                    });
                }
                Gradient::Dense(_) => {}
            }
            if let Some(state) = state {
                if state.first_moment.shape() != param.value().shape() {
                    warn!("参数`{}`的状态形状与参数不一致，本次 step 未做任何更新", param.name());
                    return Err(OptimizerError::StateDictMismatch(format!(
                        "参数`{}`的矩估计形状{:?}与参数形状{:?}不一致",
                        param.name(),
                        state.first_moment.shape(),
                        param.value().shape()
                    )));
                }
            }
        }
        Ok(())
    }

    /// 导出状态字典（用于断点续训）
    pub fn state_dict(&self) -> LambStateDict<T> {
        LambStateDict {
            adam_mode: self.adam_mode,
            defaults: self.defaults,
            groups: self.groups.clone(),
            states: self.states.clone(),
        }
    }

    /// 载入状态字典
    ///
    /// 参数组结构（组数、各组句柄及顺序）必须与当前优化器一致；
    /// 全局与各组超参数以字典为准，`adam_mode`保持构造时的取值。
    pub fn load_state_dict(&mut self, state_dict: LambStateDict<T>) -> Result<(), OptimizerError> {
        state_dict.defaults.validate("")?;
        if state_dict.groups.len() != self.groups.len() {
            return Err(OptimizerError::StateDictMismatch(format!(
                "参数组数量不一致：字典中为{}，优化器中为{}",
                state_dict.groups.len(),
                self.groups.len()
            )));
        }
        for (i, (loaded, current)) in state_dict.groups.iter().zip(&self.groups).enumerate() {
            if loaded.params != current.params {
                return Err(OptimizerError::StateDictMismatch(format!(
                    "第{i}个参数组的参数句柄不一致"
                )));
            }
            loaded
                .hyper_params
                .validate(&format!("param_groups[{i}]."))?;
        }
        if state_dict.states.len() != self.states.len() {
            return Err(OptimizerError::StateDictMismatch(format!(
                "状态数量不一致：字典中为{}，优化器中为{}",
                state_dict.states.len(),
                self.states.len()
            )));
        }
        for state in state_dict.states.iter().flatten() {
            if state.first_moment.shape() != state.second_moment.shape() {
                return Err(OptimizerError::StateDictMismatch(
                    "一阶矩与二阶矩的形状不一致".to_string(),
                ));
            }
        }

        self.defaults = state_dict.defaults;
        self.groups = state_dict.groups;
        self.states = state_dict.states;
        debug!("LAMB 状态字典已载入：{}个参数组", self.groups.len());
        Ok(())
    }
}

impl<T: ElementwiseMath> Optimizer<T> for Lamb<T> {
    fn zero_grad(&self, store: &mut ParamStore<T>) -> Result<(), OptimizerError> {
        for id in self.tracked_params() {
            store.clear_grad(id)?;
        }
        Ok(())
    }

    fn step(&mut self, store: &mut ParamStore<T>) -> Result<(), OptimizerError> {
        self.check_before_step(store)?;

        let mut slot = 0;
        let mut updated = 0;
        for group in &self.groups {
            for &id in &group.params {
                let state = &mut self.states[slot];
                slot += 1;

                let (name, value, grad) = store.get_mut(id)?.split_mut();
                // 没有梯度的参数本次跳过（也不会创建状态）
                let Some(Gradient::Dense(grad)) = grad else {
                    continue;
                };
                let state = state.get_or_insert_with(|| ParameterState::zeros_like(value));
                let diagnostics = lamb_update(value, grad, state, &group.hyper_params, self.adam_mode);
                updated += 1;
                trace!(
                    "LAMB 参数`{name}`（第{}次更新）：weight_norm={}, adam_norm={}, trust_ratio={}",
                    state.step_count,
                    diagnostics.weight_norm,
                    diagnostics.adam_norm,
                    diagnostics.trust_ratio
                );
            }
        }
        debug!("LAMB step 完成：更新{updated}个参数，跳过{}个", slot - updated);
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.defaults.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) -> Result<(), OptimizerError> {
        check_learning_rate("learning_rate", lr)?;
        self.defaults.learning_rate = lr;
        for group in self.groups.iter_mut().filter(|g| !g.own_learning_rate) {
            group.hyper_params.learning_rate = lr;
        }
        Ok(())
    }
}

/// 对单个参数执行一次 LAMB 更新（原地修改参数值与状态），返回本次的诊断量
fn lamb_update<T: ElementwiseMath>(
    value: &mut T,
    grad: &T,
    state: &mut ParameterState<T>,
    hyper_params: &HyperParams,
    adam_mode: bool,
) -> ParamDiagnostics {
    let HyperParams {
        learning_rate,
        beta1,
        beta2,
        epsilon,
        weight_decay,
    } = *hyper_params;

    state.step_count += 1;

    // m = β1 · m + (1 - β1) · g
    state.first_moment.scale_(beta1);
    state.first_moment.add_scaled_(1.0 - beta1, grad);
    // v = β2 · v + (1 - β2) · g²
    state.second_moment.scale_(beta2);
    state.second_moment.add_scaled_product_(1.0 - beta2, grad, grad);

    // 论文 v3 不做偏差修正，步长直接取学习率
    let weight_norm = value.l2_norm().clamp(0.0, WEIGHT_NORM_CLAMP);

    let mut denominator = state.second_moment.sqrt();
    denominator.add_scalar_(epsilon);
    let mut adam_step = state.first_moment.clone();
    adam_step.div_(&denominator);
    // 权重衰减项在求范数之前并入更新方向
    if weight_decay != 0.0 {
        adam_step.add_scaled_(weight_decay, value);
    }

    let adam_norm = adam_step.l2_norm();
    let trust_ratio = if weight_norm == 0.0 || adam_norm == 0.0 {
        1.0
    } else {
        weight_norm / adam_norm
    };
    state.diagnostics = ParamDiagnostics {
        weight_norm,
        adam_norm,
        trust_ratio,
    };

    // adam 模式只影响实际更新，记录的诊断量保持不变
    let applied_ratio = if adam_mode { 1.0 } else { trust_ratio };
    value.add_scaled_(-learning_rate * applied_ratio, &adam_step);

    state.diagnostics
}
