/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 优化器模块单元测试
 *
 * 测试按功能分组：
 * - config: 配置与构造时的校验
 * - param: 参数仓库与梯度布局
 * - step: 单步更新的数值正确性
 * - adam_mode: adam 模式与诊断量
 * - diagnostics: 诊断量导出
 * - state_dict: 状态字典（断点续训）
 */

mod config;

use crate::optim::{ParamId, ParamStore};
use crate::tensor::Tensor;

/// 只含一个参数的仓库
fn single_param_store(name: &str, data: &[f32], shape: &[usize]) -> (ParamStore, ParamId) {
    let mut store = ParamStore::new();
    let id = store.add(name, Tensor::new(data, shape));
    (store, id)
}
