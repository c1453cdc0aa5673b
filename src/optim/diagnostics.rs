/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : trust ratio 等诊断量的导出，供外部按名称聚合（如画直方图）
 *
 * 优化器本身只负责在每次 step 后保持诊断量最新，聚合与格式化都在这里（优化器之外）完成。
 */

use log::info;

use super::Lamb;
use crate::tensor::ElementwiseMath;

/// 诊断量的名称，顺序固定
pub const DIAGNOSTIC_NAMES: [&str; 3] = ["weight_norm", "adam_norm", "trust_ratio"];

/// 按名称分组后的诊断量，组内顺序与参数更新顺序一致
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrustRatioSummary {
    pub weight_norm: Vec<f32>,
    pub adam_norm: Vec<f32>,
    pub trust_ratio: Vec<f32>,
}

impl TrustRatioSummary {
    /// 以`(名称, 数值列表)`的形式遍历，名称顺序同`DIAGNOSTIC_NAMES`
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[f32])> {
        DIAGNOSTIC_NAMES.into_iter().zip([
            self.weight_norm.as_slice(),
            self.adam_norm.as_slice(),
            self.trust_ratio.as_slice(),
        ])
    }

    pub fn is_empty(&self) -> bool {
        self.trust_ratio.is_empty()
    }
}

/// 收集所有已更新过的参数的诊断量
pub fn collect_trust_ratios<T: ElementwiseMath>(optimizer: &Lamb<T>) -> TrustRatioSummary {
    let mut summary = TrustRatioSummary::default();
    for entry in optimizer.diagnostics() {
        summary.weight_norm.push(entry.diagnostics.weight_norm);
        summary.adam_norm.push(entry.diagnostics.adam_norm);
        summary.trust_ratio.push(entry.diagnostics.trust_ratio);
    }
    summary
}

/// 直方图的接收端（如 TensorBoard 写入器），由调用方实现
pub trait HistogramSink {
    fn add_histogram(&mut self, tag: &str, values: &[f32], step: u64);
}

/// 将各层的诊断量以`lamb/<名称>`为标签写入直方图；尚无任何状态时不写入
pub fn log_lamb_rs<T, S>(optimizer: &Lamb<T>, sink: &mut S, token_count: u64)
where
    T: ElementwiseMath,
    S: HistogramSink + ?Sized,
{
    let summary = collect_trust_ratios(optimizer);
    if summary.is_empty() {
        return;
    }
    for (name, values) in summary.iter() {
        sink.add_histogram(&format!("lamb/{name}"), values, token_count);
    }
}

/// 只把最小/平均/最大值打到日志里的简易接收端
#[derive(Debug, Default)]
pub struct LogHistogramSink;

impl HistogramSink for LogHistogramSink {
    fn add_histogram(&mut self, tag: &str, values: &[f32], step: u64) {
        if values.is_empty() {
            return;
        }
        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        info!(
            "[{step}] {tag}: n={}, min={min:.6}, mean={mean:.6}, max={max:.6}",
            values.len()
        );
    }
}
