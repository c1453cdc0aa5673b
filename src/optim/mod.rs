/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 优化器模块，实现 PyTorch 风格的 LAMB 优化器
 */

mod base;
mod config;
mod diagnostics;
mod lamb;
mod param;
mod state;

pub use base::Optimizer;
pub use config::{GroupOptions, HyperParams, LambConfig, ParamGroup};
pub use diagnostics::{
    DIAGNOSTIC_NAMES, HistogramSink, LogHistogramSink, TrustRatioSummary, collect_trust_ratios,
    log_lamb_rs,
};
pub use lamb::{DiagnosticsEntry, Lamb, LambGroup};
pub use param::{Gradient, GradientLayout, ParamId, ParamStore, Parameter, SparseGradient};
pub use state::{LambStateDict, ParamDiagnostics, ParameterState};

#[cfg(test)]
mod tests;
