/// 错误断言宏 - 灵活粒度验证 Result 错误
///
/// # 用法
/// - `assert_err!(expr)`：只验证是 Err
/// - `assert_err!(expr, OptimizerError::InvalidConfiguration("beta1"))`：验证是哪个超参数非法
/// - `assert_err!(expr, Pattern { .. })`：验证错误类型
/// - `assert_err!(expr, Pattern { field, .. } if condition)`：验证类型 + 条件
///
/// # 示例
/// ```ignore
/// assert_err!(result, OptimizerError::InvalidConfiguration("learning_rate"));
/// assert_err!(result, OptimizerError::UnsupportedGradientLayout { name } if name == "w");
/// ```
#[macro_export]
macro_rules! assert_err {
    // 只验证是 Err
    ($expr:expr) => {
        assert!($expr.is_err(), "预期 Err，实际得到 {:?}", $expr);
    };
    // 简洁语法：InvalidConfiguration(字段名)
    ($expr:expr, $err_type:ident :: InvalidConfiguration ( $field:literal )) => {
        match &$expr {
            Err($err_type::InvalidConfiguration { field, .. }) => assert_eq!(
                field, $field,
                "非法字段不匹配：预期 `{}`，实际得到 `{}`",
                $field, field
            ),
            Err(e) => panic!(
                "错误类型不匹配：预期 `{}::InvalidConfiguration`，实际得到 `{:?}`",
                stringify!($err_type), e
            ),
            Ok(v) => panic!(
                "预期 Err({}::InvalidConfiguration)，实际得到 Ok({:?})",
                stringify!($err_type), v
            ),
        }
    };
    // 通用模式匹配（带 if guard 或复杂 pattern）
    ($expr:expr, $($pattern:tt)+) => {
        match &$expr {
            Err(e) => assert!(
                matches!(e, $($pattern)+),
                "错误类型不匹配：预期 `{}`，实际得到 `{:?}`",
                stringify!($($pattern)+),
                e
            ),
            Ok(v) => panic!(
                "预期 Err 匹配 `{}`，实际得到 Ok({:?})",
                stringify!($($pattern)+),
                v
            ),
        }
    };
}

/// panic断言宏，可选地校验panic消息
#[macro_export]
macro_rules! assert_panic {
    ($expr:expr) => {
        if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $expr)).is_ok() {
            panic!("表达式没有触发panic");
        }
    };
    ($expr:expr, $expected_msg:expr) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $expr)) {
            Ok(_) => panic!("表达式没有触发panic"),
            Err(err) => {
                let expected = $expected_msg.to_string();
                let actual = err
                    .downcast_ref::<String>()
                    .cloned()
                    .or_else(|| err.downcast_ref::<&'static str>().map(|s| s.to_string()));
                assert_eq!(actual.as_deref(), Some(expected.as_str()), "panic消息与预期不符");
            }
        }
    };
}
