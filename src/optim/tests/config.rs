use crate::assert_err;
use crate::errors::OptimizerError;
use crate::optim::{Lamb, LambConfig, Optimizer, ParamGroup, ParamStore};
use crate::tensor::Tensor;

use super::single_param_store;

#[test]
fn test_default_config() {
    let config = LambConfig::default();
    assert_eq!(config.learning_rate, 1e-3);
    assert_eq!(config.beta1, 0.9);
    assert_eq!(config.beta2, 0.999);
    assert_eq!(config.epsilon, 1e-6);
    assert_eq!(config.weight_decay, 0.0);
    assert!(!config.adam_mode);
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_hyper_params_fail_construction() {
    let (store, w) = single_param_store("w", &[1., 2.], &[2]);
    let cases = [
        (LambConfig::new(-1e-3), "learning_rate"),
        (LambConfig::new(f32::NAN), "learning_rate"),
        (LambConfig::default().with_epsilon(-1e-8), "epsilon"),
        (LambConfig::default().with_betas(1.0, 0.999), "beta1"),
        (LambConfig::default().with_betas(-0.1, 0.999), "beta1"),
        (LambConfig::default().with_betas(0.9, 1.0), "beta2"),
        (LambConfig::default().with_betas(0.9, -0.5), "beta2"),
    ];
    for (config, expected_field) in cases {
        let result = Lamb::with_params(&store, &[w], config);
        match result {
            Err(OptimizerError::InvalidConfiguration { field, .. }) => {
                assert_eq!(field, expected_field)
            }
            other => panic!("预期`{expected_field}`非法，实际得到{other:?}"),
        }
    }
}

#[test]
fn test_invalid_configuration_names_value() {
    let (store, w) = single_param_store("w", &[1.], &[1]);
    assert_err!(
        Lamb::with_params(&store, &[w], LambConfig::default().with_betas(0.9, 1.5)),
        OptimizerError::InvalidConfiguration { field, value } if field == "beta2" && *value == 1.5
    );
}

#[test]
fn test_boundary_values_are_accepted() {
    let (store, w) = single_param_store("w", &[1.], &[1]);
    let config = LambConfig::new(0.0).with_betas(0.0, 0.0).with_epsilon(0.0);
    assert!(Lamb::with_params(&store, &[w], config).is_ok());
}

#[test]
fn test_weight_decay_is_not_bounds_checked() {
    let (store, w) = single_param_store("w", &[1.], &[1]);
    let config = LambConfig::default().with_weight_decay(-0.01);
    assert!(Lamb::with_params(&store, &[w], config).is_ok());
}

#[test]
fn test_group_overrides_are_validated() {
    let mut store = ParamStore::new();
    let a = store.add("a", Tensor::zeros(&[2]));
    let b = store.add("b", Tensor::zeros(&[2]));
    let groups = vec![
        ParamGroup::new(vec![a]),
        ParamGroup::new(vec![b]).with_betas(1.0, 0.999),
    ];
    assert_err!(
        Lamb::new(&store, groups, LambConfig::default()),
        OptimizerError::InvalidConfiguration("param_groups[1].beta1")
    );
}

#[test]
fn test_group_overrides_take_precedence() {
    let mut store = ParamStore::new();
    let a = store.add("a", Tensor::zeros(&[2]));
    let b = store.add("b", Tensor::zeros(&[2]));
    let groups = vec![
        ParamGroup::new(vec![a]),
        ParamGroup::new(vec![b])
            .with_learning_rate(0.5)
            .with_weight_decay(0.01)
            .with_epsilon(1e-8),
    ];
    let lamb = Lamb::new(&store, groups, LambConfig::new(0.1)).unwrap();
    let first = lamb.param_groups()[0].hyper_params();
    let second = lamb.param_groups()[1].hyper_params();
    assert_eq!(first.learning_rate, 0.1);
    assert_eq!(first.weight_decay, 0.0);
    assert_eq!(second.learning_rate, 0.5);
    assert_eq!(second.weight_decay, 0.01);
    assert_eq!(second.epsilon, 1e-8);
    assert_eq!(second.beta1, 0.9);
}

#[test]
fn test_empty_parameter_list() {
    let store: ParamStore = ParamStore::new();
    assert_err!(
        Lamb::new(&store, vec![], LambConfig::default()),
        OptimizerError::EmptyParameterList
    );
    assert_err!(
        Lamb::new(&store, vec![ParamGroup::new(vec![])], LambConfig::default()),
        OptimizerError::EmptyParameterList
    );
}

#[test]
fn test_duplicate_parameter() {
    let mut store = ParamStore::new();
    let a = store.add("a", Tensor::zeros(&[1]));
    let b = store.add("b", Tensor::zeros(&[1]));
    let groups = vec![ParamGroup::new(vec![a, b]), ParamGroup::new(vec![b])];
    assert_err!(
        Lamb::new(&store, groups, LambConfig::default()),
        OptimizerError::DuplicateParameter(id) if *id == b
    );
}

#[test]
fn test_unknown_parameter() {
    let mut other = ParamStore::new();
    other.add("a", Tensor::zeros(&[1]));
    let b = other.add("b", Tensor::zeros(&[1]));
    let (store, _) = single_param_store("only", &[1.], &[1]);
    assert_err!(
        Lamb::with_params(&store, &[b], LambConfig::default()),
        OptimizerError::ParamNotFound(id) if *id == b
    );
}

#[test]
fn test_config_from_json() {
    let config = LambConfig::from_json(r#"{"learning_rate": 0.01, "adam_mode": true}"#).unwrap();
    assert_eq!(config.learning_rate, 0.01);
    assert!(config.adam_mode);
    assert_eq!(config.beta2, 0.999);
    assert_eq!(config.epsilon, 1e-6);

    assert_err!(
        LambConfig::from_json(r#"{"beta1": 1.2}"#),
        OptimizerError::InvalidConfiguration("beta1")
    );
    assert_err!(
        LambConfig::from_json("{learning_rate"),
        OptimizerError::Serialization(_)
    );
}

#[test]
fn test_config_json_round_trip() {
    let config = LambConfig::new(0.02).with_weight_decay(0.01).with_adam_mode(true);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(LambConfig::from_json(&json).unwrap(), config);
}

#[test]
fn test_set_learning_rate() {
    let mut store = ParamStore::new();
    let a = store.add("a", Tensor::zeros(&[1]));
    let b = store.add("b", Tensor::zeros(&[1]));
    let groups = vec![
        ParamGroup::new(vec![a]),
        ParamGroup::new(vec![b]).with_learning_rate(0.5),
    ];
    let mut lamb = Lamb::new(&store, groups, LambConfig::new(0.1)).unwrap();
    assert_eq!(lamb.learning_rate(), 0.1);

    lamb.set_learning_rate(0.01).unwrap();
    assert_eq!(lamb.learning_rate(), 0.01);
    assert_eq!(lamb.param_groups()[0].hyper_params().learning_rate, 0.01);
    // 单独指定了学习率的组不受全局学习率影响
    assert_eq!(lamb.param_groups()[1].hyper_params().learning_rate, 0.5);

    assert_err!(
        lamb.set_learning_rate(-1.),
        OptimizerError::InvalidConfiguration("learning_rate")
    );
    assert_eq!(lamb.learning_rate(), 0.01);
}

#[test]
fn test_schedule_keeps_frozen_group() {
    let mut store = ParamStore::new();
    let scheduled = store.add("scheduled", Tensor::new(&[1.], &[1]));
    let frozen = store.add("frozen", Tensor::new(&[1.], &[1]));
    let groups = vec![
        ParamGroup::new(vec![scheduled]),
        ParamGroup::new(vec![frozen]).with_learning_rate(0.),
    ];
    let mut lamb = Lamb::new(&store, groups, LambConfig::new(0.1)).unwrap();
    assert!(!lamb.param_groups()[0].has_own_learning_rate());
    assert!(lamb.param_groups()[1].has_own_learning_rate());

    for lr in [0.05, 0.02] {
        lamb.set_learning_rate(lr).unwrap();
        store.set_dense_grad(scheduled, Tensor::new(&[1.], &[1])).unwrap();
        store.set_dense_grad(frozen, Tensor::new(&[1.], &[1])).unwrap();
        lamb.step(&mut store).unwrap();
    }

    assert_eq!(lamb.param_groups()[0].hyper_params().learning_rate, 0.02);
    assert_eq!(lamb.param_groups()[1].hyper_params().learning_rate, 0.);
    assert_ne!(store.value(scheduled).unwrap().to_vec(), vec![1.]);
    assert_eq!(store.value(frozen).unwrap().to_vec(), vec![1.]);
}

#[test]
fn test_set_group_learning_rate() {
    let mut store = ParamStore::new();
    let a = store.add("a", Tensor::zeros(&[1]));
    let b = store.add("b", Tensor::zeros(&[1]));
    let groups = vec![ParamGroup::new(vec![a]), ParamGroup::new(vec![b])];
    let mut lamb = Lamb::new(&store, groups, LambConfig::new(0.1)).unwrap();

    lamb.set_group_learning_rate(1, 0.3).unwrap();
    assert!(lamb.param_groups()[1].has_own_learning_rate());
    assert_eq!(lamb.param_groups()[0].hyper_params().learning_rate, 0.1);
    assert_eq!(lamb.param_groups()[1].hyper_params().learning_rate, 0.3);

    // 此后全局学习率不再覆盖该组
    lamb.set_learning_rate(0.01).unwrap();
    assert_eq!(lamb.param_groups()[0].hyper_params().learning_rate, 0.01);
    assert_eq!(lamb.param_groups()[1].hyper_params().learning_rate, 0.3);

    assert_err!(
        lamb.set_group_learning_rate(2, 0.1),
        OptimizerError::GroupNotFound(2)
    );
    assert_err!(
        lamb.set_group_learning_rate(0, f32::NAN),
        OptimizerError::InvalidConfiguration("param_groups[0].learning_rate")
    );
    assert_eq!(lamb.param_groups()[0].hyper_params().learning_rate, 0.01);
}
