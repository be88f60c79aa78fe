use crate::engine::core::compaction::merge_config::MergeConfig;
use crate::engine::errors::MergeError;

#[test]
fn default_config_is_valid() {
    assert!(MergeConfig::default().validate().is_ok());
    assert!(
        MergeConfig::for_strategy("realtime", "max-small-segment-count=4")
            .validate()
            .is_ok()
    );
}

#[test]
fn unknown_strategy_is_rejected() {
    let err = MergeConfig::for_strategy("no_such", "").validate().unwrap_err();
    assert!(matches!(err, MergeError::Config(_)));
}

#[test]
fn malformed_params_are_rejected() {
    let err = MergeConfig::for_strategy("balance_tree", "base-doc-count")
        .validate()
        .unwrap_err();
    assert!(matches!(err, MergeError::Config(_)));

    let mut config = MergeConfig::default();
    config.optimize_param = "bogus=1".into();
    assert!(matches!(config.validate(), Err(MergeError::Config(_))));
}

#[test]
fn max_doc_id_must_fit_local_doc_ids() {
    let mut config = MergeConfig::default();

    config.max_doc_id = u64::from(u32::MAX);
    assert!(config.validate().is_ok());

    config.max_doc_id = u64::from(u32::MAX) + 1;
    assert!(matches!(config.validate(), Err(MergeError::Config(_))));

    config.max_doc_id = 0;
    assert!(matches!(config.validate(), Err(MergeError::Config(_))));
}
