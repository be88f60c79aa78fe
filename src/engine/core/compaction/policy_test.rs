use crate::engine::core::compaction::policy::MergeStrategyFactory;
use crate::engine::core::segment::LevelInfo;
use crate::engine::errors::MergeError;
use crate::test_helpers::factories::SegmentMergeInfoFactory;

#[test]
fn creates_every_registered_strategy() {
    for name in MergeStrategyFactory::NAMES {
        let strategy = MergeStrategyFactory::create(name, "", "").unwrap();
        assert_eq!(strategy.name(), name);
    }
}

#[test]
fn rejects_unknown_strategy_name() {
    let err = MergeStrategyFactory::create("leveled", "", "").unwrap_err();
    assert!(matches!(err, MergeError::Config(_)));
}

#[test]
fn validates_optimize_param_for_every_strategy() {
    let err = MergeStrategyFactory::create("realtime", "", "bogus=1").unwrap_err();
    assert!(matches!(err, MergeError::Config(_)));

    let err = MergeStrategyFactory::create("optimize", "base-doc-count=1", "").unwrap_err();
    assert!(matches!(err, MergeError::Config(_)));
}

#[test]
fn optimize_task_uses_optimize_param() {
    let strategy = MergeStrategyFactory::create(
        "balance_tree",
        "base-doc-count=1000;conflict-segment-number=4",
        "after-merge-max-doc-count=15",
    )
    .unwrap();
    let infos = SegmentMergeInfoFactory::create_many(&[10, 10, 10]);

    let regular = strategy
        .create_merge_task(&infos, &LevelInfo::sequence())
        .unwrap();
    assert!(regular.is_empty());

    let forced = strategy
        .create_optimize_task(&infos, &LevelInfo::sequence())
        .unwrap();
    assert_eq!(forced.len(), 1);
    assert_eq!(forced.plans()[0].target_count, 2);
}
