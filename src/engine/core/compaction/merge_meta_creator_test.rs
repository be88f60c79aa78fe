use crate::engine::core::compaction::encoder::EncoderRegistry;
use crate::engine::core::compaction::merge_config::MergeConfig;
use crate::engine::core::compaction::merge_meta::MergeMeta;
use crate::engine::core::compaction::merge_meta_creator::MergeMetaCreator;
use crate::engine::core::compaction::merge_plan::PlanReason;
use crate::engine::core::compaction::truncate::{InMemorySchema, TruncateProfile};
use crate::engine::core::segment::{LevelInfo, SegmentId};
use crate::engine::core::version::Version;
use crate::engine::errors::MergeError;
use crate::test_helpers::factories::IndexFixture;
use crate::test_helpers::factory::Factory;
use serde_json::json;

fn four_segments() -> IndexFixture {
    Factory::index_fixture()
        .with_segment(0, 10)
        .with_segment(1, 10)
        .with_segment(2, 10)
        .with_segment(3, 10)
        .with_deletions(1, 0, &[0, 1])
        .with_version(0, &[0, 1, 2, 3])
        .create()
}

fn ids(ids: impl Iterator<Item = SegmentId>) -> Vec<u32> {
    ids.map(|s| s.get()).collect()
}

#[test]
fn binds_targets_and_reclaim_map() {
    let fixture = four_segments();
    let config = MergeConfig::for_strategy("balance_tree", "base-doc-count=10;conflict-segment-number=4");
    let encoders = EncoderRegistry::new();
    let creator = MergeMetaCreator::new(fixture.store(), &config, None, &encoders).unwrap();
    let version = Version::load(fixture.store(), 0).unwrap();

    let meta = creator.create(&version, false).unwrap();
    assert_eq!(meta.target_version_id, 1);
    assert_eq!(meta.plans.len(), 1);

    let bound = &meta.plans[0];
    assert_eq!(ids(bound.plan.source_ids()), vec![0, 1, 2, 3]);
    assert_eq!(ids(bound.target_segments.iter().copied()), vec![4]);
    assert_eq!(bound.target_dirs, vec!["segment_4".to_string()]);
    assert_eq!(bound.reclaim_map.live_doc_count(), 38);
    assert_eq!(bound.target_infos[0].doc_count, 38);
    assert!(bound.target_infos[0].merged);
}

#[test]
fn target_ids_skip_orphan_directories() {
    let fixture = Factory::index_fixture()
        .with_segment(0, 10)
        .with_segment(1, 10)
        .with_segment(9, 1)
        .with_version(0, &[0, 1])
        .create();
    let config = MergeConfig::for_strategy("specific_segments", "merge_segments=0,1");
    let encoders = EncoderRegistry::new();
    let creator = MergeMetaCreator::new(fixture.store(), &config, None, &encoders).unwrap();

    let meta = creator
        .create(&Version::load(fixture.store(), 0).unwrap(), false)
        .unwrap();
    assert_eq!(ids(meta.target_segments().into_iter()), vec![10]);
}

#[test]
fn doc_id_limit_counts_all_docs_of_unmerged_segments() {
    let fixture = four_segments();
    let version = Version::load(fixture.store(), 0).unwrap();
    let encoders = EncoderRegistry::new();

    let mut config = MergeConfig::for_strategy("balance_tree", "base-doc-count=10;conflict-segment-number=5");
    config.max_doc_id = 40;
    let creator = MergeMetaCreator::new(fixture.store(), &config, None, &encoders).unwrap();
    assert!(creator.create(&version, false).unwrap().is_empty());

    config.max_doc_id = 39;
    let creator = MergeMetaCreator::new(fixture.store(), &config, None, &encoders).unwrap();
    match creator.create(&version, false).unwrap_err() {
        MergeError::DocIdOverflow { projected, limit } => {
            assert_eq!(projected, 40);
            assert_eq!(limit, 39);
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn doc_id_limit_counts_live_docs_of_merged_segments() {
    let fixture = four_segments();
    let version = Version::load(fixture.store(), 0).unwrap();
    let encoders = EncoderRegistry::new();

    let mut config = MergeConfig::for_strategy("balance_tree", "base-doc-count=10;conflict-segment-number=4");
    config.max_doc_id = 38;
    let creator = MergeMetaCreator::new(fixture.store(), &config, None, &encoders).unwrap();
    assert_eq!(creator.create(&version, false).unwrap().plans.len(), 1);

    config.max_doc_id = 37;
    let creator = MergeMetaCreator::new(fixture.store(), &config, None, &encoders).unwrap();
    assert!(matches!(
        creator.create(&version, false),
        Err(MergeError::DocIdOverflow { projected: 38, limit: 37 })
    ));
}

#[test]
fn segments_missing_truncate_profiles_are_rebuilt_alone() {
    let with_profile = || {
        Factory::segment_info()
            .with("doc_count", 10)
            .with("truncate_profiles", json!(["by_price"]))
            .create()
    };
    let fixture = Factory::index_fixture()
        .with_segment(0, 10)
        .with_segment(1, 10)
        .with_segment_info(2, with_profile())
        .with_segment_info(3, with_profile())
        .with_version(0, &[0, 1, 2, 3])
        .create();

    let mut config = MergeConfig::for_strategy("balance_tree", "base-doc-count=10");
    config.truncate_profiles = vec![TruncateProfile::new("by_price", "price")];
    let schema = InMemorySchema::new().with_attribute("price");
    let encoders = EncoderRegistry::new();
    let creator = MergeMetaCreator::new(fixture.store(), &config, Some(&schema), &encoders).unwrap();

    let meta = creator
        .create(&Version::load(fixture.store(), 0).unwrap(), false)
        .unwrap();
    let plans: Vec<(Vec<u32>, PlanReason)> = meta
        .task
        .plans()
        .iter()
        .map(|p| (ids(p.source_ids()), p.reason))
        .collect();
    assert_eq!(
        plans,
        vec![
            (vec![2, 3], PlanReason::Tiered),
            (vec![0], PlanReason::TruncateRebuild),
            (vec![1], PlanReason::TruncateRebuild),
        ]
    );
    assert!(
        meta.plans
            .iter()
            .all(|p| p.target_infos[0].truncate_profiles.contains("by_price"))
    );
}

#[test]
fn rejects_unresolvable_setup() {
    let fixture = four_segments();
    let encoders = EncoderRegistry::new();

    let mut config = MergeConfig::for_strategy("balance_tree", "");
    config.truncate_profiles = vec![TruncateProfile::new("by_rating", "rating")];
    let schema = InMemorySchema::new().with_attribute("price");
    assert!(matches!(
        MergeMetaCreator::new(fixture.store(), &config, Some(&schema), &encoders),
        Err(MergeError::UnresolvedTruncateProfile { .. })
    ));
    assert!(matches!(
        MergeMetaCreator::new(fixture.store(), &config, None, &encoders),
        Err(MergeError::Config(_))
    ));

    let mut config = MergeConfig::for_strategy("balance_tree", "");
    config.encoders = vec!["attribute".into()];
    assert!(matches!(
        MergeMetaCreator::new(fixture.store(), &config, None, &encoders),
        Err(MergeError::Config(_))
    ));

    let mut config = MergeConfig::for_strategy("balance_tree", "");
    config.max_doc_id = u64::from(u32::MAX) + 1;
    assert!(matches!(
        MergeMetaCreator::new(fixture.store(), &config, None, &encoders),
        Err(MergeError::Config(_))
    ));
}

#[test]
fn binds_registered_encoders() {
    let fixture = four_segments();
    let mut config = MergeConfig::for_strategy("balance_tree", "base-doc-count=10;conflict-segment-number=4");
    config.encoders = vec!["attribute".into()];
    let encoders = EncoderRegistry::with_pass_through(["attribute"]).unwrap();
    let creator = MergeMetaCreator::new(fixture.store(), &config, None, &encoders).unwrap();

    let meta = creator
        .create(&Version::load(fixture.store(), 0).unwrap(), false)
        .unwrap();
    let resource = &meta.plans[0].encoders[0];
    assert_eq!(resource.encoder, "attribute");
    assert_eq!(resource.params.get("sources").map(String::as_str), Some("4"));
}

#[test]
fn rejects_missing_segments_and_other_topologies() {
    let fixture = four_segments();
    let config = MergeConfig::for_strategy("optimize", "");
    let encoders = EncoderRegistry::new();
    let creator = MergeMetaCreator::new(fixture.store(), &config, None, &encoders).unwrap();

    let missing = Version::with_segments(1, [0, 1, 5].map(SegmentId::new));
    assert!(matches!(
        creator.create(&missing, false),
        Err(MergeError::SegmentMissing(5))
    ));

    let mut hashed = Version::load(fixture.store(), 0).unwrap();
    hashed.level_info = LevelInfo::hash_mod(2, 1);
    assert!(matches!(
        creator.create(&hashed, true),
        Err(MergeError::UnsupportedTopology(_))
    ));
}

#[test]
fn optimize_merges_everything_and_meta_round_trips() {
    let fixture = four_segments();
    let config = MergeConfig::for_strategy("balance_tree", "base-doc-count=1000;conflict-segment-number=8");
    let encoders = EncoderRegistry::new();
    let creator = MergeMetaCreator::new(fixture.store(), &config, None, &encoders).unwrap();
    let version = Version::load(fixture.store(), 0).unwrap();

    assert!(creator.create(&version, false).unwrap().is_empty());
    let meta = creator.create(&version, true).unwrap();
    assert_eq!(ids(meta.plans[0].plan.source_ids()), vec![0, 1, 2, 3]);
    assert_eq!(meta.plans[0].plan.reason, PlanReason::Optimize);

    meta.store(fixture.store()).unwrap();
    assert_eq!(MergeMeta::load(fixture.store(), 0).unwrap(), meta);
}
