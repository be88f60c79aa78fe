use super::model::load_settings_from;
use indoc::indoc;
use tempfile::tempdir;

#[test]
fn loads_settings_from_toml_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("segmerge.toml");
    std::fs::write(
        &path,
        indoc! {r#"
            [logging]
            log_dir = "logs"
            stdout_level = "info"
            file_level = "debug"

            [index]
            dir = "data/index"

            [merge]
            strategy = "balance_tree"
            strategy_param = "base-doc-count=1024;conflict-segment-number=3"
            max_doc_id = 1000000

            [gc]
            keep_version_count = 3
            reserved_versions = [1, 4]

            [schema]
            attributes = ["price"]
        "#},
    )
    .unwrap();

    let settings = load_settings_from(path.to_str().unwrap()).unwrap();
    assert_eq!(settings.logging.stdout_level, "info");
    assert_eq!(settings.index.dir, "data/index");
    assert_eq!(settings.merge.strategy, "balance_tree");
    assert_eq!(settings.merge.max_doc_id, 1_000_000);
    assert!(settings.merge.optimize_param.is_empty());
    assert_eq!(settings.gc.keep_version_count, 3);
    assert_eq!(settings.gc.reserved_versions, vec![1, 4]);
    assert!(settings.schema.attributes.contains("price"));
}

#[test]
fn gc_section_is_optional() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("segmerge.toml");
    std::fs::write(
        &path,
        indoc! {r#"
            [logging]
            log_dir = "logs"
            stdout_level = "warn"
            file_level = "info"

            [index]
            dir = "idx"

            [merge]
            strategy = "optimize"
        "#},
    )
    .unwrap();

    let settings = load_settings_from(path.to_str().unwrap()).unwrap();
    assert_eq!(settings.gc.keep_version_count, 2);
    assert!(settings.gc.reserved_versions.is_empty());
    assert_eq!(settings.merge.max_doc_id, i32::MAX as u64);
    assert!(settings.schema.indexes.is_empty());
}

#[test]
fn rejects_invalid_merge_section() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("segmerge.toml");
    std::fs::write(
        &path,
        indoc! {r#"
            [logging]
            log_dir = "logs"
            stdout_level = "info"
            file_level = "info"

            [index]
            dir = "idx"

            [merge]
            strategy = "no_such"
        "#},
    )
    .unwrap();

    let err = load_settings_from(path.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("no_such"), "{err}");
}
