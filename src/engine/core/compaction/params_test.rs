use crate::engine::core::compaction::params::StrategyParams;
use crate::engine::errors::MergeError;

#[test]
fn parses_typed_values_and_defaults() {
    let mut params = StrategyParams::parse("test", " a=1 ; flag=true;big=5000000000;").unwrap();
    assert_eq!(params.take_u32("a", 9).unwrap(), 1);
    assert_eq!(params.take_u32("missing", 9).unwrap(), 9);
    assert!(params.take_bool("flag", false).unwrap());
    assert_eq!(params.take_u64("big", 0).unwrap(), 5_000_000_000);
    params.finish().unwrap();
}

#[test]
fn rejects_malformed_entries() {
    for raw in ["a", "=1", "a=1;a=2"] {
        let err = StrategyParams::parse("test", raw).unwrap_err();
        assert!(matches!(err, MergeError::Config(_)), "{raw}");
    }
}

#[test]
fn rejects_bad_values_and_leftover_keys() {
    let mut params = StrategyParams::parse("test", "a=-1;b=2").unwrap();
    assert!(matches!(params.take_u32("a", 0), Err(MergeError::Config(_))));
    let err = params.finish().unwrap_err();
    assert!(err.to_string().contains('b'));
}
