use rl::{AgentConfig, ConfigError};

#[test]
fn defaults_are_valid() {
    let config = AgentConfig::default();
    config.validate().unwrap();
    assert_eq!(config.bucket_counts, [3, 3, 6, 3]);
    assert_eq!(config.actions, vec![-1.0, 0.0, 1.0]);
    assert_eq!(config.max_step, 250);
    assert_eq!(config.streak_to_end, 120);
}

#[test]
fn partial_json_fills_in_defaults() {
    let config = AgentConfig::from_json_str(
        r#"{
            "max_step": 40,
            "actions": [-0.5, 0.5],
            "schedule": { "min_explore_rate": 0.05 },
            "reward": { "failure": -1.0 }
        }"#,
    )
    .unwrap();
    assert_eq!(config.max_step, 40);
    assert_eq!(config.actions, vec![-0.5, 0.5]);
    assert!((config.schedule.min_explore_rate - 0.05).abs() < f64::EPSILON);
    assert!((config.schedule.max_learning_rate - 0.5).abs() < f64::EPSILON);
    assert!((config.reward.failure + 1.0).abs() < f64::EPSILON);
    assert!((config.reward.survive - 1.0).abs() < f64::EPSILON);
    assert_eq!(config.bucket_counts, [3, 3, 6, 3]);
}

#[test]
fn json_round_trips_through_serde() {
    let config = AgentConfig::default();
    let encoded = serde_json::to_string(&config).unwrap();
    assert_eq!(AgentConfig::from_json_str(&encoded).unwrap(), config);
}

#[test]
fn invalid_values_fail_fast() {
    let cases: [(&str, fn(&ConfigError) -> bool); 6] = [
        (r#"{"bucket_counts": [3, 0, 6, 3]}"#, |e| {
            matches!(e, ConfigError::ZeroBuckets { dim: 1 })
        }),
        (
            r#"{"bounds": [{"lower": 1, "upper": -1}, {"lower": -1, "upper": 1},
                           {"lower": -1, "upper": 1}, {"lower": -1, "upper": 1}]}"#,
            |e| matches!(e, ConfigError::InvalidBound { dim: 0, .. }),
        ),
        (r#"{"actions": []}"#, |e| matches!(e, ConfigError::EmptyActions)),
        (r#"{"discount": 1.5}"#, |e| matches!(e, ConfigError::InvalidDiscount(_))),
        (r#"{"max_step": 0}"#, |e| {
            matches!(e, ConfigError::ZeroLimit { name: "max_step" })
        }),
        (r#"{"limits": {"pole_angle": -0.1}}"#, |e| {
            matches!(e, ConfigError::InvalidSafetyLimit { name: "pole_angle", .. })
        }),
    ];
    for (raw, check) in cases {
        let err = AgentConfig::from_json_str(raw).unwrap_err();
        assert!(check(&err), "{raw} gave {err}");
    }
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(
        AgentConfig::from_json_str("{ max_step: "),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AgentConfig::from_json_file(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn oversized_table_is_rejected() {
    let err = AgentConfig::from_json_str(r#"{"bucket_counts":[65536,65536,65536,65536]}"#)
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::TableTooLarge {
            bucket_counts: [65536, 65536, 65536, 65536],
            actions: 3,
            ..
        }
    ));

    let err = AgentConfig::from_json_str(r#"{"bucket_counts":[256,256,256,1]}"#).unwrap_err();
    assert!(matches!(err, ConfigError::TableTooLarge { .. }), "{err}");
}

#[test]
fn table_size_limit_is_inclusive() {
    assert_eq!(rl::cell_count([3, 3, 6, 3], 3), Some(486));
    assert_eq!(rl::cell_count([1 << 12, 1 << 12, 1, 1], 1), Some(rl::MAX_CELLS));
    assert_eq!(rl::cell_count([1 << 12, 1 << 12, 1, 1], 2), None);
    assert_eq!(rl::cell_count([usize::MAX, 2, 1, 1], 1), None);
}
