use fxp_protocol::*;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_file_config_from_toml() {
    let toml_str = r#"
steps = ["setup", "5"]
dry_run = true
project_root = "/srv/fxjefe"
symbol = "GBPUSD"
confidence_threshold = 0.65
account_equity = 25000.0
unknown_key = "ignored"
"#;

    let config: FileConfig = toml::from_str(toml_str).expect("Failed to deserialize FileConfig");

    assert_eq!(
        config.steps,
        Some(vec![StageSelector::from("setup"), StageSelector::from("5")])
    );
    assert_eq!(config.dry_run, Some(true));
    assert_eq!(config.project_root, Some(PathBuf::from("/srv/fxjefe")));
    assert_eq!(config.symbol.as_deref(), Some("GBPUSD"));
    assert_eq!(config.confidence_threshold, Some(0.65));
    assert_eq!(config.account_equity, Some(25000.0));
    assert_eq!(config.timeframe, None);
}

#[test]
fn test_file_config_from_yaml() {
    let yaml_str = r#"
steps:
  - evaluation
  - risk_sizing
max_risk_pct: 2.0
lookup_dirs:
  - vendor/stages
"#;

    let config: FileConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize FileConfig");

    assert_eq!(config.steps.as_ref().map(Vec::len), Some(2));
    assert_eq!(config.max_risk_pct, Some(2.0));
    assert_eq!(config.lookup_dirs, Some(vec![PathBuf::from("vendor/stages")]));
}

#[test]
fn test_file_config_accepts_bare_indices() {
    let config: FileConfig =
        serde_json::from_str(r#"{"steps": [1, "model_predictions", 7]}"#)
            .expect("Failed to deserialize FileConfig");

    let steps = config.steps.expect("steps are present");
    assert_eq!(
        steps,
        vec![
            StageSelector::Index(1),
            StageSelector::from("model_predictions"),
            StageSelector::Index(7),
        ]
    );
    let rendered: Vec<String> = steps.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["1", "model_predictions", "7"]);

    let yaml: FileConfig =
        serde_yaml::from_str("steps:\n  - 2\n  - setup\n").expect("Failed to deserialize FileConfig");
    assert_eq!(
        yaml.steps,
        Some(vec![StageSelector::Index(2), StageSelector::from("setup")])
    );
}

#[test]
fn test_file_config_empty_json() {
    let config: FileConfig = serde_json::from_str("{}").expect("Failed to deserialize FileConfig");
    assert_eq!(config, FileConfig::default());
}

#[test]
fn test_stage_status_serialization() {
    let status = StageStatus::Skipped;
    let json = serde_json::to_value(status).expect("Failed to serialize StageStatus");

    assert_eq!(json, "SKIPPED");

    let deserialized: StageStatus = serde_json::from_value(json).expect("Failed to deserialize StageStatus");
    assert_eq!(deserialized, StageStatus::Skipped);
}

#[test]
fn test_stage_name_serialization() {
    let json = serde_json::to_value(StageName::ModelPredictions).expect("Failed to serialize StageName");
    assert_eq!(json, "model_predictions");

    let deserialized: StageName = serde_json::from_str("\"process_trades\"").expect("Failed to deserialize StageName");
    assert_eq!(deserialized, StageName::ProcessTrades);
}

#[test]
fn test_stage_result_serialization() {
    let result = StageResult {
        name: StageName::Evaluation,
        status: StageStatus::Failed,
        elapsed: Duration::from_millis(1500),
        error: Some("division by zero".to_string()),
        provider: Some("evaluation_framework".to_string()),
        note: None,
        output: None,
    };

    let json = serde_json::to_string(&result).expect("Failed to serialize StageResult");
    let deserialized: StageResult = serde_json::from_str(&json).expect("Failed to deserialize StageResult");

    assert_eq!(deserialized, result);
}

#[test]
fn test_signal_serialization() {
    let record = SignalRecord {
        row: 3,
        signal: Signal::Buy,
        confidence: 0.7,
        probabilities: [0.1, 0.2, 0.7],
    };

    let json = serde_json::to_value(&record).expect("Failed to serialize SignalRecord");
    assert_eq!(json["signal"], "BUY");
    assert_eq!(json["row"], 3);

    assert_eq!(
        serde_json::to_value(InferenceMode::Degraded).expect("Failed to serialize InferenceMode"),
        "degraded"
    );
}
