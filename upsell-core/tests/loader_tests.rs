use serde_json::json;
use std::io::Write;
use upsell_core::{UpsellError, load_events, parse_events};

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_bare_array_file() {
    let file = write_temp(r#"[{"event": "$pageview", "distinct_id": "u1"}, {"event": "upgrade_clicked"}]"#);
    let batch = load_events(file.path()).unwrap();

    assert_eq!(batch.len(), 2);
    assert_eq!(batch.as_slice()[0].distinct_id(), Some("u1"));
    assert_eq!(batch.as_slice()[1].event_name(), Some("upgrade_clicked"));
}

#[test]
fn test_posthog_results_shape() {
    let items = json!([{"id": 1}, {"id": 2}, {"id": 3}]);
    let doc = json!({"next": null, "results": items.clone()});
    let file = write_temp(&doc.to_string());

    let batch = load_events(file.path()).unwrap();
    assert_eq!(serde_json::to_value(&batch).unwrap(), items);
}

#[test]
fn test_events_key_shape() {
    let items = json!([{"event": "a"}, {"event": "a"}]);
    let batch = parse_events(json!({"events": items.clone()}).to_string().as_bytes()).unwrap();
    assert_eq!(serde_json::to_value(&batch).unwrap(), items);
}

#[test]
fn test_empty_array() {
    let batch = parse_events(b"[]").unwrap();
    assert!(batch.is_empty());
}

#[test]
fn test_unsupported_shapes() {
    for doc in ["42", r#""events""#, "null", "true", r#"{"data": []}"#, "{}"] {
        let err = parse_events(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, UpsellError::UnsupportedFormat), "{doc} gave {err:?}");
    }
}

#[test]
fn test_malformed_json() {
    for doc in ["", "[", r#"{"results": [}"#, "not json"] {
        let err = parse_events(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, UpsellError::MalformedInput(_)), "{doc:?} gave {err:?}");
    }
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_events(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, UpsellError::NotFound(_)));
}
