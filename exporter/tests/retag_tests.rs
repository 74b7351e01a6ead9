use kbexport::{retag_feed, ExportError};
use kbexport_shape::Environment;
use kbexport_sink::read_feed;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::io::Read;
use std::path::Path;

fn shared_strings(workbook: &Path) -> String {
    let mut archive = zip::ZipArchive::new(fs::File::open(workbook).unwrap()).unwrap();
    let mut file = archive.by_name("xl/sharedStrings.xml").unwrap();
    let mut xml = String::new();
    file.read_to_string(&mut xml).unwrap();
    xml
}

#[test]
fn writes_one_feed_per_environment() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("default.ndjson");
    fs::write(
        &input,
        concat!(
            r#"{"id":"dv1","type":"index-pattern","attributes":{"title":"logs-*","name":"Logs"}}"#,
            "\n",
            r#"{"id":"r1","name":"Rule without attributes","index":["logs-*"]}"#,
            "\n",
        ),
    )
    .unwrap();
    let out = dir.path().join("retagged");

    let written = retag_feed(&input, &out, &Environment::ALL).unwrap();
    assert_eq!(written.len(), 4);

    for env in Environment::ALL {
        let path = out.join(env.as_str()).join("default.ndjson");
        let records = read_feed(&path).unwrap().records;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["attributes"]["title"], json!(format!("{env}:logs-*")));
        assert_eq!(records[0]["attributes"]["name"], "Logs");
        assert_eq!(records[1]["index"], json!(["logs-*"]));

        let workbook = out
            .join(env.as_str())
            .join("excel")
            .join(format!("modified_object_attributes_{env}.xlsx"));
        let strings = shared_strings(&workbook);
        assert!(strings.contains(&format!("{env}:logs-*")), "{env}: {strings}");
        assert!(strings.contains("dv1"));
    }
}

#[test]
fn embedded_json_attributes_are_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("objects.ndjson");
    let record = json!({
        "id": "s1",
        "attributes": {
            "kibanaSavedObjectMeta": {
                "searchSourceJSON": "{\"index\":\"metrics-*\",\"query\":{\"language\":\"kuery\"}}"
            }
        }
    });
    fs::write(&input, format!("{record}\n")).unwrap();

    retag_feed(&input, dir.path(), &[Environment::Live]).unwrap();

    let records = read_feed(&dir.path().join("live/objects.ndjson")).unwrap().records;
    let source = records[0]["attributes"]["kibanaSavedObjectMeta"]["searchSourceJSON"]
        .as_str()
        .unwrap();
    assert_eq!(source, r#"{"index":"live:metrics-*","query":{"language":"kuery"}}"#);
}

#[test]
fn malformed_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.ndjson");
    fs::write(&input, "{\"attributes\":{\"title\":\"a-*\"}}\n{not json\n").unwrap();

    retag_feed(&input, dir.path(), &[Environment::Dev]).unwrap();

    let text = fs::read_to_string(dir.path().join("dev/broken.ndjson")).unwrap();
    assert_eq!(text, "{\"attributes\":{\"title\":\"dev:a-*\"}}\n");
}

#[test]
fn missing_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("absent.ndjson");
    let err = retag_feed(&input, dir.path(), &[Environment::Sim]).unwrap_err();
    assert!(matches!(err, ExportError::Sink(_)));
}
