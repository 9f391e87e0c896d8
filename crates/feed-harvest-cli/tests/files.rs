//! Config, target and record files on disk.

use std::io::Write;

use serde_json::Value;

use feed_harvest::{Action, HarvestConfig, PostRecord, PostType, RecordSink, Target};
use feed_harvest_cli::config::{collect_targets, load_harvest_config};
use feed_harvest_cli::sink::{write_card_dump, JsonFileSink};

fn record(handle: &str) -> PostRecord {
    PostRecord {
        post_url: Some("https://www.linkedin.com/feed/update/urn:li:activity:7130316800000012345/".into()),
        shared_job_url: None,
        img_url: None,
        post_content: Some("Shipping day.".into()),
        post_type: PostType::Video,
        like_count: Some(1024),
        comment_count: Some(37),
        repost_count: Some(5),
        view_count: None,
        post_date: Some("2w".into()),
        action: Action::Post,
        author: Some("Jane Doe".into()),
        author_url: Some(format!("https://www.linkedin.com/in/{handle}")),
        profile_url: format!("https://www.linkedin.com/in/{handle}"),
        post_timestamp: Some("2023-11-14T22:13:20.000Z".into()),
        video_url: Some("https://dms.licdn.com/playlist/v.mp4".into()),
        shared_post_url: None,
    }
}

#[test]
fn test_json_sink_writes_camel_case_array() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let mut sink = JsonFileSink::new(&out);
    let target = Target::new("jdoe").unwrap();

    sink.accept(&target, &[record("jdoe")]).unwrap();

    let path = out.join("jdoe.json");
    assert_eq!(sink.written(), &[(path.clone(), 1)]);
    let json: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let first = &json.as_array().unwrap()[0];
    assert_eq!(first["type"], "video");
    assert_eq!(first["likeCount"], 1024);
    assert_eq!(first["postTimestamp"], "2023-11-14T22:13:20.000Z");
    assert!(first["viewCount"].is_null());
    assert!(first["sharedPostUrl"].is_null());
    assert_eq!(first["profileUrl"], "https://www.linkedin.com/in/jdoe");
}

#[test]
fn test_json_sink_empty_target_writes_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = JsonFileSink::new(dir.path());
    let target = Target::new("quiet").unwrap();

    sink.accept(&target, &[]).unwrap();

    let text = std::fs::read_to_string(dir.path().join("quiet.json")).unwrap();
    assert_eq!(text.trim(), "[]");
}

#[test]
fn test_config_file_overrides_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"settle_ms": 250, "scroll": {{"max_idle_rounds": 3, "pause_ms": 800}}}}"#
    )
    .unwrap();

    let config = load_harvest_config(Some(file.path())).unwrap();
    assert_eq!(config.settle_ms, 250);
    assert_eq!(config.scroll.max_idle_rounds, 3);
    assert_eq!(config.scroll.pause_ms, 800);
    assert_eq!(config.scroll.max_rounds, HarvestConfig::default().scroll.max_rounds);
}

#[test]
fn test_bad_config_files_are_fatal() {
    let mut malformed = tempfile::NamedTempFile::new().unwrap();
    write!(malformed, "{{ not json").unwrap();
    assert!(load_harvest_config(Some(malformed.path())).is_err());

    let mut degenerate = tempfile::NamedTempFile::new().unwrap();
    write!(degenerate, r#"{{"scroll": {{"max_rounds": 0}}}}"#).unwrap();
    assert!(load_harvest_config(Some(degenerate.path())).is_err());

    let dir = tempfile::tempdir().unwrap();
    assert!(load_harvest_config(Some(dir.path().join("missing.json").as_path())).is_err());
}

#[test]
fn test_targets_file_merged_after_arguments() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# weekly batch").unwrap();
    writeln!(file, "sam-someone").unwrap();
    writeln!(file, "jdoe   # already on the command line").unwrap();

    let targets = collect_targets(&["jdoe".into()], Some(file.path()), Some("ann")).unwrap();
    let handles: Vec<_> = targets.iter().map(|t| t.handle()).collect();
    assert_eq!(handles, vec!["jdoe", "sam-someone", "ann"]);
}

#[test]
fn test_card_dump_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = Target::new("jdoe").unwrap();
    let path = write_card_dump(dir.path(), &target, &["<div>one</div>".into()]).unwrap();

    assert_eq!(path, dir.path().join("jdoe.cards.html"));
    let text = std::fs::read_to_string(path).unwrap();
    assert!(text.contains("<!-- CARD 1 -->\n<div>one</div>"));
}
