//! E2E tests for the stop path against a mocked Notion API.
//!
//! Uses a file-backed store in a temp dir and a local mockito server, so no
//! real credentials or network access are needed.

use chrono::DateTime;
use notion_timer_core::storage::{NotionConfig, STATE_FILE_NAME};
use notion_timer_core::{
    CoreError, Credentials, FileStateStore, NotionSubmitter, StateStore, SubmissionError,
    TimerEngine, TimerStatus,
};
use tempfile::TempDir;

fn credentials() -> Result<Credentials, notion_timer_core::ConfigError> {
    Ok(Credentials {
        token: "secret_test_token".into(),
        database_id: "db-123-456".into(),
    })
}

fn submitter_for(server: &mockito::Server) -> NotionSubmitter {
    NotionSubmitter::new(&NotionConfig {
        api_base: format!("{}/v1/", server.url()),
        timeout_secs: 5,
        ..NotionConfig::default()
    })
    .unwrap()
}

/// Test: a full start/stop cycle creates exactly one page with the expected body.
#[test]
fn test_stop_creates_page_and_clears_state() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1/pages")
        .match_header("authorization", "Bearer secret_test_token")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "parent": { "database_id": "db-123-456" },
            "properties": {
                "Task": { "title": [{ "text": { "content": "整理本周亮点" } }] },
                "Project": { "select": { "name": "写周报" } },
                "Start": { "date": { "start": "2024-05-06T09:00:00+08:00" } },
                "End": { "date": { "start": "2024-05-06T09:40:15+08:00" } },
                "Duration (minutes)": { "number": 40.25 }
            }
        })))
        .with_status(200)
        .with_body(r#"{"object":"page","id":"page-e2e"}"#)
        .expect(1)
        .create();

    let dir = TempDir::new().unwrap();
    let engine = TimerEngine::new(FileStateStore::new(dir.path().join(STATE_FILE_NAME)));
    engine
        .start_at(
            "写周报",
            "整理本周亮点",
            DateTime::parse_from_rfc3339("2024-05-06T09:00:00+08:00").unwrap(),
        )
        .unwrap();

    let outcome = engine
        .stop_at(
            &submitter_for(&server),
            credentials,
            DateTime::parse_from_rfc3339("2024-05-06T09:40:15+08:00").unwrap(),
        )
        .unwrap();

    mock.assert();
    assert_eq!(outcome.record_id.to_string(), "page-e2e");
    assert_eq!(outcome.interval.duration_minutes, 40.25);
    assert_eq!(engine.status().unwrap(), TimerStatus::Idle);
}

/// Test: a rejected write leaves the state file byte-for-byte intact.
#[test]
fn test_rejected_write_keeps_state_file() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/v1/pages")
        .with_status(404)
        .with_body(r#"{"object":"error","status":404,"code":"object_not_found","message":"Could not find database with ID: db-123-456."}"#)
        .create();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join(STATE_FILE_NAME);
    let engine = TimerEngine::new(FileStateStore::new(&path));
    let started = engine.start("p", "t").unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let err = engine.stop(&submitter_for(&server), credentials).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Submission(SubmissionError::SchemaMismatch { status: 404, .. })
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    assert_eq!(engine.store().read().unwrap(), Some(started));
}

/// Test: stopping while idle never reaches the server.
#[test]
fn test_stop_when_idle_sends_nothing() {
    let mut server = mockito::Server::new();
    let mock = server.mock("POST", "/v1/pages").expect(0).create();

    let dir = TempDir::new().unwrap();
    let engine = TimerEngine::new(FileStateStore::new(dir.path().join(STATE_FILE_NAME)));

    let err = engine.stop(&submitter_for(&server), credentials).unwrap_err();
    assert!(matches!(err, CoreError::NotRunning));
    mock.assert();
}
