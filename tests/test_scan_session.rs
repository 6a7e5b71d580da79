//! Integration tests for the scan session state machine
//!
//! These tests drive a ScanSession against scripted recognition clients and
//! check the published statuses, the trigger gate and the rendered rows.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::fixtures::png_image;
use common::mock_client::{GatedClient, ScriptedClient, json_response};
use common::recording_sink::RecordingSink;
use photo_scan::state::{LIVE_BADGE, SCANNING_MESSAGE, WAITING_MESSAGE};
use photo_scan::{
    DisplayRow, EndpointResponse, Placeholder, ScanConfig, ScanError, ScanSession, ScanStatus,
};

const CAT_BODY: &str =
    r#"{"ok":true,"items":[{"name":"Felis catus","name_ja":"ネコ","confidence":0.92}]}"#;

fn session_with(client: ScriptedClient) -> (ScanSession<ScriptedClient, RecordingSink>, RecordingSink) {
    let sink = RecordingSink::new();
    let session = ScanSession::new(&ScanConfig::default(), client, sink.clone());
    (session, sink)
}

fn assert_trigger_gate(sink: &RecordingSink) {
    for view in sink.statuses() {
        assert_eq!(
            view.trigger_enabled,
            view.status != ScanStatus::Scanning,
            "trigger wrong in {:?}",
            view
        );
    }
}

#[tokio::test]
async fn test_initial_state_is_idle_with_not_scanned_placeholder() {
    let (session, sink) = session_with(ScriptedClient::new());

    assert_eq!(session.status(), ScanStatus::Idle);
    assert_eq!(sink.last_status().message, WAITING_MESSAGE);
    assert_eq!(
        sink.last_rows(),
        vec![DisplayRow::Placeholder(Placeholder::NotScanned)]
    );
}

#[tokio::test]
async fn test_successful_scan_walks_idle_scanning_success() {
    let client = ScriptedClient::new().respond(json_response(200, CAT_BODY));
    let (session, sink) = session_with(client);

    session.select(Some(png_image("cat.png", 64, 48))).unwrap();
    assert_eq!(sink.last_status().message, "Ready to scan cat.png");

    let status = session.scan().await.unwrap();
    assert_eq!(status, ScanStatus::Success);
    assert_eq!(
        sink.history(),
        vec![ScanStatus::Idle, ScanStatus::Scanning, ScanStatus::Success]
    );

    let scanning = sink
        .statuses()
        .into_iter()
        .find(|view| view.status == ScanStatus::Scanning)
        .unwrap();
    assert_eq!(scanning.message, SCANNING_MESSAGE);

    let done = sink.last_status();
    assert_eq!(done.message, "Found 1 item");
    assert_eq!(done.badge.as_deref(), Some(LIVE_BADGE));
    assert!(done.error.is_none());
    assert!(done.trigger_enabled);

    match sink.last_rows().as_slice() {
        [DisplayRow::Item(row)] => {
            assert_eq!(row.primary, "ネコ");
            assert_eq!(row.secondary.as_deref(), Some("Felis catus"));
            assert_eq!(row.confidence, "92%");
        }
        other => panic!("unexpected rows {:?}", other),
    }

    let uploads = session.client().uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].name, "cat.png");
    assert_trigger_gate(&sink);
}

#[tokio::test]
async fn test_scan_image_selects_then_scans() {
    let client = ScriptedClient::new().respond(json_response(200, CAT_BODY));
    let (session, sink) = session_with(client);

    let status = session.scan_image(png_image("cat.png", 8, 8)).await.unwrap();

    assert_eq!(status, ScanStatus::Success);
    assert_eq!(session.selected_name().as_deref(), Some("cat.png"));
    assert_eq!(sink.selections(), vec![Some("cat.png".to_string())]);
    assert_eq!(
        sink.history(),
        vec![ScanStatus::Idle, ScanStatus::Scanning, ScanStatus::Success]
    );
}

#[tokio::test]
async fn test_redirect_surfaces_login_required() {
    let redirect = EndpointResponse::new(302, Vec::new()).with_location("/login");
    let (session, sink) = session_with(ScriptedClient::new().respond(redirect));

    session.select(Some(png_image("cat.png", 32, 32))).unwrap();
    let status = session.scan().await.unwrap();

    assert_eq!(status, ScanStatus::Error);
    let view = sink.last_status();
    assert_eq!(view.message, "Login required");
    assert_eq!(
        view.error.as_deref(),
        Some("Login required. Sign in and try again.")
    );
    assert!(view.badge.is_none());
    assert!(view.trigger_enabled);
    assert_eq!(
        sink.last_rows(),
        vec![DisplayRow::Placeholder(Placeholder::Failed)]
    );
}

#[tokio::test]
async fn test_trigger_disabled_only_while_scanning() {
    let client = ScriptedClient::new()
        .respond(json_response(200, CAT_BODY))
        .respond(json_response(200, r#"{"ok":false,"error":"Model offline"}"#))
        .respond(json_response(200, "<html>not json</html>"))
        .fail(ScanError::network("recognize"))
        .respond(json_response(500, "Internal Server Error"));
    let (session, sink) = session_with(client);
    session.select(Some(png_image("cat.png", 16, 16))).unwrap();

    let mut outcomes = Vec::new();
    for _ in 0..5 {
        let status = session.scan().await.unwrap();
        outcomes.push((status, sink.last_status().error));
    }

    assert_eq!(outcomes[0], (ScanStatus::Success, None));
    assert_eq!(
        outcomes[1],
        (ScanStatus::Error, Some("Model offline".to_string()))
    );
    assert_eq!(
        outcomes[2],
        (
            ScanStatus::Error,
            Some("Could not parse the server response.".to_string())
        )
    );
    assert_eq!(
        outcomes[3],
        (
            ScanStatus::Error,
            Some("Communication error. Check the connection and try again.".to_string())
        )
    );
    assert_eq!(
        outcomes[4],
        (ScanStatus::Error, Some("Recognition failed.".to_string()))
    );

    assert_trigger_gate(&sink);
    assert!(sink.last_status().trigger_enabled);
}

#[tokio::test]
async fn test_empty_result_shows_no_detections() {
    let client = ScriptedClient::new().respond(json_response(200, r#"{"ok":true,"items":[]}"#));
    let (session, sink) = session_with(client);

    session.select(Some(png_image("empty.png", 8, 8))).unwrap();
    assert_eq!(session.scan().await.unwrap(), ScanStatus::Success);

    assert_eq!(sink.last_status().message, "Found 0 items");
    assert_eq!(
        sink.last_rows(),
        vec![DisplayRow::Placeholder(Placeholder::NoDetections)]
    );
}

#[tokio::test]
async fn test_scan_without_selection_prompts_and_stays_idle() {
    let (session, sink) = session_with(ScriptedClient::new());

    let status = session.scan().await.unwrap();

    assert_eq!(status, ScanStatus::Idle);
    assert_eq!(sink.last_status().message, "Please select an image.");
    assert!(sink.last_status().trigger_enabled);
    assert!(session.client().uploads().is_empty());
    assert!(!sink.history().contains(&ScanStatus::Scanning));
}

#[tokio::test]
async fn test_new_selection_resets_results() {
    let client = ScriptedClient::new().respond(json_response(200, CAT_BODY));
    let (session, sink) = session_with(client);

    session.select(Some(png_image("cat.png", 8, 8))).unwrap();
    session.scan().await.unwrap();
    assert!(matches!(sink.last_rows()[0], DisplayRow::Item(_)));

    session.select(Some(png_image("dog.png", 8, 8))).unwrap();
    assert_eq!(session.status(), ScanStatus::Idle);
    assert_eq!(session.selected_name().as_deref(), Some("dog.png"));
    assert!(sink.last_status().badge.is_none());
    assert_eq!(
        sink.last_rows(),
        vec![DisplayRow::Placeholder(Placeholder::NotScanned)]
    );

    session.select(None).unwrap();
    assert_eq!(session.selected_name(), None);
    assert_eq!(sink.last_status().message, WAITING_MESSAGE);
    assert_eq!(
        sink.selections(),
        vec![
            Some("cat.png".to_string()),
            Some("dog.png".to_string()),
            None
        ]
    );
}

#[tokio::test]
async fn test_concurrent_scan_and_selection_are_rejected() {
    let client = GatedClient::new(json_response(200, CAT_BODY));
    let entered = client.entered.clone();
    let release = client.release.clone();
    let sink = RecordingSink::new();
    let session = Arc::new(ScanSession::new(&ScanConfig::default(), client, sink.clone()));

    session.select(Some(png_image("cat.png", 8, 8))).unwrap();
    let running = tokio::spawn({
        let session = session.clone();
        async move { session.scan().await }
    });

    entered.notified().await;
    assert_eq!(session.status(), ScanStatus::Scanning);
    assert!(!session.view().trigger_enabled);

    let err = session.scan().await.unwrap_err();
    assert_eq!(err.category(), "busy");
    let err = session.select(Some(png_image("dog.png", 8, 8))).unwrap_err();
    assert_eq!(err.category(), "busy");
    assert_eq!(session.selected_name().as_deref(), Some("cat.png"));
    assert_eq!(session.status(), ScanStatus::Scanning);

    release.notify_one();
    let status = running.await.unwrap().unwrap();
    assert_eq!(status, ScanStatus::Success);
    assert_eq!(
        sink.history(),
        vec![ScanStatus::Idle, ScanStatus::Scanning, ScanStatus::Success]
    );
}

#[tokio::test]
async fn test_abandoned_scan_still_reenables_trigger() {
    let client = GatedClient::new(json_response(200, CAT_BODY));
    let sink = RecordingSink::new();
    let session = ScanSession::new(&ScanConfig::default(), client, sink.clone());
    session.select(Some(png_image("cat.png", 8, 8))).unwrap();

    let result = tokio::time::timeout(Duration::from_millis(200), session.scan()).await;
    assert!(result.is_err(), "gated scan should not finish");

    let view = session.view();
    assert_eq!(view.status, ScanStatus::Error);
    assert!(view.trigger_enabled);
    assert_eq!(view.message, "Communication error");
    assert_eq!(
        session.rows(),
        vec![DisplayRow::Placeholder(Placeholder::Failed)]
    );
}
