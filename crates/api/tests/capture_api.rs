//! Integration tests for `/api/capture`, `/api/analyze-style` and the
//! static `/captures` directory.

mod common;

use axum::http::StatusCode;
use common::{
    body_bytes, body_json, expect_json, get, post_file, post_json, save_capture, FakeAnalyzer,
    FakeMedia, TestAppBuilder, GENERATED_PNG, PNG_BYTES,
};
use serde_json::json;
use silhouette_core::data_url;

// ---------------------------------------------------------------------------
// Test: Save and read back the latest capture
// ---------------------------------------------------------------------------

#[tokio::test]
async fn latest_capture_is_404_before_any_save() {
    let t = common::build_test_app().await;
    let response = get(t.router(), "/api/capture/latest").await;

    let json = expect_json(response, StatusCode::NOT_FOUND).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "No capture data found");
}

#[tokio::test]
async fn saved_capture_round_trips() {
    let t = common::build_test_app().await;
    let saved = save_capture(t.router(), "formal").await["data"].clone();

    assert!(saved["timestamp"].is_i64());
    let url = saved["snapshotUrl"].as_str().unwrap();
    assert!(url.starts_with("/captures/capture_"));
    assert!(url.ends_with(".png"));
    assert_eq!(saved["styleAnalysis"]["style"], "formal");

    let latest = expect_json(get(t.router(), "/api/capture/latest").await, StatusCode::OK).await;
    let data = &latest["data"];
    assert_eq!(data["timestamp"], saved["timestamp"]);
    assert_eq!(data["styleAnalysis"], saved["styleAnalysis"]);

    let snapshot = data["snapshot"].as_str().unwrap();
    assert!(snapshot.starts_with("data:image/png;base64,"));
    assert_eq!(data_url::decode(snapshot).unwrap().bytes, PNG_BYTES);
}

#[tokio::test]
async fn newest_capture_wins() {
    let t = common::build_test_app().await;
    save_capture(t.router(), "formal").await;
    let second = save_capture(t.router(), "streetwear").await["data"].clone();

    let latest = body_json(get(t.router(), "/api/capture/latest").await).await;
    assert_eq!(latest["data"]["timestamp"], second["timestamp"]);
    assert_eq!(latest["data"]["styleAnalysis"]["style"], "streetwear");
}

#[tokio::test]
async fn snapshot_is_served_from_captures_dir() {
    let t = common::build_test_app().await;
    let saved = save_capture(t.router(), "formal").await["data"].clone();

    let response = get(t.router(), saved["snapshotUrl"].as_str().unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await.as_ref(), PNG_BYTES);
}

#[tokio::test]
async fn capture_metadata_is_not_served() {
    let t = common::build_test_app().await;
    let saved = save_capture(t.router(), "formal").await["data"].clone();
    let timestamp = saved["timestamp"].as_i64().unwrap();

    assert_eq!(
        saved["snapshotPath"],
        format!("capture_{timestamp}.png").as_str()
    );
    for uri in [
        "/captures/latest.json".to_string(),
        "/captures/latest.txt".to_string(),
        format!("/captures/capture_{timestamp}.json"),
    ] {
        let response = get(t.router(), &uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn legacy_overshoot_field_is_accepted() {
    let t = common::build_test_app().await;
    let body = json!({
        "snapshot": data_url::encode("image/png", PNG_BYTES),
        "overshootData": { "colour": "olive" },
    });

    let json = expect_json(
        post_json(t.router(), "/api/capture", body).await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(json["data"]["styleAnalysis"]["colour"], "olive");
}

// ---------------------------------------------------------------------------
// Test: Capture validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn capture_without_snapshot_is_rejected() {
    let t = common::build_test_app().await;
    let body = json!({ "styleAnalysis": { "style": "formal" } });

    let json = expect_json(
        post_json(t.router(), "/api/capture", body).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["error"], "snapshot is required");
}

#[tokio::test]
async fn capture_without_analysis_is_rejected() {
    let t = common::build_test_app().await;
    let body = json!({ "snapshot": data_url::encode("image/png", PNG_BYTES) });

    let json = expect_json(
        post_json(t.router(), "/api/capture", body).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["error"], "styleAnalysis is required");
}

#[tokio::test]
async fn non_object_analysis_is_rejected() {
    let t = common::build_test_app().await;
    let body = json!({
        "snapshot": data_url::encode("image/png", PNG_BYTES),
        "styleAnalysis": "formal",
    });

    let response = post_json(t.router(), "/api/capture", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let latest = get(t.router(), "/api/capture/latest").await;
    assert_eq!(latest.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: Editing the latest capture
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_photo_requires_a_capture() {
    let t = common::build_test_app_with_media(FakeMedia::new()).await;
    let response = post_json(
        t.router(),
        "/api/capture/generate-photo",
        json!({ "prompt": "Make the jacket red" }),
    )
    .await;

    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "NO_CAPTURE");
}

#[tokio::test]
async fn missing_capture_is_reported_before_missing_provider() {
    let t = common::build_test_app().await;
    let response = post_json(
        t.router(),
        "/api/capture/generate-photo",
        json!({ "prompt": "Make the jacket red" }),
    )
    .await;

    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "NO_CAPTURE");
}

#[tokio::test]
async fn generate_photo_requires_a_prompt() {
    let media = FakeMedia::new();
    let t = common::build_test_app_with_media(media.clone()).await;
    save_capture(t.router(), "formal").await;

    let response = post_json(t.router(), "/api/capture/generate-photo", json!({})).await;

    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["error"], "Prompt is required");
    assert!(media.prompts().is_empty());
}

#[tokio::test]
async fn generate_photo_edits_snapshot_and_saves_result() {
    let media = FakeMedia::new();
    let t = common::build_test_app_with_media(media.clone()).await;
    save_capture(t.router(), "formal").await;

    let response = post_json(
        t.router(),
        "/api/capture/generate-photo",
        json!({ "prompt": "Make the jacket red" }),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    let data = &json["data"];

    assert_eq!(data["mimeType"], "image/png");
    assert_eq!(data["text"], "Here is your look");
    let data_url_str = data["dataUrl"].as_str().unwrap();
    assert_eq!(data_url::decode(data_url_str).unwrap().bytes, GENERATED_PNG);

    let requests = media.image_requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("Make the jacket red"));
    let source = requests[0].source.as_ref().unwrap();
    assert_eq!(source.bytes, PNG_BYTES);
    assert_eq!(source.mime_type, "image/png");

    let file = get(t.router(), data["url"].as_str().unwrap()).await;
    assert_eq!(file.status(), StatusCode::OK);
    assert_eq!(body_bytes(file).await.as_ref(), GENERATED_PNG);
}

#[tokio::test]
async fn generate_photo_without_provider_is_not_configured() {
    let t = common::build_test_app().await;
    save_capture(t.router(), "formal").await;

    let response = post_json(
        t.router(),
        "/api/capture/generate-photo",
        json!({ "prompt": "Make the jacket red" }),
    )
    .await;

    let json = expect_json(response, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert_eq!(json["code"], "NOT_CONFIGURED");
}

// ---------------------------------------------------------------------------
// Test: Style analysis upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analyze_style_parses_verdict() {
    let analyzer = FakeAnalyzer::new(
        "Here you go: {\"color\": \"Navy\", \"style\": \"smart\", \"item\": \"jacket\"}",
    );
    let t = TestAppBuilder::default()
        .analyzer(analyzer.clone())
        .build()
        .await;

    let response = post_file(
        t.router(),
        "/api/analyze-style",
        "video",
        "clip.webm",
        "video/webm",
        b"webm-bytes",
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;

    assert_eq!(json["data"]["parsed"], true);
    assert_eq!(json["data"]["analysis"]["color"], "Navy");
    assert_eq!(json["data"]["analysis"]["style"], "formal");
    assert_eq!(json["data"]["analysis"]["itemCategory"], "outerwear");

    let clips = analyzer.clips.lock().unwrap();
    assert_eq!(clips.len(), 1);
    assert_eq!(clips[0].bytes, b"webm-bytes");
    assert_eq!(clips[0].mime_type, "video/webm");
    assert_eq!(clips[0].file_name, "clip.webm");
}

#[tokio::test]
async fn analyze_style_keeps_unparsed_text() {
    let t = TestAppBuilder::default()
        .analyzer(FakeAnalyzer::new("The person wears a blue shirt."))
        .build()
        .await;

    let response = post_file(
        t.router(),
        "/api/analyze-style",
        "video",
        "clip.mp4",
        "video/mp4",
        b"mp4-bytes",
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;

    assert_eq!(json["data"]["parsed"], false);
    assert_eq!(json["data"]["result"], "The person wears a blue shirt.");
    assert!(json["data"]["analysis"].is_null());
}

#[tokio::test]
async fn analyze_style_without_video_field_is_rejected() {
    let t = TestAppBuilder::default()
        .analyzer(FakeAnalyzer::new("{}"))
        .build()
        .await;

    let response = post_file(
        t.router(),
        "/api/analyze-style",
        "image",
        "photo.png",
        "image/png",
        PNG_BYTES,
    )
    .await;

    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["error"], "No video file uploaded");
}

#[tokio::test]
async fn analyze_style_without_provider_is_not_configured() {
    let t = common::build_test_app().await;
    let response = post_file(
        t.router(),
        "/api/analyze-style",
        "video",
        "clip.webm",
        "video/webm",
        b"webm-bytes",
    )
    .await;

    let json = expect_json(response, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert_eq!(json["error"], "OVERSHOOT_API_KEY is not configured");
}
