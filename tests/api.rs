//! HTTP integration tests.
//!
//! Builds the full router over a temporary data file and upload directories
//! and drives it with `tower::ServiceExt::oneshot`.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use voice_qa::{
    config::{AppConfig, DEFAULT_MAX_UPLOAD_BYTES},
    routes::routes::app,
    state::AppState,
};

const BOUNDARY: &str = "voiceqa-test-boundary";

struct TestApp {
    dir: TempDir,
    cfg: AppConfig,
    router: Router,
}

async fn test_app_with_limit(max_upload_bytes: usize) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let cfg = AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        data_file: dir.path().join("qa_data.json"),
        video_dir: dir.path().join("static/uploads/videos"),
        image_dir: dir.path().join("static/uploads/images"),
        max_upload_bytes,
    };
    let state = AppState::from_config(&cfg).await.unwrap();
    let router = app(state, &cfg);
    TestApp { dir, cfg, router }
}

async fn test_app() -> TestApp {
    test_app_with_limit(DEFAULT_MAX_UPLOAD_BYTES).await
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn form(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn upload(
        &self,
        uri: &str,
        field: &str,
        filename: &str,
        data: &[u8],
    ) -> (StatusCode, Value) {
        self.send(multipart_request(uri, field, Some(filename), data))
            .await
    }

    async fn qas(&self) -> Vec<Value> {
        let (status, body) = self.get("/get_qas").await;
        assert_eq!(status, StatusCode::OK);
        body["qas"].as_array().cloned().unwrap_or_default()
    }
}

fn multipart_request(
    uri: &str,
    field: &str,
    filename: Option<&str>,
    data: &[u8],
) -> Request<Body> {
    let disposition = match filename {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = test_app().await;
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["message"], "Voice Q&A App is running");
}

#[tokio::test]
async fn readiness_probes_writable_directories() {
    let app = test_app().await;
    let (status, body) = app.get("/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["checks"]["videos"]["ok"], true);
    assert_eq!(body["checks"]["images"]["ok"], true);
    assert_eq!(body["checks"]["data"]["ok"], true);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = test_app().await;
    let (status, body) = app.get("/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));
}

#[tokio::test]
async fn add_then_answer_round_trip() {
    let app = test_app().await;

    let (status, body) = app
        .form("/add_qa", "question=++What+Is+X%3F+&answer=+It+is+Y+")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Question and answer added successfully");

    let (status, body) = app
        .json(Method::POST, "/get_answer", json!({ "question": "what is x?" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "answer": "It is Y" }));

    let qas = app.qas().await;
    assert_eq!(qas.len(), 1);
    assert_eq!(qas[0]["question"], "what is x?");
    assert!(!qas[0]["id"].as_str().unwrap().is_empty());

    // The document on disk is the JSON array itself.
    let raw = std::fs::read_to_string(&app.cfg.data_file).unwrap();
    let stored: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn add_accepts_multipart_forms() {
    let app = test_app().await;

    let mut body = Vec::new();
    for (name, value) in [("question", " Hi "), ("answer", "hello")] {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let (status, body) = app
        .send(
            Request::post("/add_qa")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Question and answer added successfully");

    let qas = app.qas().await;
    assert_eq!(qas.len(), 1);
    assert_eq!(qas[0]["question"], "hi");
    assert_eq!(qas[0]["answer"], "hello");

    // A multipart form missing the answer fails validation like a urlencoded one.
    let (status, body) = app
        .send(multipart_request("/add_qa", "question", None, b"hi"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Question and answer cannot be empty");
}

#[tokio::test]
async fn add_rejects_empty_fields() {
    let app = test_app().await;
    let (status, body) = app.form("/add_qa", "question=+++&answer=x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "status": "error", "message": "Question and answer cannot be empty" })
    );

    let (status, _) = app.form("/add_qa", "question=x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.qas().await.is_empty());
}

#[tokio::test]
async fn unmatched_and_malformed_lookups_get_sentinels() {
    let app = test_app().await;
    let (status, body) = app
        .json(Method::POST, "/get_answer", json!({ "question": "who are you" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["answer"],
        "Sorry, I don't know the answer to that question."
    );

    let (status, body) = app
        .send(
            Request::post("/get_answer")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{broken"))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["answer"],
        "An error occurred while processing your request."
    );
}

#[tokio::test]
async fn update_and_delete_by_id() {
    let app = test_app().await;
    app.form("/add_qa", "question=q1&answer=a1").await;
    let id = app.qas().await[0]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/update_qa/{id}"),
            json!({ "question": " Q2 ", "answer": "a2" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Q&A updated successfully");
    let qas = app.qas().await;
    assert_eq!(qas[0], json!({ "id": id, "question": "q2", "answer": "a2" }));

    let (status, body) = app
        .json(
            Method::PUT,
            "/update_qa/missing",
            json!({ "question": "q", "answer": "a" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Q&A not found");

    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/update_qa/{id}"),
            json!({ "question": "", "answer": "a" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.delete(&format!("/delete_qa/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Q&A deleted successfully");

    let (status, _) = app.delete(&format!("/delete_qa/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.qas().await.is_empty());
}

#[tokio::test]
async fn legacy_document_gets_ids_on_first_read() {
    let app = test_app().await;
    std::fs::write(
        &app.cfg.data_file,
        r#"[{"question": "hi", "answer": "hello"}]"#,
    )
    .unwrap();

    let qas = app.qas().await;
    let id = qas[0]["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let raw = std::fs::read_to_string(&app.cfg.data_file).unwrap();
    assert!(raw.contains(&id));
    assert_eq!(app.qas().await[0]["id"], id.as_str());
}

#[tokio::test]
async fn video_uploads_are_renamed_listed_served_and_deleted() {
    let app = test_app().await;

    let mut names = Vec::new();
    for n in 1..=3 {
        let (status, body) = app
            .upload("/upload_video", "video", "clip.mp4", b"frames")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Video uploaded successfully");
        assert_eq!(body["display_name"], format!("Video {n}"));
        names.push(body["filename"].as_str().unwrap().to_string());
    }
    assert_eq!(names, vec!["clip.mp4", "clip_1.mp4", "clip_2.mp4"]);
    assert!(app.dir.path().join("static/uploads/videos/clip_2.mp4").exists());

    let (status, body) = app.get("/get_videos").await;
    assert_eq!(status, StatusCode::OK);
    let videos = body["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 3);
    let mut ids: Vec<&str> = videos.iter().map(|v| v["id"].as_str().unwrap()).collect();
    ids.sort();
    assert_eq!(ids, vec!["clip.mp4", "clip_1.mp4", "clip_2.mp4"]);
    let url_prefix = app.cfg.video_url_prefix();
    for video in videos {
        assert_eq!(
            video["url"],
            format!("{}/{}", url_prefix, video["id"].as_str().unwrap())
        );
    }

    let served = app
        .router
        .clone()
        .oneshot(
            Request::get(format!("{url_prefix}/clip_1.mp4"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    let bytes = to_bytes(served.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"frames");

    for name in &names {
        let (status, body) = app.delete(&format!("/delete_video/{name}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Video deleted successfully");
    }
    let (_, body) = app.get("/get_videos").await;
    assert_eq!(body["videos"], json!([]));

    let (status, body) = app.delete("/delete_video/clip.mp4").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Video not found");
}

#[tokio::test]
async fn disallowed_extensions_are_rejected() {
    let app = test_app().await;
    let (status, body) = app
        .upload("/upload_video", "video", "setup.exe", b"MZ")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid file type. Only mp4, webm, and ogg are allowed."
    );

    let (status, body) = app
        .upload("/upload_image", "image", "clip.mp4", b"")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid file type. Only jpg, jpeg, png, and gif are allowed."
    );
}

#[tokio::test]
async fn missing_or_unnamed_file_parts_are_rejected() {
    let app = test_app().await;

    // Wrong field name.
    let (status, body) = app
        .upload("/upload_image", "video", "cat.png", b"png")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No image file provided");

    // A plain form field is not a file.
    let (status, body) = app
        .send(multipart_request("/upload_image", "image", None, b"text"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No image file provided");

    // Not multipart at all.
    let (status, body) = app.form("/upload_image", "image=cat.png").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No image file provided");

    // An empty filename is still a file part, just an unusable one.
    let (status, body) = app.upload("/upload_image", "image", "", b"png").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "status": "error", "message": "No selected file" })
    );
}

#[tokio::test]
async fn images_are_listed_separately_from_videos() {
    let app = test_app().await;
    let (status, body) = app
        .upload("/upload_image", "image", "../../cat pic.JPG", b"jpg")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "cat_pic.JPG");
    assert_eq!(body["display_name"], "Image 1");

    let (_, body) = app.get("/get_images").await;
    assert_eq!(
        body,
        json!({
            "status": "success",
            "images": [{
                "id": "cat_pic.JPG",
                "display_name": "Image 1",
                "url": format!("{}/cat_pic.JPG", app.cfg.image_url_prefix()),
            }]
        })
    );
    let (_, body) = app.get("/get_videos").await;
    assert_eq!(body["videos"], json!([]));
}

#[tokio::test]
async fn oversized_uploads_are_refused() {
    let app = test_app_with_limit(1024).await;
    let (status, _) = app
        .upload("/upload_video", "video", "big.mp4", &[0u8; 4096])
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let (_, body) = app.get("/get_videos").await;
    assert_eq!(body["videos"], json!([]));
}
