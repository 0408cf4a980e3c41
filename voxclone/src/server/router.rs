//! HTTP router construction.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;

use super::api;
use super::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_mb * 1024 * 1024;

    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/languages", get(api::get_languages))
        .route("/api/voices", get(api::list_voices).post(api::create_voice))
        .route("/api/voices/{id}", delete(api::delete_voice))
        .route("/api/synthesize", post(api::synthesize))
        .route("/api/batch-synthesize", post(api::batch_synthesize))
        .route("/api/audio/{id}", get(api::get_audio))
        .route("/api/pdf/extract", post(api::extract_pdf))
        .route("/api/pdf/synthesize", post(api::synthesize_chunks))
        .route("/api/text/chunk", post(api::chunk_text))
        .route("/api/voice-transform", post(api::voice_transform))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VoxcloneConfig;
    use crate::tts::silence::SilenceBackend;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;
    use translate_client::{MockTranslator, Translator};

    const BOUNDARY: &str = "voxclone-test-boundary";

    struct TestApp {
        _dir: TempDir,
        state: Arc<AppState>,
    }

    impl TestApp {
        fn new() -> Self {
            Self::with_translator(Arc::new(MockTranslator::always_succeeds()))
        }

        fn with_translator(translator: Arc<dyn Translator>) -> Self {
            let dir = TempDir::new().unwrap();
            let config = VoxcloneConfig {
                data_dir: Some(dir.path().to_path_buf()),
                ..VoxcloneConfig::default()
            };
            let state =
                AppState::new(config, Arc::new(SilenceBackend::new()), translator).unwrap();
            Self {
                _dir: dir,
                state: Arc::new(state),
            }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
            let response = build_router(Arc::clone(&self.state))
                .oneshot(request)
                .await
                .unwrap();
            let status = response.status();
            let body = response.into_body().collect().await.unwrap().to_bytes();
            (status, body.to_vec())
        }

        async fn get(&self, uri: &str) -> (StatusCode, Value) {
            let (status, body) = self
                .send(Request::get(uri).body(Body::empty()).unwrap())
                .await;
            (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
        }

        async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            let request = Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            let (status, body) = self.send(request).await;
            (status, serde_json::from_slice(&body).unwrap())
        }

        /// POST a raw body, optionally with a content type.
        async fn post_raw(
            &self,
            uri: &str,
            content_type: Option<&str>,
            body: &'static str,
        ) -> (StatusCode, Value) {
            let mut request = Request::post(uri);
            if let Some(content_type) = content_type {
                request = request.header(header::CONTENT_TYPE, content_type);
            }
            let (status, body) = self.send(request.body(Body::from(body)).unwrap()).await;
            (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
        }

        async fn post_multipart(&self, uri: &str, parts: &[Part<'_>]) -> (StatusCode, Value) {
            let request = Request::post(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(multipart_body(parts)))
                .unwrap();
            let (status, body) = self.send(request).await;
            (status, serde_json::from_slice(&body).unwrap())
        }

        async fn create_voice(&self, name: &str) -> String {
            let (status, body) = self
                .post_multipart(
                    "/api/voices",
                    &[
                        Part::file("audio", "sample.wav", b"RIFF reference"),
                        Part::text("name", name),
                    ],
                )
                .await;
            assert_eq!(status, StatusCode::OK, "{body}");
            body["voice_id"].as_str().unwrap().to_string()
        }
    }

    struct Part<'a> {
        name: &'a str,
        file_name: Option<&'a str>,
        data: &'a [u8],
    }

    impl<'a> Part<'a> {
        fn text(name: &'a str, value: &'a str) -> Self {
            Self {
                name,
                file_name: None,
                data: value.as_bytes(),
            }
        }

        fn file(name: &'a str, file_name: &'a str, data: &'a [u8]) -> Self {
            Self {
                name,
                file_name: Some(file_name),
                data,
            }
        }
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part.file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        part.name, file_name
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                ),
            }
            body.extend_from_slice(part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new();
        let (status, body) = app.get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["engine"], "silence");
        assert_eq!(body["model_loaded"], true);
        assert_eq!(body["voices"], 0);
    }

    #[tokio::test]
    async fn test_languages() {
        let app = TestApp::new();
        let (status, body) = app.get("/api/languages").await;
        assert_eq!(status, StatusCode::OK);
        let languages = body["languages"].as_array().unwrap();
        assert_eq!(languages.len(), 16);
        assert_eq!(languages[0], json!({"code": "en", "name": "English"}));
        assert!(languages.iter().any(|l| l["code"] == "zh-cn"));
    }

    #[tokio::test]
    async fn test_voice_lifecycle() {
        let app = TestApp::new();
        let voice_id = app.create_voice("Narrator").await;

        let (status, body) = app.get("/api/voices").await;
        assert_eq!(status, StatusCode::OK);
        let voices = body["voices"].as_array().unwrap();
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0]["id"], voice_id.as_str());
        assert_eq!(voices[0]["name"], "Narrator");
        assert_eq!(voices[0]["language"], "en");
        assert_eq!(voices[0]["samples_count"], 1);

        let uri = format!("/api/voices/{}", voice_id);
        let request = Request::delete(uri.as_str()).body(Body::empty()).unwrap();
        let (status, _) = app.send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!app.state.paths.voice_sample(&voice_id).exists());

        let request = Request::delete(uri.as_str()).body(Body::empty()).unwrap();
        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Voice not found");
    }

    #[tokio::test]
    async fn test_create_voice_defaults_and_missing_audio() {
        let app = TestApp::new();

        let (status, body) = app
            .post_multipart("/api/voices", &[Part::text("name", "No file")])
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No audio file provided");

        let (status, body) = app
            .post_multipart("/api/voices", &[Part::file("audio", "a.wav", b"RIFF")])
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Unnamed Voice");
    }

    #[tokio::test]
    async fn test_synthesize_and_fetch_audio() {
        let app = TestApp::new();
        let voice_id = app.create_voice("Narrator").await;

        let (status, body) = app
            .post_json(
                "/api/synthesize",
                json!({"voice_id": voice_id, "text": "Hello there."}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let audio_id = body["audio_id"].as_str().unwrap();
        assert_eq!(body["audio_url"], format!("/api/audio/{}", audio_id));

        let request = Request::get(format!("/api/audio/{}", audio_id))
            .body(Body::empty())
            .unwrap();
        let response = build_router(Arc::clone(&app.state))
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..4], b"RIFF");
    }

    #[tokio::test]
    async fn test_synthesize_errors() {
        let app = TestApp::new();

        let (status, _) = app
            .post_json("/api/synthesize", json!({"voice_id": "missing", "text": "Hi."}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app
            .post_json("/api/synthesize", json!({"voice_id": "missing"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing voice_id or text");
    }

    #[tokio::test]
    async fn test_voice_sample_missing_is_not_found() {
        let app = TestApp::new();
        let voice_id = app.create_voice("Ghost").await;
        std::fs::remove_file(app.state.paths.voice_sample(&voice_id)).unwrap();

        let (status, body) = app
            .post_json("/api/synthesize", json!({"voice_id": voice_id, "text": "Boo."}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Voice audio file not found");
    }

    #[tokio::test]
    async fn test_audio_not_found() {
        let app = TestApp::new();
        let (status, _) = app.get("/api/audio/does-not-exist").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.get("/api/audio/..%2F..%2Fvoices").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let app = TestApp::new();
        let voice_id = app.create_voice("Narrator").await;

        let (status, body) = app
            .post_json(
                "/api/batch-synthesize",
                json!({"voice_id": voice_id, "texts": ["One.", "  ", "Three."]}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["success"], true);
        assert_eq!(results[1]["success"], false);
        assert_eq!(results[1]["error"], "Empty text");
        assert!(results[1].get("audio_id").is_none());
        assert_eq!(results[2]["success"], true);
        assert_eq!(results[2]["text"], "Three.");

        let (status, _) = app
            .post_json("/api/batch-synthesize", json!({"voice_id": voice_id, "texts": []}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_text_chunk() {
        let app = TestApp::new();

        let (status, body) = app
            .post_json(
                "/api/text/chunk",
                json!({
                    "text": "Para one text.\n\nPara two text.",
                    "chunk_method": "paragraphs",
                    "max_chars": 100
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["chunks"], json!(["Para one text.\n\nPara two text."]));
        assert_eq!(body["total_chunks"], 1);
        assert_eq!(body["chunk_method"], "paragraphs");
    }

    #[tokio::test]
    async fn test_text_chunk_validation() {
        let app = TestApp::new();

        for bad in [json!(0), json!("abc"), json!(-3)] {
            let (status, body) = app
                .post_json("/api/text/chunk", json!({"text": "Some text.", "max_chars": bad}))
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "max_chars must be a positive integer");
        }

        let (status, _) = app
            .post_json(
                "/api/text/chunk",
                json!({"text": "Some text.", "chunk_method": "words"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.post_json("/api/text/chunk", json!({"text": "   "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pdf_extract_validation() {
        let app = TestApp::new();

        let (status, body) = app
            .post_multipart("/api/pdf/extract", &[Part::text("chunk_method", "sentences")])
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No PDF file provided");

        let (status, body) = app
            .post_multipart(
                "/api/pdf/extract",
                &[Part::file("pdf", "notes.txt", b"plain text")],
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "File must be a PDF");

        let (status, _) = app
            .post_multipart(
                "/api/pdf/extract",
                &[
                    Part::file("pdf", "book.PDF", b"%PDF-1.4"),
                    Part::text("max_chars", "zero"),
                ],
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pdf_extract_text_layer() {
        let app = TestApp::new();
        let pdf = crate::pdf::single_page_pdf("It was a bright cold day in April.");

        let (status, body) = app
            .post_multipart(
                "/api/pdf/extract",
                &[
                    Part::file("pdf", "orwell.pdf", &pdf),
                    Part::text("chunk_method", "sentences"),
                ],
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["success"], true);
        assert_eq!(body["filename"], "orwell.pdf");
        assert_eq!(body["chunk_method"], "sentences");
        assert_eq!(body["total_chunks"], 1);

        let chunk = body["chunks"][0].as_str().unwrap();
        let squeezed: String = chunk.split_whitespace().collect();
        assert_eq!(squeezed, "ItwasabrightcolddayinApril.");
        assert_eq!(body["avg_chunk_size"], chunk.chars().count());
        assert_eq!(body["total_chars"], chunk.chars().count());
    }

    #[tokio::test]
    async fn test_malformed_json_bodies_get_json_errors() {
        let app = TestApp::new();

        let (status, body) = app
            .post_json(
                "/api/pdf/synthesize",
                json!({"voice_id": "v1", "chunks": "not a list"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));

        let (status, body) = app
            .post_raw("/api/synthesize", None, r#"{"voice_id": "v1", "text": "Hi."}"#)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Content-Type"));

        let (status, body) = app
            .post_raw("/api/text/chunk", Some("application/json"), "{not json")
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = app
            .post_raw("/api/batch-synthesize", Some("application/json"), r#"{"texts": 5}"#)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_non_multipart_uploads_get_json_errors() {
        let app = TestApp::new();

        let (status, body) = app
            .post_raw("/api/pdf/extract", Some("application/json"), "{}")
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid multipart body"));

        let (status, body) = app.post_raw("/api/voices", None, "audio").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = app.post_raw("/api/voice-transform", None, "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_synthesize_chunks_with_translation() {
        let translator = Arc::new(MockTranslator::always_succeeds());
        let app = TestApp::with_translator(translator.clone());
        let voice_id = app.create_voice("Narrator").await;

        let (status, body) = app
            .post_json(
                "/api/pdf/synthesize",
                json!({
                    "voice_id": voice_id,
                    "chunks": ["Hello world.", ""],
                    "language": "en",
                    "translate_to": "es",
                    "source_lang": "en"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_chunks"], 2);
        assert_eq!(body["successful"], 1);
        assert_eq!(body["failed"], 1);

        let first = &body["results"][0];
        assert_eq!(first["translated"], true);
        assert_eq!(first["chunk"], "Hello world.");
        assert_eq!(first["translated_chunk"], "[es] Hello world.");
        assert_eq!(first["chunk_length"], "[es] Hello world.".len());
        assert_eq!(body["results"][1]["error"], "Empty chunk");
        assert_eq!(translator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_synthesize_chunks_translation_fallback() {
        let app = TestApp::with_translator(Arc::new(MockTranslator::always_fails()));
        let voice_id = app.create_voice("Narrator").await;

        let (status, body) = app
            .post_json(
                "/api/pdf/synthesize",
                json!({"voice_id": voice_id, "chunks": ["Hello world."], "translate_to": "fr"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let first = &body["results"][0];
        assert_eq!(first["success"], true);
        assert_eq!(first["translated"], false);
        assert_eq!(first["chunk_length"], 12);
        assert!(first.get("translated_chunk").is_none());
    }

    #[tokio::test]
    async fn test_synthesize_chunks_retries_transient_translation_failure() {
        let translator = Arc::new(MockTranslator::fails_then_succeeds(1));
        let app = TestApp::with_translator(translator.clone());
        let voice_id = app.create_voice("Narrator").await;

        let (status, body) = app
            .post_json(
                "/api/pdf/synthesize",
                json!({"voice_id": voice_id, "chunks": ["Hello world."], "translate_to": "de"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["translated"], true);
        assert_eq!(body["results"][0]["translated_chunk"], "[de] Hello world.");
        assert_eq!(translator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_synthesize_chunks_does_not_retry_rejected_translation() {
        let translator = Arc::new(MockTranslator::always_rejects());
        let app = TestApp::with_translator(translator.clone());
        let voice_id = app.create_voice("Narrator").await;

        let (status, body) = app
            .post_json(
                "/api/pdf/synthesize",
                json!({"voice_id": voice_id, "chunks": ["Hello world."], "translate_to": "xx"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["success"], true);
        assert_eq!(body["results"][0]["translated"], false);
        assert_eq!(translator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_synthesize_chunks_skips_same_language() {
        let translator = Arc::new(MockTranslator::always_succeeds());
        let app = TestApp::with_translator(translator.clone());
        let voice_id = app.create_voice("Narrator").await;

        let (status, body) = app
            .post_json(
                "/api/pdf/synthesize",
                json!({
                    "voice_id": voice_id,
                    "chunks": ["Hello world."],
                    "translate_to": "original"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["results"][0].get("translated").is_none());
        assert_eq!(translator.call_count(), 0);

        let (status, _) = app
            .post_json(
                "/api/pdf/synthesize",
                json!({"voice_id": "nope", "chunks": ["Hello."]}),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_voice_transform_returns_audio() {
        let app = TestApp::new();
        let voice_id = app.create_voice("Target").await;

        let (status, body) = app
            .post_multipart(
                "/api/voice-transform",
                &[
                    Part::file("source_audio", "me.wav", b"RIFF source"),
                    Part::text("target_voice_id", &voice_id),
                    Part::text("speed", "1.0"),
                    Part::text("pitch", "1.0"),
                    Part::text("emotion", "happy"),
                    Part::text("intensity", "0.7"),
                ],
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["transform_applied"], false);
        assert_eq!(body["settings"]["emotion"], "happy");
        assert_eq!(body["settings"]["intensity"], 0.7);

        let audio_id = body["audio_id"].as_str().unwrap();
        let stored = std::fs::read(app.state.paths.audio_file(audio_id).unwrap()).unwrap();
        assert_eq!(stored, b"RIFF source");
    }

    #[tokio::test]
    async fn test_voice_transform_validation() {
        let app = TestApp::new();
        let voice_id = app.create_voice("Target").await;

        let (status, _) = app
            .post_multipart(
                "/api/voice-transform",
                &[Part::text("target_voice_id", &voice_id)],
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .post_multipart(
                "/api/voice-transform",
                &[
                    Part::file("source_audio", "me.wav", b"RIFF"),
                    Part::text("target_voice_id", &voice_id),
                    Part::text("emotion", "bored"),
                ],
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unknown emotion 'bored'");

        let (status, _) = app
            .post_multipart(
                "/api/voice-transform",
                &[
                    Part::file("source_audio", "me.wav", b"RIFF"),
                    Part::text("target_voice_id", "unknown"),
                ],
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
