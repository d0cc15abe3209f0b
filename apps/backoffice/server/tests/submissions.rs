mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{TestApp, Upload, PDF_BYTES};

fn seed_question(app: &TestApp) -> i64 {
    let conn = app.state.dbs.tnc.lock().unwrap();
    conn.execute("INSERT INTO packages (name) VALUES ('El Nido')", [])
        .unwrap();
    let package_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO terms_questions (package_id, question_text, yes_option, no_option, sort_order) \
         VALUES (?1, 'Do you agree to the refund policy?', 'I agree', 'I disagree', 1)",
        [package_id],
    )
    .unwrap();
    conn.last_insert_rowid()
}

fn submission(question_id: i64) -> Value {
    json!({
        "package_type": "El Nido Tour A",
        "email": "guest@example.com",
        "lead_guest": "Maria Santos",
        "contact_number": "09171234567",
        "payment_date": "2025-03-01",
        "payment_amount": 4500,
        "companions": ["Jose Santos", "", "Luz Santos"],
        "answers": [{ "question_id": question_id, "answer": "yes" }],
    })
}

#[tokio::test]
async fn test_public_submission_is_stored_with_details() {
    let app = TestApp::new().await;
    let question_id = seed_question(&app);

    let (status, body) = app
        .send_json(Method::POST, "/api/submissions", Some(submission(question_id)), None)
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let data = &body["data"];
    assert_eq!(data["companions"], json!(["Jose Santos", "Luz Santos"]));
    assert_eq!(
        data["answers"][0]["question"],
        "Do you agree to the refund policy?"
    );
    assert_eq!(data["has_payment_receipt"], false);
    assert_eq!(data["archived"], false);

    let id = data["id"].as_i64().unwrap();
    let (status, body) = app.get(&format!("/api/submissions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lead_guest"], "Maria Santos");
}

#[tokio::test]
async fn test_submission_validation_reports_nested_fields() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send_json(
            Method::POST,
            "/api/submissions",
            Some(json!({
                "package_type": "Coron",
                "email": "not-an-email",
                "lead_guest": "X",
                "contact_number": "1".repeat(21),
                "answers": [{ "question_id": "abc" }],
            })),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = &body["errors"];
    assert!(errors["email"].is_array());
    assert!(errors["contact_number"].is_array());
    assert!(errors["answers.0.question_id"].is_array());
    assert!(errors["answers.0.answer"].is_array());
}

#[tokio::test]
async fn test_listing_requires_auth() {
    let app = TestApp::new().await;
    let (status, _) = app
        .send_json(Method::GET, "/api/submissions", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_payment_receipt_upload_and_cleanup() {
    let app = TestApp::new().await;
    let question_id = seed_question(&app);
    let (_, body) = app
        .send_json(Method::POST, "/api/submissions", Some(submission(question_id)), None)
        .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .multipart(
            Method::POST,
            &format!("/api/submissions/{id}/payment-receipt"),
            &[("note", "forgot the file")],
            &[],
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["receipt"].is_array());

    let (status, body) = app
        .multipart(
            Method::POST,
            &format!("/api/submissions/{id}/payment-receipt"),
            &[],
            &[Upload {
                field: "receipt",
                file_name: "gcash receipt.pdf",
                content_type: "application/pdf",
                bytes: PDF_BYTES,
            }],
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["mime_type"], "application/pdf");
    assert!(body["data"]["file_url"]
        .as_str()
        .unwrap()
        .starts_with("http://backoffice.test/storage/payment_receipts/"));

    let (_, body) = app.get(&format!("/api/submissions/{id}")).await;
    assert_eq!(body["data"]["has_payment_receipt"], true);
    assert_eq!(body["data"]["payment_receipts"].as_array().unwrap().len(), 1);

    let receipts_dir = app.state.storage.root().join("payment_receipts");
    assert_eq!(std::fs::read_dir(&receipts_dir).unwrap().count(), 1);

    let (status, _) = app.delete(&format!("/api/submissions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(std::fs::read_dir(&receipts_dir).unwrap().count(), 0);

    let (status, body) = app
        .multipart(
            Method::POST,
            &format!("/api/submissions/{id}/payment-receipt"),
            &[],
            &[Upload {
                field: "receipt",
                file_name: "late.pdf",
                content_type: "application/pdf",
                bytes: PDF_BYTES,
            }],
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Submission not found");
}

fn pdf_of_size(len: usize) -> Vec<u8> {
    let mut bytes = PDF_BYTES.to_vec();
    bytes.resize(len, b' ');
    bytes
}

#[tokio::test]
async fn test_oversize_receipt_is_rejected_without_writing() {
    let app = TestApp::new().await;
    let question_id = seed_question(&app);
    let (_, body) = app
        .send_json(Method::POST, "/api/submissions", Some(submission(question_id)), None)
        .await;
    let id = body["data"]["id"].as_i64().unwrap();
    let receipts_dir = app.state.storage.root().join("payment_receipts");

    for len in [5 * 1024 * 1024 + 1, 6 * 1024 * 1024] {
        let bytes = pdf_of_size(len);
        let (status, body) = app
            .multipart(
                Method::POST,
                &format!("/api/submissions/{id}/payment-receipt"),
                &[],
                &[Upload {
                    field: "receipt",
                    file_name: "big.pdf",
                    content_type: "application/pdf",
                    bytes: &bytes,
                }],
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        assert_eq!(
            body["errors"]["receipt"],
            json!(["The receipt field must not be greater than 5120 kilobytes."])
        );
    }
    let written = std::fs::read_dir(&receipts_dir)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(written, 0);

    let (_, body) = app.get(&format!("/api/submissions/{id}")).await;
    assert_eq!(body["data"]["has_payment_receipt"], false);

    // exactly at the limit is accepted
    let bytes = pdf_of_size(5 * 1024 * 1024);
    let (status, body) = app
        .multipart(
            Method::POST,
            &format!("/api/submissions/{id}/payment-receipt"),
            &[],
            &[Upload {
                field: "receipt",
                file_name: "limit.pdf",
                content_type: "application/pdf",
                bytes: &bytes,
            }],
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(std::fs::read_dir(&receipts_dir).unwrap().count(), 1);
}

#[tokio::test]
async fn test_archive_and_restore_filter_listing() {
    let app = TestApp::new().await;
    let question_id = seed_question(&app);
    let mut ids = Vec::new();
    for _ in 0..3 {
        let (_, body) = app
            .send_json(Method::POST, "/api/submissions", Some(submission(question_id)), None)
            .await;
        ids.push(body["data"]["id"].as_i64().unwrap());
    }

    let (status, body) = app
        .post(&format!("/api/submissions/{}/archive", ids[0]), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Submission archived successfully");

    let (_, body) = app.get("/api/submissions").await;
    assert_eq!(body["data"]["total"], 2);
    let (_, body) = app.get("/api/submissions?show_archived=2").await;
    assert_eq!(body["data"]["total"], 1);
    let (_, body) = app.get("/api/submissions?show_archived=1").await;
    assert_eq!(body["data"]["total"], 3);

    app.post(&format!("/api/submissions/{}/restore", ids[0]), json!({}))
        .await;
    let (_, body) = app.get("/api/submissions?per_page=2").await;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["last_page"], 2);
}

#[tokio::test]
async fn test_update_submission() {
    let app = TestApp::new().await;
    let question_id = seed_question(&app);
    let (_, body) = app
        .send_json(Method::POST, "/api/submissions", Some(submission(question_id)), None)
        .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/submissions/{id}"),
            json!({ "lead_guest": "Maria S. Reyes", "payment_amount": -5 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["payment_amount"].is_array());

    let (status, body) = app
        .put(
            &format!("/api/submissions/{id}"),
            json!({ "lead_guest": "Maria S. Reyes" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lead_guest"], "Maria S. Reyes");
    assert_eq!(body["data"]["email"], "guest@example.com");
}
