mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use backoffice_lib::db::repository::create_destination;
use common::{TestApp, Upload, PDF_BYTES, PNG_BYTES};

fn seed_destinations(app: &TestApp) -> (i64, i64, i64) {
    let conn = app.state.dbs.main.lock().unwrap();
    let coron = create_destination(&conn, "Coron", "coron", Some("Palawan"), true).unwrap();
    let el_nido = create_destination(&conn, "El Nido", "el-nido", Some("Palawan"), true).unwrap();
    let closed = create_destination(&conn, "Closed Island", "closed", None, false).unwrap();
    (coron.id, el_nido.id, closed.id)
}

#[tokio::test]
async fn test_destinations_lists_active_only() {
    let app = TestApp::new().await;
    seed_destinations(&app);
    let (status, body) = app.get("/api/tours/destinations").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Coron", "El Nido"]);
}

#[tokio::test]
async fn test_create_tour_generates_unique_slug_and_alt() {
    let app = TestApp::new().await;
    let (coron, _, _) = seed_destinations(&app);

    let mut slugs = Vec::new();
    for _ in 0..2 {
        let (status, body) = app
            .post(
                "/api/tours",
                json!({
                    "title": "Coron Island Hopping",
                    "package_type": "single",
                    "destination_id": coron,
                    "tour_type": "day_tour",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(
            body["data"]["image_alt"],
            "Coron Island Hopping - Tour Package Image"
        );
        assert_eq!(body["data"]["tour_type_display"], "Day tour");
        assert_eq!(body["data"]["destination_name"], "Coron");
        slugs.push(body["data"]["slug"].as_str().unwrap().to_string());
    }
    assert_eq!(slugs, ["coron-island-hopping", "coron-island-hopping-1"]);

    let (status, body) = app
        .post(
            "/api/tours",
            json!({ "title": "Other", "slug": "coron-island-hopping", "package_type": "single" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["slug"].is_array());
}

#[tokio::test]
async fn test_combined_tour_requires_known_destinations() {
    let app = TestApp::new().await;
    let (coron, el_nido, _) = seed_destinations(&app);

    let (status, body) = app
        .post(
            "/api/tours",
            json!({ "title": "Palawan Combo", "package_type": "combined" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["combined_destinations"].is_array());

    let (status, body) = app
        .post(
            "/api/tours",
            json!({
                "title": "Palawan Combo",
                "package_type": "combined",
                "combined_destinations": [el_nido, 9999],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["combined_destinations.1"].is_array());

    let (status, body) = app
        .post(
            "/api/tours",
            json!({
                "title": "Palawan Combo",
                "package_type": "combined",
                "combined_destinations": [el_nido, coron],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["combined_destinations"], "El Nido, Coron");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/tours/{id}"),
            json!({ "package_type": "combined", "combined_destinations": [coron] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["combined_destinations"], "Coron");
    assert_eq!(body["data"]["combined_destination_ids"], json!([coron]));
}

#[tokio::test]
async fn test_tour_image_upload_replace_and_delete() {
    let app = TestApp::new().await;

    let (status, body) = app
        .multipart(
            Method::POST,
            "/api/tours",
            &[("title", "Sunset Cruise"), ("package_type", "single")],
            &[Upload {
                field: "image",
                file_name: "brochure.pdf",
                content_type: "application/pdf",
                bytes: PDF_BYTES,
            }],
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["image"].is_array());

    let (status, body) = app
        .multipart(
            Method::POST,
            "/api/tours",
            &[("title", "Sunset Cruise"), ("package_type", "single")],
            &[Upload {
                field: "image",
                file_name: "cruise.PNG",
                content_type: "image/png",
                bytes: PNG_BYTES,
            }],
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["data"]["id"].as_i64().unwrap();
    let first = body["data"]["image"].as_str().unwrap().to_string();
    assert!(first.starts_with("tours/"));
    assert!(first.ends_with("_sunset-cruise.png"));
    assert!(app.state.storage.exists(&first));

    // multipart updates arrive as POST
    let (status, body) = app
        .multipart(
            Method::POST,
            &format!("/api/tours/{id}"),
            &[("title", "Sunset Cruise Deluxe")],
            &[Upload {
                field: "image",
                file_name: "deluxe.png",
                content_type: "image/png",
                bytes: PNG_BYTES,
            }],
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let second = body["data"]["image"].as_str().unwrap().to_string();
    assert!(second.ends_with("_sunset-cruise-deluxe.png"));
    assert!(!app.state.storage.exists(&first));
    assert!(app.state.storage.exists(&second));

    let (status, _) = app.delete(&format!("/api/tours/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!app.state.storage.exists(&second));

    let (status, body) = app.get(&format!("/api/tours/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Tour not found");
}

#[tokio::test]
async fn test_toggles_and_filters() {
    let app = TestApp::new().await;
    let mut ids = Vec::new();
    for (title, order) in [("Beta", 2), ("Alpha", 1), ("Gamma", 3)] {
        let (_, body) = app
            .post(
                "/api/tours",
                json!({ "title": title, "package_type": "single", "display_order": order }),
            )
            .await;
        ids.push(body["data"]["id"].as_i64().unwrap());
    }

    let (_, body) = app.get("/api/tours").await;
    let titles: Vec<_> = body["data"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["Alpha", "Beta", "Gamma"]);

    let (status, body) = app
        .patch(&format!("/api/tours/{}/toggle-active", ids[0]), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "id": ids[0], "active": false }));

    let (_, body) = app
        .patch(&format!("/api/tours/{}/toggle-featured", ids[2]), json!({}))
        .await;
    assert_eq!(body["data"]["featured"], true);

    let (_, body) = app.get("/api/tours?active_only=1").await;
    assert_eq!(body["data"]["total"], 2);
    let (_, body) = app.get("/api/tours?featured_only=true").await;
    assert_eq!(body["data"]["total"], 1);
    let (_, body) = app.get("/api/tours?search=amm").await;
    assert_eq!(body["data"]["data"][0]["title"], "Gamma");

    let (status, _) = app
        .patch("/api/tours/9999/toggle-active", json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_huge_page_number_does_not_break_listing() {
    let app = TestApp::new().await;
    app.post(
        "/api/tours",
        json!({ "title": "Kayangan Lake", "package_type": "single" }),
    )
    .await;

    let (status, body) = app
        .get("/api/tours?page=9223372036854775807&per_page=100")
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["data"], json!([]));
    assert_eq!(body["data"]["total"], 1);

    let (status, body) = app.get(&format!("/api/tours?page={}", u64::MAX)).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = app.get("/api/tours").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
}
