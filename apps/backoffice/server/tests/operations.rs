mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::TestApp;

const BASE: &str = "/api/tour-operations";

fn completed_tour() -> Value {
    json!({
        "assigned_team": "Team Bravo",
        "travel_dates": "Mar 3-5, 2025",
        "destination": "Coron",
        "tour_type": "Private",
        "days": 3,
        "pax": 4,
        "lead_guest": "Maria Santos",
        "completion_date": "2025-03-05",
    })
}

fn domestic_tour() -> Value {
    json!({
        "travel_dates": "Apr 10-12, 2025",
        "destination": "Bohol",
        "days": 3,
        "pax": 2,
        "lead_guest": "Jose Rizal",
        "contact": "09171234567",
        "payment_status": "Partially Paid",
        "balance": 12500,
        "hotel_balance": "3000.50",
        "booked_accommodation": "1",
        "coordinated_with_supplier": false,
        "status": "pending",
    })
}

async fn create(app: &TestApp, kind: &str, body: Value) -> i64 {
    let (status, body) = app.post(&format!("{BASE}/{kind}"), body).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_completed_tour_crud() {
    let app = TestApp::new().await;

    let mut invalid = completed_tour();
    invalid["days"] = json!(0);
    invalid["completion_date"] = json!("someday");
    let (status, body) = app.post(&format!("{BASE}/completed"), invalid).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["days"].is_array());
    assert!(body["errors"]["completion_date"].is_array());

    let id = create(&app, "completed", completed_tour()).await;

    let (status, body) = app
        .put(
            &format!("{BASE}/completed/{id}"),
            json!({ "pax": 5, "notes": "Guests asked for photos" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Completed tour updated successfully");
    assert_eq!(body["data"]["pax"], 5);
    assert_eq!(body["data"]["lead_guest"], "Maria Santos");

    let (_, body) = app.get(&format!("{BASE}/completed?search=Bravo")).await;
    assert_eq!(body["data"]["total"], 1);

    let (status, _) = app.delete(&format!("{BASE}/completed/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get(&format!("{BASE}/completed/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Completed tour not found");
}

#[tokio::test]
async fn test_completed_tour_followup_and_tail_end() {
    let app = TestApp::new().await;
    let id = create(&app, "completed", completed_tour()).await;

    let (status, body) = app
        .patch(
            &format!("{BASE}/completed/{id}/followup-status"),
            json!({ "followup_status": "Called twice" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["followup_status"].is_array());

    let (status, body) = app
        .patch(
            &format!("{BASE}/completed/{id}/followup-status"),
            json!({ "followup_status": "1st Follow up sent" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Follow-up status updated successfully");
    assert_eq!(
        body["data"],
        json!({
            "id": id,
            "followup_status": "1st Follow up sent",
            "followup_status_display": "1st Follow-up Sent",
        })
    );

    let (status, body) = app
        .patch(
            &format!("{BASE}/completed/{id}/tail-end"),
            json!({ "tail_end": "ALL GOOD POSTED" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tail_end_display"], "All Good - Posted");

    let (status, _) = app
        .patch(
            &format!("{BASE}/completed/9999/tail-end"),
            json!({ "tail_end": "No Review" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancelled_tour_refund_status() {
    let app = TestApp::new().await;
    let id = create(
        &app,
        "cancelled",
        json!({
            "cancellation_date": "2025-02-14",
            "days": 2,
            "pax": 3,
            "with_coordinator": "With",
            "pickup_point": "Manila",
            "payment_status": "Fully Paid",
            "status": "cancelled",
            "lead_guest": "Andres Bonifacio",
            "contact": "09181234567",
            "destination": "Sagada",
        }),
    )
    .await;

    let (status, body) = app
        .patch(
            &format!("{BASE}/cancelled/{id}/refund-status"),
            json!({ "refund_status": "Refunded" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["refund_status"].is_array());

    let (status, body) = app
        .patch(
            &format!("{BASE}/cancelled/{id}/refund-status"),
            json!({ "refund_status": "Processing" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Refund status updated successfully");
    assert_eq!(body["data"]["refund_status"], "Processing");
    assert_eq!(body["data"]["refund_status_display"], "Processing");
}

#[tokio::test]
async fn test_domestic_tour_flags_and_status() {
    let app = TestApp::new().await;

    let mut invalid = domestic_tour();
    invalid["payment_status"] = json!("Unpaid");
    invalid["hotel_balance"] = json!(-1);
    let (status, body) = app.post(&format!("{BASE}/domestic"), invalid).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["payment_status"].is_array());
    assert!(body["errors"]["hotel_balance"].is_array());

    let id = create(&app, "domestic", domestic_tour()).await;
    let (_, body) = app.get(&format!("{BASE}/domestic/{id}")).await;
    let data = &body["data"];
    assert_eq!(data["booked_accommodation"], true);
    assert_eq!(data["coordinated_with_supplier"], false);
    assert_eq!(data["coordinated_with_supplier_display"], "No");
    assert_eq!(data["hotel_balance"], 3000.5);
    assert_eq!(data["formatted_balance"], "12,500.00");
    assert_eq!(data["status_display"], "Pending");

    let (status, body) = app
        .patch(&format!("{BASE}/domestic/{id}/status"), json!({ "status": "" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["status"].is_array());

    let (status, body) = app
        .patch(
            &format!("{BASE}/domestic/{id}/status"),
            json!({ "status": "confirmed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Tour status updated successfully");
    assert_eq!(
        body["data"],
        json!({ "id": id, "status": "confirmed", "status_display": "Confirmed" })
    );
}

#[tokio::test]
async fn test_luzon_joiner_status() {
    let app = TestApp::new().await;
    let id = create(
        &app,
        "luzon-joiners",
        json!({
            "travel_dates": "May 1-2, 2025",
            "destination": "Baler",
            "days": 2,
            "pax": 6,
            "with_coordinator": "None",
            "lead_guest": "Gabriela Silang",
            "contact": "09191234567",
            "pickup_point": "Cubao",
            "payment_status": "Fully Paid",
            "van_details_sent": true,
            "status": "booked",
        }),
    )
    .await;

    let (_, body) = app.get(&format!("{BASE}/luzon-joiners/{id}")).await;
    assert_eq!(body["data"]["with_coordinator_display"], "No");
    assert_eq!(body["data"]["van_details_sent"], true);

    let (status, body) = app
        .patch(
            &format!("{BASE}/luzon-joiners/{id}/status"),
            json!({ "status": "departed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status_display"], "Departed");

    let (status, body) = app
        .patch(
            &format!("{BASE}/luzon-joiners/9999/status"),
            json!({ "status": "departed" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Luzon joiner tour not found");
}
