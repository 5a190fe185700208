//! Order fetch debounce, suppression and cancel against a mock API.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use mirrorcraft_core::{Money, OrderId, OrderStatus};
use mirrorcraft_integration_tests::{TestSession, api_path};
use mirrorcraft_storefront::state::FetchOutcome;

fn orders_body() -> serde_json::Value {
    json!({
        "success": true,
        "orders": [
            {
                "_id": "o1",
                "orderStatus": "Processing",
                "totalAmount": 2968,
                "orderItems": [{"productId": "p1", "name": "Arch", "price": 1234, "quantity": 2}],
                "shippingAddress": {"name": "Asha Rao", "city": "Pune", "pincode": "411001"},
                "createdAt": "2024-05-01T10:00:00Z"
            },
            {"_id": "o2", "status": "delivered", "total": "₹500"}
        ]
    })
}

async fn mount_orders(session: &TestSession, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(api_path("user-orders")))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_body()))
        .expect(expected_calls)
        .mount(&session.server)
        .await;
}

#[tokio::test]
async fn test_second_fetch_inside_window_is_debounced() {
    let session = TestSession::logged_in().await;
    mount_orders(&session, 1).await;

    let orders = session.storefront.orders();
    assert_eq!(orders.fetch_orders(false).await, FetchOutcome::Fetched(2));
    assert_eq!(orders.fetch_orders(false).await, FetchOutcome::Debounced);

    let list = orders.orders();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].status, OrderStatus::Processing);
    assert_eq!(list[0].total, Money::from_major(2968));
    assert_eq!(list[1].total, Money::from_major(500));
    assert_eq!(
        list[0].shipping_address.as_ref().unwrap().postal_code.as_deref(),
        Some("411001")
    );
}

#[tokio::test]
async fn test_forced_fetch_bypasses_debounce() {
    let session = TestSession::logged_in().await;
    mount_orders(&session, 2).await;

    let orders = session.storefront.orders();
    assert_eq!(orders.fetch_orders(false).await, FetchOutcome::Fetched(2));
    assert_eq!(orders.fetch_orders(true).await, FetchOutcome::Fetched(2));
}

#[tokio::test]
async fn test_fetch_without_token_makes_no_request() {
    let session = TestSession::start().await;
    mount_orders(&session, 0).await;

    assert_eq!(
        session.storefront.orders().fetch_orders(true).await,
        FetchOutcome::NotAuthenticated
    );
}

#[tokio::test]
async fn test_fetch_failure_empties_collection() {
    let session = TestSession::logged_in().await;
    let orders = session.storefront.orders();

    Mock::given(method("GET"))
        .and(path(api_path("user-orders")))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_body()))
        .up_to_n_times(1)
        .mount(&session.server)
        .await;
    assert_eq!(orders.fetch_orders(false).await, FetchOutcome::Fetched(2));

    Mock::given(method("GET"))
        .and(path(api_path("user-orders")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&session.server)
        .await;
    assert_eq!(orders.fetch_orders(true).await, FetchOutcome::Failed);
    assert!(orders.orders().is_empty());
}

#[tokio::test]
async fn test_cleared_history_suppresses_until_forced() {
    let session = TestSession::logged_in().await;
    mount_orders(&session, 1).await;

    let orders = session.storefront.orders();
    orders.clear_orders();
    assert_eq!(orders.fetch_orders(false).await, FetchOutcome::Suppressed);

    // The flag outlives the session
    let reopened = session.reopen();
    assert_eq!(reopened.orders().fetch_orders(false).await, FetchOutcome::Suppressed);

    assert_eq!(orders.fetch_orders(true).await, FetchOutcome::Fetched(2));
    assert!(!orders.is_cleared());
}

#[tokio::test]
async fn test_cancel_patches_status_only_after_success() {
    let session = TestSession::logged_in().await;
    mount_orders(&session, 1).await;

    Mock::given(method("PUT"))
        .and(path(api_path("user-orders/o1/cancel")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&session.server)
        .await;
    Mock::given(method("PUT"))
        .and(path(api_path("user-orders/o2/cancel")))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Order already delivered"})),
        )
        .expect(1)
        .mount(&session.server)
        .await;

    let orders = session.storefront.orders();
    orders.fetch_orders(false).await;

    assert!(orders.cancel_order(&OrderId::new("o1")).await);
    assert_eq!(
        orders.order(&OrderId::new("o1")).unwrap().status,
        OrderStatus::Cancelled
    );

    assert!(!orders.cancel_order(&OrderId::new("o2")).await);
    assert_eq!(
        orders.order(&OrderId::new("o2")).unwrap().status,
        OrderStatus::Delivered
    );
}

#[tokio::test]
async fn test_track_returns_carrier_detail() {
    let session = TestSession::logged_in().await;

    Mock::given(method("GET"))
        .and(path(api_path("user-orders/o1/track")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "tracking": {
                "status": "shipped",
                "carrier": "Delhivery",
                "trackingNumber": "DL998877",
                "estimatedDelivery": "2024-05-06",
                "events": [{"description": "In transit", "location": "Nagpur"}]
            }
        })))
        .expect(1)
        .mount(&session.server)
        .await;

    let info = session
        .storefront
        .orders()
        .track_order(&OrderId::new("o1"))
        .await
        .unwrap();
    assert_eq!(info.status, OrderStatus::Shipped);
    assert_eq!(info.carrier.as_deref(), Some("Delhivery"));
    assert_eq!(info.events.len(), 1);
    assert!(session.storefront.orders().orders().is_empty());
}
