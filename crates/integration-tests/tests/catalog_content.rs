//! Catalog caching and content endpoints against a mock API.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use mirrorcraft_core::{BlogId, Money, ProductId};
use mirrorcraft_integration_tests::{TestSession, api_path};
use mirrorcraft_storefront::models::{Enquiry, ProductQuery};
use mirrorcraft_storefront::services::ContentError;

#[tokio::test]
async fn test_product_listing_is_cached() {
    let session = TestSession::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("products")))
        .and(query_param("category", "wall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [
                {"_id": "p1", "name": "Sunburst", "price": 2499, "images": ["/s.jpg"], "countInStock": 3},
                {"_id": "p2", "title": "Arch", "price": "₹1,499"}
            ]
        })))
        .expect(1)
        .mount(&session.server)
        .await;

    let catalog = session.storefront.catalog();
    let query = ProductQuery {
        category: Some("wall".to_string()),
        ..ProductQuery::default()
    };

    let first = catalog.products(&query).await;
    let second = catalog.products(&query).await;
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].clamp_quantity(10), Some(3));
    assert_eq!(first[1].price, Money::from_major(1499));
}

#[tokio::test]
async fn test_listing_failure_is_empty() {
    let session = TestSession::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("products")))
        .respond_with(ResponseTemplate::new(502))
        .mount(&session.server)
        .await;

    assert!(
        session
            .storefront
            .catalog()
            .products(&ProductQuery::default())
            .await
            .is_empty()
    );
}

#[tokio::test]
async fn test_single_product_and_categories() {
    let session = TestSession::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("products/p1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "product": {"_id": "p1", "name": "Sunburst", "price": 2499, "mrp": 2999}
        })))
        .expect(1)
        .mount(&session.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("categories")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "c1", "name": "Wall Mirrors", "slug": "wall"},
            {"_id": "c2", "slug": "vanity"}
        ])))
        .expect(1)
        .mount(&session.server)
        .await;

    let catalog = session.storefront.catalog();
    let product = catalog.product(&ProductId::new("p1")).await.unwrap();
    assert_eq!(product.original_price, Some(Money::from_major(2999)));
    assert_eq!(catalog.product(&ProductId::new("p1")).await, Some(product));

    let categories = catalog.categories().await;
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[1].name, "vanity");
}

#[tokio::test]
async fn test_blogs_and_likes() {
    let session = TestSession::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("blogs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "blogs": [{"_id": "b1", "title": "Mirrors in small rooms", "likes": 4}]
        })))
        .mount(&session.server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("blogs/b1/like")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"likes": ["u1", "u2", "u3", "u4", "u5"]})))
        .expect(1)
        .mount(&session.server)
        .await;

    let content = session.storefront.content();
    let blogs = content.blogs().await;
    assert_eq!(blogs.len(), 1);
    assert_eq!(blogs[0].likes, 4);

    let likes = content.like_blog(&BlogId::new("b1")).await.unwrap();
    assert_eq!(likes, Some(5));
}

#[tokio::test]
async fn test_enquiry_normalises_email() {
    let session = TestSession::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("enquiry")))
        .and(body_json(json!({
            "name": "Asha",
            "email": "asha@example.in",
            "message": "Do you ship to Goa?"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&session.server)
        .await;

    let enquiry = Enquiry {
        name: "Asha".to_string(),
        email: " Asha@Example.IN".to_string(),
        phone: None,
        subject: None,
        message: "Do you ship to Goa?".to_string(),
    };
    session.storefront.content().submit_enquiry(&enquiry).await.unwrap();
}

#[tokio::test]
async fn test_enquiry_server_error_is_reported() {
    let session = TestSession::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("enquiry")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&session.server)
        .await;

    let enquiry = Enquiry {
        name: "Asha".to_string(),
        email: "asha@example.in".to_string(),
        phone: None,
        subject: Some("Bulk order".to_string()),
        message: "Hello".to_string(),
    };
    let err = session
        .storefront
        .content()
        .submit_enquiry(&enquiry)
        .await
        .unwrap_err();
    assert!(matches!(err, ContentError::Api(_)));
}
