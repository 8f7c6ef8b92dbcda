use poem::Server;
use poem::listener::{Acceptor, Listener, TcpListener};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use wishvest::api::build_app;
use wishvest::config::ItemDefaults;
use wishvest::providers::HtmlMetaResolver;
use wishvest::service::ItemService;
use wishvest::store::MemoryItemStore;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_product_page(page_path: &str, html: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

/// Boots the full app on an ephemeral port and returns its base URL.
async fn spawn_app() -> String {
    let service = Arc::new(ItemService::new(
        Arc::new(MemoryItemStore::new()),
        Arc::new(
            HtmlMetaResolver::new(
                Duration::from_millis(500),
                "wishvest-integration-test/1.0",
            )
            .unwrap(),
        ),
        ItemDefaults::default(),
    ));
    let app = build_app(service);

    let acceptor = TcpListener::bind("127.0.0.1:0")
        .into_acceptor()
        .await
        .unwrap();
    let addr = *acceptor.local_addr()[0].as_socket_addr().unwrap();

    tokio::spawn(async move {
        Server::new_with_acceptor(acceptor).run(app).await.unwrap();
    });

    format!("http://{addr}")
}

const PRODUCT_HTML: &str = r#"<html><head>
    <meta property="og:image" content="/img/x.png">
</head><body>A cool gadget</body></html>"#;

#[test_log::test(tokio::test)]
async fn test_create_item_end_to_end() {
    let page_server = test_utils::create_product_page("/items/cool-gadget.html", PRODUCT_HTML).await;
    let product_url = format!("{}/items/cool-gadget.html", page_server.uri());
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/items"))
        .json(&json!({
            "userId": "u1",
            "url": product_url,
            "price": 100,
            "targetYears": 5,
            "expectedReturn": 0.07
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 201);
    let item: Value = response.json().await.unwrap();
    info!(?item, "Created item");

    assert_eq!(item["userId"], "u1");
    assert_eq!(item["url"], product_url);
    assert_eq!(item["name"], "cool gadget");
    assert_eq!(item["salesTaxRate"], 14.0);
    assert!((item["fv"].as_f64().unwrap() - 140.26).abs() < 0.01);
    assert_eq!(
        item["imageUrl"],
        format!("{}/img/x.png", page_server.uri())
    );
    assert!(!item["itemId"].as_str().unwrap().is_empty());
    assert!(!item["createdAt"].as_str().unwrap().is_empty());

    // A second create gets a fresh identifier
    let second: Value = client
        .post(format!("{base}/items"))
        .json(&json!({ "userId": "u1", "url": product_url, "price": 100 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_ne!(second["itemId"], item["itemId"]);
}

#[test_log::test(tokio::test)]
async fn test_create_tolerates_unreachable_product_page() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    // Nothing listens on this URL; the preview degrades silently
    let response = client
        .post(format!("{base}/items"))
        .json(&json!({
            "userId": "u1",
            "url": "https://unreachable.invalid/p",
            "price": 50
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 201);
    let item: Value = response.json().await.unwrap();
    assert!(item.get("imageUrl").is_none());
}

#[test_log::test(tokio::test)]
async fn test_create_missing_fields_returns_400() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/items"))
        .json(&json!({ "userId": "u1", "price": 100 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("url"));

    let response = client
        .post(format!("{base}/items"))
        .json(&json!({ "userId": "u1", "url": "https://x.test/p" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("price"));
}

#[test_log::test(tokio::test)]
async fn test_create_rejects_negative_price() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/items"))
        .json(&json!({ "userId": "u1", "url": "https://x.test/p", "price": -10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[test_log::test(tokio::test)]
async fn test_list_is_newest_first_and_scoped() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    for name in ["first", "second"] {
        let response = client
            .post(format!("{base}/items"))
            .json(&json!({
                "userId": "u1",
                "name": name,
                "url": "https://unreachable.invalid/p",
                "price": 10
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
    }

    let items: Vec<Value> = client
        .get(format!("{base}/items?userId=u1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "second");
    assert_eq!(items[1]["name"], "first");

    let empty: Vec<Value> = client
        .get(format!("{base}/items?userId=somebody-else"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_update_recomputes_future_value() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{base}/items"))
        .json(&json!({ "userId": "u1", "url": "https://unreachable.invalid/p", "price": 100 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let item_id = created["itemId"].as_str().unwrap();

    let response = client
        .put(format!("{base}/items/{item_id}?userId=u1"))
        .json(&json!({ "price": 200, "targetYears": 10, "expectedReturn": 0.05 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let updated: Value = response.json().await.unwrap();

    let expected_fv = 200.0 * 1.05f64.powi(10);
    assert!((updated["fv"].as_f64().unwrap() - expected_fv).abs() < 1e-6);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_eq!(updated["itemId"], created["itemId"]);
}

#[test_log::test(tokio::test)]
async fn test_update_unknown_item_returns_404() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{base}/items/does-not-exist?userId=u1"))
        .json(&json!({ "price": 200 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().is_some());
}

#[test_log::test(tokio::test)]
async fn test_delete_item_then_404() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{base}/items"))
        .json(&json!({ "userId": "u1", "url": "https://unreachable.invalid/p", "price": 100 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let item_id = created["itemId"].as_str().unwrap();

    let response = client
        .delete(format!("{base}/items/{item_id}?userId=u1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["itemId"], item_id);
    assert!(body["message"].as_str().unwrap().contains("deleted"));

    let response = client
        .delete(format!("{base}/items/{item_id}?userId=u1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[test_log::test(tokio::test)]
async fn test_missing_user_falls_back_to_placeholder() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{base}/items"))
        .json(&json!({ "url": "https://unreachable.invalid/p", "price": 10 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["userId"], "demo");

    // Listing without userId sees the same record
    let items: Vec<Value> = client
        .get(format!("{base}/items"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_health_and_cors() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/health"))
        .header("origin", "http://frontend.example")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(!body["timestamp"].as_str().unwrap().is_empty());
}
