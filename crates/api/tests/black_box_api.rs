use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;
use stockroom_auth::{JwtClaims, Role};
use stockroom_core::UserId;
use stockroom_infra::AppConfig;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod (in-memory store), bound to an ephemeral port.
        let config = AppConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            jwt_secret: JWT_SECRET.to_string(),
            database_url: None,
            database_max_connections: 1,
        };
        let app = stockroom_api::app::build_app(&config)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind(config.bind_addr)
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_warehouse(&self, token: &str, name: &str) -> String {
        let res = self
            .client
            .post(self.url("/warehouses"))
            .bearer_auth(token)
            .json(&json!({ "name": name, "address": "1 Dock Road" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: serde_json::Value = res.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_product(&self, token: &str, name: &str) -> String {
        let res = self
            .client
            .post(self.url("/products"))
            .bearer_auth(token)
            .json(&json!({ "name": name, "description": "test item", "price": "9.99" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["price"], "9.99");
        body["id"].as_str().unwrap().to_string()
    }

    async fn mutate(
        &self,
        token: &str,
        supply: bool,
        warehouse: &str,
        product: &str,
        quantity: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let req = if supply {
            self.client.post(self.url("/supply"))
        } else {
            self.client.put(self.url("/consume"))
        };
        let res = req
            .bearer_auth(token)
            .json(&json!({ "warehouse": warehouse, "product": product, "quantity": quantity }))
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(role: Role) -> (UserId, String) {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        role,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt");
    (claims.sub, token)
}

#[tokio::test]
async fn health_is_public_and_whoami_requires_auth() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .get(srv.url("/stocks"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reflects_token_claims() {
    let srv = TestServer::spawn().await;
    let (user_id, token) = mint_jwt(Role::Consumer);

    let res = srv
        .client
        .get(srv.url("/whoami"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user_id"].as_str().unwrap(), user_id.to_string());
    assert_eq!(body["role"], "consumer");
}

#[tokio::test]
async fn supply_and_consume_lifecycle() {
    let srv = TestServer::spawn().await;
    let (_, supplier) = mint_jwt(Role::Supplier);
    let (_, consumer) = mint_jwt(Role::Consumer);

    let w = srv.create_warehouse(&supplier, "North").await;
    let p = srv.create_product(&supplier, "Widget").await;

    let (status, body) = srv.mutate(&supplier, true, &w, &p, json!(100)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 100);
    assert_eq!(body["warehouse"], w.as_str());
    assert_eq!(body["product_detail"]["name"], "Widget");
    let stock_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = srv.mutate(&consumer, false, &w, &p, json!(10)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 90);

    let (status, body) = srv.mutate(&consumer, false, &w, &p, json!(1000)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "insufficient_stock");

    let res = srv
        .client
        .get(srv.url(&format!("/stocks/{stock_id}")))
        .bearer_auth(&consumer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["quantity"], 90);
    assert_eq!(body["warehouse_detail"]["name"], "North");
}

#[tokio::test]
async fn roles_are_enforced() {
    let srv = TestServer::spawn().await;
    let (_, supplier) = mint_jwt(Role::Supplier);
    let (_, consumer) = mint_jwt(Role::Consumer);

    let w = srv.create_warehouse(&supplier, "North").await;
    let p = srv.create_product(&supplier, "Widget").await;

    let (status, body) = srv.mutate(&consumer, true, &w, &p, json!(5)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = srv.mutate(&supplier, false, &w, &p, json!(5)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let res = srv
        .client
        .post(srv.url("/warehouses"))
        .bearer_auth(&consumer)
        .json(&json!({ "name": "Nope", "address": "Nowhere" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn bad_requests_map_to_domain_errors() {
    let srv = TestServer::spawn().await;
    let (_, supplier) = mint_jwt(Role::Supplier);
    let (_, other_supplier) = mint_jwt(Role::Supplier);
    let (_, consumer) = mint_jwt(Role::Consumer);

    let w = srv.create_warehouse(&supplier, "North").await;
    let p = srv.create_product(&supplier, "Widget").await;

    let (status, body) = srv.mutate(&other_supplier, true, &w, &p, json!(5)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "warehouse_not_owned");

    let (status, body) = srv.mutate(&supplier, true, &w, &p, json!(0)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_quantity");

    let (status, body) = srv.mutate(&supplier, true, &w, &p, json!(1.5)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_quantity");

    let (status, body) = srv.mutate(&consumer, false, "bogus", &p, json!(1)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = srv.mutate(&consumer, false, &w, &p, json!(1)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "product not available at this warehouse");

    let res = srv
        .client
        .post(srv.url("/products"))
        .bearer_auth(&supplier)
        .json(&json!({ "name": "Widget", "price": "1.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn stock_listing_is_scoped_for_suppliers() {
    let srv = TestServer::spawn().await;
    let (_, alice) = mint_jwt(Role::Supplier);
    let (_, bob) = mint_jwt(Role::Supplier);
    let (_, consumer) = mint_jwt(Role::Consumer);

    let p = srv.create_product(&alice, "Widget").await;
    let wa = srv.create_warehouse(&alice, "Alice's").await;
    let wb = srv.create_warehouse(&bob, "Bob's").await;

    assert_eq!(srv.mutate(&alice, true, &wa, &p, json!(3)).await.0, StatusCode::OK);
    assert_eq!(srv.mutate(&bob, true, &wb, &p, json!(4)).await.0, StatusCode::OK);

    let list = |token: String| {
        let req = srv.client.get(srv.url("/stocks")).bearer_auth(token);
        async move {
            let res = req.send().await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
            res.json::<Vec<serde_json::Value>>().await.unwrap()
        }
    };

    let alices = list(alice).await;
    assert_eq!(alices.len(), 1);
    assert_eq!(alices[0]["warehouse"], wa.as_str());
    assert_eq!(alices[0]["quantity"], 3);

    assert_eq!(list(consumer).await.len(), 2);
}

#[tokio::test]
async fn malformed_bodies_get_json_validation_errors() {
    let srv = TestServer::spawn().await;
    let (_, supplier) = mint_jwt(Role::Supplier);

    let cases = [
        json!({ "name": "Widget", "price": "abc" }),
        json!({ "description": "no name", "price": "1.00" }),
    ];
    for body in cases {
        let res = srv
            .client
            .post(srv.url("/products"))
            .bearer_auth(&supplier)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body {body}");
        let err: serde_json::Value = res.json().await.unwrap();
        assert_eq!(err["error"], "validation_error");
        assert!(err["message"].is_string());
    }

    let res = srv
        .client
        .post(srv.url("/warehouses"))
        .bearer_auth(&supplier)
        .json(&json!({ "name": "North" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "validation_error");

    let res = srv
        .client
        .post(srv.url("/supply"))
        .bearer_auth(&supplier)
        .body(r#"{"warehouse":"x","product":"y","quantity":1}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "validation_error");
}

#[tokio::test]
async fn unparseable_stock_id_is_not_found() {
    let srv = TestServer::spawn().await;
    let (_, consumer) = mint_jwt(Role::Consumer);

    let res = srv
        .client
        .get(srv.url("/stocks/not-a-uuid"))
        .bearer_auth(&consumer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "not_found");
}
