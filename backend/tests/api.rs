use std::sync::Arc;

use adapters::{MemoryDatabase, MemoryStorage};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    Router,
};
use backend::{app, config::Config, state::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "foodspot-test-boundary";
const STORAGE_URL: &str = "http://storage.test";

struct TestApp {
    router: Router,
    storage: Arc<MemoryStorage>,
}

impl TestApp {
    fn new() -> Self {
        let config = Config::from_lookup(|key| match key {
            "STORE" => Some("memory".to_string()),
            "JWT_SECRET" => Some("integration-secret".to_string()),
            _ => None,
        })
        .unwrap();

        let storage = Arc::new(MemoryStorage::new(STORAGE_URL));
        let state =
            AppState::with_backends(config, Arc::new(MemoryDatabase::new()), storage.clone());

        Self {
            router: app(state),
            storage,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn multipart(&self, uri: &str, token: &str, parts: &[Part<'_>]) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(request).await
    }

    /// Registers and logs in, returning `(access_token, refresh_token)`.
    async fn sign_up(&self, email: &str) -> (String, String) {
        let (status, _) = self
            .json(
                Method::POST,
                "/auth/register",
                None,
                json!({ "email": email, "username": "tester", "password": "secret123" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .json(
                Method::POST,
                "/auth/login",
                None,
                json!({ "email": email, "password": "secret123" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        (
            body["token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    async fn create_food(&self, token: &str, name: &str) -> Value {
        let (status, body) = self
            .multipart(
                "/food",
                token,
                &[
                    Part::Text("food_name", name),
                    Part::Text("from", "Padang"),
                    Part::File {
                        name: "images",
                        file_name: "plate.jpg",
                        content_type: "image/jpeg",
                        data: b"jpeg-bytes",
                    },
                ],
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

#[tokio::test]
async fn root_and_unknown_routes() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = app.get("/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn registration_rules() {
    let app = TestApp::new();
    let register = |email: &str, password: &str| {
        json!({ "email": email, "username": "ayu", "password": password })
    };

    let (status, body) = app
        .json(Method::POST, "/auth/register", None, register("Ayu@Example.com", "secret123"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Registration successful!");
    assert_eq!(body["user"]["email"], "ayu@example.com");
    assert!(body["user"].get("password").is_none());

    let (status, _) = app
        .json(Method::POST, "/auth/regis", None, register("ayu@example.com", "secret123"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .json(Method::POST, "/auth/register", None, register("not-an-email", "secret123"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(Method::POST, "/auth/register", None, register("short@example.com", "abc"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .json(Method::POST, "/auth/register", None, json!({ "username": "x" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "email is required.");

    let (status, body) = app
        .json(
            Method::POST,
            "/auth/register",
            None,
            json!({ "email": "nouser@example.com", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "username is required.");

    let (status, body) = app
        .json(
            Method::POST,
            "/auth/register",
            None,
            json!({ "email": "nopass@example.com", "username": "ayu" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "password is required.");
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = TestApp::new();
    app.sign_up("budi@example.com").await;

    let (status, body) = app
        .json(
            Method::POST,
            "/auth/login",
            None,
            json!({ "email": "budi@example.com", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    let (status, _) = app
        .json(
            Method::POST,
            "/auth/login",
            None,
            json!({ "email": "nobody@example.com", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_check_the_bearer_token() {
    let app = TestApp::new();

    let (status, _) = app.get("/user/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/user/profile", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, refresh) = app.sign_up("citra@example.com").await;
    let (status, _) = app.get("/user/profile", Some(&refresh)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .json(Method::POST, "/food-place", None, json!({ "shop_name": "x" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rotates_and_logout_revokes() {
    let app = TestApp::new();
    let (access, refresh) = app.sign_up("dewi@example.com").await;

    let (status, body) = app
        .json(
            Method::POST,
            "/auth/refresh-token",
            None,
            json!({ "refresh_token": refresh }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = body["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(rotated, refresh);

    let (status, _) = app
        .json(
            Method::POST,
            "/auth/refresh-token",
            None,
            json!({ "refresh_token": refresh }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .json(
            Method::POST,
            "/auth/refresh-token",
            None,
            json!({ "refresh_token": access }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for _ in 0..2 {
        let (status, body) = app
            .json(
                Method::POST,
                "/auth/logout",
                None,
                json!({ "refresh_token": rotated }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Logged out.");
    }

    let (status, _) = app
        .json(
            Method::POST,
            "/auth/refresh-token",
            None,
            json!({ "refresh_token": rotated }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_endpoints_need_a_refresh_token() {
    let app = TestApp::new();

    for uri in ["/auth/refresh-token", "/auth/logout"] {
        let (status, body) = app.json(Method::POST, uri, None, json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "refresh_token is required.");
    }
}

#[tokio::test]
async fn food_lifecycle_keeps_storage_in_step() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("eka@example.com").await;

    let created = app.create_food(&token, "Rendang").await;
    let id = created["id_food"].as_i64().unwrap();
    assert_eq!(created["food_name"], "Rendang");
    assert_eq!(created["from"], "Padang");

    let images = created["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    let url = images[0]["image_url"].as_str().unwrap();
    assert!(url.starts_with(&format!("{STORAGE_URL}/food/public/")));
    assert!(url.ends_with(".jpg"));
    assert_eq!(app.storage.paths("food").await.len(), 1);

    let (status, body) = app.get(&format!("/food/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["images"].as_array().unwrap().len(), 1);

    let (status, body) = app.get("/food", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app.get("/food/search?name=Rendang", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id_food"], id);

    let (status, _) = app.get("/food/search?name=rendang", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/food/{id}"),
            Some(&token),
            json!({ "category": "Main course" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "Main course");
    assert_eq!(body["food_name"], "Rendang");

    let (status, _) = app
        .json(Method::PUT, &format!("/food/{id}"), Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete(&format!("/food/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.storage.paths("food").await.is_empty());

    let (status, _) = app.get(&format!("/food/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/food/{id}"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn food_uploads_must_be_images() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("fajar@example.com").await;

    let (status, _) = app
        .multipart(
            "/food",
            &token,
            &[
                Part::Text("food_name", "Soto"),
                Part::File {
                    name: "images",
                    file_name: "notes.txt",
                    content_type: "text/plain",
                    data: b"hello",
                },
            ],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .multipart("/food", &token, &[Part::Text("category", "Soup")])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "food_name is required.");

    assert!(app.storage.paths("food").await.is_empty());
}

#[tokio::test]
async fn food_updates_are_cleaned_and_checked() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("kartika@example.com").await;
    let food = app.create_food(&token, "Pempek").await;
    let id = food["id_food"].as_i64().unwrap();

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/food/{id}"),
            Some(&token),
            json!({ "food_name": "  Pempek Kapal Selam ", "category": "  ", "serving": " Cold " }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["food_name"], "Pempek Kapal Selam");
    assert!(body["category"].is_null());
    assert_eq!(body["serving"], "Cold");

    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/food/{id}"),
            Some(&token),
            json!({ "desc": "   " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/food/{id}"),
            Some(&token),
            json!({ "food_name": " " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::PUT,
            "/food/999",
            Some(&token),
            json!({ "category": "Snack" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn food_upload_is_capped_at_fifty_images() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("lestari@example.com").await;

    let mut parts = vec![Part::Text("food_name", "Nasi Campur")];
    parts.extend((0..51).map(|_| Part::File {
        name: "images",
        file_name: "plate.png",
        content_type: "image/png",
        data: b"png-bytes",
    }));

    let (status, body) = app.multipart("/food", &token, &parts).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "At most 50 images can be uploaded.");
    assert!(app.storage.paths("food").await.is_empty());

    let (_, foods) = app.get("/food", None).await;
    assert!(foods.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_food_drops_its_reviews() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("maya@example.com").await;
    let food = app.create_food(&token, "Rawon").await;
    let id = food["id_food"].as_i64().unwrap();

    let (status, _) = app
        .json(
            Method::POST,
            &format!("/food/{id}/review"),
            Some(&token),
            json!({ "review_desc": "Dark and rich" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.delete(&format!("/food/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/food/{id}/review"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn food_place_updates_are_checked() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("nadia@example.com").await;

    let (status, created) = app
        .json(
            Method::POST,
            "/food-place",
            Some(&token),
            json!({ "shop_name": "Warung Bu Tini", "latitude": 0.0, "longitude": 0.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/food-place/{id}");

    let (status, body) = app
        .json(Method::PUT, &uri, Some(&token), json!({ "food_id": 999 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Food not found.");

    let (_, place) = app.get(&uri, None).await;
    assert!(place["food_id"].is_null());

    let (status, _) = app
        .json(Method::PUT, &uri, Some(&token), json!({ "shop_name": "   " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.json(Method::PUT, &uri, Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::PUT,
            "/food-place/999",
            Some(&token),
            json!({ "phone": "0812" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete("/food-place/999", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let food = app.create_food(&token, "Gado-gado").await;
    let (status, body) = app
        .json(
            Method::PUT,
            &uri,
            Some(&token),
            json!({ "food_id": food["id_food"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["food"]["food_name"], "Gado-gado");
}

#[tokio::test]
async fn food_place_lifecycle() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("gita@example.com").await;
    let food = app.create_food(&token, "Sate Padang").await;
    let food_id = food["id_food"].as_i64().unwrap();

    let (status, created) = app
        .json(
            Method::POST,
            "/food-place",
            Some(&token),
            json!({
                "food_id": food_id,
                "shop_name": "Warung Uda",
                "latitude": -6.2,
                "longitude": 106.8,
                "images": ["https://img.test/a.jpg", "https://img.test/b.jpg"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["food"]["food_name"], "Sate Padang");
    assert_eq!(created["images"][0]["image_url"], "https://img.test/a.jpg");
    assert_eq!(created["images"][1]["image_url"], "https://img.test/b.jpg");

    let (status, _) = app
        .json(
            Method::POST,
            "/food-place",
            Some(&token),
            json!({ "shop_name": "Nowhere", "latitude": 91.0, "longitude": 0.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/food-place",
            Some(&token),
            json!({ "food_id": 999, "shop_name": "Ghost", "latitude": 0.0, "longitude": 0.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/food-place/search?name=sate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["food_name"], "sate");
    assert_eq!(body["results"].as_array().unwrap().len(), 1);

    let (status, _) = app.get("/food-place/search?name=pizza", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/food-place/{id}"),
            Some(&token),
            json!({ "phone": "0812", "images": ["https://img.test/c.jpg"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone"], "0812");
    assert_eq!(body["shop_name"], "Warung Uda");
    assert_eq!(body["images"].as_array().unwrap().len(), 1);

    let (status, body) = app.get("/food-place", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app.delete(&format!("/food-place/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/food-place/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reviews_carry_their_author() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("hana@example.com").await;
    let food = app.create_food(&token, "Gudeg").await;
    let id = food["id_food"].as_i64().unwrap();

    let (status, _) = app.get(&format!("/food/{id}/review"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .json(
            Method::POST,
            &format!("/food/{id}/review"),
            Some(&token),
            json!({ "review_desc": "   " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/food/999/review",
            Some(&token),
            json!({ "review_desc": "Sweet" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, review) = app
        .json(
            Method::POST,
            &format!("/food/{id}/review"),
            Some(&token),
            json!({ "review_desc": "Sweet and rich" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(review["id_food"], id);

    let (status, body) = app.get(&format!("/food/{id}/review"), None).await;
    assert_eq!(status, StatusCode::OK);
    let reviews = body.as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["review_desc"], "Sweet and rich");
    assert_eq!(reviews[0]["user"]["email"], "hana@example.com");
}

#[tokio::test]
async fn profile_can_be_read_and_edited() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("indra@example.com").await;
    app.sign_up("taken@example.com").await;

    let (status, body) = app.get("/user/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "indra@example.com");
    assert!(body["image_url"].is_null());

    let (status, body) = app
        .json(
            Method::PUT,
            "/user/profile",
            Some(&token),
            json!({ "name": "Indra" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Indra");

    let (status, _) = app
        .json(
            Method::PUT,
            "/user/profile",
            Some(&token),
            json!({ "email": "taken@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .json(Method::PUT, "/user/profile", Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .json(
            Method::PUT,
            "/user/profile",
            Some(&token),
            json!({ "email": "indra-at-example" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "email is not a valid address.");
}

#[tokio::test]
async fn profile_image_replaces_the_previous_one() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("joko@example.com").await;

    let upload = |file_name: &'static str, content_type: &'static str| {
        [Part::File {
            name: "profile_image",
            file_name,
            content_type,
            data: b"image-bytes",
        }]
    };

    let (status, body) = app
        .multipart("/user/profile/image", &token, &upload("me.png", "image/png"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let first = body["imageUrl"].as_str().unwrap().to_string();
    assert!(first.ends_with(".png"));

    let (status, body) = app
        .multipart("/user/profile/image", &token, &upload("me.jpg", "image/jpeg"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let second = body["imageUrl"].as_str().unwrap().to_string();
    assert!(second.ends_with(".jpg"));
    assert_eq!(app.storage.paths("profile_image").await.len(), 1);

    let (_, body) = app.get("/user/profile", Some(&token)).await;
    assert_eq!(body["image_url"], second.as_str());

    let (status, _) = app
        .multipart("/user/profile/image", &token, &[Part::Text("other", "x")])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
