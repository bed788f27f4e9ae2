// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::FromRequest,
    http::Request,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ApiError,
    models::{
        AccountListResponse, AccountResponse, AccountUpdateRequest, CustomerProfile, LoginRequest,
        ProfileResponse, SignupRequest, TokenResponse,
    },
    state::AppState,
    storage::Account,
};

pub mod accounts;
pub mod health;
pub mod profile;
pub mod session;

/// JSON body extractor whose rejection is an [`ApiError`] (400 with the
/// parser's message) instead of axum's plain-text default.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/ping", get(health::ping))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/login", post(session::login))
        .route("/signup", post(session::signup))
        .route("/profile", get(profile::get_profile))
        .route(
            "/account",
            get(accounts::list_accounts).post(accounts::open_account),
        )
        .route(
            "/account/{id}",
            get(accounts::get_account).post(accounts::update_account),
        )
        .with_state(state);

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CorsLayer::permissive());

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware)
}

/// Registers the `x-authentication-token` header scheme referenced by the
/// protected paths.
struct TokenSecurity;

impl Modify for TokenSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    "x-authentication-token",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::ping,
        health::liveness,
        health::readiness,
        session::login,
        session::signup,
        profile::get_profile,
        accounts::list_accounts,
        accounts::open_account,
        accounts::get_account,
        accounts::update_account
    ),
    components(
        schemas(
            Account,
            AccountListResponse,
            AccountResponse,
            AccountUpdateRequest,
            CustomerProfile,
            LoginRequest,
            ProfileResponse,
            SignupRequest,
            TokenResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&TokenSecurity),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Session", description = "Login, signup and profile"),
        (name = "Accounts", description = "Owned accounts and balance updates")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        auth::{TokenService, AUTH_TOKEN_HEADER},
        storage::{
            database::tests::temp_store,
            seed::{SeedAccount, SeedCustomer},
            SeedData,
        },
    };

    const SECRET: &[u8] = b"router-test-secret";

    struct TestApp {
        router: Router,
        tokens: TokenService,
        _dir: tempfile::TempDir,
    }

    fn app() -> TestApp {
        let (store, dir) = temp_store();
        SeedData {
            customers: vec![
                SeedCustomer {
                    id: Some(1),
                    email: "test@x.co".to_string(),
                    password: "1234".to_string(),
                    first_name: "Test".to_string(),
                    last_name: "User".to_string(),
                    accounts: vec![
                        SeedAccount { id: 1, balance: 100 },
                        SeedAccount { id: 2, balance: 0 },
                    ],
                },
                SeedCustomer {
                    id: Some(2),
                    email: "other@x.co".to_string(),
                    password: "5678".to_string(),
                    first_name: String::new(),
                    last_name: String::new(),
                    accounts: vec![SeedAccount { id: 3, balance: 50 }],
                },
            ],
        }
        .apply(&store)
        .unwrap();

        TestApp {
            router: router(AppState::new(store, TokenService::new(SECRET, 300))),
            tokens: TokenService::new(SECRET, 300),
            _dir: dir,
        }
    }

    impl TestApp {
        fn token_for(&self, customer_id: u64) -> String {
            self.tokens
                .issue(customer_id, chrono::Utc::now().timestamp())
                .unwrap()
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> Response {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(AUTH_TOKEN_HEADER, token);
            }
            let body = match body {
                Some(value) => {
                    builder = builder.header(header::CONTENT_TYPE, "application/json");
                    Body::from(value.to_string())
                }
                None => Body::empty(),
            };
            self.router
                .clone()
                .oneshot(builder.body(body).unwrap())
                .await
                .unwrap()
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn ping_answers_success() {
        let app = app();
        let response = app.send(Method::GET, "/ping", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(json_body(response).await, json!("success"));
    }

    #[tokio::test]
    async fn readiness_reports_store_ok() {
        let app = app();
        let response = app.send(Method::GET, "/health/ready", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["checks"]["store"], "ok");
    }

    #[tokio::test]
    async fn login_then_list_accounts() {
        let app = app();
        let response = app
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({"email": "test@x.co", "password": "1234"})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let token = json_body(response).await["token"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app.send(Method::GET, "/account", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"accounts": [1, 2]}));
    }

    #[tokio::test]
    async fn login_rejects_bad_password_and_unknown_email() {
        let app = app();
        for body in [
            json!({"email": "test@x.co", "password": "wrong"}),
            json!({"email": "nobody@x.co", "password": "1234"}),
        ] {
            let response = app.send(Method::POST, "/login", None, Some(body)).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                json_body(response).await["error"],
                "user does not exist or invalid password"
            );
        }
    }

    #[tokio::test]
    async fn login_rejects_malformed_body() {
        let app = app();
        let response = app
            .send(Method::POST, "/login", None, Some(json!({"email": "test@x.co"})))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_account_returns_balance() {
        let app = app();
        let token = app.token_for(1);
        let response = app.send(Method::GET, "/account/1", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"account": {"id": 1, "balance": 100}})
        );
    }

    #[tokio::test]
    async fn withdraw_and_deposit_update_balance() {
        let app = app();
        let token = app.token_for(1);

        let response = app
            .send(
                Method::POST,
                "/account/1",
                Some(&token),
                Some(json!({"type": "withdraw", "amount": 5})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.send(Method::GET, "/account/1", Some(&token), None).await;
        assert_eq!(json_body(response).await["account"]["balance"], 95);

        let response = app
            .send(
                Method::POST,
                "/account/1",
                Some(&token),
                Some(json!({"type": "deposit", "amount": 10})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.send(Method::GET, "/account/1", Some(&token), None).await;
        assert_eq!(json_body(response).await["account"]["balance"], 105);
    }

    #[tokio::test]
    async fn overdraw_is_rejected_and_balance_kept() {
        let app = app();
        let token = app.token_for(1);
        let response = app
            .send(
                Method::POST,
                "/account/1",
                Some(&token),
                Some(json!({"type": "withdraw", "amount": 101})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json_body(response).await["error"],
            "not enough funds for withdraw"
        );

        let response = app.send(Method::GET, "/account/1", Some(&token), None).await;
        assert_eq!(json_body(response).await["account"]["balance"], 100);
    }

    #[tokio::test]
    async fn invalid_update_requests_are_bad_requests() {
        let app = app();
        let token = app.token_for(1);
        for body in [
            json!({"type": "transfer", "amount": 5}),
            json!({"type": "deposit", "amount": -5}),
            json!({"type": "deposit"}),
        ] {
            let response = app
                .send(Method::POST, "/account/1", Some(&token), Some(body))
                .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        let response = app
            .send(Method::GET, "/account/not-a-number", Some(&token), None)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn foreign_and_missing_accounts_look_the_same() {
        let app = app();
        let token = app.token_for(1);
        for uri in ["/account/3", "/account/999"] {
            let response = app.send(Method::GET, uri, Some(&token), None).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(json_body(response).await["error"], "account not found");
        }

        let response = app
            .send(
                Method::POST,
                "/account/3",
                Some(&token),
                Some(json!({"type": "withdraw", "amount": 1})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let other = app.token_for(2);
        let response = app.send(Method::GET, "/account/3", Some(&other), None).await;
        assert_eq!(json_body(response).await["account"]["balance"], 50);
    }

    #[tokio::test]
    async fn protected_routes_require_valid_token() {
        let app = app();

        let response = app.send(Method::GET, "/account", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "token error");

        let response = app
            .send(Method::GET, "/account", Some("not-a-token"), None)
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let forged = TokenService::new(b"another-secret", 300)
            .issue(1, chrono::Utc::now().timestamp())
            .unwrap();
        let response = app.send(Method::GET, "/account", Some(&forged), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let stale = app
            .tokens
            .issue(1, chrono::Utc::now().timestamp() - 301)
            .unwrap();
        let response = app.send(Method::GET, "/account/1", Some(&stale), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "invalid token");
    }

    #[tokio::test]
    async fn signup_login_and_open_account() {
        let app = app();
        let response = app
            .send(
                Method::POST,
                "/signup",
                None,
                Some(json!({
                    "email": "new@x.co",
                    "password": "pw",
                    "firstName": "New",
                    "lastName": "Customer"
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let customer_id = json_body(response).await["customer"]["id"].as_u64().unwrap();

        let response = app
            .send(
                Method::POST,
                "/signup",
                None,
                Some(json!({"email": "new@x.co", "password": "other"})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let token = app.token_for(customer_id);
        let response = app.send(Method::GET, "/profile", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["customer"]["email"], "new@x.co");

        let response = app.send(Method::GET, "/account", Some(&token), None).await;
        assert_eq!(json_body(response).await, json!({"accounts": []}));

        let response = app.send(Method::POST, "/account", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["account"]["balance"], 0);
        let account_id = body["account"]["id"].as_u64().unwrap();
        assert!(account_id > 3);

        let response = app.send(Method::GET, "/account", Some(&token), None).await;
        assert_eq!(json_body(response).await, json!({"accounts": [account_id]}));
    }

    #[test]
    fn openapi_declares_token_scheme() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert_eq!(
            doc["components"]["securitySchemes"]["token"]["name"],
            "x-authentication-token"
        );
        assert!(doc["paths"]["/account/{id}"]["post"].is_object());
    }
}
