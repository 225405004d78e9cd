//! API Module
//!
//! HTTP API layer for the marketplace.
//! Each submodule handles endpoints for a specific domain.

pub mod bid;
pub mod error;
pub mod health;
pub mod job;
pub mod session;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, patch, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::Authenticator;
use crate::auth::cookies::CookieConfig;
use crate::store::Store;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: Arc<dyn Authenticator>,
    pub cookies: CookieConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        auth: Arc<dyn Authenticator>,
        cookies: CookieConfig,
    ) -> Self {
        Self {
            store,
            auth,
            cookies,
        }
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        // Liveness
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        // Session endpoints
        .route("/jwt", post(session::issue_token))
        .route("/logOut", post(session::log_out))
        // Job endpoints
        .route("/jobs", post(job::create_job).get(job::list_all_jobs))
        .route("/jobs/{email}", get(job::list_jobs_by_owner))
        .route(
            "/job/{id}",
            get(job::get_job).put(job::replace_job).delete(job::delete_job),
        )
        .route("/allJobs", get(job::search_jobs))
        .route("/jobsCount", get(job::count_jobs))
        // Bid endpoints
        .route("/bids", post(bid::submit_bid))
        .route("/myBids/{email}", get(bid::list_my_bids))
        .route("/bidRequests/{email}", get(bid::list_bid_requests))
        .route("/bid/{id}", patch(bid::update_bid_status))
        // Add state and middleware
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Credentialed CORS for the configured browser origins
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Duration;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::auth::JwtAuthenticator;
    use crate::store::MemoryStore;

    const ORIGIN: &str = "http://localhost:5173";

    fn app() -> Router {
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(JwtAuthenticator::new(b"test-secret", Duration::days(1))),
            CookieConfig::for_environment(false),
        );
        create_router(state, &[ORIGIN.to_string()])
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn job_body(title: &str, category: &str, owner: &str) -> Value {
        json!({
            "job_title": title,
            "job_category": category,
            "deadline": "2024-06-01T00:00:00.000Z",
            "buyer": { "email": owner, "name": "Buyer" },
            "min_price": 100,
        })
    }

    async fn post_job(app: &Router, title: &str, category: &str, owner: &str) -> String {
        let (status, body) = send(
            app,
            json_request(Method::POST, "/jobs", job_body(title, category, owner)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["acknowledged"], json!(true));
        body["insertedId"].as_str().unwrap().to_string()
    }

    async fn session_cookie_for(app: &Router, email: &str) -> String {
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/jwt", json!({ "email": email })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let app = app();
        let response = app.clone().oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_then_get_job() {
        let app = app();
        let id = post_job(&app, "Build API", "Web Development", "b@x.com").await;

        let (status, job) = send(&app, get_request(&format!("/job/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(job["_id"], json!(id));
        assert_eq!(job["job_title"], json!("Build API"));
        assert_eq!(job["bid_count"], json!(0));
        assert_eq!(job["min_price"], json!(100));
        assert_eq!(job["buyer"]["name"], json!("Buyer"));
    }

    #[tokio::test]
    async fn test_get_unknown_job_is_not_found() {
        let (status, body) = send(
            &app(),
            get_request("/job/6f1e2a4c-0b55-4e2e-9c51-0a0b6c9d1e11"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_bid_increments_count_and_duplicate_is_rejected() {
        let app = app();
        let job_id = post_job(&app, "Logo", "Graphics Design", "b@x.com").await;
        let bid = json!({
            "jobId": job_id,
            "email": "f@x.com",
            "buyer_email": "b@x.com",
            "price": 80,
        });

        let (status, body) = send(&app, json_request(Method::POST, "/bids", bid.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["insertedId"].is_string());

        let (status, body) = send(&app, json_request(Method::POST, "/bids", bid)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            json!("You have already placed a bid on this job")
        );

        let (_, job) = send(&app, get_request(&format!("/job/{}", job_id))).await;
        assert_eq!(job["bid_count"], json!(1));

        let (status, bids) = send(&app, get_request("/myBids/f@x.com")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bids.as_array().unwrap().len(), 1);
        assert_eq!(bids[0]["status"], json!("Pending"));

        let (_, requests) = send(&app, get_request("/bidRequests/b@x.com")).await;
        assert_eq!(requests.as_array().unwrap().len(), 1);

        let bid_id = bids[0]["_id"].as_str().unwrap().to_string();
        let (status, ack) = send(
            &app,
            json_request(
                Method::PATCH,
                &format!("/bid/{}", bid_id),
                json!({ "status": "In Progress" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack["matchedCount"], json!(1));

        let (_, bids) = send(&app, get_request("/myBids/f@x.com")).await;
        assert_eq!(bids[0]["status"], json!("In Progress"));
    }

    #[tokio::test]
    async fn test_owner_listing_requires_session() {
        let app = app();
        post_job(&app, "A", "Web Development", "b@x.com").await;

        let (status, _) = send(&app, get_request("/jobs/b@x.com")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let garbage = Request::builder()
            .uri("/jobs/b@x.com")
            .header(header::COOKIE, "token=not-a-jwt")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, garbage).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_owner_listing_checks_caller() {
        let app = app();
        post_job(&app, "A", "Web Development", "b@x.com").await;
        post_job(&app, "B", "Web Development", "other@x.com").await;

        let cookie = session_cookie_for(&app, "b@x.com").await;

        let request = Request::builder()
            .uri("/jobs/other@x.com")
            .header(header::COOKIE, cookie.clone())
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], json!("Forbidden Access"));

        let request = Request::builder()
            .uri("/jobs/b@x.com")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        let (status, jobs) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let jobs = jobs.as_array().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0]["job_title"], json!("A"));
    }

    #[tokio::test]
    async fn test_search_and_count() {
        let app = app();
        post_job(&app, "React Dashboard", "Web Development", "b@x.com").await;
        post_job(&app, "react native app", "Web Development", "b@x.com").await;
        post_job(&app, "Logo", "Graphics Design", "b@x.com").await;

        let (status, jobs) = send(
            &app,
            get_request("/allJobs?page=0&size=1&filter=Web%20Development&search=REACT"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(jobs.as_array().unwrap().len(), 1);

        let (status, count) = send(
            &app,
            get_request("/jobsCount?filter=Web%20Development&search=REACT"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(count, json!({ "count": 2 }));

        let (_, count) = send(&app, get_request("/jobsCount")).await;
        assert_eq!(count, json!({ "count": 3 }));
    }

    #[tokio::test]
    async fn test_search_tolerates_unusable_paging_values() {
        let app = app();
        for title in ["A", "B", "C"] {
            post_job(&app, title, "Web Development", "b@x.com").await;
        }

        for (uri, expected) in [
            ("/allJobs?page=-1&size=10", 3),
            ("/allJobs?page=&size=10", 3),
            ("/allJobs?page=0&size=abc", 3),
            ("/allJobs?page=x&size=", 3),
            ("/allJobs?page=1&size=2", 1),
        ] {
            let (status, jobs) = send(&app, get_request(uri)).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert_eq!(jobs.as_array().unwrap().len(), expected, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_mistyped_patches_are_bad_requests() {
        let app = app();
        let id = post_job(&app, "Logo", "Graphics Design", "b@x.com").await;

        let (status, body) = send(
            &app,
            json_request(Method::PUT, &format!("/job/{}", id), json!({ "job_title": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, jobs) = send(&app, get_request("/jobs")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(jobs[0]["job_title"], json!("Logo"));
    }

    #[tokio::test]
    async fn test_replace_and_delete_job() {
        let app = app();
        let id = post_job(&app, "Old", "Web Development", "b@x.com").await;

        let (status, ack) = send(
            &app,
            json_request(
                Method::PUT,
                &format!("/job/{}", id),
                json!({ "job_title": "New" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack["matchedCount"], json!(1));

        let (_, job) = send(&app, get_request(&format!("/job/{}", id))).await;
        assert_eq!(job["job_title"], json!("New"));
        assert_eq!(job["job_category"], json!("Web Development"));

        let delete = Request::builder()
            .method(Method::DELETE)
            .uri(format!("/job/{}", id))
            .body(Body::empty())
            .unwrap();
        let (status, ack) = send(&app, delete).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack["deletedCount"], json!(1));

        let (status, _) = send(&app, get_request(&format!("/job/{}", id))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_jwt_and_logout_cookies() {
        let app = app();
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/jwt",
                json!({ "email": "a@x.com", "name": "Alice" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("token="));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("Secure"));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/logOut")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin_with_credentials() {
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, ORIGIN)
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }
}
