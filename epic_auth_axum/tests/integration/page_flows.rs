use axum::{
    Extension, Router,
    body::{Body, to_bytes},
    http::{
        Method, Request, StatusCode,
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    },
    middleware::from_fn_with_state,
    response::Response,
    routing::get,
};
use tower::ServiceExt;

use epic_auth::Auth;
use epic_auth_axum::{
    AuthUser, epic_auth_router_no_trace, is_authenticated_or_error, is_authenticated_or_redirect,
};

use crate::common::{insert_new_user, session_cookie_value, test_auth};

fn app(auth: &Auth) -> Router {
    epic_auth_router_no_trace().with_state(auth.clone())
}

fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

async fn get_page(app: Router, path: &str, cookie: Option<&str>) -> Response {
    let mut request = Request::builder().method(Method::GET).uri(path);
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    app.oneshot(request.body(Body::empty()).expect("request"))
        .await
        .expect("response")
}

async fn post_form(app: Router, path: &str, fields: &[(&str, &str)]) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form_body(fields)))
        .expect("request");
    app.oneshot(request).await.expect("response")
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

fn location(response: &Response) -> Option<&str> {
    response.headers().get(LOCATION).and_then(|v| v.to_str().ok())
}

/// `name=value` pairs a browser would send back
fn cookie_pairs(response: &Response) -> String {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|c| !c.contains("Max-Age=0"))
        .filter_map(|c| c.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

#[tokio::test]
async fn test_protected_page_redirects_to_login_with_return_path() {
    let auth = test_auth().await;
    let response = get_page(app(&auth), "/settings/profile/two-factor", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        Some("/login?redirectTo=%2Fsettings%2Fprofile%2Ftwo-factor")
    );
}

#[tokio::test]
async fn test_protected_post_without_session_is_401() {
    let auth = test_auth().await;
    let response = post_form(app(&auth), "/settings/profile/two-factor", &[]).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_creates_session_and_greets_user() {
    let auth = test_auth().await;
    let response = post_form(
        app(&auth),
        "/signup",
        &[
            ("email", "Kody@Example.com"),
            ("username", "kody"),
            ("name", "Kody Koala"),
            ("password", "kodylovesyou"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("session cookie");
    assert!(set_cookie.starts_with("en_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(!set_cookie.contains("Max-Age"));

    let cookie = cookie_pairs(&response);
    let response = get_page(app(&auth), "/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Hello, Kody Koala!"));
}

#[tokio::test]
async fn test_signup_validation_and_conflict_rerender_form() {
    let auth = test_auth().await;
    let existing = insert_new_user(&auth).await;

    let response = post_form(
        app(&auth),
        "/signup",
        &[
            ("email", "not-an-email"),
            ("username", "k"),
            ("name", ""),
            ("password", "123"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(SET_COOKIE).is_none());
    let body = body_text(response).await;
    assert!(body.contains("Username is too short"));
    assert!(body.contains("Password is too short"));
    assert!(body.contains("value=\"not-an-email\""));

    let response = post_form(
        app(&auth),
        "/signup",
        &[
            ("email", existing.user.email.as_str()),
            ("username", "brand_new"),
            ("name", "Someone"),
            ("password", "kodylovesyou"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(
        body_text(response)
            .await
            .contains("A user already exists with this email")
    );
}

#[tokio::test]
async fn test_login_honors_same_site_redirect_only() {
    let auth = test_auth().await;
    let test_user = insert_new_user(&auth).await;
    let username = test_user.user.username.as_str();
    let password = test_user.password.as_str();

    let response = post_form(
        app(&auth),
        "/login",
        &[
            ("username", username),
            ("password", password),
            ("redirectTo", "/settings/profile"),
            ("remember", "on"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/settings/profile"));
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("session cookie");
    assert!(set_cookie.contains("Max-Age="));

    for target in ["https://evil.example/", "/\t/evil.example/", "/\n/evil.example/"] {
        let response = post_form(
            app(&auth),
            "/login",
            &[
                ("username", username),
                ("password", password),
                ("redirectTo", target),
            ],
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{target:?}");
        assert_eq!(location(&response), Some("/"), "{target:?}");
    }
}

#[tokio::test]
async fn test_login_page_drops_unsafe_return_path() {
    let auth = test_auth().await;
    let response = get_page(app(&auth), "/login?redirectTo=%2F%09%2Fevil.example", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!body_text(response).await.contains("evil.example"));
}

#[tokio::test]
async fn test_login_with_bad_password_rerenders_generic_error() {
    let auth = test_auth().await;
    let test_user = insert_new_user(&auth).await;

    for username in [test_user.user.username.as_str(), "nobody_at_all"] {
        let response = post_form(
            app(&auth),
            "/login",
            &[("username", username), ("password", "wrong-password")],
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert!(
            body_text(response)
                .await
                .contains("Invalid username or password")
        );
    }
}

#[tokio::test]
async fn test_logout_clears_cookie_and_session() {
    let auth = test_auth().await;
    let test_user = insert_new_user(&auth).await;
    let value = session_cookie_value(&auth, &test_user.user).await;
    let cookie = format!("en_session={value}");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/logout")
        .header(COOKIE, &cookie)
        .body(Body::empty())
        .expect("request");
    let response = app(&auth).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|c| c.starts_with("en_session=;") && c.contains("Max-Age=0"))
    );

    let response = get_page(app(&auth), "/settings/profile", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_middleware_guards_application_routes() {
    let auth = test_auth().await;
    let test_user = insert_new_user(&auth).await;
    let cookie = format!(
        "en_session={}",
        session_cookie_value(&auth, &test_user.user).await
    );

    let api = Router::new()
        .route(
            "/api/me",
            get(|Extension(user): Extension<AuthUser>| async move { user.username }),
        )
        .layer(from_fn_with_state(auth.clone(), is_authenticated_or_error))
        .with_state(auth.clone());

    let response = get_page(api.clone(), "/api/me", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_page(api, "/api/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, test_user.user.username);

    let pages: Router = Router::new()
        .route("/notes", get(|user: AuthUser| async move { user.name }))
        .layer(from_fn_with_state(auth.clone(), is_authenticated_or_redirect))
        .with_state(auth.clone());

    let response = get_page(pages.clone(), "/notes?page=2", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        Some("/login?redirectTo=%2Fnotes%3Fpage%3D2")
    );

    let response = get_page(pages, "/notes", Some(&cookie)).await;
    assert_eq!(body_text(response).await, test_user.user.name);
}
