use reqwest::StatusCode;

use crate::common::{TestServer, insert_new_user, session_cookie_value, session_count};

#[tokio::test]
async fn test_user_profile_when_not_logged_in() {
    let server = TestServer::start().await.expect("server");
    let test_user = insert_new_user(&server.auth).await;
    let user = &test_user.user;

    let page = server
        .browser()
        .goto(&format!("/users/{}", user.username))
        .await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.heading().as_deref(), Some(user.name.as_str()));
    assert!(page.contains(&format!("@{}", user.username)));
    assert!(page.has_link(&format!("{}'s notes", user.name)));
    assert!(page.contains(&format!("href=\"/users/{}/notes\"", user.username)));
    assert!(!page.has_link("My notes"));
    assert!(!page.has_button("Logout"));
    assert!(!page.has_link("Edit profile"));
}

#[tokio::test]
async fn test_user_profile_of_someone_else_is_read_only() {
    let server = TestServer::start().await.expect("server");
    let auth = &server.auth;
    let viewer = insert_new_user(auth).await;
    let other = insert_new_user(auth).await;

    let browser = server.browser();
    let cookie = session_cookie_value(auth, &viewer.user).await;
    browser.add_cookie(&auth.config().session_cookie_name, &cookie);

    let page = browser
        .goto(&format!("/users/{}", other.user.username))
        .await;
    assert_eq!(page.heading().as_deref(), Some(other.user.name.as_str()));
    assert!(page.has_link(&viewer.user.name));
    assert!(!page.has_button("Logout"));
    assert!(!page.has_link("Edit profile"));
}

#[tokio::test]
async fn test_user_profile_when_logged_in_as_self() {
    let server = TestServer::start().await.expect("server");
    let auth = &server.auth;
    let test_user = insert_new_user(auth).await;
    let user = &test_user.user;

    let browser = server.browser();
    let cookie = session_cookie_value(auth, user).await;
    browser.add_cookie(&auth.config().session_cookie_name, &cookie);

    let page = browser.goto(&format!("/users/{}", user.username)).await;
    assert_eq!(page.heading().as_deref(), Some(user.name.as_str()));
    assert!(page.has_button("Logout"));
    assert!(page.has_link("Edit profile"));
    assert!(page.has_link("My notes"));
    assert!(!page.has_link(&format!("{}'s notes", user.name)));
}

#[tokio::test]
async fn test_unknown_user_profile_is_404() {
    let server = TestServer::start().await.expect("server");
    let page = server.browser().goto("/users/nobody_here").await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert_eq!(page.heading().as_deref(), Some("User not found"));
}

#[tokio::test]
async fn test_tampered_session_cookie_is_anonymous() {
    let server = TestServer::start().await.expect("server");
    let auth = &server.auth;
    let test_user = insert_new_user(auth).await;
    let user = &test_user.user;

    let mut cookie = session_cookie_value(auth, user).await;
    let last = cookie.pop().expect("non-empty cookie");
    cookie.push(if last == 'A' { 'B' } else { 'A' });

    let browser = server.browser();
    browser.add_cookie(&auth.config().session_cookie_name, &cookie);

    let page = browser.goto(&format!("/users/{}", user.username)).await;
    assert!(!page.has_button("Logout"));
    assert!(page.has_link("Log In"));
}

#[tokio::test]
async fn test_edit_profile_and_sign_out_other_sessions() {
    let server = TestServer::start().await.expect("server");
    let auth = &server.auth;
    let test_user = insert_new_user(auth).await;
    let user = &test_user.user;

    let browser = server.browser();
    let cookie = session_cookie_value(auth, user).await;
    browser.add_cookie(&auth.config().session_cookie_name, &cookie);
    session_cookie_value(auth, user).await;
    assert_eq!(session_count(auth, user).await, 2);

    let new_username = format!("{}_x", user.username);
    let page = browser
        .submit(
            "/settings/profile",
            &[("username", new_username.as_str()), ("name", "Kody Koala")],
        )
        .await;
    assert_eq!(page.path, "/settings/profile");
    assert!(page.has_link("Kody Koala"));

    let page = browser.goto(&format!("/users/{new_username}")).await;
    assert_eq!(page.heading().as_deref(), Some("Kody Koala"));
    assert!(page.has_button("Logout"));

    let page = browser
        .submit(
            "/settings/profile",
            &[("username", "x"), ("name", "Kody Koala")],
        )
        .await;
    assert_eq!(page.status, StatusCode::BAD_REQUEST);
    assert!(page.contains("form-errors"));

    let page = browser.submit("/settings/profile/sessions", &[]).await;
    assert_eq!(page.path, "/settings/profile");
    assert_eq!(session_count(auth, user).await, 1);
}
