use chrono::Utc;
use epic_auth::{ProvisioningUri, TwoFactorState, parse_provisioning_uri};
use reqwest::StatusCode;

use crate::common::{TestServer, TestUser, insert_new_user, session_cookie_value, session_count};

fn now() -> u64 {
    u64::try_from(Utc::now().timestamp()).expect("time after epoch")
}

/// Code for the step after the current one. Enabling 2FA consumes the
/// current step, so an immediate login has to use a later one.
fn next_step_code(otp: &ProvisioningUri) -> String {
    otp.code_at(now() + otp.params.period).expect("totp code")
}

/// A well-formed code that is not valid anywhere near now
fn wrong_code(otp: &ProvisioningUri) -> String {
    let t = now();
    let period = otp.params.period;
    let valid: Vec<String> = [t - period, t, t + period, t + 2 * period]
        .into_iter()
        .map(|at| otp.code_at(at).expect("totp code"))
        .collect();
    (0..10)
        .map(|d| d.to_string().repeat(otp.params.digits))
        .find(|candidate| !valid.contains(candidate))
        .expect("a code outside the window")
}

async fn enable_two_factor_directly(server: &TestServer, test_user: &TestUser) -> ProvisioningUri {
    let user = &test_user.user;
    let provisioning = server
        .auth
        .two_factor()
        .begin_enable(&user.id, &user.email)
        .await
        .expect("begin enable");
    let otp = parse_provisioning_uri(&provisioning.uri).expect("provisioning uri");
    server
        .auth
        .two_factor()
        .confirm(&user.id, &otp.code_at(now()).expect("code"), Utc::now())
        .await
        .expect("confirm");
    otp
}

#[tokio::test]
async fn test_users_can_add_2fa_to_their_account_and_use_it_when_logging_in() {
    let server = TestServer::start().await.expect("server");
    let auth = &server.auth;
    let test_user = insert_new_user(auth).await;
    let user = &test_user.user;

    let browser = server.browser();
    let cookie = session_cookie_value(auth, user).await;
    browser.add_cookie(&auth.config().session_cookie_name, &cookie);

    let page = browser.goto("/settings/profile").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.has_link("Enable 2FA"));

    let page = browser.goto("/settings/profile/two-factor").await;
    assert!(page.has_button("Enable 2FA"));

    let page = browser.submit("/settings/profile/two-factor", &[]).await;
    assert_eq!(page.path, "/settings/profile/two-factor/verify");
    assert!(page.contains("One-Time Password URI"));

    let uri = page.text_of("otp-uri").expect("provisioning uri on page");
    let otp = parse_provisioning_uri(&uri).expect("parse provisioning uri");
    assert_eq!(otp.account, user.email);

    let code = otp.code_at(now()).expect("totp code");
    let page = browser
        .submit("/settings/profile/two-factor/verify", &[("code", &code)])
        .await;
    assert_eq!(page.path, "/settings/profile/two-factor");
    assert!(page.contains("You have enabled two-factor authentication"));
    assert!(page.has_button("Disable 2FA"));
    assert_eq!(
        auth.two_factor().state(&user.id).await.expect("state"),
        TwoFactorState::Enabled
    );

    let page = browser.goto(&format!("/users/{}", user.username)).await;
    assert!(page.has_button("Logout"));
    let page = browser.submit("/logout", &[]).await;
    assert_eq!(page.path, "/");
    assert!(page.has_link("Log In"));
    assert_eq!(session_count(auth, user).await, 0);

    let page = browser
        .submit(
            "/login",
            &[
                ("username", user.username.as_str()),
                ("password", test_user.password.as_str()),
            ],
        )
        .await;
    assert_eq!(page.path, "/login/2fa");
    assert!(page.contains("Check your 2FA app"));
    assert_eq!(session_count(auth, user).await, 0);

    let page = browser
        .submit("/login/2fa", &[("code", &next_step_code(&otp))])
        .await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.path, "/");
    assert!(page.has_link(&user.name));
    assert_eq!(session_count(auth, user).await, 1);
}

#[tokio::test]
async fn test_wrong_code_at_login_leaves_user_logged_out() {
    let server = TestServer::start().await.expect("server");
    let auth = &server.auth;
    let test_user = insert_new_user(auth).await;
    let user = &test_user.user;
    let otp = enable_two_factor_directly(&server, &test_user).await;

    let browser = server.browser();
    let page = browser
        .submit(
            "/login",
            &[
                ("username", user.username.as_str()),
                ("password", test_user.password.as_str()),
            ],
        )
        .await;
    assert_eq!(page.path, "/login/2fa");

    let page = browser
        .submit("/login/2fa", &[("code", &wrong_code(&otp))])
        .await;
    assert_eq!(page.status, StatusCode::BAD_REQUEST);
    assert_eq!(page.path, "/login/2fa");
    assert_eq!(page.text_of("form-error").as_deref(), Some("Invalid code"));
    assert!(!page.contains("Invalid username or password"));
    assert_eq!(session_count(auth, user).await, 0);

    let page = browser.submit("/login/2fa", &[("code", "")]).await;
    assert_eq!(page.status, StatusCode::BAD_REQUEST);
    assert_eq!(session_count(auth, user).await, 0);

    let page = browser.goto("/").await;
    assert!(page.has_link("Log In"));
    assert!(!page.contains(&user.name));

    let page = browser.goto("/settings/profile").await;
    assert_eq!(page.path, "/login?redirectTo=%2Fsettings%2Fprofile");
}

#[tokio::test]
async fn test_two_factor_page_without_password_step_goes_to_login() {
    let server = TestServer::start().await.expect("server");
    let browser = server.browser();

    let page = browser.goto("/login/2fa").await;
    assert_eq!(page.path, "/login");

    let response = browser.post_form("/login/2fa", &[("code", "123456")]).await;
    assert!(response.status().is_redirection());
}

#[tokio::test]
async fn test_wrong_password_for_two_factor_user_shows_generic_error() {
    let server = TestServer::start().await.expect("server");
    let test_user = insert_new_user(&server.auth).await;
    enable_two_factor_directly(&server, &test_user).await;

    let browser = server.browser();
    let page = browser
        .submit(
            "/login",
            &[
                ("username", test_user.user.username.as_str()),
                ("password", "not-the-password"),
            ],
        )
        .await;
    assert_eq!(page.status, StatusCode::BAD_REQUEST);
    assert_eq!(page.path, "/login");
    assert_eq!(
        page.text_of("form-error").as_deref(),
        Some("Invalid username or password")
    );
    assert!(!page.contains("2FA"));
}

#[tokio::test]
async fn test_disable_two_factor_restores_password_only_login() {
    let server = TestServer::start().await.expect("server");
    let auth = &server.auth;
    let test_user = insert_new_user(auth).await;
    let user = &test_user.user;
    enable_two_factor_directly(&server, &test_user).await;

    let browser = server.browser();
    let cookie = session_cookie_value(auth, user).await;
    browser.add_cookie(&auth.config().session_cookie_name, &cookie);

    let page = browser.goto("/settings/profile").await;
    assert!(page.has_link("Disable 2FA"));
    let page = browser
        .submit("/settings/profile/two-factor/disable", &[])
        .await;
    assert!(page.has_button("Enable 2FA"));

    browser.submit("/logout", &[]).await;
    let page = browser
        .submit(
            "/login",
            &[
                ("username", user.email.as_str()),
                ("password", test_user.password.as_str()),
            ],
        )
        .await;
    assert_eq!(page.path, "/");
    assert!(page.has_link(&user.name));
}
