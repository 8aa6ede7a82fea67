use epic_auth::{Auth, AuthConfig, DataStore, Session, User, hash_password};
use std::sync::Once;
use uuid::Uuid;

/// A seeded user together with their plaintext password
#[derive(Debug, Clone)]
pub struct TestUser {
    pub user: User,
    pub password: String,
}

/// Route library logs through the test writer; filter with RUST_LOG
pub fn init_test_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// `Auth` over a fresh in-memory database
pub async fn test_auth() -> Auth {
    init_test_tracing();
    let store = DataStore::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    Auth::new(AuthConfig::for_secrets(["integration-test-secret"]), store)
        .await
        .expect("auth")
}

pub fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// Write a user and password hash straight into the credential store
pub async fn insert_new_user(auth: &Auth) -> TestUser {
    let suffix = unique_suffix();
    let password = format!("pw-{}", unique_suffix());
    let user = User::new(
        &format!("{suffix}@example.com"),
        &format!("user_{suffix}"),
        &format!("Kody {suffix}"),
    );
    let hash = hash_password(&password).expect("hash password");
    let user = auth
        .users()
        .insert_user_with_password(&user, &hash)
        .await
        .expect("insert user");
    TestUser { user, password }
}

/// Create a session row for `user` and return the signed cookie value for it
pub async fn session_cookie_value(auth: &Auth, user: &User) -> String {
    let session = Session::new(&user.id, auth.config().session_ttl).expect("session");
    auth.sessions()
        .insert(&session)
        .await
        .expect("insert session");
    auth.codec().encode(&session.id).expect("encode session cookie")
}

pub async fn session_count(auth: &Auth, user: &User) -> i64 {
    auth.sessions()
        .count_for_user(&user.id)
        .await
        .expect("count sessions")
}
