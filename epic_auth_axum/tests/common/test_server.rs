use epic_auth::Auth;
use epic_auth_axum::epic_auth_router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::fixtures::test_auth;

/// The full page router served on an ephemeral local port
///
/// Tests seed data through `auth`, which shares the server's database.
pub struct TestServer {
    server_handle: JoinHandle<()>,
    pub base_url: String,
    pub auth: Auth,
}

impl TestServer {
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        let auth = test_auth().await;
        let app = epic_auth_router().with_state(auth.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let server_handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {e}");
            }
        });

        Ok(Self {
            server_handle,
            base_url: format!("http://{addr}"),
            auth,
        })
    }

    /// Browser pointed at this server
    pub fn browser(&self) -> super::MockBrowser {
        super::MockBrowser::new(&self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}
