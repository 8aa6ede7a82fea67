pub mod fixtures;
pub mod mock_browser;
pub mod test_server;

pub use fixtures::*;
pub use mock_browser::{MockBrowser, Page};
pub use test_server::TestServer;
