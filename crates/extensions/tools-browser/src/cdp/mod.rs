//! Chrome DevTools Protocol (CDP) client.
//!
//! One WebSocket per browser, multiplexed into flattened per-target
//! sessions. Responses are correlated by request id; events are routed to
//! the session that owns them.
//!
//! ```rust,ignore
//! let client = CdpClient::connect("http://localhost:9222", Duration::from_secs(60)).await?;
//! let page = client.new_page(None).await?;
//! page.navigate("https://example.com").await?;
//! ```

mod client;
mod error;
mod protocol;
mod session;
mod transport;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
