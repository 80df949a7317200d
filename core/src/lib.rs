//! Asynchronous client for an anime/manga list-tracking service.
//!
//! # Overview
//! Authenticates with HTTP Basic credentials, builds requests for the
//! service's XML endpoints, and translates between XML and Rust values.
//!
//! # Design
//! - `RequestBuilder` turns an operation into a plain-data `HttpRequest`
//!   without I/O; `Transport` executes it; `client::parse_*` shapes the
//!   `HttpResponse`. `MalClient` composes the three.
//! - The `xml` module is the only code that reads or writes XML.
//! - All failures, including argument validation, surface as `MalError`
//!   from the operation's future.
//!
//! ```rust,no_run
//! use mal_core::{Credentials, EntryFields, EntryStatus, EntryType, MalClient};
//!
//! # async fn run() -> mal_core::Result<()> {
//! let client = MalClient::new(Credentials::from_env()?)?;
//! let user = client.verify_credentials().await?;
//! println!("{} verified", user.username().unwrap_or_default());
//!
//! for entry in client.search_entry(EntryType::Manga, "Naruto").await? {
//!     println!("{}", entry.text_of("title").unwrap_or_default());
//! }
//!
//! let values = EntryFields::new()
//!     .set("episode", 10)
//!     .set("status", EntryStatus::InProgress)
//!     .set("score", 6);
//! client.add_entry("anime", "32370", &values).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod transport;
pub mod types;
pub mod xml;

pub use auth::{AuthorizationHeader, Credentials};
pub use client::MalClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
pub use error::{MalError, NetworkError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::RequestBuilder;
pub use transport::{ReqwestTransport, Transport};
pub use types::{EntryFields, EntryStatus, EntryType, FieldValue, UserProfile};
pub use xml::XmlNode;
