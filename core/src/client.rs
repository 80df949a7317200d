//! Asynchronous client for the list service.
//!
//! # Design
//! Each operation is split into three steps: `RequestBuilder` produces an
//! `HttpRequest`, the `Transport` executes it, and a `parse_*` function
//! shapes the `HttpResponse`. The parse functions are public and pure so the
//! response handling can be tested with canned bodies.
//!
//! The client holds no mutable state. The authorization header and base URL
//! are fixed at construction, so any number of operations may be in flight
//! on one client at once.

use tracing::warn;

use crate::auth::{AuthorizationHeader, Credentials};
use crate::config::ClientConfig;
use crate::error::{MalError, NetworkError, Result};
use crate::http::HttpResponse;
use crate::request::RequestBuilder;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{EntryFields, EntryType, UserProfile};
use crate::xml::{self, XmlNode};

/// Client for verifying credentials, searching, and editing list entries.
#[derive(Debug, Clone)]
pub struct MalClient<T = ReqwestTransport> {
    requests: RequestBuilder,
    transport: T,
}

impl MalClient<ReqwestTransport> {
    /// Client against the public API with default settings.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(credentials, config, ReqwestTransport::new()?))
    }
}

impl<T: Transport> MalClient<T> {
    pub fn with_transport(credentials: Credentials, config: ClientConfig, transport: T) -> Self {
        let authorization = AuthorizationHeader::from_credentials(credentials);
        Self {
            requests: RequestBuilder::new(authorization, &config),
            transport,
        }
    }

    pub fn authorization(&self) -> &AuthorizationHeader {
        self.requests.authorization()
    }

    /// The builder used by this client, for inspecting requests without I/O.
    pub fn requests(&self) -> &RequestBuilder {
        &self.requests
    }

    /// Returns the authenticated account.
    pub async fn verify_credentials(&self) -> Result<UserProfile> {
        let request = self.requests.build_verify_credentials()?;
        let response = self.transport.execute(request).await?;
        parse_verify_credentials(response)
    }

    /// Searches the catalog. Results are always a sequence in server order,
    /// empty when nothing matched.
    pub async fn search_entry<K>(&self, kind: K, name: &str) -> Result<Vec<XmlNode>>
    where
        K: TryInto<EntryType>,
        MalError: From<K::Error>,
    {
        let kind = kind.try_into()?;
        let request = self.requests.build_search_entry(kind, name)?;
        let response = self.transport.execute(request).await?;
        parse_search_entry(kind, response)
    }

    /// Adds an entry to the list. Returns the server's confirmation text.
    pub async fn add_entry<K>(&self, kind: K, id: &str, fields: &EntryFields) -> Result<String>
    where
        K: TryInto<EntryType>,
        MalError: From<K::Error>,
    {
        let request = self.requests.build_add_entry(kind.try_into()?, id, fields)?;
        let response = self.transport.execute(request).await?;
        parse_confirmation(response)
    }

    /// Updates an entry already on the list. Returns the server's confirmation text.
    pub async fn update_entry<K>(&self, kind: K, id: &str, fields: &EntryFields) -> Result<String>
    where
        K: TryInto<EntryType>,
        MalError: From<K::Error>,
    {
        let request = self.requests.build_update_entry(kind.try_into()?, id, fields)?;
        let response = self.transport.execute(request).await?;
        parse_confirmation(response)
    }

    /// Removes an entry from the list. Returns the server's confirmation text.
    pub async fn delete_entry<K>(&self, kind: K, id: &str) -> Result<String>
    where
        K: TryInto<EntryType>,
        MalError: From<K::Error>,
    {
        let request = self.requests.build_delete_entry(kind.try_into()?, id)?;
        let response = self.transport.execute(request).await?;
        parse_confirmation(response)
    }
}

pub fn parse_verify_credentials(response: HttpResponse) -> Result<UserProfile> {
    check_status(&response)?;
    let mut doc = xml::decode(&response.body)?;
    let user = doc
        .take("user")
        .ok_or_else(|| MalError::Parse("response has no <user> root".to_string()))?;
    Ok(UserProfile::new(user))
}

/// An empty body (the service answers 204 when nothing matches) is an empty
/// result. A single `<entry>` is still returned as a one-element sequence.
pub fn parse_search_entry(kind: EntryType, response: HttpResponse) -> Result<Vec<XmlNode>> {
    check_status(&response)?;
    if response.body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut doc = xml::decode(&response.body)?;
    let mut root = doc
        .take(kind.as_str())
        .ok_or_else(|| MalError::Parse(format!("response has no <{kind}> root")))?;
    Ok(root.take("entry").map(XmlNode::into_list).unwrap_or_default())
}

/// Add, update and delete answer with free-form text; it is returned as is.
pub fn parse_confirmation(response: HttpResponse) -> Result<String> {
    check_status(&response)?;
    Ok(response.body)
}

fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    warn!(status = response.status, "request rejected by server");
    Err(NetworkError::Status {
        status: response.status,
        body: response.body.clone(),
    }
    .into())
}
