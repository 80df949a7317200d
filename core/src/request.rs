//! Request construction for every service endpoint.
//!
//! # Design
//! `RequestBuilder` holds the defaults shared by all requests from one client
//! (authorization, base URL, user agent) and never changes after
//! construction. Each `build_*` method maps one operation to its verb,
//! endpoint and body. Nothing here performs I/O.
//!
//! The content type differs by verb on purpose: the service expects
//! `application/xml` on reads and a urlencoded form everywhere else, even on
//! bodiless deletes.

use crate::auth::AuthorizationHeader;
use crate::config::ClientConfig;
use crate::error::{MalError, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{EntryFields, EntryType};
use crate::xml;

pub const XML_CONTENT_TYPE: &str = "application/xml; charset=UTF-8";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Builds `HttpRequest` values for the list service.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    authorization: AuthorizationHeader,
    base_url: String,
    user_agent: String,
}

impl RequestBuilder {
    pub fn new(authorization: AuthorizationHeader, config: &ClientConfig) -> Self {
        Self {
            authorization,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn authorization(&self) -> &AuthorizationHeader {
        &self.authorization
    }

    /// Generic construction: `endpoint` starts with `/` and is appended to the
    /// base URL. Only `POST` carries a body, sent as the form `data=<xml>`.
    pub fn build(&self, method: HttpMethod, endpoint: &str, xml_body: Option<&str>) -> Result<HttpRequest> {
        let content_type = match method {
            HttpMethod::Get => XML_CONTENT_TYPE,
            HttpMethod::Post | HttpMethod::Delete => FORM_CONTENT_TYPE,
        };
        let body = match method {
            HttpMethod::Post => Some(
                serde_urlencoded::to_string([("data", xml_body.unwrap_or_default())])
                    .map_err(|e| MalError::Serialization(e.to_string()))?,
            ),
            HttpMethod::Get | HttpMethod::Delete => None,
        };
        Ok(HttpRequest {
            method,
            url: format!("{}{endpoint}", self.base_url),
            headers: vec![
                ("Authorization".to_string(), self.authorization.as_str().to_string()),
                ("User-Agent".to_string(), self.user_agent.clone()),
                ("content-type".to_string(), content_type.to_string()),
            ],
            body,
        })
    }

    pub fn build_verify_credentials(&self) -> Result<HttpRequest> {
        self.build(HttpMethod::Get, "/account/verify_credentials.xml", None)
    }

    /// Only the first space of `name` becomes an underscore.
    pub fn build_search_entry(&self, kind: EntryType, name: &str) -> Result<HttpRequest> {
        let query = name.replacen(' ', "_", 1);
        self.build(HttpMethod::Get, &format!("/{kind}/search.xml?q={query}"), None)
    }

    pub fn build_add_entry(&self, kind: EntryType, id: &str, fields: &EntryFields) -> Result<HttpRequest> {
        let body = xml::encode_entry(fields)?;
        self.build(HttpMethod::Post, &list_endpoint(kind, "add", id)?, Some(&body))
    }

    pub fn build_update_entry(&self, kind: EntryType, id: &str, fields: &EntryFields) -> Result<HttpRequest> {
        let body = xml::encode_entry(fields)?;
        self.build(HttpMethod::Post, &list_endpoint(kind, "update", id)?, Some(&body))
    }

    pub fn build_delete_entry(&self, kind: EntryType, id: &str) -> Result<HttpRequest> {
        self.build(HttpMethod::Delete, &list_endpoint(kind, "delete", id)?, None)
    }
}

/// `/{kind}list/{action}/{id}.xml`. The id is a path segment, so it must be
/// non-empty and free of separators.
fn list_endpoint(kind: EntryType, action: &str, id: &str) -> Result<String> {
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(MalError::InvalidArgument(format!("invalid entry id {id:?}")));
    }
    Ok(format!("/{kind}list/{action}/{id}.xml"))
}
