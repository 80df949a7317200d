//! In-process stand-in for the list service's XML API.
//!
//! Routes live under `/api` and mirror the remote endpoint family closely
//! enough for the client's integration tests: Basic auth on every request, a
//! small seeded catalog for searches, and per-kind lists that accept the
//! urlencoded `data=<entry>` form.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use quick_xml::escape::escape;
use serde::Deserialize;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

/// The single account the server accepts.
#[derive(Clone, Debug)]
pub struct Account {
    pub id: u32,
    pub username: String,
    pub password: String,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            id: 4242,
            username: "mal-tester".to_string(),
            password: "hunter2".to_string(),
        }
    }
}

/// `(kind, id)` to the last `<entry>` document posted for it.
pub type Lists = Arc<RwLock<HashMap<(String, String), String>>>;

#[derive(Clone, Debug, Default)]
pub struct MockState {
    pub account: Account,
    pub lists: Lists,
}

impl MockState {
    pub fn with_account(account: Account) -> Self {
        Self {
            account,
            lists: Lists::default(),
        }
    }

    /// Stored entry XML for `kind` (`anime`/`manga`) and `id`.
    pub async fn entry(&self, kind: &str, id: &str) -> Option<String> {
        self.lists.read().await.get(&(kind.to_string(), id.to_string())).cloned()
    }
}

struct CatalogEntry {
    kind: &'static str,
    id: u32,
    title: &'static str,
    english: &'static str,
    count: u32,
    score: &'static str,
    status: &'static str,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry { kind: "anime", id: 1, title: "Cowboy Bebop", english: "Cowboy Bebop", count: 26, score: "8.78", status: "Finished Airing" },
    CatalogEntry { kind: "anime", id: 20, title: "Naruto", english: "Naruto", count: 220, score: "7.99", status: "Finished Airing" },
    CatalogEntry { kind: "anime", id: 1735, title: "Naruto: Shippuuden", english: "Naruto Shippuden", count: 500, score: "8.26", status: "Finished Airing" },
    CatalogEntry { kind: "anime", id: 21, title: "One Piece", english: "One Piece", count: 0, score: "8.70", status: "Currently Airing" },
    CatalogEntry { kind: "anime", id: 1535, title: "Death Note", english: "Death Note", count: 37, score: "8.62", status: "Finished Airing" },
    CatalogEntry { kind: "manga", id: 11, title: "Naruto", english: "Naruto", count: 700, score: "8.07", status: "Finished" },
    CatalogEntry { kind: "manga", id: 13, title: "One Piece", english: "One Piece", count: 0, score: "9.22", status: "Publishing" },
    CatalogEntry { kind: "manga", id: 21, title: "Death Note", english: "Death Note", count: 108, score: "8.69", status: "Finished" },
    CatalogEntry { kind: "manga", id: 25, title: "Fullmetal Alchemist", english: "Fullmetal Alchemist", count: 116, score: "9.03", status: "Finished" },
];

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct EntryForm {
    pub data: String,
}

pub fn app() -> Router {
    router(MockState::default())
}

pub fn router(state: MockState) -> Router {
    Router::new()
        .route("/api/{scope}/{action}", get(read_endpoint))
        .route("/api/{scope}/{action}/{target}", post(write_entry).delete(delete_entry))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, MockState::default()).await
}

pub async fn run_with_state(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

async fn read_endpoint(
    State(state): State<MockState>,
    Path((scope, action)): Path<(String, String)>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers, &state.account) {
        return unauthorized();
    }
    match (scope.as_str(), action.as_str()) {
        ("account", "verify_credentials.xml") => {
            let account = &state.account;
            xml(
                StatusCode::OK,
                format!(
                    "<user><id>{}</id><username>{}</username></user>",
                    account.id,
                    escape(account.username.as_str())
                ),
            )
        }
        (kind @ ("anime" | "manga"), "search.xml") => search(kind, params.q.as_deref().unwrap_or_default()),
        _ => not_found(),
    }
}

fn search(kind: &str, query: &str) -> Response {
    let needle = query.replace('_', " ").to_lowercase();
    if needle.trim().is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    let count_field = if kind == "anime" { "episodes" } else { "chapters" };
    let entries: String = CATALOG
        .iter()
        .filter(|e| e.kind == kind && e.title.to_lowercase().contains(&needle))
        .map(|e| {
            format!(
                "<entry><id>{}</id><title>{}</title><english>{}</english><{count_field}>{}</{count_field}><score>{}</score><status>{}</status></entry>",
                e.id,
                escape(e.title),
                escape(e.english),
                e.count,
                e.score,
                e.status
            )
        })
        .collect();
    if entries.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    info!(kind, query, "search hit");
    xml(StatusCode::OK, format!("<{kind}>{entries}</{kind}>"))
}

async fn write_entry(
    State(state): State<MockState>,
    Path((scope, action, target)): Path<(String, String, String)>,
    headers: HeaderMap,
    Form(form): Form<EntryForm>,
) -> Response {
    if !authorized(&headers, &state.account) {
        return unauthorized();
    }
    let Some((kind, id)) = list_target(&scope, &target) else {
        return not_found();
    };
    let key = (kind.to_string(), id.to_string());
    let mut lists = state.lists.write().await;
    match action.as_str() {
        "add" if lists.contains_key(&key) => {
            (StatusCode::BAD_REQUEST, format!("The {kind} (id: {id}) is already in the list.")).into_response()
        }
        "add" => {
            lists.insert(key, form.data);
            (StatusCode::CREATED, "Created").into_response()
        }
        "update" if lists.contains_key(&key) => {
            lists.insert(key, form.data);
            (StatusCode::OK, "Updated").into_response()
        }
        "update" => (StatusCode::BAD_REQUEST, format!("The {kind} (id: {id}) is not in the list.")).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_entry(
    State(state): State<MockState>,
    Path((scope, action, target)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers, &state.account) {
        return unauthorized();
    }
    let Some((kind, id)) = list_target(&scope, &target).filter(|_| action == "delete") else {
        return not_found();
    };
    let removed = state.lists.write().await.remove(&(kind.to_string(), id.to_string()));
    match removed {
        Some(_) => (StatusCode::OK, "Deleted").into_response(),
        None => (StatusCode::BAD_REQUEST, format!("The {kind} (id: {id}) is not in the list.")).into_response(),
    }
}

fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

/// `animelist` + `32370.xml` -> `("anime", "32370")`.
fn list_target<'a>(scope: &'a str, target: &'a str) -> Option<(&'a str, &'a str)> {
    let kind = scope.strip_suffix("list").filter(|k| matches!(*k, "anime" | "manga"))?;
    let id = target.strip_suffix(".xml").filter(|id| !id.is_empty())?;
    Some((kind, id))
}

fn authorized(headers: &HeaderMap, account: &Account) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
        .and_then(|token| STANDARD.decode(token).ok())
        .is_some_and(|decoded| decoded == format!("{}:{}", account.username, account.password).as_bytes())
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response()
}

fn xml(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n{body}"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_target_splits_scope_and_file() {
        assert_eq!(list_target("animelist", "32370.xml"), Some(("anime", "32370")));
        assert_eq!(list_target("mangalist", "2.xml"), Some(("manga", "2")));
        assert_eq!(list_target("novellist", "2.xml"), None);
        assert_eq!(list_target("animelist", "32370"), None);
        assert_eq!(list_target("animelist", ".xml"), None);
    }

    #[test]
    fn authorized_checks_basic_credentials() {
        let account = Account::default();
        let mut headers = HeaderMap::new();
        assert!(!authorized(&headers, &account));

        let token = STANDARD.encode("mal-tester:hunter2");
        headers.insert(header::AUTHORIZATION, format!("Basic {token}").parse().unwrap());
        assert!(authorized(&headers, &account));

        let token = STANDARD.encode("mal-tester:wrong");
        headers.insert(header::AUTHORIZATION, format!("Basic {token}").parse().unwrap());
        assert!(!authorized(&headers, &account));
    }

    #[test]
    fn catalog_ids_are_unique_per_kind() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in &CATALOG[i + 1..] {
                assert!(!(a.kind == b.kind && a.id == b.id), "{} {}", a.kind, a.id);
            }
        }
    }
}
