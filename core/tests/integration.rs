//! Full list lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every `MalClient`
//! operation over real HTTP through `ReqwestTransport`. Validates that
//! request building, transport and response shaping agree with a server
//! that checks auth, content types and form bodies.

use mal_core::{
    ClientConfig, Credentials, EntryFields, EntryStatus, EntryType, MalClient, MalError,
    NetworkError,
};
use mock_server::MockState;

async fn start_server() -> (String, MockState) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = MockState::default();
    let server_state = state.clone();
    tokio::spawn(async move { mock_server::run_with_state(listener, server_state).await });
    (format!("http://{addr}/api/"), state)
}

fn client(base_url: &str, password: &str) -> MalClient {
    let credentials = Credentials::new("mal-tester", password).unwrap();
    MalClient::with_config(credentials, ClientConfig::default().with_base_url(base_url)).unwrap()
}

#[tokio::test]
async fn list_lifecycle() {
    let (base_url, state) = start_server().await;
    let client = client(&base_url, "hunter2");

    // Step 1: verify credentials.
    let user = client.verify_credentials().await.unwrap();
    assert_eq!(user.username(), Some("mal-tester"));
    assert_eq!(user.id(), Some("4242"));

    // Step 2: search with a single hit, normalized to one element.
    let results = client.search_entry("manga", "Death Note").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text_of("id"), Some("21"));
    assert_eq!(results[0].text_of("chapters"), Some("108"));

    // Step 3: search with several hits, in server order.
    let results = client.search_entry(EntryType::Anime, "Naruto").await.unwrap();
    let titles: Vec<&str> = results.iter().map(|e| e.text_of("title").unwrap()).collect();
    assert_eq!(titles, ["Naruto", "Naruto: Shippuuden"]);

    // Step 4: search without hits.
    let results = client.search_entry(EntryType::Anime, "No Such Show").await.unwrap();
    assert!(results.is_empty());

    // Step 5: add an entry.
    let values = EntryFields::new()
        .set("episode", 10)
        .set("status", EntryStatus::InProgress)
        .set("score", 6);
    let confirmation = client.add_entry(EntryType::Anime, "32370", &values).await.unwrap();
    assert_eq!(confirmation, "Created");
    assert_eq!(
        state.entry("anime", "32370").await.as_deref(),
        Some("<entry><episode>10</episode><status>1</status><score>6</score></entry>")
    );

    // Step 6: adding again is rejected by the server.
    let err = client.add_entry(EntryType::Anime, "32370", &values).await.unwrap_err();
    assert!(matches!(err, MalError::Network(NetworkError::Status { status: 400, .. })));

    // Step 7: update the entry.
    let values = EntryFields::new()
        .set("episode", 12)
        .set("status", EntryStatus::Completed)
        .set("comments", "Loved it & more");
    let confirmation = client.update_entry("anime", "32370", &values).await.unwrap();
    assert_eq!(confirmation, "Updated");
    assert_eq!(
        state.entry("anime", "32370").await.as_deref(),
        Some("<entry><episode>12</episode><status>2</status><comments>Loved it &amp; more</comments></entry>")
    );

    // Step 8: delete.
    let confirmation = client.delete_entry(EntryType::Anime, "32370").await.unwrap();
    assert_eq!(confirmation, "Deleted");
    assert!(state.entry("anime", "32370").await.is_none());

    // Step 9: delete again.
    let err = client.delete_entry(EntryType::Anime, "32370").await.unwrap_err();
    assert!(matches!(err, MalError::Network(NetworkError::Status { status: 400, .. })));
}

#[tokio::test]
async fn wrong_password_is_rejected_by_server() {
    let (base_url, _state) = start_server().await;
    let client = client(&base_url, "wrong");

    let err = client.verify_credentials().await.unwrap_err();
    assert!(matches!(err, MalError::Network(NetworkError::Status { status: 401, .. })));
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let client = client(&format!("http://127.0.0.1:{port}/api"), "hunter2");

    let err = client.search_entry(EntryType::Anime, "Naruto").await.unwrap_err();
    assert!(matches!(err, MalError::Network(NetworkError::Request(_))));
}
