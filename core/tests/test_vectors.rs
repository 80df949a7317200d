//! Verify request building and search parsing against JSON test vectors in
//! `test-vectors/`.
//!
//! Each vector names an operation, its inputs, and the request it must
//! produce. Form bodies are compared after urlencoded decoding so the vectors
//! stay readable.

use mal_core::client::parse_search_entry;
use mal_core::{
    ClientConfig, Credentials, EntryFields, EntryType, HttpMethod, HttpRequest, HttpResponse,
    MalClient, DEFAULT_BASE_URL,
};

fn client() -> MalClient {
    MalClient::with_config(Credentials::new("user", "pass").unwrap(), ClientConfig::default()).unwrap()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn kind(input: &serde_json::Value) -> EntryType {
    serde_json::from_value(input["type"].clone()).unwrap()
}

fn fields(input: &serde_json::Value) -> EntryFields {
    serde_json::from_value(input["fields"].clone()).unwrap()
}

fn build(c: &MalClient, case: &serde_json::Value) -> HttpRequest {
    let requests = c.requests();
    let input = &case["input"];

    match case["operation"].as_str().unwrap() {
        "verify_credentials" => requests.build_verify_credentials(),
        "search_entry" => requests.build_search_entry(kind(input), input["name"].as_str().unwrap()),
        "add_entry" => requests.build_add_entry(kind(input), input["id"].as_str().unwrap(), &fields(input)),
        "update_entry" => {
            requests.build_update_entry(kind(input), input["id"].as_str().unwrap(), &fields(input))
        }
        "delete_entry" => requests.build_delete_entry(kind(input), input["id"].as_str().unwrap()),
        other => panic!("unknown operation: {other}"),
    }
    .unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let authorization = vectors["authorization"].as_str().unwrap();
    let base = DEFAULT_BASE_URL.trim_end_matches('/');

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected_request"];
        let req = build(&c, case);

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{base}{}", expected["path"].as_str().unwrap()), "{name}: url");
        assert_eq!(req.header("Authorization"), Some(authorization), "{name}: authorization");
        assert_eq!(
            req.header("content-type"),
            expected["content_type"].as_str(),
            "{name}: content type"
        );
        assert!(req.header("User-Agent").is_some(), "{name}: user agent");

        match expected["data"].as_str() {
            Some(data) => {
                let form: Vec<(String, String)> =
                    serde_urlencoded::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(form, [("data".to_string(), data.to_string())], "{name}: body");
            }
            None => assert!(req.body.is_none(), "{name}: body"),
        }
    }
}

// ---------------------------------------------------------------------------
// Search responses
// ---------------------------------------------------------------------------

#[test]
fn search_test_vectors() {
    let raw = include_str!("../../test-vectors/search.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let kind: EntryType = serde_json::from_value(case["type"].clone()).unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            body: sim["body"].as_str().unwrap().to_string(),
        };

        let entries = parse_search_entry(kind, response).unwrap();
        let actual = serde_json::to_value(&entries).unwrap();
        assert_eq!(actual, case["expected_result"], "{name}: parsed result");
    }
}
