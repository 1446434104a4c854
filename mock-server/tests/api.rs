use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::auth::authorization_header;
use mock_server::{app, Credentials};
use serde_json::Value;
use tower::ServiceExt;

const HOST: &str = "test.local";

fn creds() -> Credentials {
    Credentials::new("K", "S")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// A request signed over `path` plus the given query and form pairs.
fn signed(method: &str, path: &str, query: &[(&str, &str)], form: &[(&str, &str)]) -> Request<String> {
    let owned = |pairs: &[(&str, &str)]| -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    };
    let mut params = owned(query);
    params.extend(owned(form));
    let authorization = authorization_header(
        &creds(),
        method,
        &format!("http://{HOST}{path}"),
        &params,
        "nonce",
        1_700_000_000,
    );

    let uri = if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", url_encode(query))
    };
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::HOST, HOST)
        .header(http::header::AUTHORIZATION, authorization);
    if !form.is_empty() {
        builder = builder.header(
            http::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
    }
    builder.body(url_encode(form)).unwrap()
}

fn url_encode(pairs: &[(&str, &str)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
        serializer.append_pair(k, v);
    }
    serializer.finish()
}

// --- signature checks ---

#[tokio::test]
async fn unsigned_request_is_rejected() {
    let resp = app(creds())
        .oneshot(
            Request::builder()
                .uri("/oauth_providers")
                .header(http::header::HOST, HOST)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_secret_is_rejected() {
    let resp = app(Credentials::new("K", "other"))
        .oneshot(signed("GET", "/oauth_providers", &[], &[]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["type"], "error");
}

#[tokio::test]
async fn tampered_body_is_rejected() {
    let mut request = signed(
        "POST",
        "/users/u1/email_accounts/acct/folders/Archive",
        &[],
        &[("delimiter", "/")],
    );
    *request.body_mut() = "delimiter=.".to_string();
    let resp = app(creds()).oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- oauth providers ---

#[tokio::test]
async fn list_providers_empty() {
    let resp = app(creds())
        .oneshot(signed("GET", "/oauth_providers", &[], &[]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, serde_json::json!([]));
}

#[tokio::test]
async fn create_provider_requires_all_fields() {
    let resp = app(creds())
        .oneshot(signed("POST", "/oauth_providers", &[], &[("type", "GMAIL")]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_unknown_provider_is_404() {
    let resp = app(creds())
        .oneshot(signed("GET", "/oauth_providers/nope", &[], &[]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- folders ---

#[tokio::test]
async fn seeded_folders_are_listed() {
    let resp = app(creds())
        .oneshot(signed("GET", "/users/u1/email_accounts/acct/folders", &[], &[]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let folders = body_json(resp).await;
    let names: Vec<&str> = folders
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["INBOX", "Sent"]);
    assert_eq!(folders[0]["nb_messages"], 2);
}

#[tokio::test]
async fn names_only_listing_drops_counts() {
    let resp = app(creds())
        .oneshot(signed(
            "GET",
            "/users/u1/email_accounts/acct/folders",
            &[("include_names_only", "1")],
            &[],
        ))
        .await
        .unwrap();
    let folders = body_json(resp).await;
    assert!(folders[0].get("nb_messages").is_none());
}

#[tokio::test]
async fn unknown_folder_is_404() {
    let resp = app(creds())
        .oneshot(signed("GET", "/users/u1/email_accounts/acct/folders/Inbox", &[], &[]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creating_an_existing_folder_conflicts() {
    let resp = app(creds())
        .oneshot(signed("POST", "/users/u1/email_accounts/acct/folders/Sent", &[], &[]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert!(!body_bytes(resp).await.is_empty());
}

// --- messages ---

#[tokio::test]
async fn messages_keep_the_person_info_quirk() {
    let resp = app(creds())
        .oneshot(signed(
            "GET",
            "/users/u1/email_accounts/acct/folders/INBOX/messages",
            &[],
            &[],
        ))
        .await
        .unwrap();
    let messages = body_json(resp).await;
    assert_eq!(messages[0]["person_info"], serde_json::json!([]));
    assert!(messages[1]["person_info"].is_object());
}

#[tokio::test]
async fn limit_and_offset_page_messages() {
    let resp = app(creds())
        .oneshot(signed(
            "GET",
            "/users/u1/email_accounts/acct/folders/INBOX/messages",
            &[("limit", "1"), ("offset", "1")],
            &[],
        ))
        .await
        .unwrap();
    let messages = body_json(resp).await;
    assert_eq!(messages.as_array().unwrap().len(), 1);
    assert_eq!(messages[0]["email_message_id"], "m2");
}

#[tokio::test]
async fn body_can_be_filtered_by_type() {
    let resp = app(creds())
        .oneshot(signed(
            "GET",
            "/users/u1/email_accounts/acct/folders/INBOX/messages/m2/body",
            &[("type", "text/html")],
            &[],
        ))
        .await
        .unwrap();
    let bodies = body_json(resp).await;
    assert_eq!(bodies.as_array().unwrap().len(), 1);
    assert_eq!(bodies[0]["content"], "<p>Noon?</p>");
}

// --- discovery ---

#[tokio::test]
async fn discovery_finds_gmail() {
    let resp = app(creds())
        .oneshot(signed(
            "GET",
            "/discovery",
            &[("email", "someone@gmail.com"), ("source_type", "IMAP")],
            &[],
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["found"], true);
    assert_eq!(body["imap"]["port"], 993);
}

#[tokio::test]
async fn discovery_requires_imap_source() {
    let resp = app(creds())
        .oneshot(signed(
            "GET",
            "/discovery",
            &[("email", "someone@gmail.com"), ("source_type", "POP")],
            &[],
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
