mod http_stub;

use std::sync::Arc;

use folio_admin::backend::Backend;
use folio_admin::config::FirebaseConfig;
use folio_admin::editor::editor_for;
use folio_admin::error::IdentityError;
use folio_admin::identity::IdentityProvider as _;
use folio_admin::sections::SectionId;
use folio_admin::session::SessionStore;
use http_stub::HttpStub;
use serde_json::{Value, json};

const HERO_PATH: &str = "/v1/projects/demo/databases/(default)/documents/content/hero";

fn config(stub: &HttpStub) -> FirebaseConfig {
    FirebaseConfig {
        api_key: "test-key".to_owned(),
        project_id: "demo".to_owned(),
        auth_base: stub.base_url.clone(),
        token_base: stub.base_url.clone(),
        firestore_base: stub.base_url.clone(),
    }
}

fn path_of(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

fn auth_reply(body: &[u8]) -> (u16, String) {
    auth_reply_expiring(body, "3600")
}

fn auth_reply_expiring(body: &[u8], expires_in: &str) -> (u16, String) {
    let request: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    if request["password"] == "correct-horse" {
        let reply = json!({
            "localId": "uid-1",
            "email": request["email"],
            "idToken": "token-1",
            "refreshToken": "refresh-1",
            "expiresIn": expires_in,
        });
        (200, reply.to_string())
    } else {
        (
            400,
            json!({"error": {"message": "INVALID_LOGIN_CREDENTIALS"}}).to_string(),
        )
    }
}

#[tokio::test]
async fn sign_in_maps_credentials_and_errors() -> anyhow::Result<()> {
    let stub = HttpStub::spawn(|req| match path_of(&req.url) {
        "/v1/accounts:signInWithPassword" => auth_reply(&req.body),
        _ => (404, "{}".to_owned()),
    });
    let backend = Backend::firebase(reqwest::Client::new(), &config(&stub));
    let session = SessionStore::resolved(backend.identity());

    let err = session
        .login("ada@example.com", "wrong")
        .await
        .expect_err("bad password");
    assert!(matches!(err, IdentityError::InvalidCredentials));
    assert!(!session.current().is_authenticated());

    let identity = session.login(" Ada@Example.com ", "correct-horse").await?;
    assert_eq!(identity.uid, "uid-1");
    assert_eq!(identity.email, "ada@example.com");
    let credentials = identity.credentials.as_ref().expect("firebase issues credentials");
    assert_eq!(credentials.id_token().await?, "token-1");
    assert!(session.current().is_authenticated());

    let urls: Vec<String> = stub.requests().into_iter().map(|r| r.url).collect();
    assert!(urls.iter().all(|url| url.ends_with("?key=test-key")));
    Ok(())
}

#[tokio::test]
async fn sign_up_reports_existing_account() -> anyhow::Result<()> {
    let stub = HttpStub::spawn(|_| {
        (
            400,
            json!({"error": {"message": "EMAIL_EXISTS"}}).to_string(),
        )
    });
    let backend = Backend::firebase(reqwest::Client::new(), &config(&stub));

    let err = backend
        .identity()
        .sign_up("ada@example.com", "correct-horse")
        .await
        .expect_err("exists");
    assert!(matches!(err, IdentityError::EmailExists(email) if email == "ada@example.com"));
    Ok(())
}

#[tokio::test]
async fn editor_reads_and_writes_firestore_documents_as_user() -> anyhow::Result<()> {
    let stub = HttpStub::spawn(|req| match (req.method.as_str(), path_of(&req.url)) {
        ("POST", "/v1/accounts:signInWithPassword") => auth_reply(&req.body),
        ("GET", HERO_PATH) => (
            200,
            json!({
                "name": "projects/demo/databases/(default)/documents/content/hero",
                "fields": {
                    "intro": {"stringValue": "Hi, I'm"},
                    "name": {"stringValue": "Ada"},
                }
            })
            .to_string(),
        ),
        ("GET", _) => (
            404,
            json!({"error": {"message": "not found"}}).to_string(),
        ),
        ("PATCH", _) => (200, "{}".to_owned()),
        _ => (405, "{}".to_owned()),
    });
    let backend = Backend::firebase(reqwest::Client::new(), &config(&stub));
    let session = SessionStore::resolved(backend.identity());
    session.login("ada@example.com", "correct-horse").await?;

    let store = backend.documents_for(session.user().as_ref());
    let mut editor = editor_for(SectionId::Hero, Arc::clone(&store));
    editor.mount().await;
    assert_eq!(editor.view().draft["name"], json!("Ada"));
    assert_eq!(editor.view().meta.map(|m| m.order), Some(0));

    editor.edit(json!({"op": "set", "field": "subtitle", "value": "Engineer"}))?;
    editor.save().await?;

    let requests = stub.requests();
    let patches: Vec<_> = requests.iter().filter(|r| r.method == "PATCH").collect();
    assert_eq!(patches.len(), 2);
    let hero_patch = patches
        .iter()
        .find(|r| path_of(&r.url) == HERO_PATH)
        .expect("content write");
    let body: Value = serde_json::from_slice(&hero_patch.body)?;
    assert_eq!(
        body.pointer("/fields/subtitle/stringValue"),
        Some(&json!("Engineer"))
    );
    assert!(
        requests
            .iter()
            .filter(|r| r.method != "POST")
            .all(|r| r.authorization.as_deref() == Some("Bearer token-1"))
    );
    Ok(())
}

fn token_reply(body: &[u8]) -> (u16, String) {
    let form = String::from_utf8_lossy(body);
    if form.contains("grant_type=refresh_token") && form.contains("refresh_token=refresh-1") {
        let reply = json!({
            "id_token": "token-2",
            "refresh_token": "refresh-2",
            "expires_in": "3600",
            "token_type": "Bearer",
            "user_id": "uid-1",
        });
        (200, reply.to_string())
    } else {
        (
            400,
            json!({"error": {"message": "INVALID_REFRESH_TOKEN"}}).to_string(),
        )
    }
}

fn hero_document() -> (u16, String) {
    (
        200,
        json!({"fields": {"name": {"stringValue": "Ada"}}}).to_string(),
    )
}

#[tokio::test]
async fn rejected_id_token_is_refreshed_and_request_retried() -> anyhow::Result<()> {
    let stub = HttpStub::spawn(|req| {
        match (
            req.method.as_str(),
            path_of(&req.url),
            req.authorization.as_deref(),
        ) {
            ("POST", "/v1/accounts:signInWithPassword", _) => auth_reply(&req.body),
            ("POST", "/v1/token", _) => token_reply(&req.body),
            // The server has stopped accepting the first token.
            (_, _, Some("Bearer token-1")) => (
                401,
                json!({"error": {"message": "Request had invalid authentication credentials."}})
                    .to_string(),
            ),
            ("GET", HERO_PATH, Some("Bearer token-2")) => hero_document(),
            ("GET", _, Some("Bearer token-2")) => (404, "{}".to_owned()),
            ("PATCH", _, Some("Bearer token-2")) => (200, "{}".to_owned()),
            _ => (403, "{}".to_owned()),
        }
    });
    let backend = Backend::firebase(reqwest::Client::new(), &config(&stub));
    let session = SessionStore::resolved(backend.identity());
    session.login("ada@example.com", "correct-horse").await?;

    let mut editor = editor_for(
        SectionId::Hero,
        backend.documents_for(session.user().as_ref()),
    );
    editor.mount().await;
    assert_eq!(editor.view().draft["name"], json!("Ada"));
    editor.save().await?;

    let requests = stub.requests();
    let refreshes: Vec<_> = requests
        .iter()
        .filter(|r| path_of(&r.url) == "/v1/token")
        .collect();
    // Content and metadata were both rejected; one exchange served both.
    assert_eq!(refreshes.len(), 1);
    assert!(refreshes[0].url.ends_with("?key=test-key"));
    let patches = requests
        .iter()
        .filter(|r| r.method == "PATCH" && r.authorization.as_deref() == Some("Bearer token-2"))
        .count();
    assert_eq!(patches, 2);

    let credentials = session.user().and_then(|u| u.credentials).expect("credentials");
    assert_eq!(credentials.id_token().await?, "token-2");
    Ok(())
}

#[tokio::test]
async fn token_near_expiry_is_refreshed_before_use() -> anyhow::Result<()> {
    let stub = HttpStub::spawn(|req| match (req.method.as_str(), path_of(&req.url)) {
        ("POST", "/v1/accounts:signInWithPassword") => auth_reply_expiring(&req.body, "30"),
        ("POST", "/v1/token") => token_reply(&req.body),
        ("GET", HERO_PATH) => hero_document(),
        _ => (404, "{}".to_owned()),
    });
    let backend = Backend::firebase(reqwest::Client::new(), &config(&stub));
    let session = SessionStore::resolved(backend.identity());
    session.login("ada@example.com", "correct-horse").await?;

    let mut editor = editor_for(
        SectionId::Hero,
        backend.documents_for(session.user().as_ref()),
    );
    editor.mount().await;
    assert_eq!(editor.view().draft["name"], json!("Ada"));

    let requests = stub.requests();
    let firestore: Vec<_> = requests.iter().filter(|r| r.method == "GET").collect();
    assert!(!firestore.is_empty());
    assert!(
        firestore
            .iter()
            .all(|r| r.authorization.as_deref() == Some("Bearer token-2"))
    );
    Ok(())
}

#[tokio::test]
async fn failed_refresh_surfaces_as_save_failure() -> anyhow::Result<()> {
    let stub = HttpStub::spawn(|req| match (req.method.as_str(), path_of(&req.url)) {
        ("POST", "/v1/accounts:signInWithPassword") => auth_reply(&req.body),
        ("POST", "/v1/token") => (
            400,
            json!({"error": {"message": "TOKEN_EXPIRED"}}).to_string(),
        ),
        _ => (401, "{}".to_owned()),
    });
    let backend = Backend::firebase(reqwest::Client::new(), &config(&stub));
    let session = SessionStore::resolved(backend.identity());
    session.login("ada@example.com", "correct-horse").await?;

    let mut editor = editor_for(
        SectionId::Hero,
        backend.documents_for(session.user().as_ref()),
    );
    editor.mount().await;
    let err = editor.save().await.expect_err("refresh rejected");
    assert!(format!("{err}").contains("TOKEN_EXPIRED"));
    Ok(())
}
