//! Cloud Firestore over its REST surface.
//!
//! Documents are plain JSON objects on our side. Firestore wraps every value
//! in a typed envelope (`{"stringValue": "..."}`), so reads and writes go
//! through [`encode_fields`] / [`decode_fields`].

use anyhow::Context as _;
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use url::Url;

use super::{DocKey, DocumentStore};
use crate::identity::IdTokenSource;

pub const DEFAULT_FIRESTORE_BASE: &str = "https://firestore.googleapis.com";

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct FirestoreDocumentStore {
    client: reqwest::Client,
    config: FirestoreConfig,
    credentials: Option<IdTokenSource>,
}

impl FirestoreDocumentStore {
    pub fn new(client: reqwest::Client, config: FirestoreConfig) -> Self {
        Self {
            client,
            config,
            credentials: None,
        }
    }

    /// Same store, authorizing requests as the signed-in user.
    pub fn with_credentials(mut self, credentials: IdTokenSource) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn document_url(&self, key: &DocKey) -> anyhow::Result<Url> {
        key.validate()?;
        let mut url = Url::parse(&self.config.base_url)
            .with_context(|| format!("parse firestore base url: {}", self.config.base_url))?;
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("firestore base url cannot be a base"))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.config.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                key.namespace.as_str(),
                key.name.as_str(),
            ]);
        url.query_pairs_mut()
            .append_pair("key", &self.config.api_key);
        Ok(url)
    }

    /// Sends with the user's ID token. A 401 refreshes the token and the
    /// request is retried once.
    async fn send(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> anyhow::Result<reqwest::Response> {
        let Some(credentials) = &self.credentials else {
            return Ok(build().send().await?);
        };
        let token = credentials.id_token().await?;
        let response = build().bearer_auth(&token).send().await?;
        if response.status() != reqwest::StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        tracing::info!("firestore rejected id token; refreshing");
        let token = credentials.refresh(&token).await?;
        Ok(build().bearer_auth(token).send().await?)
    }
}

#[async_trait]
impl DocumentStore for FirestoreDocumentStore {
    async fn get(&self, key: &DocKey) -> anyhow::Result<Option<Value>> {
        let url = self.document_url(key)?;
        let response = self
            .send(|| self.client.get(url.clone()))
            .await
            .with_context(|| format!("GET firestore document {key}"))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let raw = response.text().await.context("read firestore response body")?;
        if !status.is_success() {
            let message = parse_error_message(&raw).unwrap_or(raw);
            anyhow::bail!("firestore error reading {key} ({status}): {message}");
        }

        let body: Value = serde_json::from_str(&raw).context("parse firestore document")?;
        let fields = match body.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields)?,
            Some(other) => anyhow::bail!("firestore `fields` is not an object: {other}"),
            None => Map::new(),
        };
        Ok(Some(Value::Object(fields)))
    }

    async fn put(&self, key: &DocKey, document: &Value) -> anyhow::Result<()> {
        let Value::Object(fields) = document else {
            anyhow::bail!("firestore documents must be JSON objects: {key}");
        };
        let url = self.document_url(key)?;
        // PATCH without an update mask replaces every field.
        let body = json!({ "fields": encode_fields(fields) });
        let response = self
            .send(|| self.client.patch(url.clone()).json(&body))
            .await
            .with_context(|| format!("PATCH firestore document {key}"))?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = parse_error_message(&raw).unwrap_or(raw);
            anyhow::bail!("firestore error writing {key} ({status}): {message}");
        }
        Ok(())
    }
}

fn parse_error_message(raw_json: &str) -> Option<String> {
    let value: Value = serde_json::from_str(raw_json).ok()?;
    let message = value.get("error")?.get("message")?.as_str()?.to_owned();
    Some(message)
}

pub fn encode_fields(fields: &Map<String, Value>) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(name, value)| (name.clone(), encode_value(value)))
            .collect(),
    )
}

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> anyhow::Result<Map<String, Value>> {
    fields
        .iter()
        .map(|(name, value)| {
            let decoded = decode_value(value).with_context(|| format!("decode field `{name}`"))?;
            Ok((name.clone(), decoded))
        })
        .collect()
}

pub fn decode_value(value: &Value) -> anyhow::Result<Value> {
    let Some((kind, inner)) = value.as_object().and_then(|obj| obj.iter().next()) else {
        anyhow::bail!("firestore value must be a single-key object: {value}");
    };

    let decoded = match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => Value::Bool(inner.as_bool().unwrap_or(false)),
        "integerValue" => {
            let n = match inner {
                Value::String(s) => s
                    .parse::<i64>()
                    .with_context(|| format!("parse integerValue: {s}"))?,
                Value::Number(n) => n
                    .as_i64()
                    .ok_or_else(|| anyhow::anyhow!("integerValue out of range: {n}"))?,
                other => anyhow::bail!("unexpected integerValue: {other}"),
            };
            Value::from(n)
        }
        "doubleValue" => match inner {
            Value::Number(_) => inner.clone(),
            // NaN and infinities arrive as strings and have no JSON form.
            _ => Value::Null,
        },
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => inner.clone(),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(values)) => values
                    .iter()
                    .map(decode_value)
                    .collect::<anyhow::Result<Vec<_>>>()?,
                _ => Vec::new(),
            };
            Value::Array(values)
        }
        "mapValue" => match inner.get("fields") {
            Some(Value::Object(fields)) => Value::Object(decode_fields(fields)?),
            _ => Value::Object(Map::new()),
        },
        other => anyhow::bail!("unsupported firestore value type: {other}"),
    };
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> FirestoreDocumentStore {
        FirestoreDocumentStore::new(
            reqwest::Client::new(),
            FirestoreConfig {
                project_id: "portfolio-cms".to_owned(),
                api_key: "k3y".to_owned(),
                base_url: "http://127.0.0.1:9".to_owned(),
            },
        )
    }

    #[test]
    fn document_url_addresses_default_database() {
        let url = store().document_url(&DocKey::content("hero")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9/v1/projects/portfolio-cms/databases/(default)/documents/content/hero?key=k3y"
        );
    }

    #[test]
    fn encodes_nested_content_document() {
        let doc = json!({
            "title": "About Me",
            "paragraphs": ["A", "B"],
            "order": 2,
            "enabled": true,
            "image": null,
        });
        let Value::Object(fields) = &doc else { unreachable!() };
        let encoded = encode_fields(fields);

        assert_eq!(encoded["title"], json!({"stringValue": "About Me"}));
        assert_eq!(encoded["order"], json!({"integerValue": "2"}));
        assert_eq!(encoded["enabled"], json!({"booleanValue": true}));
        assert_eq!(encoded["image"], json!({"nullValue": null}));
        assert_eq!(
            encoded["paragraphs"],
            json!({"arrayValue": {"values": [{"stringValue": "A"}, {"stringValue": "B"}]}})
        );
    }

    #[test]
    fn decodes_what_firestore_returns() {
        let fields = json!({
            "Frontend": {"arrayValue": {"values": [{"stringValue": "Rust"}]}},
            "Tools": {"arrayValue": {}},
            "meta": {"mapValue": {"fields": {"order": {"integerValue": "4"}}}},
            "empty": {"mapValue": {}},
            "ratio": {"doubleValue": 0.5},
        });
        let Value::Object(fields) = &fields else { unreachable!() };
        let decoded = decode_fields(fields).unwrap();

        assert_eq!(
            Value::Object(decoded),
            json!({
                "Frontend": ["Rust"],
                "Tools": [],
                "meta": {"order": 4},
                "empty": {},
                "ratio": 0.5,
            })
        );
    }

    #[test]
    fn rejects_unknown_value_types() {
        assert!(decode_value(&json!({"mysteryValue": 1})).is_err());
        assert!(decode_value(&json!("bare")).is_err());
    }
}
