//! Request parameters unified into one lookup map: query < form body < JSON body.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Query, Request},
    http::{self, header::CONTENT_TYPE, Method, Uri},
    Form,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Clone, Debug, Default)]
pub struct RequestData {
    query: Map<String, Value>,
    body: Map<String, Value>,
    data: Map<String, Value>,
}

impl RequestData {
    /// Later sources overwrite earlier keys of the same name.
    pub fn from_sources(query: Map<String, Value>, form: Map<String, Value>, json: Map<String, Value>) -> Self {
        let mut body = form;
        body.extend(json);
        let mut data = query.clone();
        data.extend(body.clone());
        RequestData { query, body, data }
    }

    /// Parse query string and body. A non-empty, non-form body must be valid JSON.
    pub async fn parse(uri: &Uri, content_type: Option<&str>, bytes: Bytes) -> Result<Self, AppError> {
        let query = match uri.query() {
            Some(_) => {
                let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri)
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                strings_to_map(params)
            }
            None => Map::new(),
        };

        let is_form = content_type
            .map(|ct| ct.starts_with(FORM_CONTENT_TYPE))
            .unwrap_or(false);
        let mut form = Map::new();
        let mut json = Map::new();
        if is_form {
            form = parse_form(bytes).await?;
        } else if !bytes.iter().all(u8::is_ascii_whitespace) {
            let value: Value =
                serde_json::from_slice(&bytes).map_err(|e| AppError::MalformedBody(e.to_string()))?;
            if let Value::Object(m) = value {
                json = m;
            }
        }
        Ok(Self::from_sources(query, form, json))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.data.get(key).cloned().unwrap_or(default)
    }

    pub fn all(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Query-string parameter only.
    pub fn query(&self, key: &str) -> Option<&Value> {
        self.query.get(key)
    }

    /// Body parameter only (form or JSON).
    pub fn post(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }
}

fn strings_to_map(params: HashMap<String, String>) -> Map<String, Value> {
    params.into_iter().map(|(k, v)| (k, Value::String(v))).collect()
}

async fn parse_form(bytes: Bytes) -> Result<Map<String, Value>, AppError> {
    let req = http::Request::builder()
        .method(Method::POST)
        .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
        .body(Body::from(bytes))
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let Form(params) = Form::<HashMap<String, String>>::from_request(req, &())
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;
    Ok(strings_to_map(params))
}

#[async_trait]
impl<S> FromRequest<S> for RequestData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let uri = req.uri().clone();
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        RequestData::parse(&uri, content_type.as_deref(), bytes).await
    }
}
