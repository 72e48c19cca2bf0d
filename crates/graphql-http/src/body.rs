use std::io::Read;

use axum::body::Body;
use bytes::Bytes;
use flate2::read::{GzDecoder, ZlibDecoder};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use mediatype::MediaType;
use serde_json::Value;

use crate::{BodyError, Fields};

/// 100 KiB
pub const DEFAULT_BODY_LIMIT: usize = 100 * 1024;

/// Decodes the fields of a request body. Called for every accepted request, GET included.
#[async_trait::async_trait]
pub trait BodyDecoder: Send + Sync {
    async fn decode(&self, parts: &http::request::Parts, body: Body) -> Result<Fields, BodyError>;
}

/// Understands `application/json`, `application/x-www-form-urlencoded` and
/// `application/graphql` bodies, optionally compressed with gzip or deflate. Requests without a
/// `Content-Type`, or with any other one, have no body fields.
#[derive(Debug, Clone)]
pub struct StandardBodyDecoder {
    limit: usize,
}

impl Default for StandardBodyDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_BODY_LIMIT)
    }
}

#[derive(Debug, Clone, Copy)]
enum BodyFormat {
    Graphql,
    Json,
    Form,
}

impl StandardBodyDecoder {
    pub fn new(limit: usize) -> Self {
        StandardBodyDecoder { limit }
    }

    async fn read(&self, parts: &http::request::Parts, body: Body) -> Result<Bytes, BodyError> {
        let encoding = Encoding::of(parts)?;

        let bytes = match Limited::new(body, self.limit).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => return Err(too_large()),
            Err(err) => {
                tracing::debug!("Failed to read request body: {err}");
                return Err(BodyError::bad_request("Invalid body."));
            }
        };

        match encoding {
            Encoding::Identity => Ok(bytes),
            Encoding::Gzip => self.inflate(GzDecoder::new(&bytes[..])),
            Encoding::Deflate => self.inflate(ZlibDecoder::new(&bytes[..])),
        }
    }

    /// The limit applies to the decompressed body as well.
    fn inflate(&self, decoder: impl Read) -> Result<Bytes, BodyError> {
        let mut inflated = Vec::new();
        decoder
            .take(self.limit as u64 + 1)
            .read_to_end(&mut inflated)
            .map_err(|err| {
                tracing::debug!("Failed to decompress request body: {err}");
                BodyError::bad_request("Invalid body.")
            })?;

        if inflated.len() > self.limit {
            return Err(too_large());
        }

        Ok(Bytes::from(inflated))
    }
}

#[derive(Debug, Clone, Copy)]
enum Encoding {
    Identity,
    Gzip,
    Deflate,
}

impl Encoding {
    fn of(parts: &http::request::Parts) -> Result<Self, BodyError> {
        let Some(encoding) = parts.headers.get(http::header::CONTENT_ENCODING) else {
            return Ok(Encoding::Identity);
        };

        let encoding = encoding.to_str().unwrap_or_default().trim().to_ascii_lowercase();
        match encoding.as_str() {
            "identity" => Ok(Encoding::Identity),
            "gzip" => Ok(Encoding::Gzip),
            "deflate" => Ok(Encoding::Deflate),
            _ => Err(BodyError::unsupported_media_type(format!(
                "Unsupported content-encoding \"{encoding}\"."
            ))),
        }
    }
}

fn too_large() -> BodyError {
    BodyError::new(http::StatusCode::PAYLOAD_TOO_LARGE, "Request body too large.")
}

#[async_trait::async_trait]
impl BodyDecoder for StandardBodyDecoder {
    async fn decode(&self, parts: &http::request::Parts, body: Body) -> Result<Fields, BodyError> {
        let Some(content_type) = parts.headers.get(http::header::CONTENT_TYPE) else {
            return Ok(Fields::new());
        };

        let content_type = content_type
            .to_str()
            .ok()
            .and_then(|value| MediaType::parse(value).ok())
            .ok_or_else(|| BodyError::bad_request("Invalid Content-Type header."))?;

        let ty = content_type.ty.as_str().to_ascii_lowercase();
        let subty = content_type.subty.as_str().to_ascii_lowercase();
        let format = match (ty.as_str(), subty.as_str()) {
            ("application", "graphql") => BodyFormat::Graphql,
            ("application", "json") => BodyFormat::Json,
            ("application", "x-www-form-urlencoded") => BodyFormat::Form,
            _ => return Ok(Fields::new()),
        };

        let charset = content_type
            .params
            .iter()
            .find(|(name, _)| name.as_str().eq_ignore_ascii_case("charset"))
            .map(|(_, value)| value.as_str().trim_matches('"').to_ascii_lowercase())
            .unwrap_or_else(|| "utf-8".to_string());

        if !charset.starts_with("utf-") {
            return Err(BodyError::unsupported_media_type(format!(
                "Unsupported charset \"{}\".",
                charset.to_ascii_uppercase()
            )));
        }

        let bytes = self.read(parts, body).await?;
        let text = std::str::from_utf8(&bytes).map_err(|_| BodyError::bad_request("Invalid body."))?;

        match format {
            BodyFormat::Graphql => {
                let mut fields = Fields::new();
                fields.insert("query".into(), Value::String(text.to_string()));
                Ok(fields)
            }
            BodyFormat::Json => {
                // Only a JSON object can carry GraphQL parameters.
                if !text.trim_start_matches([' ', '\t', '\n', '\r']).starts_with('{') {
                    return Err(BodyError::bad_request("POST body sent invalid JSON."));
                }
                serde_json::from_str(text).map_err(|_| BodyError::bad_request("POST body sent invalid JSON."))
            }
            BodyFormat::Form => serde_urlencoded::from_str::<Vec<(String, String)>>(text)
                // The first occurrence of a repeated key wins, as in the query string.
                .map(|pairs| {
                    pairs.into_iter().fold(Fields::new(), |mut fields, (key, value)| {
                        fields.entry(key).or_insert(Value::String(value));
                        fields
                    })
                })
                .map_err(|_| BodyError::bad_request("POST body sent invalid form data.")),
        }
    }
}
