use serde_json::Value;

use crate::{RequestError, Variables};

/// Request fields, either from the URL query string or from a decoded body.
pub type Fields = serde_json::Map<String, Value>;

/// The three parameters driving a GraphQL execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    pub query: Option<String>,
    pub variables: Option<Variables>,
    pub operation_name: Option<String>,
}

impl RequestParams {
    /// Merges URL and body fields, the URL taking precedence. A string `variables` is decoded as
    /// JSON.
    pub fn extract(url: &Fields, body: &Fields) -> Result<Self, RequestError> {
        let query = pick_string(url, body, "query");
        let operation_name = pick_string(url, body, "operationName");

        let variables = match pick(url, body, "variables") {
            None => None,
            Some(Value::String(variables)) => {
                let variables = serde_json::from_str(variables).map_err(RequestError::InvalidVariables)?;
                into_variables(variables)?
            }
            Some(variables) => into_variables(variables.clone())?,
        };

        Ok(RequestParams {
            query,
            variables,
            operation_name,
        })
    }
}

/// A `raw` field, whatever its value, disables GraphiQL.
pub fn has_raw(url: &Fields, body: &Fields) -> bool {
    url.contains_key("raw") || body.contains_key("raw")
}

/// Fields of the URL query string. The first occurrence of a repeated key wins.
pub fn url_fields(uri: &http::Uri) -> Fields {
    let Some(query) = uri.query() else {
        return Fields::new();
    };

    match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
        Ok(pairs) => pairs.into_iter().fold(Fields::new(), |mut fields, (key, value)| {
            fields.entry(key).or_insert(Value::String(value));
            fields
        }),
        Err(err) => {
            tracing::debug!("Ignoring malformed query string: {err}");
            Fields::new()
        }
    }
}

fn pick<'a>(url: &'a Fields, body: &'a Fields, key: &str) -> Option<&'a Value> {
    url.get(key)
        .filter(|value| is_set(value))
        .or_else(|| body.get(key).filter(|value| is_set(value)))
}

fn pick_string(url: &Fields, body: &Fields, key: &str) -> Option<String> {
    match pick(url, body, key)? {
        Value::String(value) => Some(value.clone()),
        other => {
            tracing::debug!("Ignoring non-string '{key}' parameter: {other}");
            None
        }
    }
}

// Empty strings, `false`, zero and `null` count as absent.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(value) => *value,
        Value::Number(value) => value.as_f64() != Some(0.0),
        Value::String(value) => !value.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn into_variables(value: Value) -> Result<Option<Variables>, RequestError> {
    match value {
        Value::Null => Ok(None),
        Value::Object(variables) => Ok(Some(variables)),
        _ => Err(RequestError::VariablesNotAnObject),
    }
}
