use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

use crate::errors::Error;

/// Ordered request payload. A `None` value is an absent ("undefined") entry:
/// it still counts as a key but never reaches the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    entries: Vec<(String, Option<Value>)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, Some(value.into()));
        self
    }

    pub fn with_opt<V: Into<Value>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.set(key, value.map(Into::into));
        self
    }

    /// Sets `key`, replacing an earlier value in place.
    pub fn set(&mut self, key: impl Into<String>, value: Option<Value>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Number of keys, absent ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn defined(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }

    /// `a=1&b=x` form of the defined entries, `None` when nothing is defined.
    pub fn to_query_string(&self) -> Option<String> {
        let pairs = self
            .defined()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(&query_value(v))))
            .collect::<Vec<_>>();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("&"))
        }
    }

    /// JSON object of the defined entries.
    pub fn to_json(&self) -> Value {
        let map = self
            .defined()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<Map<String, Value>>();
        Value::Object(map)
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            entries: map.into_iter().map(|(k, v)| (k, Some(v))).collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, Option<V>)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        let mut payload = Payload::new();
        for (k, v) in iter {
            payload.set(k, v.map(Into::into));
        }
        payload
    }
}

/// One logical HTTP operation: target, payload, verb and header overrides.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub url: String,
    pub payload: Payload,
    pub method: Method,
    pub headers: HeaderMap,
}

impl RequestDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            payload: Payload::new(),
            method: Method::GET,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(url).with_method(Method::POST)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(url).with_method(Method::PUT)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(url).with_method(Method::PATCH)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(url).with_method(Method::DELETE)
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn try_header(self, name: &str, value: &str) -> Result<Self, Error> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::Config(format!("Invalid header name '{name}': {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| Error::Config(format!("Invalid value for header '{name}': {e}")))?;
        Ok(self.with_header(header_name, header_value))
    }

    /// URL actually requested: GET payloads travel as a query string.
    pub fn target_url(&self) -> String {
        if self.method != Method::GET {
            return self.url.clone();
        }
        match self.payload.to_query_string() {
            Some(query) => {
                let sep = if self.url.contains('?') { '&' } else { '?' };
                format!("{}{sep}{query}", self.url)
            }
            None => self.url.clone(),
        }
    }

    /// Mutating verbs with a non-empty payload send it as a JSON body.
    pub fn json_body(&self) -> Option<Value> {
        let sends_body = matches!(
            self.method,
            Method::POST | Method::PUT | Method::PATCH | Method::DELETE
        );
        (sends_body && !self.payload.is_empty()).then(|| self.payload.to_json())
    }
}

/// Stringifies a value the way browser query builders do.
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => query_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

// Form encoding: spaces as '+', '*' kept, '~' escaped.
fn encode_component(raw: &str) -> String {
    urlencoding::encode(raw)
        .replace('~', "%7E")
        .replace("%20", "+")
        .replace("%2A", "*")
}
