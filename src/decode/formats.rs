use super::{Decoder, Value};
use crate::error::{Error, Result};
use simd_json::{OwnedValue, StaticNode};
use std::collections::BTreeMap;
use tracing::{Level, debug, span};

/// JSON descriptors, parsed with `simd-json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

/// TOML descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlDecoder;

impl Decoder for JsonDecoder {
    fn decode(&self, path: &str, bytes: &[u8]) -> Result<Value> {
        let span = span!(Level::DEBUG, "decode_json", path, len = bytes.len());
        let _guard = span.enter();

        // simd-json parses in place
        let mut buffer = bytes.to_vec();
        let parsed = simd_json::to_owned_value(&mut buffer).map_err(|e| Error::decode(path, e))?;
        debug!("parsed JSON descriptor");
        Ok(from_json(&parsed))
    }
}

#[allow(unreachable_patterns)] // 128-bit integer nodes only exist with simd-json's `128bit` feature
fn from_static(node: &StaticNode) -> Value {
    match *node {
        StaticNode::Null => Value::Null,
        StaticNode::Bool(b) => Value::Bool(b),
        StaticNode::I64(i) => Value::Integer(i),
        StaticNode::U64(u) => i64::try_from(u).map_or_else(|_| Value::Float(u as f64), Value::Integer),
        StaticNode::F64(f) => Value::Float(f),
        _ => Value::Null,
    }
}

fn from_json(value: &OwnedValue) -> Value {
    match value {
        OwnedValue::Static(node) => from_static(node),
        OwnedValue::String(s) => Value::String(s.clone()),
        OwnedValue::Array(items) => Value::Sequence(items.iter().map(from_json).collect()),
        OwnedValue::Object(object) => Value::Mapping(
            object
                .iter()
                .map(|(k, v)| (k.to_string(), from_json(v)))
                .collect::<BTreeMap<_, _>>(),
        ),
    }
}

impl Decoder for TomlDecoder {
    fn decode(&self, path: &str, bytes: &[u8]) -> Result<Value> {
        let span = span!(Level::DEBUG, "decode_toml", path, len = bytes.len());
        let _guard = span.enter();

        let text = simdutf8::basic::from_utf8(bytes)
            .map_err(|e| Error::decode(path, format!("invalid UTF-8: {e}")))?;
        let table: toml::Table = toml::from_str(text).map_err(|e| Error::decode(path, e))?;
        debug!(keys = table.len(), "parsed TOML descriptor");
        Ok(Value::Mapping(
            table.iter().map(|(k, v)| (k.clone(), from_toml(v))).collect(),
        ))
    }
}

fn from_toml(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::Integer(*i),
        toml::Value::Float(f) => Value::Float(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Sequence(items.iter().map(from_toml).collect()),
        toml::Value::Table(table) => Value::Mapping(
            table
                .iter()
                .map(|(k, v)| (k.clone(), from_toml(v)))
                .collect(),
        ),
    }
}
