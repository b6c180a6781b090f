//! Document-store caster
//!
//! Coerces raw document values by the field's resolved type:
//!
//! | type                         | accepted raw values                         | result                  |
//! |------------------------------|---------------------------------------------|-------------------------|
//! | `id`, `objectid`             | 24-hex string, UUID string, `{"$oid": ..}`  | lower-case string       |
//! | `uuid`                       | UUID string                                 | hyphenated lower-case   |
//! | `integer`, `int`, `long`     | number, numeric string, bool                | integer                 |
//! | `float`, `double`            | number, numeric string, bool                | float                   |
//! | `boolean`, `bool`            | anything                                    | loose truthiness        |
//! | `string`, `text`             | string, number, bool                        | string                  |
//! | `date`, `datetime`           | RFC 3339, `YYYY-MM-DD`, epoch seconds, `{"$date": millis}` | RFC 3339 UTC |
//! | `object`                     | object                                      | members cast by path    |
//!
//! `null` is never coerced. Fields marked `array` wrap scalars in a list and
//! cast each element. Unknown types and undeclared fields pass through.

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde_json::Map;
use uuid::Uuid;

use super::cast::{CastOptions, TypeCaster};
use super::registry::Schema;
use super::errors::{SchemaError, SchemaResult};
use super::types::{is_truthy, Value};

/// Length of a hex-encoded 12-byte object id.
const OBJECT_ID_HEX_LEN: usize = 24;

/// Caster for document stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentCaster;

impl DocumentCaster {
    /// Casts every member of a record by its own key.
    fn cast_record(&self, schema: &Schema, raw: Value, options: &CastOptions) -> SchemaResult<Value> {
        match raw {
            Value::Object(members) => self.cast_members(schema, members, options),
            other => Ok(other),
        }
    }

    fn cast_members(
        &self,
        schema: &Schema,
        members: Map<String, Value>,
        options: &CastOptions,
    ) -> SchemaResult<Value> {
        let mut out = Map::with_capacity(members.len());
        for (key, value) in members {
            let cast = self.cast_field(schema, &key, value, options)?;
            out.insert(key, cast);
        }
        Ok(Value::Object(out))
    }

    fn cast_field(
        &self,
        schema: &Schema,
        key: &str,
        raw: Value,
        options: &CastOptions,
    ) -> SchemaResult<Value> {
        if raw.is_null() {
            return Ok(raw);
        }
        let path = options.qualify(key);
        let Some(def) = schema.field(&path) else {
            return Ok(raw);
        };
        let field_type = schema.field_type(&path).map(str::to_ascii_lowercase);

        if def.is_array() {
            let items = match raw {
                Value::Array(items) => items,
                scalar => vec![scalar],
            };
            let cast = items
                .into_iter()
                .map(|item| self.cast_scalar(schema, &path, field_type.as_deref(), item, options))
                .collect::<SchemaResult<Vec<_>>>()?;
            return Ok(Value::Array(cast));
        }

        self.cast_scalar(schema, &path, field_type.as_deref(), raw, options)
    }

    fn cast_scalar(
        &self,
        schema: &Schema,
        path: &str,
        field_type: Option<&str>,
        value: Value,
        options: &CastOptions,
    ) -> SchemaResult<Value> {
        if value.is_null() {
            return Ok(value);
        }
        match field_type {
            Some("id") | Some("objectid") => cast_object_id(path, value),
            Some("uuid") => cast_uuid(path, value),
            Some("integer") | Some("int") | Some("long") => cast_integer(path, value),
            Some("float") | Some("double") => cast_float(path, value),
            Some("boolean") | Some("bool") => Ok(Value::Bool(is_truthy(&value))),
            Some("string") | Some("text") => cast_string(path, value),
            Some("date") | Some("datetime") => cast_date(path, value),
            Some("object") => match value {
                Value::Object(members) => {
                    let nested = CastOptions {
                        path_key: Some(path.to_string()),
                        ..options.clone()
                    };
                    self.cast_members(schema, members, &nested)
                }
                other => Err(mismatch(path, "object", &other)),
            },
            _ => Ok(value),
        }
    }
}

impl TypeCaster for DocumentCaster {
    fn cast(
        &self,
        schema: &Schema,
        _owner: Option<&str>,
        key: Option<&str>,
        raw: Value,
        options: &CastOptions,
    ) -> SchemaResult<Value> {
        match key {
            None => self.cast_record(schema, raw, options),
            Some(key) => self.cast_field(schema, key, raw, options),
        }
    }

    fn name(&self) -> &'static str {
        "document"
    }
}

fn cast_object_id(path: &str, value: Value) -> SchemaResult<Value> {
    let text = match value {
        Value::String(s) => s,
        Value::Object(mut obj) => match obj.remove("$oid") {
            Some(Value::String(s)) if obj.is_empty() => s,
            _ => return Err(mismatch(path, "object id", &Value::Object(obj))),
        },
        other => return Err(mismatch(path, "object id", &other)),
    };

    if text.len() == OBJECT_ID_HEX_LEN && text.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(Value::String(text.to_ascii_lowercase()));
    }
    match Uuid::parse_str(&text) {
        Ok(id) => Ok(Value::String(id.hyphenated().to_string())),
        Err(_) => Err(SchemaError::cast_failed(path, "object id", format!("{:?}", text))),
    }
}

fn cast_uuid(path: &str, value: Value) -> SchemaResult<Value> {
    match &value {
        Value::String(s) => Uuid::parse_str(s)
            .map(|id| Value::String(id.hyphenated().to_string()))
            .map_err(|e| SchemaError::cast_failed(path, "uuid", format!("{:?} ({})", s, e))),
        _ => Err(mismatch(path, "uuid", &value)),
    }
}

fn cast_integer(path: &str, value: Value) -> SchemaResult<Value> {
    match &value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else {
                float_to_integer(path, n.as_f64().unwrap_or(f64::NAN), &value)
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(Value::from(i));
            }
            match trimmed.parse::<f64>() {
                Ok(f) => float_to_integer(path, f, &value),
                Err(_) => Err(SchemaError::cast_failed(path, "integer", format!("{:?}", s))),
            }
        }
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        _ => Err(mismatch(path, "integer", &value)),
    }
}

fn float_to_integer(path: &str, f: f64, original: &Value) -> SchemaResult<Value> {
    if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Ok(Value::from(f.trunc() as i64))
    } else {
        Err(SchemaError::cast_failed(path, "integer", original.to_string()))
    }
}

fn cast_float(path: &str, value: Value) -> SchemaResult<Value> {
    let f = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    match f {
        Some(f) if f.is_finite() => Ok(Value::from(f)),
        _ => Err(SchemaError::cast_failed(path, "float", value.to_string())),
    }
}

fn cast_string(path: &str, value: Value) -> SchemaResult<Value> {
    match value {
        Value::String(_) => Ok(value),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        other => Err(mismatch(path, "string", &other)),
    }
}

fn cast_date(path: &str, value: Value) -> SchemaResult<Value> {
    let parsed: Option<DateTime<Utc>> = match &value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|naive| Utc.from_utc_datetime(&naive))
            }),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        Value::Object(obj) => obj
            .get("$date")
            .and_then(Value::as_i64)
            .filter(|_| obj.len() == 1)
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    };

    match parsed {
        Some(dt) => Ok(Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
        None => Err(SchemaError::cast_failed(path, "date", value.to_string())),
    }
}

fn mismatch(path: &str, expected: &str, actual: &Value) -> SchemaError {
    SchemaError::cast_failed(path, expected, json_type_name(actual))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
