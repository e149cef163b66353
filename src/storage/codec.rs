//! Collection codec
//!
//! Turns raw stored strings into validated values and back. Normal reads are
//! lenient: a value that fails to parse or validate is logged and replaced by
//! the type's default so the application stays usable. Strict reads surface the
//! same problem as `CorruptData` for flows that must not paper over damage
//! (export, verification).

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{TouchlineError, TouchlineResult};
use crate::models::Validate;

use super::adapter::StorageAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    #[default]
    Lenient,
    Strict,
}

/// Parse and validate a raw stored value
pub fn decode<T>(key: &str, raw: Option<&str>, mode: ReadMode) -> TouchlineResult<T>
where
    T: DeserializeOwned + Default + Validate,
{
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(T::default());
    };

    let parsed = serde_json::from_str::<T>(raw)
        .map_err(|e| e.to_string())
        .and_then(|value| value.validate().map(|_| value));

    match (parsed, mode) {
        (Ok(value), _) => Ok(value),
        (Err(reason), ReadMode::Strict) => Err(TouchlineError::corrupt(key, reason)),
        (Err(reason), ReadMode::Lenient) => {
            tracing::warn!(key, reason = %reason, "corrupt collection, using empty default");
            Ok(T::default())
        }
    }
}

/// Validate and serialize a value for storage
///
/// A validation failure aborts before anything is written.
pub fn encode<T>(key: &str, value: &T) -> TouchlineResult<String>
where
    T: Serialize + Validate,
{
    value.validate().map_err(|reason| {
        TouchlineError::ValidationFailed(format!("refusing to write '{}': {}", key, reason))
    })?;
    Ok(serde_json::to_string(value)?)
}

pub async fn read_value<T>(
    adapter: &dyn StorageAdapter,
    key: &str,
    mode: ReadMode,
) -> TouchlineResult<T>
where
    T: DeserializeOwned + Default + Validate,
{
    let raw = adapter.get(key).await?;
    decode(key, raw.as_deref(), mode)
}

pub async fn write_value<T>(adapter: &dyn StorageAdapter, key: &str, value: &T) -> TouchlineResult<()>
where
    T: Serialize + Validate,
{
    let encoded = encode(key, value)?;
    adapter.set(key, encoded).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: i64,
    }

    impl Validate for Counter {
        fn validate(&self) -> Result<(), String> {
            if self.value < 0 {
                Err("negative counter".into())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_empty_value_is_default() {
        let value: Counter = decode("k", None, ReadMode::Strict).unwrap();
        assert_eq!(value, Counter::default());

        let value: Counter = decode("k", Some("  "), ReadMode::Strict).unwrap();
        assert_eq!(value, Counter::default());
    }

    #[test]
    fn test_lenient_read_substitutes_default() {
        let value: Counter = decode("k", Some("{not json"), ReadMode::Lenient).unwrap();
        assert_eq!(value, Counter::default());

        let value: Counter = decode("k", Some(r#"{"value":-1}"#), ReadMode::Lenient).unwrap();
        assert_eq!(value, Counter::default());
    }

    #[test]
    fn test_strict_read_reports_corruption() {
        let err = decode::<Counter>("k", Some(r#"{"value":-1}"#), ReadMode::Strict).unwrap_err();
        assert!(matches!(err, TouchlineError::CorruptData { ref key, .. } if key == "k"));
    }

    #[test]
    fn test_encode_rejects_invalid_value() {
        let err = encode("k", &Counter { value: -5 }).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(encode("k", &Counter { value: 5 }).unwrap(), r#"{"value":5}"#);
    }
}
