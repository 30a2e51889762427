use serde::de::DeserializeOwned;

use crate::Result;

/// Decodes a gateway document into `T`.
///
/// With the `tracing` feature, fields `T` does not know about are logged and decode errors
/// carry the JSON path that failed.
#[cfg(feature = "tracing")]
pub(crate) fn from_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    let mut unknown = Vec::new();
    let mut track = |path: serde_ignored::Path<'_>| unknown.push(path.to_string());
    let deserializer = serde_ignored::Deserializer::new(value, &mut track);

    let decoded: T = serde_path_to_error::deserialize(deserializer).inspect_err(|e| {
        tracing::warn!(path = %e.path(), error = %e.inner(), "failed to decode gateway document");
    })?;

    if !unknown.is_empty() {
        tracing::debug!(
            document = std::any::type_name::<T>(),
            fields = ?unknown,
            "gateway document carries fields the client does not model"
        );
    }
    Ok(decoded)
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn from_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}
