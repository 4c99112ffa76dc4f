//! The persisted bridge metadata document.
//!
//! Bridged providers keep a small JSON document (conventionally
//! `bridge-metadata.json`, checked into source control) that survives across
//! releases. Independent subsystems each own one top-level key of the
//! document; reading or writing one key never disturbs the others.
//!
//! ```
//! use hemmer_bridge::metadata::ProviderMetadata;
//!
//! let mut doc = ProviderMetadata::from_bytes(br#"{"other": {"kept": true}}"#).unwrap();
//! doc.set("mine", &vec![1, 2, 3]).unwrap();
//!
//! let mine: Option<Vec<u32>> = doc.get("mine").unwrap();
//! assert_eq!(mine, Some(vec![1, 2, 3]));
//! assert!(doc.contains_key("other"));
//! ```

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::error::{BridgeError, Result};

/// Key under which auto-aliasing stores its history.
pub const AUTO_ALIASING_KEY: &str = "auto-aliasing";

/// Conventional file name of the metadata document.
pub const METADATA_FILE_NAME: &str = "bridge-metadata.json";

/// A JSON object whose top-level keys are namespaces owned by different subsystems.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderMetadata {
    data: Map<String, Value>,
}

impl ProviderMetadata {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document. Empty input yields an empty document.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::new());
        }
        let data = serde_json::from_slice(bytes)?;
        Ok(Self { data })
    }

    /// Read the record stored under `key`.
    ///
    /// A missing key is `Ok(None)`; a present key that does not decode as `T`
    /// is an error.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => Ok(Some(serde::Deserialize::deserialize(value)?)),
        }
    }

    /// Store `value` under `key`, replacing whatever was there.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    /// Remove the record under `key`, returning it if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Whether a record exists under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// The namespaces present in the document, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Compact JSON encoding.
    ///
    /// # Panics
    ///
    /// Panics if the document cannot be encoded, which would mean a
    /// `serde_json::Value` failed to serialize.
    pub fn marshal(&self) -> Vec<u8> {
        // The document is a map of `serde_json::Value`s, which always encode.
        serde_json::to_vec(&self.data)
            .unwrap_or_else(|err| panic!("metadata document failed to encode: {}", err))
    }

    /// JSON encoding indented by four spaces, as written to disk.
    ///
    /// # Panics
    ///
    /// Panics under the same condition as [`ProviderMetadata::marshal`].
    pub fn marshal_indent(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        // The document is a map of `serde_json::Value`s, which always encode.
        self.data
            .serialize(&mut ser)
            .unwrap_or_else(|err| panic!("metadata document failed to encode: {}", err));
        out
    }
}

/// A metadata document together with the file it is persisted to.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataInfo {
    /// Where the document lives on disk.
    pub path: PathBuf,
    /// The document itself.
    pub data: ProviderMetadata,
}

impl MetadataInfo {
    /// Wrap an in-memory document that will be saved to `path`.
    pub fn new(path: impl Into<PathBuf>, data: ProviderMetadata) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    /// Load the document at `path`. A missing file is an empty document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = match std::fs::read(path) {
            Ok(bytes) => ProviderMetadata::from_bytes(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no bridge metadata yet, starting empty");
                ProviderMetadata::new()
            },
            Err(err) => return Err(BridgeError::io(path, err)),
        };
        Ok(Self::new(path, data))
    }

    /// Write the document back to its file.
    pub fn save(&self) -> Result<()> {
        let mut bytes = self.data.marshal_indent();
        bytes.push(b'\n');
        std::fs::write(&self.path, bytes).map_err(|err| BridgeError::io(&self.path, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
    }

    #[test]
    fn test_get_missing_key() {
        let doc = ProviderMetadata::new();
        let rec: Option<Record> = doc.get("absent").unwrap();
        assert!(rec.is_none());
    }

    #[test]
    fn test_set_then_get() {
        let mut doc = ProviderMetadata::new();
        doc.set("rec", &Record { name: "a".into() }).unwrap();
        let rec: Option<Record> = doc.get("rec").unwrap();
        assert_eq!(rec, Some(Record { name: "a".into() }));
    }

    #[test]
    fn test_get_wrong_shape_is_error() {
        let doc = ProviderMetadata::from_bytes(br#"{"rec": [1, 2]}"#).unwrap();
        let result: Result<Option<Record>> = doc.get("rec");
        assert!(matches!(result, Err(BridgeError::Serialization(_))));
    }

    #[test]
    fn test_from_bytes_rejects_non_object() {
        assert!(ProviderMetadata::from_bytes(b"[1]").is_err());
        assert!(ProviderMetadata::from_bytes(b"{").is_err());
        assert_eq!(ProviderMetadata::from_bytes(b"  \n").unwrap(), ProviderMetadata::new());
    }

    #[test]
    fn test_sibling_namespaces_round_trip() {
        let input = br#"{"auto-settings": {"resources": {"r": {"x": 1}}}, "zzz": "keep"}"#;
        let mut doc = ProviderMetadata::from_bytes(input).unwrap();
        doc.set(AUTO_ALIASING_KEY, &json!({"resources": {}})).unwrap();

        let value: Value = serde_json::from_slice(&doc.marshal()).unwrap();
        assert_eq!(value["auto-settings"], json!({"resources": {"r": {"x": 1}}}));
        assert_eq!(value["zzz"], json!("keep"));
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["auto-aliasing", "auto-settings", "zzz"]);
    }

    #[test]
    fn test_marshal_indent_uses_four_spaces() {
        let mut doc = ProviderMetadata::new();
        doc.set("k", &json!({"a": 1})).unwrap();
        let text = String::from_utf8(doc.marshal_indent()).unwrap();
        assert_eq!(text, "{\n    \"k\": {\n        \"a\": 1\n    }\n}");
    }

    #[test]
    fn test_remove() {
        let mut doc = ProviderMetadata::new();
        doc.set("k", &1).unwrap();
        assert_eq!(doc.remove("k"), Some(json!(1)));
        assert!(!doc.contains_key("k"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let info = MetadataInfo::load(dir.path().join(METADATA_FILE_NAME)).unwrap();
        assert_eq!(info.data, ProviderMetadata::new());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(METADATA_FILE_NAME);

        let mut info = MetadataInfo::new(&path, ProviderMetadata::new());
        info.data.set("k", &json!({"v": true})).unwrap();
        info.save().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));

        let loaded = MetadataInfo::load(&path).unwrap();
        assert_eq!(loaded, info);
    }

    #[test]
    fn test_save_writes_every_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(METADATA_FILE_NAME);
        let input = br#"{"auto-aliasing": {"resources": {"pkg_r1": {"current": "pkg:index:R1"}}}, "auto-settings": {"x": [1, 2]}}"#;

        let info = MetadataInfo::new(&path, ProviderMetadata::from_bytes(input).unwrap());
        info.save().unwrap();

        let written: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        let expected: Value = serde_json::from_slice(input).unwrap();
        assert_eq!(written, expected);
        assert_eq!(info.data.marshal(), serde_json::to_vec(&expected).unwrap());
    }
}
