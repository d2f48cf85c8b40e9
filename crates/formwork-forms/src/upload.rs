//! Uploaded-file descriptors
//!
//! Request parsers hand over one descriptor per uploaded file. Multi-file
//! inputs sometimes arrive in the "parallel arrays" layout
//! (`{"name": [..], "type": [..], ...}`); [`normalize_uploads`] turns that into
//! one descriptor per upload index before the values reach the fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// The upload completed without error
pub const UPLOAD_ERR_OK: u32 = 0;
/// The file exceeds the server's upload limit
pub const UPLOAD_ERR_INI_SIZE: u32 = 1;
/// The file exceeds the form's declared limit
pub const UPLOAD_ERR_FORM_SIZE: u32 = 2;
/// Only part of the file arrived
pub const UPLOAD_ERR_PARTIAL: u32 = 3;
/// No file was submitted
pub const UPLOAD_ERR_NO_FILE: u32 = 4;

const DESCRIPTOR_KEYS: [&str; 5] = ["name", "type", "tmp_name", "error", "size"];

/// One uploaded file as reported by the request parser
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadedFile {
	/// Client-side file name
	pub name: String,
	/// MIME type reported by the client
	#[serde(rename = "type")]
	pub mime_type: String,
	/// Where the parser stored the contents
	pub tmp_name: PathBuf,
	pub error: u32,
	/// Size in bytes
	pub size: u64,
}

impl UploadedFile {
	/// Descriptor for a successfully received file
	///
	/// # Examples
	///
	/// ```
	/// use formwork_forms::UploadedFile;
	///
	/// let file = UploadedFile::new("cv.pdf", "application/pdf", "/tmp/php123", 2048);
	/// assert!(file.is_ok());
	/// assert_eq!(file.to_value()["type"], "application/pdf");
	/// ```
	pub fn new(
		name: impl Into<String>,
		mime_type: impl Into<String>,
		tmp_name: impl Into<PathBuf>,
		size: u64,
	) -> Self {
		Self {
			name: name.into(),
			mime_type: mime_type.into(),
			tmp_name: tmp_name.into(),
			error: UPLOAD_ERR_OK,
			size,
		}
	}

	/// Descriptor for an input left empty by the user
	pub fn missing() -> Self {
		Self {
			error: UPLOAD_ERR_NO_FILE,
			..Self::default()
		}
	}

	pub fn with_error(mut self, error: u32) -> Self {
		self.error = error;
		self
	}

	pub fn is_ok(&self) -> bool {
		self.error == UPLOAD_ERR_OK
	}

	pub fn to_value(&self) -> Value {
		serde_json::to_value(self).unwrap_or(Value::Null)
	}
}

impl From<UploadedFile> for Value {
	fn from(file: UploadedFile) -> Self {
		file.to_value()
	}
}

/// Transpose parallel-array upload entries into one descriptor per index.
///
/// Entries already in descriptor form pass through unchanged.
///
/// # Examples
///
/// ```
/// use formwork_forms::normalize_uploads;
/// use serde_json::json;
///
/// let files = json!({
///     "photos": {
///         "name": ["a.png", "b.png"],
///         "type": ["image/png", "image/png"],
///         "tmp_name": ["/tmp/1", "/tmp/2"],
///         "error": [0, 0],
///         "size": [10, 20]
///     }
/// });
/// let normalized = normalize_uploads(files.as_object().unwrap());
/// assert_eq!(normalized["photos"][1]["name"], "b.png");
/// assert_eq!(normalized["photos"][1]["size"], 20);
/// ```
pub fn normalize_uploads(files: &Map<String, Value>) -> Map<String, Value> {
	files
		.iter()
		.map(|(field, entry)| (field.clone(), normalize_entry(entry)))
		.collect()
}

fn normalize_entry(entry: &Value) -> Value {
	let Some(parts) = entry.as_object() else {
		return entry.clone();
	};
	if !parts.get("name").is_some_and(Value::is_array) {
		return entry.clone();
	}

	let mut uploads: Vec<Map<String, Value>> = Vec::new();
	for key in DESCRIPTOR_KEYS {
		let Some(Value::Array(column)) = parts.get(key) else {
			continue;
		};
		for (position, item) in column.iter().enumerate() {
			if uploads.len() <= position {
				uploads.resize_with(position + 1, Map::new);
			}
			uploads[position].insert(key.to_string(), item.clone());
		}
	}

	Value::Array(uploads.into_iter().map(Value::Object).collect())
}
