//! The parts of an HTTP request a form consumes

use serde_json::{Map, Value};

/// A parsed submission: method, body fields and uploaded-file descriptors
///
/// # Examples
///
/// ```
/// use formwork_forms::SubmittedRequest;
/// use serde_json::json;
///
/// let request = SubmittedRequest::post(json!({"email": "user@example.com"}));
/// assert_eq!(request.method, "POST");
/// assert_eq!(request.body["email"], "user@example.com");
/// assert!(request.files.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmittedRequest {
	pub method: String,
	pub body: Map<String, Value>,
	/// Upload descriptors keyed by field name, in either encoding accepted by
	/// [`normalize_uploads`](crate::normalize_uploads)
	pub files: Map<String, Value>,
}

impl SubmittedRequest {
	pub fn new(method: impl Into<String>) -> Self {
		Self {
			method: method.into(),
			..Self::default()
		}
	}

	pub fn post(body: Value) -> Self {
		Self::new("POST").with_body(body)
	}

	pub fn get(query: Value) -> Self {
		Self::new("GET").with_body(query)
	}

	/// Replace the body; anything but a JSON object yields an empty body
	pub fn with_body(mut self, body: Value) -> Self {
		self.body = into_map(body);
		self
	}

	pub fn with_files(mut self, files: Value) -> Self {
		self.files = into_map(files);
		self
	}
}

fn into_map(value: Value) -> Map<String, Value> {
	match value {
		Value::Object(map) => map,
		_ => Map::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_builders() {
		// Act
		let request = SubmittedRequest::new("put")
			.with_body(json!({"a": 1}))
			.with_files(json!({"f": {"name": "x"}}));

		// Assert
		assert_eq!(request.method, "put");
		assert_eq!(request.body["a"], json!(1));
		assert_eq!(request.files["f"]["name"], json!("x"));
	}

	#[rstest]
	fn test_non_object_body_is_empty() {
		// Act
		let request = SubmittedRequest::get(json!(["not", "a", "map"]));

		// Assert
		assert_eq!(request.method, "GET");
		assert!(request.body.is_empty());
	}
}
