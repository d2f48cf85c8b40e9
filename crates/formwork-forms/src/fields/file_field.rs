//! File upload input
//!
//! Uploads are checked by the field itself rather than through the validator
//! chain, in a fixed order: required, size ceiling, image dimensions (image
//! uploads only), then the MIME allow-list. Registered validators run last,
//! and only when every upload passed.

use crate::config::FieldConfig;
use crate::field::{
	FieldCore, FieldKind, FieldLookup, FieldResult, FormField, REQUIRED_MESSAGE, configure_base,
};
use crate::html::{attribute_string, input_id};
use crate::upload::{UPLOAD_ERR_NO_FILE, UploadedFile};
use formwork_core::escape_html_attr;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

pub const INVALID_FILE_MESSAGE: &str = "File is invalid.";

const MEBIBYTE: u64 = 1024 * 1024;

const IMAGE_MIME_TYPES: &[&str] = &[
	"image/gif",
	"image/gi_",
	"image/png",
	"application/png",
	"application/x-png",
	"image/jp_",
	"application/jpg",
	"application/x-jpg",
	"image/pjpeg",
	"image/jpeg",
];

const DOCUMENT_MIME_TYPES: &[&str] = &[
	"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
	"application/vnd.openxmlformats-officedocument.presentationml.presentation",
	"application/vnd.openxmlformats-officedocument.wordprocessingml.document",
	"application/mspowerpoint",
	"application/vnd.ms-powerpoint",
	"application/plain",
	"text/plain",
	"application/pdf",
	"application/x-pdf",
	"application/acrobat",
	"text/pdf",
	"text/x-pdf",
	"application/msword",
	"application/vnd.ms-excel",
	"application/msexcel",
	"application/doc",
	"application/vnd.oasis.opendocument.text",
	"application/x-vnd.oasis.opendocument.text",
	"application/vnd.oasis.opendocument.spreadsheet",
	"application/x-vnd.oasis.opendocument.spreadsheet",
	"application/vnd.oasis.opendocument.presentation",
	"application/x-vnd.oasis.opendocument.presentation",
];

const ARCHIVE_MIME_TYPES: &[&str] = &[
	"application/x-compressed",
	"application/gzip-compressed",
	"gzip/document",
	"application/x-zip-compressed",
	"application/zip",
	"multipart/x-zip",
	"application/tar",
	"application/x-tar",
	"application/x-gtar",
	"multipart/x-tar",
	"application/gzip",
	"application/x-gzip",
	"application/x-gunzip",
	"application/gzipped",
];

/// Named MIME allow-lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
	Image,
	Document,
	Archive,
	All,
}

impl FileCategory {
	pub fn mime_types(self) -> Vec<&'static str> {
		match self {
			Self::Image => IMAGE_MIME_TYPES.to_vec(),
			Self::Document => DOCUMENT_MIME_TYPES.to_vec(),
			Self::Archive => ARCHIVE_MIME_TYPES.to_vec(),
			Self::All => [IMAGE_MIME_TYPES, DOCUMENT_MIME_TYPES, ARCHIVE_MIME_TYPES].concat(),
		}
	}

	fn message(self) -> &'static str {
		match self {
			Self::Image => "File must be an image, e.g example.jpg or example.gif",
			Self::Archive => "File must be an archive, e.g example.zip or example.tar",
			Self::Document => "File must be a document, e.g example.doc or example.pdf",
			Self::All => "File must be a document, archive or image.",
		}
	}
}

/// Accepted uploads: a named category or an explicit MIME list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileType {
	Named(FileCategory),
	Custom(Vec<String>),
}

impl Default for FileType {
	fn default() -> Self {
		Self::Named(FileCategory::All)
	}
}

impl FileType {
	pub fn allows(&self, mime_type: &str) -> bool {
		let mime_type = mime_type.trim().to_ascii_lowercase();
		match self {
			Self::Named(category) => category.mime_types().iter().any(|t| *t == mime_type),
			Self::Custom(types) => types.iter().any(|t| t.eq_ignore_ascii_case(&mime_type)),
		}
	}

	fn message(&self) -> &'static str {
		match self {
			Self::Named(category) => category.message(),
			Self::Custom(_) => INVALID_FILE_MESSAGE,
		}
	}
}

/// Options specific to file uploads
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileOptions {
	/// Largest accepted upload in bytes
	pub max_size: u64,
	/// Largest accepted image width in pixels
	pub width: u32,
	pub height: u32,
	pub min_width: u32,
	pub min_height: u32,
	#[serde(rename = "type")]
	pub file_type: FileType,
	/// Stop at the first failing check instead of collecting every failure
	pub stop_on_first_error: bool,
}

impl Default for FileOptions {
	fn default() -> Self {
		Self {
			max_size: 10 * MEBIBYTE,
			width: 1600,
			height: 1600,
			min_width: 0,
			min_height: 0,
			file_type: FileType::default(),
			stop_on_first_error: true,
		}
	}
}

const FILE_OPTION_KEYS: [&str; 7] = [
	"max_size",
	"width",
	"height",
	"min_width",
	"min_height",
	"type",
	"stop_on_first_error",
];

/// File upload field. Its value is one upload descriptor, or a list of them
/// when the input accepts several files.
///
/// # Examples
///
/// ```
/// use formwork_forms::{FieldConfig, FormField, NoLookup, UploadedFile, build_field};
/// use formwork_forms::fields::FileField;
/// use serde_json::json;
///
/// let mut field = build_field(
///     FileField::new("cv", None),
///     FieldConfig::new().with_attribute("type", json!("document")).with_attribute("max_size", json!(1024)),
/// )
/// .unwrap();
///
/// let upload = UploadedFile::new("cv.pdf", "application/pdf", "/tmp/upload", 4096);
/// assert!(!field.is_valid(Some(upload.into()), &NoLookup));
/// assert_eq!(field.errors(), ["File must be less than 0MB.".to_string()]);
/// ```
#[derive(Debug)]
pub struct FileField {
	core: FieldCore,
	file_options: FileOptions,
}

impl FileField {
	pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
		Self {
			core: FieldCore::new(name, group),
			file_options: FileOptions::default(),
		}
	}

	pub fn file_options(&self) -> &FileOptions {
		&self.file_options
	}

	/// Submitted uploads, skipping inputs the user left empty.
	///
	/// `None` when the value is not an upload descriptor (or list of them).
	pub fn uploads(&self) -> Option<Vec<UploadedFile>> {
		let entries = match &self.core.value {
			Value::Null => return Some(Vec::new()),
			Value::String(s) if s.is_empty() => return Some(Vec::new()),
			Value::Array(items) => items.iter().collect::<Vec<_>>(),
			descriptor @ Value::Object(_) => vec![descriptor],
			_ => return None,
		};

		let mut uploads = Vec::with_capacity(entries.len());
		for entry in entries {
			let upload: UploadedFile = serde_json::from_value(entry.clone()).ok()?;
			if upload.error != UPLOAD_ERR_NO_FILE {
				uploads.push(upload);
			}
		}
		Some(uploads)
	}

	fn check_upload(&self, upload: &UploadedFile) -> Vec<String> {
		let options = &self.file_options;
		let stop = options.stop_on_first_error;
		let mut errors = Vec::new();

		if self.is_required() && (!upload.is_ok() || upload.size == 0) {
			errors.push(REQUIRED_MESSAGE.to_string());
			if stop {
				return errors;
			}
		} else if !upload.is_ok() {
			errors.push(INVALID_FILE_MESSAGE.to_string());
			if stop {
				return errors;
			}
		}

		if upload.is_ok() && upload.size > options.max_size {
			errors.push(format!(
				"File must be less than {}MB.",
				format_megabytes(options.max_size)
			));
			if stop {
				return errors;
			}
		}

		if options.file_type == FileType::Named(FileCategory::Image) {
			errors.extend(self.check_image(&upload.tmp_name, stop));
		} else if !options.file_type.allows(&upload.mime_type) {
			errors.push(options.file_type.message().to_string());
		}

		errors
	}

	/// Dimension bounds, then the detected format against the image allow-list
	fn check_image(&self, path: &Path, stop: bool) -> Vec<String> {
		let options = &self.file_options;
		let not_an_image = vec![FileCategory::Image.message().to_string()];

		let Ok(reader) = image::ImageReader::open(path).and_then(|r| r.with_guessed_format()) else {
			return not_an_image;
		};
		let Some(format) = reader.format() else {
			return not_an_image;
		};
		let Ok((width, height)) = reader.into_dimensions() else {
			return not_an_image;
		};

		let mut errors = Vec::new();
		if width > options.width || height > options.height {
			errors.push(format!(
				"File must contain an image no more than {} pixels wide and {} pixels tall.",
				options.width, options.height
			));
			if stop {
				return errors;
			}
		}
		if width < options.min_width || height < options.min_height {
			errors.push(format!(
				"File must contain an image at least {} pixels wide and {} pixels tall.",
				options.min_width, options.min_height
			));
			if stop {
				return errors;
			}
		}
		if !IMAGE_MIME_TYPES.contains(&format.to_mime_type()) {
			errors.push(FileCategory::Image.message().to_string());
		}
		errors
	}
}

impl FormField for FileField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		FieldKind::File
	}

	fn configure(&mut self, mut config: FieldConfig) -> FieldResult<()> {
		self.file_options = config.take_options(self.core.name(), &FILE_OPTION_KEYS)?;
		configure_base(self, config)
	}

	fn validate(&mut self, lookup: &dyn FieldLookup) -> bool {
		self.core.errors.clear();

		let Some(uploads) = self.uploads() else {
			self.add_error(INVALID_FILE_MESSAGE.to_string());
			return false;
		};

		if uploads.is_empty() {
			if self.is_required() {
				self.add_error(REQUIRED_MESSAGE.to_string());
				return false;
			}
			return true;
		}

		for upload in &uploads {
			let errors = self.check_upload(upload);
			if errors.is_empty() {
				continue;
			}
			self.core.errors.extend(errors);
			if self.file_options.stop_on_first_error {
				return false;
			}
		}
		if self.has_errors() {
			return false;
		}

		let value = self.core.value.clone();
		let validators = self.core.validators.clone();
		for validator in &validators {
			if let Err(message) = validator(&value, lookup) {
				self.add_error(message);
				return false;
			}
		}
		true
	}

	fn control(&self, form_name: &str) -> String {
		let multiple = self
			.core
			.attributes
			.get("multiple")
			.is_some_and(|m| m.as_bool().unwrap_or(true));
		let name = if multiple {
			format!("{}[]", self.core.full_name())
		} else {
			self.core.full_name().to_string()
		};
		format!(
			r#"<input type="file" name="{}" id="{}"{} />"#,
			escape_html_attr(&name),
			escape_html_attr(&input_id(form_name, self.core.full_name())),
			attribute_string(&self.core.attributes, &["type"])
		)
	}

	/// Client-side names of the uploaded files
	fn display_value(&self) -> Option<String> {
		let uploads = self.uploads()?;
		Some(
			uploads
				.iter()
				.map(|upload| upload.name.as_str())
				.collect::<Vec<_>>()
				.join(", "),
		)
	}
}

/// Megabytes rounded to two decimals, without trailing zeros
fn format_megabytes(bytes: u64) -> String {
	let megabytes = (bytes as f64 / MEBIBYTE as f64 * 100.0).round() / 100.0;
	format!("{}", megabytes)
}
