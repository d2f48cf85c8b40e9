//! reCAPTCHA widget and server-side verification
//!
//! The widget posts the solved challenge under the field's name; validation
//! hands it to a [`CaptchaVerifier`] together with the site's private key.
//! Transport failures are logged and reported as a failed captcha.

use crate::config::FieldConfig;
use crate::field::{FieldCore, FieldKind, FieldLookup, FieldResult, FormField, configure_base};
use formwork_core::escape_html_attr;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const CAPTCHA_FAILURE_MESSAGE: &str = "Could not validate captcha.";

/// Google's verification endpoint
pub const SITE_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

const WIDGET_SCRIPT_URL: &str = "https://www.google.com/recaptcha/api.js";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum CaptchaError {
	#[error("Captcha verification request failed: {0}")]
	Transport(#[from] reqwest::Error),
	#[error("Captcha verification worker panicked")]
	Worker,
}

/// Checks a submitted challenge response against the captcha provider
pub trait CaptchaVerifier: Send + Sync {
	/// `Ok(true)` when the provider accepts `response` for the site owning `secret`
	fn verify(&self, secret: &str, response: &str) -> Result<bool, CaptchaError>;
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
	success: bool,
	#[serde(default, rename = "error-codes")]
	error_codes: Vec<String>,
}

/// HTTP client for the `siteverify` API
///
/// # Examples
///
/// ```no_run
/// use formwork_forms::fields::{CaptchaVerifier, SiteVerifyClient};
/// use std::time::Duration;
///
/// let client = SiteVerifyClient::new().with_timeout(Duration::from_secs(3));
/// let accepted = client.verify("site-secret", "token-from-widget").unwrap_or(false);
/// ```
#[derive(Debug, Clone)]
pub struct SiteVerifyClient {
	endpoint: String,
	timeout: Duration,
}

impl SiteVerifyClient {
	pub fn new() -> Self {
		Self::with_endpoint(SITE_VERIFY_URL)
	}

	/// Point the client at another endpoint (a self-hosted proxy, for example)
	pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
		Self {
			endpoint: endpoint.into(),
			timeout: DEFAULT_TIMEOUT,
		}
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	fn request(&self, secret: &str, response: &str) -> Result<bool, CaptchaError> {
		let client = reqwest::blocking::Client::builder()
			.timeout(self.timeout)
			.build()?;
		let reply: SiteVerifyResponse = client
			.post(&self.endpoint)
			.form(&[("secret", secret), ("response", response)])
			.send()?
			.error_for_status()?
			.json()?;

		if !reply.success {
			tracing::debug!(error_codes = ?reply.error_codes, "captcha response rejected by provider");
		}
		Ok(reply.success)
	}
}

impl Default for SiteVerifyClient {
	fn default() -> Self {
		Self::new()
	}
}

impl CaptchaVerifier for SiteVerifyClient {
	fn verify(&self, secret: &str, response: &str) -> Result<bool, CaptchaError> {
		// The blocking client runs its own runtime and must stay off async worker threads
		std::thread::scope(|scope| scope.spawn(|| self.request(secret, response)).join())
			.unwrap_or(Err(CaptchaError::Worker))
	}
}

/// Options specific to the reCAPTCHA field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RecaptchaOptions {
	/// Site key embedded in the widget
	pub public_key: String,
	/// Secret sent to the provider when verifying
	pub private_key: String,
	pub theme: String,
}

impl Default for RecaptchaOptions {
	fn default() -> Self {
		Self {
			public_key: String::new(),
			private_key: String::new(),
			theme: "dark".to_string(),
		}
	}
}

/// reCAPTCHA challenge.
///
/// Renders Google's widget and verifies the posted response during
/// validation. An empty response fails without contacting the provider. The
/// response token is never part of the extracted form values.
///
/// # Examples
///
/// ```
/// use formwork_forms::{FieldConfig, FormField, build_field};
/// use formwork_forms::fields::RecaptchaField;
/// use serde_json::json;
///
/// let field = build_field(
///     RecaptchaField::new("g-recaptcha-response", None),
///     FieldConfig::new()
///         .with_attribute("public_key", json!("site-key"))
///         .with_attribute("private_key", json!("secret")),
/// )
/// .unwrap();
/// assert!(field.control("f").contains(r#"data-sitekey="site-key""#));
/// assert_eq!(field.value(), None);
/// ```
pub struct RecaptchaField {
	core: FieldCore,
	recaptcha_options: RecaptchaOptions,
	verifier: Arc<dyn CaptchaVerifier>,
}

impl RecaptchaField {
	pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
		Self {
			core: FieldCore::new(name, group),
			recaptcha_options: RecaptchaOptions::default(),
			verifier: Arc::new(SiteVerifyClient::new()),
		}
	}

	/// Verify responses with `verifier` instead of the `siteverify` API
	pub fn with_verifier(mut self, verifier: Arc<dyn CaptchaVerifier>) -> Self {
		self.verifier = verifier;
		self
	}

	pub fn recaptcha_options(&self) -> &RecaptchaOptions {
		&self.recaptcha_options
	}

	fn check_response(&self, response: &str) -> bool {
		if response.is_empty() {
			return false;
		}
		match self.verifier.verify(&self.recaptcha_options.private_key, response) {
			Ok(accepted) => accepted,
			Err(error) => {
				tracing::warn!(field = %self.core.full_name(), error = %error, "captcha verification failed");
				false
			}
		}
	}
}

impl FormField for RecaptchaField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		FieldKind::Recaptcha
	}

	fn configure(&mut self, mut config: FieldConfig) -> FieldResult<()> {
		self.recaptcha_options =
			config.take_options(self.core.name(), &["public_key", "private_key", "theme"])?;
		configure_base(self, config)
	}

	fn value(&self) -> Option<&Value> {
		None
	}

	fn type_check(&self, value: &Value, _lookup: &dyn FieldLookup) -> Result<(), String> {
		if self.check_response(value.as_str().unwrap_or_default()) {
			Ok(())
		} else {
			Err(CAPTCHA_FAILURE_MESSAGE.to_string())
		}
	}

	fn control(&self, _form_name: &str) -> String {
		format!(
			"<script src=\"{}\" async defer></script>\n<div class=\"g-recaptcha\" data-sitekey=\"{}\" data-theme=\"{}\"></div>",
			WIDGET_SCRIPT_URL,
			escape_html_attr(&self.recaptcha_options.public_key),
			escape_html_attr(&self.recaptcha_options.theme)
		)
	}

	fn render_view(&self, _show_empty: bool) -> String {
		String::new()
	}
}

impl fmt::Debug for RecaptchaField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RecaptchaField")
			.field("full_name", &self.core.full_name())
			.field("public_key", &self.recaptcha_options.public_key)
			.finish_non_exhaustive()
	}
}
