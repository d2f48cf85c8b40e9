//! Form lifecycle tests
//!
//! Configure, populate, validate and extract values through the public API.

use formwork_forms::fields::{
	CAPTCHA_FAILURE_MESSAGE, CSRF_FAILURE_MESSAGE, CaptchaError, CaptchaVerifier, RecaptchaField,
};
use formwork_forms::{
	FieldConfig, FieldRegistry, FieldResult, FieldSpec, Form, FormConfig, FormError, FormField,
	REQUIRED_MESSAGE, SubmittedRequest, UPLOAD_ERR_PARTIAL, UploadedFile, Validator, build_field,
};
use formwork_sessions::InMemorySessionStore;
use rstest::*;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[fixture]
fn session() -> Arc<InMemorySessionStore> {
	Arc::new(InMemorySessionStore::new())
}

fn build(session: Arc<InMemorySessionStore>, config: Value) -> Form {
	Form::new(FormConfig::from_value(config).unwrap(), session).unwrap()
}

/// Render the form so a token is issued, then submit `body` with that token
fn submit(form: &mut Form, mut body: Value) -> bool {
	form.render();
	body["_csrf"] = json!(form.csrf_token().unwrap());
	form.is_valid(&SubmittedRequest::post(body))
}

#[rstest]
fn test_default_is_filtered_on_configure(session: Arc<InMemorySessionStore>) {
	// Arrange
	let form = build(session, json!({"elements": {"pi": ["number", {"default": "3.140"}]}}));

	// Act
	let value = form.get_value("pi").unwrap();

	// Assert
	assert_eq!(value, Some(&json!(3)));
}

#[rstest]
#[case("0.01", json!("10"), json!(10.0))]
#[case("0.01", json!("2.346"), json!(2.35))]
#[case("1", json!("7.6"), json!(8))]
#[case("any", json!("1.23456"), json!(1.23456))]
fn test_step_controls_rounding(
	session: Arc<InMemorySessionStore>,
	#[case] step: &str,
	#[case] submitted: Value,
	#[case] expected: Value,
) {
	// Arrange
	let mut form = build(session, json!({"elements": {"amount": ["number", {"step": step}]}}));

	// Act
	let valid = submit(&mut form, json!({"amount": submitted}));

	// Assert
	assert!(valid);
	assert_eq!(form.get_value("amount").unwrap(), Some(&expected));
}

#[rstest]
fn test_required_empty_skips_validators(session: Arc<InMemorySessionStore>) {
	// Arrange
	let calls = Arc::new(AtomicUsize::new(0));
	let seen = calls.clone();
	let validator: Validator = Arc::new(move |_, _| {
		seen.fetch_add(1, Ordering::SeqCst);
		Err("unreachable".to_string())
	});
	let config = FormConfig::new("profile").with_element(
		"nickname",
		"text",
		FieldConfig::new().required().with_validator(validator),
	);
	let mut form = Form::new(config, session).unwrap();

	// Act
	let valid = submit(&mut form, json!({"nickname": ""}));

	// Assert
	assert!(!valid);
	assert_eq!(form.get_field("nickname").unwrap().errors(), [REQUIRED_MESSAGE.to_string()]);
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[rstest]
#[case(false)]
#[case(true)]
fn test_unknown_choice_is_rejected(session: Arc<InMemorySessionStore>, #[case] required: bool) {
	// Arrange
	let mut form = build(
		session,
		json!({"elements": {"color": ["select", {
			"required": required,
			"choices": {"Warm": {"red": "Red"}, "blue": "Blue"}
		}]}}),
	);

	// Act
	let valid = submit(&mut form, json!({"color": "green"}));

	// Assert
	assert!(!valid);
	assert_eq!(
		form.get_field("color").unwrap().errors(),
		["Choice is not one of the available options.".to_string()]
	);
}

#[rstest]
fn test_grouped_choice_is_accepted(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(
		session,
		json!({"elements": {"color": ["radio", {"choices": {"Warm": {"red": "Red"}, "blue": "Blue"}}]}}),
	);

	// Act
	let valid = submit(&mut form, json!({"color": "red"}));

	// Assert
	assert!(valid);
}

#[rstest]
#[case(json!(["a"]), false)]
#[case(json!(["a", "b"]), true)]
#[case(json!([]), true)]
fn test_minimum_selected(
	session: Arc<InMemorySessionStore>,
	#[case] selected: Value,
	#[case] expected: bool,
) {
	// Arrange
	let mut form = build(
		session,
		json!({"elements": {"tags": ["checkbox", {
			"minimum_selected": 2,
			"choices": {"a": "A", "b": "B", "c": "C"}
		}]}}),
	);

	// Act
	let valid = submit(&mut form, json!({"tags": selected}));

	// Assert
	assert_eq!(valid, expected);
	if !expected {
		assert_eq!(
			form.get_field("tags").unwrap().errors(),
			["At least 2 options must be selected".to_string()]
		);
	}
}

#[rstest]
fn test_populate_get_values_round_trip(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(
		session.clone(),
		json!({"elements": {
			"title": ["text", {}],
			"count": ["number", {}],
			"color": ["select", {"choices": {"red": "Red", "blue": "Blue"}}],
			"tags": ["multicheckbox", {"choices": {"a": "A", "b": "B"}}],
			"public": ["toggle", {}],
			"go": ["submit", {"label": "Go"}]
		}}),
	);
	form.populate(
		json!({"title": "Hello", "count": "5", "color": "blue", "tags": ["b"], "public": "1"})
			.as_object()
			.unwrap(),
		false,
	);
	let values = form.get_values();

	// Act
	let mut copy = build(
		session,
		json!({"elements": {
			"title": ["text", {}],
			"count": ["number", {}],
			"color": ["select", {"choices": {"red": "Red", "blue": "Blue"}}],
			"tags": ["multicheckbox", {"choices": {"a": "A", "b": "B"}}],
			"public": ["toggle", {}],
			"go": ["submit", {"label": "Go"}]
		}}),
	);
	copy.populate(&values, true);

	// Assert
	assert_eq!(copy.get_values(), values);
	assert_eq!(
		Value::Object(values),
		json!({"title": "Hello", "count": 5, "color": "blue", "tags": ["b"], "public": true})
	);
}

#[rstest]
fn test_belongs_to_nests_values(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(
		session,
		json!({
			"groups": {
				"where": {"legend": "Address", "belongsTo": "address", "elements": {
					"city": ["text", {"required": true}],
					"street": ["text", {}]
				}}
			},
			"elements": {
				"note": ["text", {"belongsTo": "meta"}]
			}
		}),
	);

	// Act
	let valid = submit(
		&mut form,
		json!({"address": {"city": "Lyon", "street": "Rue A"}, "meta": {"note": "hi"}}),
	);

	// Assert
	assert!(valid);
	assert!(form.has_field("address_city"));
	assert!(form.has_field("meta_note"));
	assert_eq!(
		Value::Object(form.get_values()),
		json!({"address": {"city": "Lyon", "street": "Rue A"}, "meta": {"note": "hi"}})
	);
}

#[rstest]
fn test_flat_submission_of_grouped_field(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(
		session,
		json!({"elements": {"city": ["text", {"belongsTo": "address"}]}}),
	);

	// Act
	form.populate(json!({"address_city": "Rome"}).as_object().unwrap(), false);

	// Assert
	assert_eq!(form.get_value("address_city").unwrap(), Some(&json!("Rome")));
}

#[rstest]
fn test_csrf_mismatch_fails_even_when_fields_are_valid(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(session, json!({"name": "login", "elements": {"user": ["text", {}]}}));
	form.render();

	// Act
	let valid = form.is_valid(&SubmittedRequest::post(json!({"user": "ok", "_csrf": "forged"})));

	// Assert
	assert!(!valid);
	assert!(!form.get_field("user").unwrap().has_errors());
	assert_eq!(
		form.get_field("_csrf").unwrap().errors(),
		[CSRF_FAILURE_MESSAGE.to_string()]
	);
}

#[rstest]
fn test_stale_token_is_rejected_after_rerender(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(session, json!({"name": "login", "elements": {"user": ["text", {}]}}));
	form.render();
	let stale = form.csrf_token().unwrap();
	form.render();

	// Act
	let valid = form.is_valid(&SubmittedRequest::post(json!({"user": "ok", "_csrf": stale})));

	// Assert
	assert!(!valid);
}

#[rstest]
fn test_forms_sharing_a_session_keep_separate_tokens(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut login = build(session.clone(), json!({"name": "login"}));
	let mut signup = build(session, json!({"name": "signup"}));
	login.render();
	signup.render();
	let login_token = login.csrf_token().unwrap();
	let signup_token = signup.csrf_token().unwrap();

	// Act & Assert
	assert!(!signup.is_valid(&SubmittedRequest::post(json!({"_csrf": login_token.clone()}))));
	assert!(signup.is_valid(&SubmittedRequest::post(json!({"_csrf": signup_token}))));
	assert!(login.is_valid(&SubmittedRequest::post(json!({"_csrf": login_token}))));
}

#[rstest]
fn test_single_use_token(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(session, json!({"name": "pay", "csrf_single_use": true}));
	form.render();
	let token = form.csrf_token().unwrap();

	// Act
	let first = form.is_valid(&SubmittedRequest::post(json!({"_csrf": token.clone()})));
	let replay = form.is_valid(&SubmittedRequest::post(json!({"_csrf": token})));

	// Assert
	assert!(first);
	assert!(!replay);
}

#[rstest]
fn test_method_is_compared_case_insensitively(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(session, json!({"method": "get", "elements": {"q": ["text", {}]}}));
	form.render();
	let token = form.csrf_token().unwrap();

	// Act
	let valid = form.is_valid(&SubmittedRequest::new("GET").with_body(json!({"q": "rust", "_csrf": token})));

	// Assert
	assert!(valid);
	assert_eq!(form.get_value("q").unwrap(), Some(&json!("rust")));
}

#[rstest]
fn test_password_confirmation_reads_sibling(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(
		session,
		json!({"elements": {
			"password": ["password", {"min_length": 8}],
			"password_again": ["password", {"confirm": "password"}]
		}}),
	);

	// Act
	let mismatch = submit(
		&mut form,
		json!({"password": "correct horse", "password_again": "battery staple"}),
	);
	let errors = form.get_field("password_again").unwrap().errors().to_vec();
	let matched = submit(
		&mut form,
		json!({"password": "correct horse", "password_again": "correct horse"}),
	);

	// Assert
	assert!(!mismatch);
	assert_eq!(errors, ["Field and confirmation field do not match.".to_string()]);
	assert!(matched);
	assert_eq!(form.get_values()["password"], json!("correct horse"));
}

#[rstest]
fn test_required_upload_with_error_fails_as_required(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(session, json!({"elements": {"cv": ["file", {"required": true}]}}));
	let upload = UploadedFile::new("cv.pdf", "application/pdf", "/tmp/none", 10).with_error(UPLOAD_ERR_PARTIAL);
	form.render();
	let request = SubmittedRequest::post(json!({"_csrf": form.csrf_token()}))
		.with_files(json!({"cv": upload}));

	// Act
	let valid = form.is_valid(&request);

	// Assert
	assert!(!valid);
	assert_eq!(form.get_field("cv").unwrap().errors(), [REQUIRED_MESSAGE.to_string()]);
}

#[rstest]
fn test_oversized_upload_stops_before_type_check(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(
		session,
		json!({"elements": {"cv": ["file", {"type": "document", "max_size": 1048576}]}}),
	);
	let upload = UploadedFile::new("song.mp3", "audio/mpeg", "/tmp/none", 3 * 1048576);
	form.render();
	let request = SubmittedRequest::post(json!({"_csrf": form.csrf_token()}))
		.with_files(json!({"cv": upload}));

	// Act
	let valid = form.is_valid(&request);

	// Assert
	assert!(!valid);
	assert_eq!(form.get_field("cv").unwrap().errors(), ["File must be less than 1MB.".to_string()]);
}

#[rstest]
fn test_parallel_array_uploads_reach_the_field(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(
		session,
		json!({"elements": {"docs": ["file", {"type": "document", "multiple": true}]}}),
	);
	form.render();
	let request = SubmittedRequest::post(json!({"_csrf": form.csrf_token()})).with_files(json!({
		"docs": {
			"name": ["a.pdf", "b.txt"],
			"type": ["application/pdf", "text/plain"],
			"tmp_name": ["/tmp/a", "/tmp/b"],
			"error": [0, 0],
			"size": [100, 200]
		}
	}));

	// Act
	let valid = form.is_valid(&request);

	// Assert
	assert!(valid);
	assert_eq!(form.get_values()["docs"][1]["name"], json!("b.txt"));
}

#[rstest]
fn test_image_dimensions_are_checked(session: Arc<InMemorySessionStore>) {
	// Arrange
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("wide.png");
	image::RgbImage::new(40, 10).save(&path).unwrap();
	let mut form = build(
		session,
		json!({"elements": {"banner": ["file", {"type": "image", "width": 32, "height": 32}]}}),
	);
	form.render();
	let upload = UploadedFile::new("wide.png", "image/png", &path, 100);
	let request = SubmittedRequest::post(json!({"_csrf": form.csrf_token()}))
		.with_files(json!({"banner": upload}));

	// Act
	let valid = form.is_valid(&request);

	// Assert
	assert!(!valid);
	assert_eq!(
		form.get_field("banner").unwrap().errors(),
		["File must contain an image no more than 32 pixels wide and 32 pixels tall.".to_string()]
	);
}

#[rstest]
fn test_image_within_bounds_is_accepted(session: Arc<InMemorySessionStore>) {
	// Arrange
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("icon.png");
	image::RgbImage::new(16, 16).save(&path).unwrap();
	let mut form = build(session, json!({"elements": {"icon": ["file", {"type": "image"}]}}));
	form.render();
	let upload = UploadedFile::new("icon.png", "image/png", &path, 100);
	let request = SubmittedRequest::post(json!({"_csrf": form.csrf_token()}))
		.with_files(json!({"icon": upload}));

	// Act & Assert
	assert!(form.is_valid(&request));
}

#[rstest]
fn test_duplicate_registration(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(session, json!({"elements": {"email": ["email", {"default": "old@example.com"}]}}));

	// Act
	let duplicate = form.add_field("email", "text", FieldConfig::new(), None, false);
	form.add_field(
		"email",
		"text",
		FieldConfig::new().with_default(json!("replacement")),
		None,
		true,
	)
	.unwrap();

	// Assert
	assert!(matches!(duplicate, Err(FormError::FieldAlreadyExists(ref name)) if name == "email"));
	assert_eq!(form.get_values()["email"], json!("replacement"));
}

#[rstest]
fn test_configuration_errors_name_the_field(session: Arc<InMemorySessionStore>) {
	// Act
	let result = Form::new(
		FormConfig::from_value(json!({"elements": {"age": ["password", {"min_length": "many"}]}})).unwrap(),
		session,
	);

	// Assert
	assert!(matches!(result, Err(FormError::Field { ref field, .. }) if field == "age"));
}

#[rstest]
fn test_with_defaults_and_revalidate(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut defaults = Map::new();
	defaults.insert("email".to_string(), json!("stored@example.com"));
	let mut form = Form::with_defaults(
		FormConfig::new("edit").with_element("email", "email", FieldConfig::new().required()),
		session,
		&defaults,
	)
	.unwrap();

	// Act
	let email_valid = form.get_field_mut("email").unwrap().validate(&formwork_forms::NoLookup);

	// Assert
	assert!(email_valid);
	assert_eq!(form.get_value("email").unwrap(), Some(&json!("stored@example.com")));
}

struct FixedAnswer(&'static str);

impl CaptchaVerifier for FixedAnswer {
	fn verify(&self, secret: &str, response: &str) -> Result<bool, CaptchaError> {
		Ok(secret == "secret" && response == self.0)
	}
}

fn captcha_form(session: Arc<InMemorySessionStore>) -> Form {
	let mut registry = FieldRegistry::with_builtin_fields();
	registry.register(
		"recaptcha",
		Arc::new(|spec: FieldSpec<'_>| -> FieldResult<Box<dyn FormField>> {
			let field = RecaptchaField::new(spec.name, spec.group).with_verifier(Arc::new(FixedAnswer("solved")));
			Ok(Box::new(build_field(field, spec.config)?) as Box<dyn FormField>)
		}),
	);
	let config = FormConfig::from_value(json!({"name": "contact", "elements": {
		"message": ["textarea", {"required": true}],
		"g-recaptcha-response": ["recaptcha", {"public_key": "site", "private_key": "secret"}]
	}}))
	.unwrap();
	Form::with_registry(config, session, Arc::new(registry)).unwrap()
}

#[rstest]
#[case("solved", true)]
#[case("guessed", false)]
#[case("", false)]
fn test_captcha_gates_the_form(
	session: Arc<InMemorySessionStore>,
	#[case] response: &str,
	#[case] expected: bool,
) {
	// Arrange
	let mut form = captcha_form(session);

	// Act
	let valid = submit(&mut form, json!({"message": "Hello", "g-recaptcha-response": response}));

	// Assert
	assert_eq!(valid, expected);
	let errors = form.get_field("g-recaptcha-response").unwrap().errors().to_vec();
	if expected {
		assert!(errors.is_empty());
		assert_eq!(Value::Object(form.get_values()), json!({"message": "Hello"}));
	} else {
		assert_eq!(errors, [CAPTCHA_FAILURE_MESSAGE.to_string()]);
	}
}

#[rstest]
fn test_reconfigured_form_accepts_only_the_new_fields(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(session, json!({"elements": {"age": ["number", {"required": true}]}}));
	form.configure(FormConfig::from_value(json!({"elements": {"nick": ["text", {}]}})).unwrap())
		.unwrap();

	// Act
	let valid = submit(&mut form, json!({"nick": "ada", "age": "0"}));

	// Assert
	assert!(valid);
	assert!(form.get_field("age").is_err());
	assert_eq!(Value::Object(form.get_values()), json!({"nick": "ada"}));
}

#[rstest]
#[case(json!("0"))]
#[case(json!(0))]
fn test_required_number_rejects_zero(session: Arc<InMemorySessionStore>, #[case] submitted: Value) {
	// Arrange
	let mut form = build(session, json!({"elements": {"qty": ["number", {"required": true}]}}));

	// Act
	let valid = submit(&mut form, json!({"qty": submitted}));

	// Assert
	assert!(!valid);
	assert_eq!(form.get_field("qty").unwrap().errors(), [REQUIRED_MESSAGE.to_string()]);
}

#[rstest]
fn test_huge_number_survives_submission(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(session, json!({"elements": {"mass": ["number", {}]}}));

	// Act
	let valid = submit(&mut form, json!({"mass": "1e30"}));

	// Assert
	assert!(valid);
	assert_eq!(form.get_value("mass").unwrap().and_then(Value::as_f64), Some(1e30));
}
