//! Form rendering tests

use formwork_forms::{FieldConfig, FieldRegistry, Form, FormConfig, GroupConfig};
use formwork_sessions::InMemorySessionStore;
use rstest::*;
use serde_json::{Value, json};
use std::sync::Arc;

#[fixture]
fn session() -> Arc<InMemorySessionStore> {
	Arc::new(InMemorySessionStore::new())
}

fn build(session: Arc<InMemorySessionStore>, config: Value) -> Form {
	Form::new(FormConfig::from_value(config).unwrap(), session).unwrap()
}

#[rstest]
fn test_full_page_layout(session: Arc<InMemorySessionStore>) {
	// Arrange
	let config = FormConfig::new("signup")
		.with_action("/signup")
		.with_class("stacked")
		.with_group(
			"account",
			GroupConfig::new()
				.with_legend("Account")
				.with_legend_class("h4")
				.with_description("Used to sign in")
				.with_class("card")
				.with_element("email", "email", FieldConfig::new().with_label("E-mail").required())
				.with_element("ref", "hidden", FieldConfig::new().with_default(json!("ad-42"))),
		)
		.with_group(
			"actions",
			GroupConfig::new()
				.hide_fieldset()
				.with_element("save", "submit", FieldConfig::new().with_label("Save")),
		);
	let form = Form::new(config, session).unwrap();

	// Act
	let html = form.render();

	// Assert
	assert!(html.starts_with(r#"<form id="signup" action="/signup" method="POST" class="form stacked">"#));
	assert!(html.contains(
		r#"<fieldset id="account" class="card"><legend class="h4"><div>Account</div></legend><p class="">Used to sign in</p><div class="form-group " id="field_email">"#
	));
	assert!(html.contains(r#"<input type="email" name="email" id="signup_email" value="" />"#));
	assert!(html.contains(r#"</fieldset><div class="form-group " id="field_save">"#));
	assert!(html.contains(
		r#"<input type="hidden" name="ref" id="signup_ref" value="ad-42" />"#
	));
	assert!(html.contains(r#"<input type="hidden" name="_csrf" id="signup__csrf" value=""#));
	assert!(html.ends_with(r#" autocomplete="off" /></form>"#));
}

#[rstest]
fn test_fieldset_without_legend_has_no_legend(session: Arc<InMemorySessionStore>) {
	// Arrange
	let form = build(session, json!({"elements": {"q": ["text", {}]}}));

	// Act
	let html = form.render();

	// Assert
	assert!(html.contains(r#"<fieldset id="0" class=""><div class="form-group " id="field_q">"#));
	assert!(!html.contains("<legend"));
}

#[rstest]
fn test_errors_are_escaped_after_validation(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(
		session,
		json!({"name": "n", "elements": {"site": ["url", {"label": "<b>Site</b>"}]}}),
	);
	form.populate(json!({"site": "<script>"}).as_object().unwrap(), false);
	form.validate();

	// Act
	let html = form.render();

	// Assert
	assert!(html.contains(r#"<label for="n_site" class=""><b>Site</b> </label>"#));
	assert!(html.contains(r#"value="&lt;script&gt;""#));
	assert!(html.contains(r#"<small class="help-block form-error">Must be a valid URL.</small>"#));
}

#[rstest]
fn test_choice_widgets(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(
		session,
		json!({"name": "order", "elements": {
			"size": ["radio", {"choices": {"s": "Small", "l": "Large"}}],
			"extras": ["multiselect", {"choices": {"ice": "Ice", "lemon": "Lemon"}}],
			"gift": ["toggle", {"label": "Gift wrap"}]
		}}),
	);
	form.populate(json!({"size": "l", "extras": ["lemon"], "gift": true}).as_object().unwrap(), false);

	// Act
	let html = form.render();

	// Assert
	assert!(html.contains(
		r#"<input type="radio" name="size" id="order_size_l" value="l" checked="checked" /><label for="order_size_l">Large</label>"#
	));
	assert!(html.contains(
		r#"<select name="extras[]" id="order_extras" multiple="multiple"><option value="ice">Ice</option><option value="lemon" selected="selected">Lemon</option></select>"#
	));
	assert!(html.contains(r#"<input type="hidden" name="gift" value="0" />"#));
	assert!(html.contains(r#"<label for="order_gift">Gift wrap</label>"#));
}

#[rstest]
fn test_render_view_shows_labels_not_keys(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(
		session,
		json!({"groups": {"prefs": {"legend": "Preferences", "elements": {
			"color": ["select", {"label": "Color", "choices": {"r": "Red", "g": "Green"}}],
			"days": ["checkbox", {"label": "Days", "choices": {"mon": "Monday", "tue": "Tuesday"}}],
			"secret": ["password", {"label": "Password"}],
			"news": ["toggle", {"label": "News"}]
		}}}}),
	);
	form.populate(
		json!({"color": "g", "days": ["mon", "tue"], "secret": "hunter2", "news": "1"})
			.as_object()
			.unwrap(),
		false,
	);

	// Act
	let html = form.render_view(false);

	// Assert
	assert!(html.starts_with(r#"<fieldset id="prefs" class=""><legend class="">Preferences</legend><dl>"#));
	assert!(html.contains("<dt>Color</dt><dd>Green</dd>"));
	assert!(html.contains("<dt>Days</dt><dd>Monday<br>Tuesday</dd>"));
	assert!(html.contains("<dt>News</dt><dd>Yes</dd>"));
	assert!(!html.contains("hunter2"));
	assert!(html.ends_with("</dl></fieldset>"));
}

#[rstest]
fn test_render_hidden_block(session: Arc<InMemorySessionStore>) {
	// Arrange
	let form = build(
		session,
		json!({"name": "f", "elements": {
			"id": ["hidden", {"default": 7}],
			"title": ["text", {}]
		}}),
	);

	// Act
	let hidden = form.render_hidden();

	// Assert
	let lines: Vec<&str> = hidden.lines().collect();
	assert_eq!(lines.len(), 2);
	assert_eq!(lines[0], r#"<input type="hidden" name="id" id="f_id" value="7" />"#);
	assert!(lines[1].starts_with(r#"<input type="hidden" name="_csrf""#));
	assert!(!hidden.contains("title"));
}

#[rstest]
fn test_custom_registry_type_renders(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut registry = FieldRegistry::with_builtin_fields();
	registry.register_alias("phone", "text");
	let config = FormConfig::new("contact").with_element(
		"mobile",
		"phone",
		FieldConfig::new().with_attribute("type", json!("tel")),
	);

	// Act
	let form = Form::with_registry(config, session, Arc::new(registry)).unwrap();

	// Assert
	assert!(form.render().contains(r#"<input type="tel" name="mobile" id="contact_mobile" value="" />"#));
}

#[rstest]
fn test_set_name_changes_ids(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(session, json!({"name": "a", "elements": {"q": ["text", {}]}}));

	// Act
	form.set_name("b");

	// Assert
	assert_eq!(form.name(), "b");
	assert!(form.open_form().starts_with(r#"<form id="b""#));
	assert!(form.render().contains(r#"id="b_q""#));
}

#[rstest]
fn test_csrf_failure_is_shown_at_the_top(session: Arc<InMemorySessionStore>) {
	// Arrange
	let mut form = build(session, json!({"name": "login", "elements": {"user": ["text", {}]}}));
	form.render();
	form.is_valid(&formwork_forms::SubmittedRequest::post(json!({"user": "u", "_csrf": "forged"})));

	// Act
	let html = form.render();

	// Assert
	assert!(html.starts_with(concat!(
		r#"<form id="login" action="" method="POST" class="form ">"#,
		r#"<div class="alert alert-danger" role="alert">CSRF validation failure.</div>"#
	)));
}
