// Text-like fields
pub mod date_field;
pub mod email_field;
pub mod hidden_field;
pub mod number_field;
pub mod password_field;
pub mod text_field;
pub mod url_field;

// Choice fields
pub mod choice_field;
pub mod multiple_choice_field;
pub mod toggle_field;

// Non-data and special fields
pub mod button_field;
pub mod csrf_field;
pub mod file_field;
pub mod markup_field;
pub mod recaptcha_field;

pub use date_field::{DateField, TimeField};
pub use email_field::EmailField;
pub use hidden_field::HiddenField;
pub use number_field::NumberField;
pub use password_field::{PasswordField, PasswordOptions};
pub use text_field::{TextAreaField, TextField};
pub use url_field::UrlField;

pub use choice_field::{ChoiceField, ChoiceOptions, ChoiceWidget};
pub use multiple_choice_field::{MultipleChoiceField, MultipleChoiceOptions, MultipleChoiceWidget};
pub use toggle_field::{ToggleField, ToggleOptions};

pub use button_field::ButtonField;
pub use csrf_field::{CSRF_FAILURE_MESSAGE, CsrfField, CsrfOptions};
pub use file_field::{FileCategory, FileField, FileOptions, FileType};
pub use markup_field::MarkupField;
pub use recaptcha_field::{
	CAPTCHA_FAILURE_MESSAGE, CaptchaError, CaptchaVerifier, RecaptchaField, RecaptchaOptions,
	SITE_VERIFY_URL, SiteVerifyClient,
};
