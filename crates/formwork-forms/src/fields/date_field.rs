//! Calendar date and wall-clock time inputs

use crate::field::{FieldCore, FieldKind, FieldLookup, FormField, is_empty_value};
use crate::html::{render_input, value_to_string};
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

pub const INVALID_DATE_MESSAGE: &str = "Must be a valid date.";
pub const INVALID_TIME_MESSAGE: &str = "Must be a valid time.";

/// Wire format of `<input type="date">`
const DATE_FORMAT: &str = "%Y-%m-%d";
/// `<input type="time">` submits seconds only when `step` asks for them
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// Date input accepting `YYYY-MM-DD`
///
/// # Examples
///
/// ```
/// use formwork_forms::{FormField, NoLookup};
/// use formwork_forms::fields::DateField;
/// use serde_json::json;
///
/// let mut field = DateField::new("birthday", None);
/// assert!(field.is_valid(Some(json!("2024-02-29")), &NoLookup));
/// assert!(!field.is_valid(Some(json!("2023-02-29")), &NoLookup));
/// ```
#[derive(Debug)]
pub struct DateField {
	core: FieldCore,
}

impl DateField {
	pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
		Self {
			core: FieldCore::new(name, group),
		}
	}

	/// The stored value as a calendar date, when it parses
	pub fn date(&self) -> Option<NaiveDate> {
		parse_date(self.core.value.as_str()?)
	}
}

impl FormField for DateField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		FieldKind::Date
	}

	fn type_check(&self, value: &Value, _lookup: &dyn FieldLookup) -> Result<(), String> {
		if is_empty_value(value) || value.as_str().and_then(parse_date).is_some() {
			Ok(())
		} else {
			Err(INVALID_DATE_MESSAGE.to_string())
		}
	}

	fn control(&self, form_name: &str) -> String {
		render_input(&self.core, form_name, "date", &value_to_string(&self.core.value))
	}
}

/// Time input accepting `HH:MM` or `HH:MM:SS`
#[derive(Debug)]
pub struct TimeField {
	core: FieldCore,
}

impl TimeField {
	pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
		Self {
			core: FieldCore::new(name, group),
		}
	}

	pub fn time(&self) -> Option<NaiveTime> {
		parse_time(self.core.value.as_str()?)
	}
}

impl FormField for TimeField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		FieldKind::Time
	}

	fn type_check(&self, value: &Value, _lookup: &dyn FieldLookup) -> Result<(), String> {
		if is_empty_value(value) || value.as_str().and_then(parse_time).is_some() {
			Ok(())
		} else {
			Err(INVALID_TIME_MESSAGE.to_string())
		}
	}

	fn control(&self, form_name: &str) -> String {
		render_input(&self.core, form_name, "time", &value_to_string(&self.core.value))
	}
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
	NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
	let raw = raw.trim();
	TIME_FORMATS
		.iter()
		.find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
}
