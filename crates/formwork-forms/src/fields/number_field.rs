//! Numeric input with step-driven rounding

use crate::config::FieldConfig;
use crate::field::{FieldCore, FieldKind, FieldLookup, FieldResult, FormField, configure_base, is_empty_value};
use crate::html::{render_input, value_to_string};
use serde_json::{Number, Value};

pub const NOT_NUMERIC_MESSAGE: &str = "Must be numeric.";

/// Most fractional digits a `step` can ask for
const MAX_DECIMALS: u32 = 10;

/// Magnitude from which rounded numbers no longer fit an `i64`
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Numeric input.
///
/// Submitted numbers are rounded to as many decimal places as the `step`
/// attribute has (none when `step` is absent or integral). Integral results
/// are stored as integers while they fit an `i64`, and as floats beyond.
/// Values that do not parse are kept as submitted and rejected by validation.
///
/// # Examples
///
/// ```
/// use formwork_forms::{FieldConfig, FormField, build_field};
/// use formwork_forms::fields::NumberField;
/// use serde_json::json;
///
/// let field = build_field(
///     NumberField::new("price", None),
///     FieldConfig::new().with_attribute("step", json!("0.01")).with_default(json!("9.999")),
/// )
/// .unwrap();
/// assert_eq!(field.value(), Some(&json!(10.0)));
/// ```
#[derive(Debug)]
pub struct NumberField {
	core: FieldCore,
}

impl NumberField {
	pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
		let mut core = FieldCore::new(name, group);
		core.attributes
			.insert("type".to_string(), Value::from("number"));
		Self { core }
	}

	/// Decimal places implied by the `step` attribute.
	///
	/// `None` when `step` is present but not a number (`"any"`), in which
	/// case values are not rounded.
	pub fn decimals(&self) -> Option<u32> {
		match self.core.attributes.get("step") {
			None | Some(Value::Null) => Some(0),
			Some(step) => parse_number(step).map(fraction_digits),
		}
	}
}

impl FormField for NumberField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		FieldKind::Number
	}

	fn configure(&mut self, config: FieldConfig) -> FieldResult<()> {
		configure_base(self, config)?;
		self.core
			.attributes
			.insert("type".to_string(), Value::from("number"));
		Ok(())
	}

	fn type_filter(&self, value: Value) -> Value {
		let Some(number) = parse_number(&value) else {
			return value;
		};
		let rounded = match self.decimals() {
			Some(0) => {
				let rounded = number.round();
				if rounded.abs() < I64_LIMIT {
					return Value::from(rounded as i64);
				}
				rounded
			}
			Some(decimals) => {
				let factor = 10f64.powi(decimals as i32);
				let scaled = (number * factor).round() / factor;
				// Past the scaling range the number has no fractional digits left
				if scaled.is_finite() { scaled } else { number }
			}
			None => number,
		};
		Number::from_f64(rounded).map(Value::Number).unwrap_or(value)
	}

	fn type_check(&self, value: &Value, _lookup: &dyn FieldLookup) -> Result<(), String> {
		if is_empty_value(value) || value.is_number() {
			Ok(())
		} else {
			Err(NOT_NUMERIC_MESSAGE.to_string())
		}
	}

	fn control(&self, form_name: &str) -> String {
		render_input(&self.core, form_name, "number", &value_to_string(&self.core.value))
	}
}

fn parse_number(value: &Value) -> Option<f64> {
	let number = match value {
		Value::Number(n) => n.as_f64()?,
		Value::String(s) => s.trim().parse::<f64>().ok()?,
		_ => return None,
	};
	number.is_finite().then_some(number)
}

fn fraction_digits(step: f64) -> u32 {
	let mut scaled = step.abs();
	let mut digits = 0;
	while digits < MAX_DECIMALS && (scaled - scaled.round()).abs() > 1e-9 {
		scaled *= 10.0;
		digits += 1;
	}
	digits
}
