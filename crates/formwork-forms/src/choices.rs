//! Choice sets for option-based fields
//!
//! A choice set maps a submitted key to a display label. Entries may nest one
//! level (or more) to form option groups; membership checks and label lookups
//! work on the flattened set.

use crate::html::value_to_string;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// One entry of a choice set
#[derive(Debug, Clone, PartialEq)]
pub enum Choice {
	Label(String),
	/// Option group: the entry's key is the group label
	Group(Choices),
}

/// Ordered choice set
///
/// # Examples
///
/// ```
/// use formwork_forms::Choices;
/// use serde_json::json;
///
/// let choices = Choices::new()
/// 	.with_choice("", "Pick one")
/// 	.with_group("Fruit", Choices::new().with_choice("apple", "Apple"));
///
/// assert!(choices.contains(&json!("apple")));
/// assert_eq!(choices.label_for(&json!("apple")), Some("Apple"));
/// assert!(!choices.contains(&json!("Fruit")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Choices(IndexMap<String, Choice>);

impl Choices {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_choice(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
		self.0.insert(key.into(), Choice::Label(label.into()));
		self
	}

	pub fn with_group(mut self, label: impl Into<String>, choices: Choices) -> Self {
		self.0.insert(label.into(), Choice::Group(choices));
		self
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Choice)> {
		self.0.iter().map(|(key, choice)| (key.as_str(), choice))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Every selectable key with its label, option groups expanded in place
	pub fn flatten(&self) -> IndexMap<&str, &str> {
		let mut flattened = IndexMap::new();
		self.flatten_into(&mut flattened);
		flattened
	}

	fn flatten_into<'a>(&'a self, out: &mut IndexMap<&'a str, &'a str>) {
		for (key, choice) in &self.0 {
			match choice {
				Choice::Label(label) => {
					out.insert(key.as_str(), label.as_str());
				}
				Choice::Group(group) => group.flatten_into(out),
			}
		}
	}

	/// Whether a submitted value names one of the selectable keys
	pub fn contains(&self, value: &Value) -> bool {
		self.label_for(value).is_some()
	}

	/// Label of the choice a submitted value selects
	pub fn label_for(&self, value: &Value) -> Option<&str> {
		let key = choice_key(value)?;
		self.flatten().get(key.as_str()).copied()
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Choices {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(key, label)| (key.into(), Choice::Label(label.into())))
				.collect(),
		)
	}
}

impl TryFrom<Value> for Choices {
	type Error = String;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		let entries: Vec<(String, Value)> = match value {
			Value::Object(map) => map.into_iter().collect(),
			Value::Array(items) => items
				.into_iter()
				.enumerate()
				.map(|(index, item)| (index.to_string(), item))
				.collect(),
			other => return Err(format!("choices must be a map or a list, found {}", other)),
		};

		let mut choices = IndexMap::new();
		for (key, entry) in entries {
			let choice = match entry {
				nested @ (Value::Object(_) | Value::Array(_)) => Choice::Group(Choices::try_from(nested)?),
				scalar => Choice::Label(value_to_string(&scalar)),
			};
			choices.insert(key, choice);
		}
		Ok(Self(choices))
	}
}

/// Key a scalar submission selects; containers never match a single choice
fn choice_key(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
		Value::Null | Value::Array(_) | Value::Object(_) => None,
	}
}
