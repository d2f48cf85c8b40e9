//! HTML escaping for rendered form markup

/// Escape HTML special characters for use in a text node
///
/// # Examples
///
/// ```
/// use formwork_core::escape_html;
///
/// let escaped = escape_html("<b>Tom & 'Jerry'</b>");
/// assert_eq!(escaped, "&lt;b&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/b&gt;");
/// ```
pub fn escape_html(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	for ch in input.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#x27;"),
			_ => out.push(ch),
		}
	}
	out
}

/// Escape a value placed inside a double-quoted HTML attribute
///
/// Line breaks are encoded as well so multi-line values survive a round trip
/// through the browser.
///
/// # Examples
///
/// ```
/// use formwork_core::escape_html_attr;
///
/// let escaped = escape_html_attr("a\"b\nc");
/// assert_eq!(escaped, "a&quot;b&#10;c");
/// ```
pub fn escape_html_attr(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	for ch in input.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#x27;"),
			'\n' => out.push_str("&#10;"),
			'\r' => out.push_str("&#13;"),
			_ => out.push(ch),
		}
	}
	out
}
