//! Light markup repair applied before parsing, and its inverse after rendering.
//!
//! HTML fragments are rarely well-formed XML. Two repairs get most real
//! content through an XML reader:
//!
//! - self-closing tags (`<br/>`, `<img src="a.png" />`) are expanded into an
//!   explicit start/end pair;
//! - every `&` is escaped, so entity references the reader does not know
//!   (`&nbsp;`, `&copy;`) survive as literal source text.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex_lite::Regex;

/// Matches `<name ...attrs/>`.
static SELF_CLOSING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([A-Za-z][\w:.-]*)([^<>]*?)/>").unwrap()
});

/// Prepare markup for the XML reader.
///
/// # Examples
///
/// ```
/// use htmlchunk::normalize::normalize_markup;
///
/// assert_eq!(normalize_markup("a<br/>b"), "a<br></br>b");
/// assert_eq!(normalize_markup("Tom & Jerry"), "Tom &amp; Jerry");
/// ```
pub fn normalize_markup(html: &str) -> String {
    let expanded = SELF_CLOSING_RE.replace_all(html, "<${1}${2}></${1}>");
    escape_ampersands(&expanded).into_owned()
}

/// Escape every `&` as `&amp;`.
pub fn escape_ampersands(text: &str) -> Cow<'_, str> {
    if text.contains('&') {
        Cow::Owned(text.replace('&', "&amp;"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Undo residual `&amp;` escaping in rendered markup.
///
/// ```
/// use htmlchunk::normalize::restore_ampersands;
///
/// assert_eq!(restore_ampersands("a &amp; b".to_string()), "a & b");
/// ```
pub fn restore_ampersands(markup: String) -> String {
    if markup.contains("&amp;") {
        markup.replace("&amp;", "&")
    } else {
        markup
    }
}
