use std::borrow::Cow;

/// Line break markup substituted for every newline in feed bodies.
pub const LINE_BREAK: &str = "<br />";

/// Escapes HTML-significant characters so extracted text can be embedded in a feed body.
///
/// Replaces `&`, `<`, `>`, `"` and `'` with their entity forms (`&amp;`, `&lt;`,
/// `&gt;`, `&quot;`, `&#39;`). Nothing else is touched: this is entity escaping,
/// not sanitization.
///
/// Returns `Cow::Borrowed` when the input contains none of those characters.
///
/// # Examples
///
/// ```
/// use bulletin_rss::util::escape_html;
///
/// assert_eq!(escape_html("plain"), "plain");
/// assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
/// assert_eq!(escape_html("it's \"quoted\""), "it&#39;s &quot;quoted&quot;");
/// ```
pub fn escape_html(s: &str) -> Cow<'_, str> {
    let needs_escape = s
        .bytes()
        .any(|b| matches!(b, b'&' | b'<' | b'>' | b'"' | b'\''));

    if !needs_escape {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + s.len() / 4);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Converts extracted page text into a feed body.
///
/// The text is escaped first and every `\n` then becomes [`LINE_BREAK`], so the
/// break markup itself is never escaped.
///
/// ```
/// use bulletin_rss::util::to_feed_body;
///
/// assert_eq!(to_feed_body("a&b\nc"), "a&amp;b<br />c");
/// ```
pub fn to_feed_body(text: &str) -> String {
    escape_html(text).replace('\n', LINE_BREAK)
}
