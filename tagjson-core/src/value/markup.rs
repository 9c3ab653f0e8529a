use std::fmt;

/// The capability of rendering a value as HTML that is safe to embed in a page as-is.
///
/// Any value with this capability is serialized by the built-in markup tag, and always comes
/// back as a [`Markup`].
pub trait RenderHtml {
    fn render_html(&self) -> String;
}

/// A string of HTML that is known to be safe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Markup(String);

impl Markup {
    /// Wraps already-safe HTML without escaping it.
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// Escapes `text` so that it renders literally in HTML.
    ///
    /// ```rust
    /// use tagjson_core::value::Markup;
    ///
    /// let markup = Markup::escape("<b>Tom & \"Jerry\"</b>");
    /// assert_eq!(markup.as_str(), "&lt;b&gt;Tom &amp; &#34;Jerry&#34;&lt;/b&gt;");
    /// ```
    pub fn escape(text: &str) -> Self {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&#34;"),
                '\'' => out.push_str("&#39;"),
                c => out.push(c),
            }
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl RenderHtml for Markup {
    fn render_html(&self) -> String {
        self.0.clone()
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
