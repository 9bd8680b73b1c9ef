//! Negotiated representation: output format and language

/// Output format of a response.
///
/// An explicit `format` parameter is trusted verbatim, so unknown values are
/// kept in [`Format::Other`] and rejected later by validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Html,
    Xml,
    Json,
    Other(String),
}

impl Format {
    /// Map a raw `format` value onto a format
    pub fn from_param(value: &str) -> Self {
        match value {
            "html" => Format::Html,
            "xml" => Format::Xml,
            "json" => Format::Json,
            other => Format::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Format::Html => "html",
            Format::Xml => "xml",
            Format::Json => "json",
            Format::Other(s) => s,
        }
    }

    /// `Content-Type` header value for bodies in this format
    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Html => "text/html;charset=UTF-8",
            Format::Xml => "application/xml;charset=UTF-8",
            Format::Json | Format::Other(_) => "application/json;charset=UTF-8",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response language. The `l` parameter is taken verbatim, hence [`Language::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    De,
    En,
    Other(String),
}

impl Language {
    pub fn from_param(value: &str) -> Self {
        match value {
            "de" => Language::De,
            "en" => Language::En,
            other => Language::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Language::De => "de",
            Language::En => "en",
            Language::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
