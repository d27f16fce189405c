use std::fmt;

/// Canonical ISO alpha-3 country key.
///
/// Codes are stored exactly as they were produced by resolution; a literal
/// three-character input is accepted unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CountryCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for CountryCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CountryCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Anything a caller may use to name a country.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Identifier {
    Numeric(i64),
    Code(String),
    Name(String),
}

impl Identifier {
    /// Integers become `Numeric`, three ASCII letters become `Code`, anything
    /// else is a `Name`.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if let Ok(n) = s.parse::<i64>() {
            return Identifier::Numeric(n);
        }
        if s.len() == 3 && s.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Identifier::Code(s.to_string());
        }
        Identifier::Name(s.to_string())
    }

    /// Key used for the direct table lookup.
    pub fn key(&self) -> AliasKey {
        match self {
            Identifier::Numeric(n) => AliasKey::Numeric(*n),
            Identifier::Code(s) | Identifier::Name(s) => AliasKey::Text(s.clone()),
        }
    }

    /// String form used when comparing against textual aliases.
    pub fn text(&self) -> String {
        match self {
            Identifier::Numeric(n) => n.to_string(),
            Identifier::Code(s) | Identifier::Name(s) => s.clone(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Identifier::Numeric(_))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{n}"),
            Identifier::Code(s) | Identifier::Name(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Identifier::Numeric(n)
    }
}

impl From<&CountryCode> for Identifier {
    fn from(code: &CountryCode) -> Self {
        Identifier::Code(code.as_str().to_string())
    }
}

/// Key of the identifier resolution table.
///
/// Numeric and textual keys are distinct: `Numeric(156)` and `Text("156")`
/// are separate entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AliasKey {
    Numeric(i64),
    Text(String),
}

impl AliasKey {
    pub fn text(s: impl Into<String>) -> Self {
        AliasKey::Text(s.into())
    }
}

impl From<&CountryCode> for AliasKey {
    fn from(code: &CountryCode) -> Self {
        AliasKey::Text(code.as_str().to_string())
    }
}
