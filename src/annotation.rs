//! Field annotations
//!
//! Every model member may carry a free-form annotation written in
//! struct-tag syntax:
//!
//! ```text
//! json:"age" binding:"required" default:"23" gte:"0" lte:"150" description:"age in years"
//! ```
//!
//! [`Tags`] is the parsed key/value view of that string and [`Constraints`]
//! is the typed record the reflector and renderer work with. Neither ever
//! fails: malformed input simply yields fewer tags.

use {
    crate::{kind::SchemaKind, logging},
    serde_json::{Number, Value},
    std::fmt,
};

/// Parsed `key:"value"` pairs, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    pairs: Vec<(String, String)>,
}

impl Tags {
    /// Parse an annotation. Stops at the first malformed pair and keeps
    /// everything read before it.
    pub fn parse(annotation: &str) -> Self {
        let mut pairs = Vec::new();
        let mut rest = annotation;

        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }

            let key_len = rest
                .bytes()
                .take_while(|&b| b > b' ' && b != b':' && b != b'"' && b != 0x7f)
                .count();
            let bytes = rest.as_bytes();
            if key_len == 0
                || key_len + 1 >= bytes.len()
                || bytes[key_len] != b':'
                || bytes[key_len + 1] != b'"'
            {
                break;
            }
            let key = &rest[..key_len];
            rest = &rest[key_len + 2..];

            let Some((value, consumed)) = read_quoted(rest) else {
                break;
            };
            pairs.push((key.to_string(), value));
            rest = &rest[consumed..];
        }

        Self { pairs }
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value under `key`, or `fallback` when the key is absent or empty.
    pub fn get_or<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        match self.get(key) {
            Some(value) if !value.is_empty() => value,
            _ => fallback,
        }
    }

    /// Replace the value under `key`, appending the pair if it is new.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

// Reads a double-quoted value whose opening quote was already consumed.
// Returns the unescaped value and the number of bytes consumed, including
// the closing quote.
fn read_quoted(input: &str) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((value, i + 1)),
            '\\' => match chars.next()? {
                (_, 'n') => value.push('\n'),
                (_, 't') => value.push('\t'),
                (_, escaped) => value.push(escaped),
            },
            other => value.push(other),
        }
    }
    None
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}:\"")?;
            for c in value.chars() {
                match c {
                    '"' => f.write_str("\\\"")?,
                    '\\' => f.write_str("\\\\")?,
                    '\n' => f.write_str("\\n")?,
                    '\t' => f.write_str("\\t")?,
                    other => write!(f, "{other}")?,
                }
            }
            f.write_str("\"")?;
        }
        Ok(())
    }
}

/// Whether `binding` or `validate` lists the `required` token.
pub fn is_required(tags: &Tags) -> bool {
    ["binding", "validate"].iter().any(|key| {
        tags.get(key)
            .map(|rules| rules.split(',').any(|rule| rule.trim() == "required"))
            .unwrap_or(false)
    })
}

/// Typed constraints of one field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub description: Option<String>,
    /// Raw default; coerced against the field kind by [`coerce`].
    pub default: Option<String>,
    pub one_of: Vec<String>,
    pub min: Option<Number>,
    pub max: Option<Number>,
    pub lt: Option<Number>,
    pub gt: Option<Number>,
    pub lte: Option<Number>,
    pub gte: Option<Number>,
    pub required: bool,
    /// Property name taken from the `json` tag.
    pub json_name: Option<String>,
    /// `json:"-"`
    pub skip: bool,
}

impl Constraints {
    pub fn parse(annotation: &str) -> Self {
        Self::from_tags(&Tags::parse(annotation))
    }

    pub fn from_tags(tags: &Tags) -> Self {
        let non_empty = |key: &str| {
            tags.get(key)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let bound = |key: &str| tags.get(key).and_then(parse_number);

        let (json_name, skip) = match tags.get("json") {
            Some(json) => {
                let name = json.split(',').next().unwrap_or("").trim();
                match name {
                    "-" => (None, true),
                    "" => (None, false),
                    name => (Some(name.to_string()), false),
                }
            }
            None => (None, false),
        };

        Self {
            description: non_empty("description"),
            default: non_empty("default"),
            one_of: tags
                .get("oneof")
                .map(|values| values.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            min: bound("min"),
            max: bound("max"),
            lt: bound("lt"),
            gt: bound("gt"),
            lte: bound("lte"),
            gte: bound("gte"),
            required: is_required(tags),
            json_name,
            skip,
        }
    }

    pub fn description_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.description.as_deref().unwrap_or(fallback)
    }

    /// Enumeration values coerced to `kind`, raw strings where coercion fails.
    pub fn enum_values(&self, kind: SchemaKind) -> Vec<Value> {
        self.one_of
            .iter()
            .map(|raw| coerce(raw, kind).unwrap_or_else(|| Value::String(raw.clone())))
            .collect()
    }
}

/// Parse a bound as an integer when possible, otherwise as a float.
pub fn parse_number(raw: &str) -> Option<Number> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n.into());
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n.into());
    }
    raw.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Coerce a raw annotation value to the JSON representation of `kind`.
pub fn coerce(raw: &str, kind: SchemaKind) -> Option<Value> {
    match kind {
        SchemaKind::Integer => {
            let raw = raw.trim();
            raw.parse::<i64>()
                .map(Value::from)
                .or_else(|_| raw.parse::<u64>().map(Value::from))
                .ok()
        }
        SchemaKind::Number => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        SchemaKind::Boolean => match raw.trim() {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(Value::Bool(true)),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(Value::Bool(false)),
            _ => None,
        },
        SchemaKind::String | SchemaKind::Array | SchemaKind::Object => {
            Some(Value::String(raw.to_string()))
        }
    }
}

/// Coerce a field default, logging values that do not fit the kind.
pub fn coerce_default(field: &str, raw: &str, kind: SchemaKind) -> Option<Value> {
    let value = coerce(raw, kind);
    if value.is_none() {
        logging::log_default_coercion_failed(field, raw, kind);
    }
    value
}
