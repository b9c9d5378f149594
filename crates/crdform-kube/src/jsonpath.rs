//! kubectl-style JSONPath expressions for wait conditions
//!
//! Supported syntax, with or without the surrounding `{}`:
//!
//! ```text
//! $ . field ['quoted field'] [index] [-1] [*] .* [?(@.field=="value")] [?(@.field!="value")]
//! ```
//!
//! Recursive descent (`..`), slices and unions are rejected.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Errors raised while parsing an expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonPathError {
    #[error("empty JSONPath expression")]
    Empty,

    #[error("unexpected '{found}' at position {position} in '{expr}'")]
    Unexpected {
        expr: String,
        position: usize,
        found: char,
    },

    #[error("unexpected end of JSONPath expression '{0}'")]
    UnexpectedEnd(String),

    #[error("unbalanced braces in JSONPath expression '{0}'")]
    Unbalanced(String),

    #[error("invalid array index '{0}'")]
    InvalidIndex(String),

    #[error("unsupported JSONPath syntax in '{expr}': {what}")]
    Unsupported { expr: String, what: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Field(String),
    Index(i64),
    Wildcard,
    Filter(Filter),
}

#[derive(Debug, Clone, PartialEq)]
struct Filter {
    path: Vec<String>,
    negate: bool,
    literal: Value,
}

/// A parsed expression
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    source: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn parse(expr: &str) -> Result<Self, JsonPathError> {
        let trimmed = expr.trim();
        let inner = match (trimmed.starts_with('{'), trimmed.ends_with('}')) {
            (true, true) => trimmed[1..trimmed.len() - 1].trim(),
            (false, false) => trimmed,
            _ => return Err(JsonPathError::Unbalanced(expr.to_string())),
        };
        if inner.is_empty() {
            return Err(JsonPathError::Empty);
        }

        let mut parser = Parser {
            expr: inner,
            chars: inner.chars().collect(),
            pos: 0,
        };
        let segments = parser.segments()?;
        Ok(Self {
            source: expr.to_string(),
            segments,
        })
    }

    /// All values the expression selects in `root`
    pub fn evaluate<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];
        for segment in &self.segments {
            let mut next = Vec::new();
            for value in current {
                select(segment, value, &mut next);
            }
            current = next;
        }
        current
    }

    /// Whether any selected value renders as `expected`
    pub fn matches(&self, root: &Value, expected: &str) -> bool {
        self.evaluate(root)
            .into_iter()
            .any(|v| render(v) == expected)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Text form used for comparisons: strings verbatim, everything else as JSON
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn select<'a>(segment: &Segment, value: &'a Value, out: &mut Vec<&'a Value>) {
    match segment {
        Segment::Field(name) => {
            if let Some(v) = value.get(name.as_str()) {
                out.push(v);
            }
        }
        Segment::Index(i) => {
            if let Value::Array(items) = value {
                let idx = if *i < 0 {
                    items.len().checked_sub(i.unsigned_abs() as usize)
                } else {
                    Some(*i as usize)
                };
                if let Some(v) = idx.and_then(|idx| items.get(idx)) {
                    out.push(v);
                }
            }
        }
        Segment::Wildcard => match value {
            Value::Array(items) => out.extend(items),
            Value::Object(fields) => out.extend(fields.values()),
            _ => {}
        },
        Segment::Filter(filter) => {
            if let Value::Array(items) = value {
                out.extend(items.iter().filter(|item| filter.accepts(item)));
            }
        }
    }
}

impl Filter {
    fn accepts(&self, item: &Value) -> bool {
        let mut current = Some(item);
        for field in &self.path {
            current = current.and_then(|v| v.get(field.as_str()));
        }
        let equal = current.is_some_and(|v| render(v) == render(&self.literal));
        equal != self.negate
    }
}

struct Parser<'a> {
    expr: &'a str,
    chars: Vec<char>,
    pos: usize,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn unexpected(&self) -> JsonPathError {
        match self.peek() {
            Some(found) => JsonPathError::Unexpected {
                expr: self.expr.to_string(),
                position: self.pos,
                found,
            },
            None => JsonPathError::UnexpectedEnd(self.expr.to_string()),
        }
    }

    fn unsupported(&self, what: &'static str) -> JsonPathError {
        JsonPathError::Unsupported {
            expr: self.expr.to_string(),
            what,
        }
    }

    fn expect(&mut self, c: char) -> Result<(), JsonPathError> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn ident(&mut self) -> Result<String, JsonPathError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn quoted(&mut self) -> Result<String, JsonPathError> {
        let quote = self.peek().ok_or_else(|| self.unexpected())?;
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(JsonPathError::UnexpectedEnd(self.expr.to_string())),
                Some('\\') => {
                    self.pos += 1;
                    let escaped = self.peek().ok_or_else(|| self.unexpected())?;
                    out.push(escaped);
                    self.pos += 1;
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn segments(&mut self) -> Result<Vec<Segment>, JsonPathError> {
        let mut segments = Vec::new();

        if self.peek() == Some('$') {
            self.pos += 1;
        } else if self.peek().is_some_and(is_ident_char) {
            // `status.phase` is accepted as `.status.phase`
            segments.push(Segment::Field(self.ident()?));
        }

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.pos += 1;
                    match self.peek() {
                        // `{.}` selects the root
                        None => break,
                        Some('.') => return Err(self.unsupported("recursive descent")),
                        Some('*') => {
                            self.pos += 1;
                            segments.push(Segment::Wildcard);
                        }
                        Some(_) => segments.push(Segment::Field(self.ident()?)),
                    }
                }
                '[' => {
                    self.pos += 1;
                    segments.push(self.bracket()?);
                }
                _ => return Err(self.unexpected()),
            }
        }
        Ok(segments)
    }

    fn bracket(&mut self) -> Result<Segment, JsonPathError> {
        self.skip_ws();
        let segment = match self.peek() {
            Some('*') => {
                self.pos += 1;
                Segment::Wildcard
            }
            Some('\'' | '"') => Segment::Field(self.quoted()?),
            Some('?') => {
                self.pos += 1;
                self.expect('(')?;
                let filter = self.filter()?;
                self.expect(')')?;
                Segment::Filter(filter)
            }
            Some(c) if c == '-' || c.is_ascii_digit() => {
                let start = self.pos;
                self.pos += 1;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let text: String = self.chars[start..self.pos].iter().collect();
                if matches!(self.peek(), Some(':')) {
                    return Err(self.unsupported("array slices"));
                }
                if matches!(self.peek(), Some(',')) {
                    return Err(self.unsupported("unions"));
                }
                Segment::Index(
                    text.parse()
                        .map_err(|_| JsonPathError::InvalidIndex(text.clone()))?,
                )
            }
            _ => return Err(self.unexpected()),
        };
        self.skip_ws();
        self.expect(']')?;
        Ok(segment)
    }

    fn filter(&mut self) -> Result<Filter, JsonPathError> {
        self.skip_ws();
        self.expect('@')?;

        let mut path = Vec::new();
        loop {
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    path.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    path.push(self.quoted()?);
                    self.expect(']')?;
                }
                _ => break,
            }
        }

        self.skip_ws();
        let negate = match (self.peek(), self.chars.get(self.pos + 1)) {
            (Some('='), Some('=')) => false,
            (Some('!'), Some('=')) => true,
            _ => return Err(self.unsupported("filters other than == and !=")),
        };
        self.pos += 2;
        self.skip_ws();

        let literal = match self.peek() {
            Some('\'' | '"') => Value::String(self.quoted()?),
            Some(_) => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| !c.is_whitespace() && c != ')')
                {
                    self.pos += 1;
                }
                let token: String = self.chars[start..self.pos].iter().collect();
                serde_json::from_str(&token).map_err(|_| JsonPathError::Unexpected {
                    expr: self.expr.to_string(),
                    position: start,
                    found: self.chars[start],
                })?
            }
            None => return Err(self.unexpected()),
        };
        self.skip_ws();
        Ok(Filter {
            path,
            negate,
            literal,
        })
    }
}
