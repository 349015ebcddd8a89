use crate::Value;

/// Literal SQL fragment with its own positional bindings.
///
/// Placeholders follow the usual protocol: `?` consumes the next binding as a value,
/// `??` consumes the next binding as an identifier (quoted, not counted as a value binding)
/// and `\?` is a literal question mark consumed by neither.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Raw {
    pub sql: String,
    pub bindings: Vec<Value>,
}

impl Raw {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.bindings.push(value.into());
        self
    }

    pub fn bindings(mut self, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.bindings.extend(values.into_iter().map(Into::into));
        self
    }
}

impl From<&str> for Raw {
    fn from(value: &str) -> Self {
        Raw::new(value)
    }
}

impl From<String> for Raw {
    fn from(value: String) -> Self {
        Raw::new(value)
    }
}

/// One piece of a raw SQL string, as split by the placeholder protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder<'s> {
    Text(&'s str),
    Value,
    Identifier,
    Escaped,
}

/// Splits `sql` into text and placeholders.
pub fn placeholders(sql: &str) -> Vec<Placeholder<'_>> {
    let mut result = Vec::new();
    let bytes = sql.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1) == Some(&b'?') => {
                if start < i {
                    result.push(Placeholder::Text(&sql[start..i]));
                }
                result.push(Placeholder::Escaped);
                i += 2;
                start = i;
            }
            b'?' => {
                if start < i {
                    result.push(Placeholder::Text(&sql[start..i]));
                }
                if bytes.get(i + 1) == Some(&b'?') {
                    result.push(Placeholder::Identifier);
                    i += 2;
                } else {
                    result.push(Placeholder::Value);
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < sql.len() {
        result.push(Placeholder::Text(&sql[start..]));
    }
    result
}

/// Number of unescaped positional value placeholders in `sql`.
pub fn count_placeholders(sql: &str) -> usize {
    placeholders(sql)
        .into_iter()
        .filter(|v| *v == Placeholder::Value)
        .count()
}
