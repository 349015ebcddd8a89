use crate::{
    CompileError, Config, Dialect, Placeholder, Raw, Result, Value, placeholders, separated_by,
};

/// Quoting and binding authority of one compilation pass.
///
/// Owns the bindings collected while compiling a single statement, the compilers call
/// [`Formatter::take_bindings`] once a statement is complete.
pub struct Formatter<'a> {
    dialect: &'a dyn Dialect,
    config: &'a Config,
    bindings: Vec<Value>,
}

impl<'a> Formatter<'a> {
    pub fn new(dialect: &'a dyn Dialect, config: &'a Config) -> Self {
        Self {
            dialect,
            config,
            bindings: Vec::new(),
        }
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Quote one identifier part. `*` is never quoted.
    pub fn write_identifier(&self, out: &mut String, value: &str) {
        let value = value.trim();
        if value == "*" {
            out.push('*');
            return;
        }
        self.dialect
            .write_identifier_quoted(out, &self.transform(value));
    }

    /// Identifier after the configured transformation, unquoted.
    pub fn transform(&self, value: &str) -> String {
        match &self.config.identifier_transform {
            Some(transform) => transform(value),
            None => value.to_string(),
        }
    }

    /// Quote a possibly qualified (`a.b`) and aliased (`x as y`) identifier.
    pub fn write_wrapped(&self, out: &mut String, value: &str) {
        let lower = value.to_ascii_lowercase();
        if let Some(i) = lower.find(" as ") {
            self.write_wrapped(out, value[..i].trim());
            out.push_str(" as ");
            self.write_identifier(out, value[i + 4..].trim());
            return;
        }
        separated_by(
            out,
            value.split('.'),
            |out, v| self.write_identifier(out, v),
            ".",
        );
    }

    pub fn wrap(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 2);
        self.write_wrapped(&mut out, value);
        out
    }

    /// Comma separated list of wrapped identifiers.
    pub fn columnize(&self, columns: &[impl AsRef<str>]) -> String {
        let mut out = String::new();
        separated_by(
            &mut out,
            columns,
            |out, v| self.write_wrapped(out, v.as_ref()),
            ", ",
        );
        out
    }

    /// Writes a `?` placeholder and records the binding.
    pub fn parameter(&mut self, out: &mut String, value: &Value) {
        out.push('?');
        self.bindings.push(value.clone());
    }

    pub fn parameters(&mut self, out: &mut String, values: &[Value]) {
        separated_by(out, values, |out, v| self.parameter(out, v), ", ");
    }

    /// Expands the placeholders of a raw fragment, moving its bindings into this formatter.
    pub fn raw(&mut self, out: &mut String, raw: &Raw) -> Result<()> {
        let pieces = placeholders(&raw.sql);
        let expected = pieces
            .iter()
            .filter(|v| matches!(v, Placeholder::Value | Placeholder::Identifier))
            .count();
        if expected != raw.bindings.len() {
            return Err(CompileError::BindingCount {
                expected,
                actual: raw.bindings.len(),
            }
            .into());
        }
        let mut bindings = raw.bindings.iter();
        for piece in pieces {
            match piece {
                Placeholder::Text(v) => out.push_str(v),
                Placeholder::Escaped => out.push_str("\\?"),
                Placeholder::Value => {
                    if let Some(value) = bindings.next() {
                        self.parameter(out, value);
                    }
                }
                Placeholder::Identifier => match bindings.next() {
                    Some(Value::Text(name)) => self.write_wrapped(out, name),
                    Some(v) => return Err(CompileError::IdentifierBinding(v.kind()).into()),
                    None => {}
                },
            }
        }
        Ok(())
    }

    /// Literal rendering of a value, used for DDL defaults and display text.
    pub fn value_literal(&self, out: &mut String, value: &Value) {
        self.dialect.write_value(out, value);
    }

    /// Literal written into compiled DDL, which carries no bindings. Every `?` of the literal
    /// is escaped so it never counts as a placeholder.
    pub fn ddl_literal(&self, out: &mut String, value: &Value) {
        let mut literal = String::new();
        self.dialect.write_value(&mut literal, value);
        escape_placeholders(out, &literal);
    }

    /// String literal for compiled DDL, see [`Formatter::ddl_literal`].
    pub fn ddl_string(&self, out: &mut String, value: &str) {
        let mut literal = String::with_capacity(value.len() + 2);
        self.dialect.write_value_string(&mut literal, value);
        escape_placeholders(out, &literal);
    }

    /// Raw fragment for compiled DDL: bindings become escaped literals, `\?` stays escaped.
    pub fn ddl_raw(&self, out: &mut String, raw: &Raw) -> Result<()> {
        let pieces = placeholders(&raw.sql);
        let expected = pieces
            .iter()
            .filter(|v| matches!(v, Placeholder::Value | Placeholder::Identifier))
            .count();
        if expected != raw.bindings.len() {
            return Err(CompileError::BindingCount {
                expected,
                actual: raw.bindings.len(),
            }
            .into());
        }
        let mut bindings = raw.bindings.iter();
        for piece in pieces {
            match piece {
                Placeholder::Text(v) => out.push_str(v),
                Placeholder::Escaped => out.push_str("\\?"),
                Placeholder::Value => {
                    if let Some(value) = bindings.next() {
                        self.ddl_literal(out, value);
                    }
                }
                Placeholder::Identifier => match bindings.next() {
                    Some(Value::Text(name)) => self.write_wrapped(out, name),
                    Some(v) => return Err(CompileError::IdentifierBinding(v.kind()).into()),
                    None => {}
                },
            }
        }
        Ok(())
    }

    pub fn bindings(&self) -> &[Value] {
        &self.bindings
    }

    pub fn take_bindings(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.bindings)
    }
}

/// Copies `text`, writing `?` as `\?`.
pub fn escape_placeholders(out: &mut String, text: &str) {
    let mut position = 0;
    for (i, c) in text.char_indices() {
        if c == '?' {
            out.push_str(&text[position..i]);
            out.push_str("\\?");
            position = i + 1;
        }
    }
    out.push_str(&text[position..]);
}

/// Substitutes the bindings into `sql` as literals. The result is meant for humans only.
pub fn interpolate(dialect: &dyn Dialect, sql: &str, bindings: &[Value]) -> String {
    let mut out = String::with_capacity(sql.len() + bindings.len() * 8);
    let mut bindings = bindings.iter();
    for piece in placeholders(sql) {
        match piece {
            Placeholder::Text(v) => out.push_str(v),
            Placeholder::Escaped => out.push('?'),
            Placeholder::Identifier => out.push_str("??"),
            Placeholder::Value => match bindings.next() {
                Some(value) => dialect.write_value(&mut out, value),
                None => out.push('?'),
            },
        }
    }
    out
}
