use crate::{
    ColumnCompiler, CompiledStatement, Method, QueryCompiler, QueryOutput, RawResponse, Result,
    SchemaCompiler, TableCompiler, Value,
};
use std::fmt::Write;
use time::{Date, PrimitiveDateTime, Time};

/// Strategy object of a database flavour: quoting, literals, native placeholders, response
/// normalization and the four compilers.
///
/// Every method has a default rendering the common SQL form, implementors override the parts
/// their database writes differently.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    fn query_compiler(&self) -> &dyn QueryCompiler;
    fn schema_compiler(&self) -> &dyn SchemaCompiler;
    fn table_compiler(&self) -> &dyn TableCompiler;
    fn column_compiler(&self) -> &dyn ColumnCompiler;

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', "\"\"");
        out.push('"');
    }

    /// Render a concrete value as a SQL literal.
    fn write_value(&self, out: &mut String, value: &Value) {
        match value {
            Value::Null => out.push_str("NULL"),
            Value::Default => out.push_str("DEFAULT"),
            Value::Boolean(v) => self.write_value_bool(out, *v),
            Value::Int(v) => out.push_str(itoa::Buffer::new().format(*v)),
            Value::Float(v) => self.write_value_float(out, *v),
            Value::Decimal(v) => drop(write!(out, "{}", v)),
            Value::Text(v) | Value::Json(v) => self.write_value_string(out, v),
            Value::Blob(v) => self.write_value_blob(out, v),
            Value::Date(v) => {
                out.push('\'');
                self.write_value_date(out, v);
                out.push('\'');
            }
            Value::Time(v) => {
                out.push('\'');
                self.write_value_time(out, v);
                out.push('\'');
            }
            Value::Timestamp(v) => self.write_value_timestamp(out, v),
            Value::Uuid(v) => drop(write!(out, "'{}'", v)),
        }
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize]);
    }

    fn write_value_float(&self, out: &mut String, value: f64) {
        if value.is_nan() {
            out.push_str("'NaN'");
        } else if value.is_infinite() {
            out.push_str(if value < 0.0 {
                "'-Infinity'"
            } else {
                "'Infinity'"
            });
        } else {
            out.push_str(ryu::Buffer::new().format_finite(value));
        }
    }

    /// Render and escape a string literal using single quotes.
    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(out, value, '\'', "''");
        out.push('\'');
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        out.push_str(&hex::encode_upper(value));
        out.push('\'');
    }

    fn write_value_date(&self, out: &mut String, value: &Date) {
        let _ = write!(
            out,
            "{:04}-{:02}-{:02}",
            value.year(),
            value.month() as u8,
            value.day()
        );
    }

    fn write_value_time(&self, out: &mut String, value: &Time) {
        let _ = write!(
            out,
            "{:02}:{:02}:{:02}",
            value.hour(),
            value.minute(),
            value.second()
        );
        let mut subsecond = value.nanosecond();
        if subsecond != 0 {
            let mut width = 9;
            while subsecond % 10 == 0 {
                subsecond /= 10;
                width -= 1;
            }
            let _ = write!(out, ".{:0width$}", subsecond);
        }
    }

    fn write_value_timestamp(&self, out: &mut String, value: &PrimitiveDateTime) {
        out.push('\'');
        self.write_value_date(out, &value.date());
        out.push(' ');
        self.write_value_time(out, &value.time());
        out.push('\'');
    }

    /// Converts compiled SQL into the native placeholder syntax. The default keeps `?`
    /// and only unescapes `\?`.
    fn position_bindings(&self, sql: &str) -> String {
        sql.replace("\\?", "?")
    }

    /// Whether a running statement can be aborted through `Connection::cancel_query`.
    fn can_cancel_query(&self) -> bool {
        false
    }

    /// Shapes the raw driver response of a statement that has no output of its own.
    fn process_response(
        &self,
        statement: &CompiledStatement,
        response: RawResponse,
    ) -> Result<QueryOutput> {
        Ok(match statement.method {
            Method::Select => QueryOutput::Rows(response.rows),
            Method::First => QueryOutput::Row(response.rows.into_iter().next()),
            Method::Pluck => {
                let label = statement.pluck.as_deref().map(output_label).unwrap_or("");
                QueryOutput::Values(
                    response
                        .rows
                        .into_iter()
                        .map(|row| row.get_column(label).cloned().unwrap_or_default())
                        .collect(),
                )
            }
            Method::Insert | Method::Update | Method::Delete if statement.returning => {
                QueryOutput::Rows(response.rows)
            }
            Method::Insert | Method::Update | Method::Delete | Method::Truncate => {
                QueryOutput::Affected(response.affected)
            }
            Method::HasTable | Method::HasColumn => QueryOutput::Exists(!response.rows.is_empty()),
            Method::ColumnInfo => QueryOutput::Rows(response.rows),
            Method::Raw if response.rows.is_empty() => QueryOutput::Affected(response.affected),
            Method::Raw => QueryOutput::Rows(response.rows),
            Method::Ddl => QueryOutput::Empty,
        })
    }
}

/// Label of the result column produced by selecting `column` (`t.a` gives `a`, `a as b` gives `b`).
pub fn output_label(column: &str) -> &str {
    let lower = column.to_ascii_lowercase();
    let column = match lower.rfind(" as ") {
        Some(i) => &column[i + 4..],
        None => column,
    };
    column.rsplit('.').next().unwrap_or(column).trim()
}

/// Dialect using every default, standard SQL with double quoted identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl QueryCompiler for GenericDialect {}
impl SchemaCompiler for GenericDialect {}
impl TableCompiler for GenericDialect {}
impl ColumnCompiler for GenericDialect {}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }
    fn query_compiler(&self) -> &dyn QueryCompiler {
        self
    }
    fn schema_compiler(&self) -> &dyn SchemaCompiler {
        self
    }
    fn table_compiler(&self) -> &dyn TableCompiler {
        self
    }
    fn column_compiler(&self) -> &dyn ColumnCompiler {
        self
    }
}
