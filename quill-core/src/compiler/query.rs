use crate::{
    Clause, ColumnInfo, CompileError, CompiledStatement, Condition, ConflictAction, Formatter,
    Grouping, InValues, Join, JoinKind, Lock, Merge, Method, Operand, Operator, Output,
    QueryBuilder, QueryOutput, Result, RowLabeled, Selection, Statement, Target, UnionSource,
    Value, WithSource, output_label, separated_by, try_separated_by,
};
use std::collections::{BTreeMap, BTreeSet};

/// Serializes a [`QueryBuilder`] into one statement.
///
/// Select components are emitted in a fixed order: with, columns and from, join, where,
/// union, group, having, order, limit, offset, lock. Bindings are collected in the same
/// left to right order as their placeholders.
pub trait QueryCompiler: Send + Sync {
    fn compile(&self, f: &mut Formatter, query: &QueryBuilder) -> Result<CompiledStatement> {
        let single = query.single();
        let method = single.method;
        let mut statement = match method {
            Method::Select | Method::First | Method::Pluck => {
                CompiledStatement::new(self.select(f, query)?, f.take_bindings(), method)
            }
            Method::Insert => CompiledStatement::new(self.insert(f, query)?, f.take_bindings(), method),
            Method::Update => CompiledStatement::new(self.update(f, query)?, f.take_bindings(), method),
            Method::Delete => CompiledStatement::new(self.delete(f, query)?, f.take_bindings(), method),
            Method::Truncate => self.truncate(f, query)?,
            Method::ColumnInfo => self.column_info(f, query)?,
            _ => {
                return Err(CompileError::Invalid(format!(
                    "{} cannot be compiled from a query builder",
                    method.as_str()
                ))
                .into());
            }
        };
        if statement.bindings.iter().any(Value::is_default) {
            return Err(CompileError::UndefinedBinding {
                method: method.as_str(),
                columns: query.undefined_columns().join(", "),
                sql: statement.sql,
            }
            .into());
        }
        statement.timeout = single.timeout;
        statement.cancel_on_timeout = single.cancel_on_timeout;
        statement.pluck = single.pluck.clone();
        statement.returning = !single.returning.is_empty() && self.supports_returning();
        Ok(statement)
    }

    fn select(&self, f: &mut Formatter, query: &QueryBuilder) -> Result<String> {
        let mut out = String::with_capacity(128);
        let components: [fn(&Self, &mut Formatter, &mut String, &QueryBuilder) -> Result<()>; 11] = [
            Self::with_clause,
            Self::columns,
            Self::join,
            Self::where_clause,
            Self::union,
            Self::group,
            Self::having,
            Self::order,
            Self::limit,
            Self::offset,
            Self::lock,
        ];
        for component in components {
            let len = out.len();
            if len > 0 {
                out.push(' ');
            }
            component(self, f, &mut out, query)?;
            if out.len() == len + 1 {
                out.truncate(len);
            }
        }
        Ok(out)
    }

    fn with_clause(&self, f: &mut Formatter, out: &mut String, query: &QueryBuilder) -> Result<()> {
        let ctes: Vec<_> = query
            .grouped(Grouping::With)
            .filter_map(|v| match v {
                Statement::With(v) => Some(v),
                _ => None,
            })
            .collect();
        if ctes.is_empty() {
            return Ok(());
        }
        out.push_str("with ");
        if ctes.iter().any(|v| v.recursive) {
            out.push_str("recursive ");
        }
        try_separated_by(
            out,
            ctes,
            |out, cte| {
                f.write_identifier(out, &cte.alias);
                out.push_str(" as (");
                match &cte.source {
                    WithSource::Query(query) => out.push_str(&self.select(f, query)?),
                    WithSource::Raw(raw) => f.raw(out, raw)?,
                }
                out.push(')');
                Ok(())
            },
            ", ",
        )
    }

    fn columns(&self, f: &mut Formatter, out: &mut String, query: &QueryBuilder) -> Result<()> {
        out.push_str("select ");
        if query.single().distinct {
            out.push_str("distinct ");
        }
        if query.has(Grouping::Columns) {
            try_separated_by(
                out,
                query.grouped(Grouping::Columns),
                |out, v| match v {
                    Statement::Columns(selection) => self.selection(f, out, selection),
                    _ => Ok(()),
                },
                ", ",
            )?;
        } else {
            out.push('*');
        }
        if let Some(table) = &query.single().table {
            out.push_str(" from ");
            self.table(f, out, query, "select")?;
            if let (Some(alias), Target::Column(..) | Target::Raw(..)) =
                (&query.single().alias, table)
            {
                out.push_str(" as ");
                f.write_identifier(out, alias);
            }
        }
        Ok(())
    }

    fn selection(&self, f: &mut Formatter, out: &mut String, selection: &Selection) -> Result<()> {
        match selection {
            Selection::Column(target) => self.target(f, out, target)?,
            Selection::Aggregate {
                function,
                column,
                distinct,
            } => {
                let lower = column.to_ascii_lowercase();
                let (column, alias) = match lower.find(" as ") {
                    Some(i) => (column[..i].trim(), Some(column[i + 4..].trim())),
                    None => (column.as_str(), None),
                };
                out.push_str(function.as_str());
                out.push('(');
                if *distinct {
                    out.push_str("distinct ");
                }
                f.write_wrapped(out, column);
                out.push(')');
                if let Some(alias) = alias {
                    out.push_str(" as ");
                    f.write_identifier(out, alias);
                }
            }
            Selection::Query { query, alias } => {
                out.push('(');
                out.push_str(&self.select(f, query)?);
                out.push_str(") as ");
                f.write_identifier(out, alias);
            }
        }
        Ok(())
    }

    fn target(&self, f: &mut Formatter, out: &mut String, target: &Target) -> Result<()> {
        match target {
            Target::Column(v) => f.write_wrapped(out, v),
            Target::Raw(v) => f.raw(out, v)?,
            Target::Query(query) => {
                let (query, alias) = query.as_ref().clone().take_alias();
                out.push('(');
                out.push_str(&self.select(f, &query)?);
                out.push(')');
                if let Some(alias) = alias {
                    out.push_str(" as ");
                    f.write_identifier(out, &alias);
                }
            }
        }
        Ok(())
    }

    /// The table of the builder, raising an error naming `method` when there is none.
    fn table(
        &self,
        f: &mut Formatter,
        out: &mut String,
        query: &QueryBuilder,
        method: &'static str,
    ) -> Result<()> {
        match &query.single().table {
            Some(target) => self.target(f, out, target),
            None => Err(CompileError::MissingTable(method).into()),
        }
    }

    fn join(&self, f: &mut Formatter, out: &mut String, query: &QueryBuilder) -> Result<()> {
        try_separated_by(
            out,
            query.grouped(Grouping::Join),
            |out, v| match v {
                Statement::Join(join) => self.join_clause(f, out, join),
                _ => Ok(()),
            },
            " ",
        )
    }

    fn join_clause(&self, f: &mut Formatter, out: &mut String, join: &Join) -> Result<()> {
        out.push_str(join.kind.as_str());
        out.push(' ');
        self.target(f, out, &join.table)?;
        if join.kind == JoinKind::Cross || join.conditions.is_empty() {
            return Ok(());
        }
        out.push_str(" on ");
        for (i, condition) in join.conditions.iter().enumerate() {
            if i > 0 {
                out.push(' ');
                out.push_str(condition.bool_op.as_str());
                out.push(' ');
            }
            f.write_wrapped(out, &condition.first);
            out.push(' ');
            out.push_str(self.operator(condition.operator)?);
            out.push(' ');
            self.operand(f, out, &condition.second)?;
        }
        Ok(())
    }

    fn where_clause(&self, f: &mut Formatter, out: &mut String, query: &QueryBuilder) -> Result<()> {
        self.conditions(f, out, query, Grouping::Where, "where ")
    }

    fn having(&self, f: &mut Formatter, out: &mut String, query: &QueryBuilder) -> Result<()> {
        self.conditions(f, out, query, Grouping::Having, "having ")
    }

    fn conditions(
        &self,
        f: &mut Formatter,
        out: &mut String,
        query: &QueryBuilder,
        grouping: Grouping,
        keyword: &str,
    ) -> Result<()> {
        let clauses: Vec<&Clause> = query
            .grouped(grouping)
            .filter_map(|v| match v {
                Statement::Where(v) | Statement::Having(v) => Some(v),
                _ => None,
            })
            .collect();
        if clauses.is_empty() {
            return Ok(());
        }
        out.push_str(keyword);
        self.clauses(f, out, clauses)
    }

    fn clauses<'c>(
        &self,
        f: &mut Formatter,
        out: &mut String,
        clauses: Vec<&'c Clause>,
    ) -> Result<()> {
        for (i, clause) in clauses.into_iter().enumerate() {
            if i > 0 {
                out.push(' ');
                out.push_str(clause.bool_op.as_str());
                out.push(' ');
            }
            self.clause(f, out, clause)?;
        }
        Ok(())
    }

    fn clause(&self, f: &mut Formatter, out: &mut String, clause: &Clause) -> Result<()> {
        let not = if clause.negated { "not " } else { "" };
        match &clause.condition {
            Condition::Basic {
                column,
                operator,
                value,
            } => {
                out.push_str(not);
                self.target(f, out, column)?;
                out.push(' ');
                out.push_str(self.operator(*operator)?);
                out.push(' ');
                self.operand(f, out, value)?;
            }
            Condition::In { column, values } => match values {
                InValues::List(values) if values.is_empty() => {
                    out.push_str(if clause.negated { "1 = 1" } else { "1 = 0" });
                }
                InValues::List(values) => {
                    f.write_wrapped(out, column);
                    out.push(' ');
                    out.push_str(not);
                    out.push_str("in (");
                    f.parameters(out, values);
                    out.push(')');
                }
                InValues::Query(query) => {
                    f.write_wrapped(out, column);
                    out.push(' ');
                    out.push_str(not);
                    out.push_str("in (");
                    out.push_str(&self.select(f, query)?);
                    out.push(')');
                }
            },
            Condition::Null { column } => {
                f.write_wrapped(out, column);
                out.push_str(" is ");
                out.push_str(not);
                out.push_str("null");
            }
            Condition::Between { column, low, high } => {
                f.write_wrapped(out, column);
                out.push(' ');
                out.push_str(not);
                out.push_str("between ");
                self.operand(f, out, low)?;
                out.push_str(" and ");
                self.operand(f, out, high)?;
            }
            Condition::Exists(query) => {
                out.push_str(not);
                out.push_str("exists (");
                out.push_str(&self.select(f, query)?);
                out.push(')');
            }
            Condition::Raw(raw) => {
                if clause.negated {
                    out.push_str("not (");
                    f.raw(out, raw)?;
                    out.push(')');
                } else {
                    f.raw(out, raw)?;
                }
            }
            Condition::Group(clauses) => {
                out.push_str(not);
                out.push('(');
                self.clauses(f, out, clauses.iter().collect())?;
                out.push(')');
            }
        }
        Ok(())
    }

    /// SQL text of an operator, dialects may rewrite or reject some of them.
    fn operator(&self, operator: Operator) -> Result<&'static str> {
        Ok(operator.as_str())
    }

    fn operand(&self, f: &mut Formatter, out: &mut String, operand: &Operand) -> Result<()> {
        match operand {
            Operand::Value(v) => f.parameter(out, v),
            Operand::Raw(v) => f.raw(out, v)?,
            Operand::Column(v) => f.write_wrapped(out, v),
            Operand::Query(query) => {
                out.push('(');
                out.push_str(&self.select(f, query)?);
                out.push(')');
            }
        }
        Ok(())
    }

    fn union(&self, f: &mut Formatter, out: &mut String, query: &QueryBuilder) -> Result<()> {
        try_separated_by(
            out,
            query.grouped(Grouping::Union),
            |out, v| {
                let Statement::Union(union) = v else {
                    return Ok(());
                };
                out.push_str(if union.all { "union all " } else { "union " });
                match &union.source {
                    UnionSource::Query(query) => out.push_str(&self.select(f, query)?),
                    UnionSource::Raw(raw) => f.raw(out, raw)?,
                }
                Ok(())
            },
            " ",
        )
    }

    fn group(&self, f: &mut Formatter, out: &mut String, query: &QueryBuilder) -> Result<()> {
        if !query.has(Grouping::Group) {
            return Ok(());
        }
        out.push_str("group by ");
        try_separated_by(
            out,
            query.grouped(Grouping::Group),
            |out, v| match v {
                Statement::Group(target) => self.target(f, out, target),
                _ => Ok(()),
            },
            ", ",
        )
    }

    fn order(&self, f: &mut Formatter, out: &mut String, query: &QueryBuilder) -> Result<()> {
        if !query.has(Grouping::Order) {
            return Ok(());
        }
        out.push_str("order by ");
        try_separated_by(
            out,
            query.grouped(Grouping::Order),
            |out, v| {
                let Statement::Order(order) = v else {
                    return Ok(());
                };
                self.target(f, out, &order.target)?;
                out.push(' ');
                out.push_str(order.order.as_str());
                Ok(())
            },
            ", ",
        )
    }

    fn limit_value(&self, query: &QueryBuilder) -> Option<u64> {
        match query.single().method {
            Method::First => Some(1),
            _ => query.single().limit,
        }
    }

    fn limit(&self, f: &mut Formatter, out: &mut String, query: &QueryBuilder) -> Result<()> {
        if let Some(limit) = self.limit_value(query) {
            out.push_str("limit ");
            f.parameter(out, &Value::Int(limit as i64));
        }
        Ok(())
    }

    fn offset(&self, f: &mut Formatter, out: &mut String, query: &QueryBuilder) -> Result<()> {
        if let Some(offset) = query.single().offset {
            out.push_str("offset ");
            f.parameter(out, &Value::Int(offset as i64));
        }
        Ok(())
    }

    fn lock(&self, _f: &mut Formatter, out: &mut String, query: &QueryBuilder) -> Result<()> {
        match query.single().lock {
            Some(Lock::ForUpdate) => out.push_str("for update"),
            Some(Lock::ForShare) => out.push_str("for share"),
            None => {}
        }
        Ok(())
    }

    fn insert_keyword(&self, _query: &QueryBuilder) -> &'static str {
        "insert into "
    }

    /// Written for keys missing from some of the inserted records.
    fn insert_default(&self, f: &Formatter) -> &'static str {
        if f.config().use_null_as_default {
            "NULL"
        } else {
            "DEFAULT"
        }
    }

    fn insert(&self, f: &mut Formatter, query: &QueryBuilder) -> Result<String> {
        let records = query.single().insert.as_deref().unwrap_or_default();
        if records.is_empty() {
            return Err(CompileError::Empty("insert").into());
        }
        let columns: Vec<&String> = records
            .iter()
            .flat_map(|v| v.keys())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut out = String::with_capacity(64 + records.len() * columns.len() * 3);
        out.push_str(self.insert_keyword(query));
        self.table(f, &mut out, query, "insert")?;
        if columns.is_empty() {
            out.push_str(" default values");
        } else {
            out.push_str(" (");
            out.push_str(&f.columnize(&columns));
            out.push_str(") values ");
            let default = self.insert_default(f);
            for (i, record) in records.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push('(');
                separated_by(
                    &mut out,
                    &columns,
                    |out, column| match record.get(*column) {
                        None | Some(Value::Default) => out.push_str(default),
                        Some(value) => f.parameter(out, value),
                    },
                    ", ",
                );
                out.push(')');
            }
        }
        self.on_conflict(f, &mut out, query, &columns)?;
        self.returning(f, &mut out, query)?;
        Ok(out)
    }

    /// `on conflict (...) do nothing` or `do update set ... [where ...]`.
    fn on_conflict(
        &self,
        f: &mut Formatter,
        out: &mut String,
        query: &QueryBuilder,
        inserted: &[&String],
    ) -> Result<()> {
        let Some(conflict) = &query.single().on_conflict else {
            return Ok(());
        };
        out.push_str(" on conflict");
        if !conflict.columns.is_empty() {
            out.push_str(" (");
            out.push_str(&f.columnize(&conflict.columns));
            out.push(')');
        }
        let ConflictAction::Merge(merge) = &conflict.action else {
            out.push_str(" do nothing");
            return Ok(());
        };
        out.push_str(" do update set ");
        match merge {
            Merge::All => separated_by(
                out,
                inserted,
                |out, v| {
                    f.write_wrapped(out, v);
                    out.push_str(" = excluded.");
                    f.write_wrapped(out, v);
                },
                ", ",
            ),
            Merge::Columns(columns) => separated_by(
                out,
                columns,
                |out, v| {
                    f.write_wrapped(out, v);
                    out.push_str(" = excluded.");
                    f.write_wrapped(out, v);
                },
                ", ",
            ),
            Merge::Values(values) => separated_by(
                out,
                values,
                |out, (k, v)| {
                    f.write_wrapped(out, k);
                    out.push_str(" = ");
                    f.parameter(out, v);
                },
                ", ",
            ),
        }
        if query.has(Grouping::Where) {
            out.push(' ');
            self.where_clause(f, out, query)?;
        }
        Ok(())
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn returning(&self, f: &mut Formatter, out: &mut String, query: &QueryBuilder) -> Result<()> {
        let returning = &query.single().returning;
        if returning.is_empty() {
            return Ok(());
        }
        if !self.supports_returning() {
            log::warn!(
                "{} does not support returning, the clause is ignored",
                f.dialect().name()
            );
            return Ok(());
        }
        out.push_str(" returning ");
        out.push_str(&f.columnize(returning));
        Ok(())
    }

    fn update(&self, f: &mut Formatter, query: &QueryBuilder) -> Result<String> {
        let single = query.single();
        let values = single.update.as_ref().map(|v| v.len()).unwrap_or_default();
        if values == 0 && single.counters.is_empty() {
            return Err(CompileError::Empty("update").into());
        }
        let mut out = String::with_capacity(64);
        out.push_str("update ");
        self.table(f, &mut out, query, "update")?;
        out.push_str(" set ");
        separated_by(
            &mut out,
            single.update.iter().flatten(),
            |out, (column, value)| {
                f.write_wrapped(out, column);
                out.push_str(" = ");
                f.parameter(out, value);
            },
            ", ",
        );
        if values > 0 && !single.counters.is_empty() {
            out.push_str(", ");
        }
        separated_by(
            &mut out,
            &single.counters,
            |out, (column, counter)| {
                let column = f.wrap(column);
                out.push_str(&column);
                out.push_str(" = ");
                out.push_str(&column);
                out.push_str(if counter.decrement { " - " } else { " + " });
                f.parameter(out, &counter.amount);
            },
            ", ",
        );
        if query.has(Grouping::Where) {
            out.push(' ');
            self.where_clause(f, &mut out, query)?;
        }
        self.returning(f, &mut out, query)?;
        Ok(out)
    }

    fn delete(&self, f: &mut Formatter, query: &QueryBuilder) -> Result<String> {
        let mut out = String::with_capacity(64);
        out.push_str("delete from ");
        self.table(f, &mut out, query, "del")?;
        if query.has(Grouping::Where) {
            out.push(' ');
            self.where_clause(f, &mut out, query)?;
        }
        self.returning(f, &mut out, query)?;
        Ok(out)
    }

    fn truncate(&self, f: &mut Formatter, query: &QueryBuilder) -> Result<CompiledStatement> {
        let mut out = String::from("truncate ");
        self.table(f, &mut out, query, "truncate")?;
        Ok(CompiledStatement::new(out, f.take_bindings(), Method::Truncate))
    }

    /// Column introspection through `information_schema.columns`.
    fn column_info(&self, f: &mut Formatter, query: &QueryBuilder) -> Result<CompiledStatement> {
        let Some(Target::Column(table)) = &query.single().table else {
            return Err(CompileError::MissingTable("columnInfo").into());
        };
        let mut out = String::from(
            "select * from information_schema.columns where table_name = ",
        );
        f.parameter(&mut out, &Value::Text(table.clone()));
        let column = query.single().column_info.clone();
        Ok(
            CompiledStatement::new(out, f.take_bindings(), Method::ColumnInfo).with_output(
                Output::transform(move |response| {
                    information_schema_columns(&response.rows, column.as_deref())
                }),
            ),
        )
    }
}

fn text(row: &RowLabeled, name: &str) -> Option<String> {
    match row.get_column(name)? {
        Value::Null => None,
        Value::Text(v) => Some(v.clone()),
        v => Some(v.as_i64().map(|v| v.to_string()).unwrap_or_default()),
    }
}

/// Shapes `information_schema.columns` rows into a column map, optionally keeping one column.
pub fn information_schema_columns(rows: &[RowLabeled], column: Option<&str>) -> Result<QueryOutput> {
    let mut result = BTreeMap::new();
    for row in rows {
        let Some(name) = text(row, "column_name").or_else(|| text(row, "COLUMN_NAME")) else {
            continue;
        };
        let get = |key: &str| text(row, key).or_else(|| text(row, &key.to_ascii_uppercase()));
        result.insert(
            name,
            ColumnInfo {
                data_type: get("data_type").unwrap_or_default(),
                max_length: get("character_maximum_length").and_then(|v| v.parse().ok()),
                nullable: get("is_nullable").is_some_and(|v| v.eq_ignore_ascii_case("yes")),
                default_value: get("column_default"),
            },
        );
    }
    if let Some(column) = column {
        let label = output_label(column);
        result.retain(|k, _| k.eq_ignore_ascii_case(label));
    }
    Ok(QueryOutput::Columns(result))
}
