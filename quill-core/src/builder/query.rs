use crate::{
    Aggregate, BoolOp, Clause, CompiledStatement, Condition, Config, Dialect, Filter, Formatter,
    Grouping, InValues, Join, JoinCondition, JoinKind, Method, Operand, Operator, Order, OrderBy,
    Pending, Raw, Record, Result, Selection, Statement, Target, Union, UnionSource, Value, With,
    WithSource, interpolate,
};
use std::{collections::BTreeMap, time::Duration};

/// Row locking clause of a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lock {
    ForUpdate,
    ForShare,
}

/// What to update when an insert hits a conflict.
#[derive(Debug, Clone, PartialEq)]
pub enum Merge {
    /// Every inserted column takes the value proposed for insertion.
    All,
    Columns(Vec<String>),
    Values(Record),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConflictAction {
    Ignore,
    Merge(Merge),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    pub columns: Vec<String>,
    pub action: ConflictAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    pub amount: Value,
    pub decrement: bool,
}

/// Options that hold exactly one value per builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Single {
    pub table: Option<Target>,
    pub alias: Option<String>,
    pub method: Method,
    pub distinct: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub insert: Option<Vec<Record>>,
    /// Accumulates across `update()` calls.
    pub update: Option<Record>,
    pub counters: BTreeMap<String, Counter>,
    pub on_conflict: Option<OnConflict>,
    pub returning: Vec<String>,
    pub pluck: Option<String>,
    pub lock: Option<Lock>,
    pub column_info: Option<String>,
    pub timeout: Option<Duration>,
    pub cancel_on_timeout: bool,
}

/// Owned accumulator of a query. Every method consumes the builder and returns it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    statements: Vec<Statement>,
    single: Single,
}

pub(crate) fn names(columns: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    columns.into_iter().map(Into::into).collect()
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(table: impl Into<Target>) -> Self {
        Self::new().from(table)
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn single(&self) -> &Single {
        &self.single
    }

    /// Statements of one grouping, in the order they were appended.
    pub fn grouped(&self, grouping: Grouping) -> impl Iterator<Item = &Statement> {
        self.statements
            .iter()
            .filter(move |v| v.grouping() == grouping)
    }

    pub fn has(&self, grouping: Grouping) -> bool {
        self.grouped(grouping).next().is_some()
    }

    pub(crate) fn push_statement(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn from(mut self, table: impl Into<Target>) -> Self {
        self.single.table = Some(table.into());
        self
    }

    /// Alias of the table, `from "users" as "u"`. Nested as a table or column of another
    /// builder, it names the whole subquery instead: `(select ...) as "u"`.
    pub fn as_(mut self, alias: impl Into<String>) -> Self {
        self.single.alias = Some(alias.into());
        self
    }

    pub(crate) fn take_alias(mut self) -> (Self, Option<String>) {
        let alias = self.single.alias.take();
        (self, alias)
    }

    /// The next clause is joined with `or`.
    pub fn or(self) -> Pending {
        Pending::new(self, BoolOp::Or, false)
    }

    /// The next clause is negated.
    pub fn not(self) -> Pending {
        Pending::new(self, BoolOp::And, true)
    }

    pub fn select(mut self, columns: impl IntoIterator<Item = impl Into<Target>>) -> Self {
        self.statements.extend(
            columns
                .into_iter()
                .map(|v| Statement::Columns(Selection::Column(v.into()))),
        );
        self
    }

    pub fn column(self, column: impl Into<Target>) -> Self {
        self.select([column])
    }

    pub fn select_query(mut self, alias: impl Into<String>, query: QueryBuilder) -> Self {
        self.statements.push(Statement::Columns(Selection::Query {
            query: query.into(),
            alias: alias.into(),
        }));
        self
    }

    pub fn distinct(mut self, columns: impl IntoIterator<Item = impl Into<Target>>) -> Self {
        self.single.distinct = true;
        self.select(columns)
    }

    fn aggregate(mut self, function: Aggregate, column: impl Into<String>, distinct: bool) -> Self {
        self.statements.push(Statement::Columns(Selection::Aggregate {
            function,
            column: column.into(),
            distinct,
        }));
        self
    }

    /// `count("id")`, an `"id as total"` argument adds an alias.
    pub fn count(self, column: impl Into<String>) -> Self {
        self.aggregate(Aggregate::Count, column, false)
    }

    pub fn count_distinct(self, column: impl Into<String>) -> Self {
        self.aggregate(Aggregate::Count, column, true)
    }

    pub fn min(self, column: impl Into<String>) -> Self {
        self.aggregate(Aggregate::Min, column, false)
    }

    pub fn max(self, column: impl Into<String>) -> Self {
        self.aggregate(Aggregate::Max, column, false)
    }

    pub fn sum(self, column: impl Into<String>) -> Self {
        self.aggregate(Aggregate::Sum, column, false)
    }

    pub fn avg(self, column: impl Into<String>) -> Self {
        self.aggregate(Aggregate::Avg, column, false)
    }

    /// Select a single row.
    pub fn first(mut self, columns: impl IntoIterator<Item = impl Into<Target>>) -> Self {
        self.single.method = Method::First;
        self.select(columns)
    }

    /// Select the values of a single column.
    pub fn pluck(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        self.single.method = Method::Pluck;
        self.single.pluck = Some(column.clone());
        self.column(column)
    }

    pub fn or_where(self, column: impl Into<Target>, value: impl Into<Operand>) -> Self {
        self.or().where_(column, value)
    }

    pub fn where_not(self, column: impl Into<Target>, value: impl Into<Operand>) -> Self {
        self.not().where_(column, value)
    }

    pub fn or_where_in(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.or().where_in(column, values)
    }

    pub fn where_not_in(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.not().where_in(column, values)
    }

    pub fn or_where_null(self, column: impl Into<String>) -> Self {
        self.or().where_null(column)
    }

    pub fn with(mut self, alias: impl Into<String>, source: impl Into<WithSource>) -> Self {
        self.statements.push(Statement::With(With {
            alias: alias.into(),
            source: source.into(),
            recursive: false,
        }));
        self
    }

    pub fn with_recursive(mut self, alias: impl Into<String>, source: impl Into<WithSource>) -> Self {
        self.statements.push(Statement::With(With {
            alias: alias.into(),
            source: source.into(),
            recursive: true,
        }));
        self
    }

    pub fn with_raw(self, alias: impl Into<String>, raw: impl Into<Raw>) -> Self {
        self.with(alias, raw.into())
    }

    /// Join with a single `first operator second` column comparison.
    pub fn join_kind(
        mut self,
        kind: JoinKind,
        table: impl Into<Target>,
        first: impl Into<String>,
        operator: Operator,
        second: impl Into<String>,
    ) -> Self {
        self.statements.push(Statement::Join(Join {
            kind,
            table: table.into(),
            conditions: vec![JoinCondition {
                bool_op: BoolOp::And,
                first: first.into(),
                operator,
                second: Operand::Column(second.into()),
            }],
        }));
        self
    }

    pub fn join(
        self,
        table: impl Into<Target>,
        first: impl Into<String>,
        operator: Operator,
        second: impl Into<String>,
    ) -> Self {
        self.join_kind(JoinKind::Inner, table, first, operator, second)
    }

    pub fn inner_join(
        self,
        table: impl Into<Target>,
        first: impl Into<String>,
        operator: Operator,
        second: impl Into<String>,
    ) -> Self {
        self.join_kind(JoinKind::Inner, table, first, operator, second)
    }

    pub fn left_join(
        self,
        table: impl Into<Target>,
        first: impl Into<String>,
        operator: Operator,
        second: impl Into<String>,
    ) -> Self {
        self.join_kind(JoinKind::Left, table, first, operator, second)
    }

    pub fn left_outer_join(
        self,
        table: impl Into<Target>,
        first: impl Into<String>,
        operator: Operator,
        second: impl Into<String>,
    ) -> Self {
        self.join_kind(JoinKind::LeftOuter, table, first, operator, second)
    }

    pub fn right_join(
        self,
        table: impl Into<Target>,
        first: impl Into<String>,
        operator: Operator,
        second: impl Into<String>,
    ) -> Self {
        self.join_kind(JoinKind::Right, table, first, operator, second)
    }

    pub fn right_outer_join(
        self,
        table: impl Into<Target>,
        first: impl Into<String>,
        operator: Operator,
        second: impl Into<String>,
    ) -> Self {
        self.join_kind(JoinKind::RightOuter, table, first, operator, second)
    }

    pub fn full_outer_join(
        self,
        table: impl Into<Target>,
        first: impl Into<String>,
        operator: Operator,
        second: impl Into<String>,
    ) -> Self {
        self.join_kind(JoinKind::FullOuter, table, first, operator, second)
    }

    pub fn cross_join(mut self, table: impl Into<Target>) -> Self {
        self.statements.push(Statement::Join(Join {
            kind: JoinKind::Cross,
            table: table.into(),
            conditions: Vec::new(),
        }));
        self
    }

    /// Join with the conditions appended by `f`.
    pub fn join_on(
        mut self,
        kind: JoinKind,
        table: impl Into<Target>,
        f: impl FnOnce(JoinClause) -> JoinClause,
    ) -> Self {
        let clause = f(JoinClause::default());
        self.statements.push(Statement::Join(Join {
            kind,
            table: table.into(),
            conditions: clause.conditions,
        }));
        self
    }

    pub fn group_by(mut self, columns: impl IntoIterator<Item = impl Into<Target>>) -> Self {
        self.statements
            .extend(columns.into_iter().map(|v| Statement::Group(v.into())));
        self
    }

    pub fn order_by(mut self, target: impl Into<Target>, order: Order) -> Self {
        self.statements.push(Statement::Order(OrderBy {
            target: target.into(),
            order,
        }));
        self
    }

    pub fn union(mut self, query: QueryBuilder) -> Self {
        self.statements.push(Statement::Union(Union {
            source: UnionSource::Query(query.into()),
            all: false,
        }));
        self
    }

    pub fn union_all(mut self, query: QueryBuilder) -> Self {
        self.statements.push(Statement::Union(Union {
            source: UnionSource::Query(query.into()),
            all: true,
        }));
        self
    }

    pub fn union_raw(mut self, raw: impl Into<Raw>, all: bool) -> Self {
        self.statements.push(Statement::Union(Union {
            source: UnionSource::Raw(raw.into()),
            all,
        }));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.single.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.single.offset = Some(offset);
        self
    }

    pub fn insert(self, record: Record) -> Self {
        self.insert_many([record])
    }

    pub fn insert_many(mut self, records: impl IntoIterator<Item = Record>) -> Self {
        self.single.method = Method::Insert;
        self.single.insert = Some(records.into_iter().collect());
        self
    }

    pub fn returning(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.single.returning = names(columns);
        self
    }

    /// Conflict target of an insert, completed by one of the [`OnConflictBuilder`] actions.
    pub fn on_conflict(
        self,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> OnConflictBuilder {
        OnConflictBuilder {
            builder: self,
            columns: names(columns),
        }
    }

    /// Values to set, merged with the ones given by previous calls.
    pub fn update(mut self, record: Record) -> Self {
        self.single.method = Method::Update;
        self.single.update.get_or_insert_default().extend(record);
        self
    }

    pub fn update_column(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut record = Record::new();
        record.insert(column.into(), value.into());
        self.update(record)
    }

    pub fn increment(mut self, column: impl Into<String>, amount: impl Into<Value>) -> Self {
        self.single.method = Method::Update;
        self.single.counters.insert(
            column.into(),
            Counter {
                amount: amount.into(),
                decrement: false,
            },
        );
        self
    }

    pub fn decrement(mut self, column: impl Into<String>, amount: impl Into<Value>) -> Self {
        self.single.method = Method::Update;
        self.single.counters.insert(
            column.into(),
            Counter {
                amount: amount.into(),
                decrement: true,
            },
        );
        self
    }

    pub fn del(mut self) -> Self {
        self.single.method = Method::Delete;
        self
    }

    pub fn truncate(mut self) -> Self {
        self.single.method = Method::Truncate;
        self
    }

    /// Introspect the columns of the table, or a single one.
    pub fn column_info(mut self, column: Option<&str>) -> Self {
        self.single.method = Method::ColumnInfo;
        self.single.column_info = column.map(Into::into);
        self
    }

    pub fn for_update(mut self) -> Self {
        self.single.lock = Some(Lock::ForUpdate);
        self
    }

    pub fn for_share(mut self) -> Self {
        self.single.lock = Some(Lock::ForShare);
        self
    }

    /// Abort the statement after `timeout`, optionally asking the backend to cancel it.
    pub fn timeout(mut self, timeout: Duration, cancel: bool) -> Self {
        self.single.timeout = Some(timeout);
        self.single.cancel_on_timeout = cancel;
        self
    }

    /// Remove every statement of a grouping.
    pub fn clear(mut self, grouping: Grouping) -> Self {
        self.statements.retain(|v| v.grouping() != grouping);
        if grouping == Grouping::Columns {
            self.single.distinct = false;
        }
        self
    }

    /// Columns whose value was never defined but still reached a binding slot.
    pub fn undefined_columns(&self) -> Vec<String> {
        fn visit(clauses: &mut dyn Iterator<Item = &Clause>, out: &mut Vec<String>) {
            for clause in clauses {
                match &clause.condition {
                    Condition::Basic {
                        column: Target::Column(column),
                        value: Operand::Value(Value::Default),
                        ..
                    } => out.push(column.clone()),
                    Condition::In {
                        column,
                        values: InValues::List(values),
                    } if values.iter().any(Value::is_default) => out.push(column.clone()),
                    Condition::Between { column, low, high }
                        if [low, high]
                            .iter()
                            .any(|v| matches!(v, Operand::Value(Value::Default))) =>
                    {
                        out.push(column.clone())
                    }
                    Condition::Group(clauses) => visit(&mut clauses.iter(), out),
                    _ => {}
                }
            }
        }
        let mut result: Vec<String> = self
            .single
            .update
            .iter()
            .flat_map(|v| v.iter())
            .filter(|(_, v)| v.is_default())
            .map(|(k, _)| k.clone())
            .collect();
        visit(
            &mut self.statements.iter().filter_map(|v| match v {
                Statement::Where(clause) | Statement::Having(clause) => Some(clause),
                _ => None,
            }),
            &mut result,
        );
        result
    }

    pub fn compile(&self, dialect: &dyn Dialect) -> Result<CompiledStatement> {
        self.compile_with(dialect, &Config::default())
    }

    pub fn compile_with(&self, dialect: &dyn Dialect, config: &Config) -> Result<CompiledStatement> {
        let mut f = Formatter::new(dialect, config);
        let mut statement = dialect.query_compiler().compile(&mut f, self)?;
        if statement.timeout.is_none() {
            statement.timeout = config.default_timeout;
        }
        Ok(statement)
    }

    /// SQL with the bindings substituted, meant for display only.
    pub fn to_query(&self, dialect: &dyn Dialect) -> Result<String> {
        let statement = self.compile(dialect)?;
        Ok(interpolate(dialect, &statement.sql, &statement.bindings))
    }
}

/// Insert waiting for the action to take on conflict.
#[derive(Debug)]
#[must_use = "call ignore() or one of the merge methods"]
pub struct OnConflictBuilder {
    builder: QueryBuilder,
    columns: Vec<String>,
}

impl OnConflictBuilder {
    fn action(mut self, action: ConflictAction) -> QueryBuilder {
        self.builder.single.on_conflict = Some(OnConflict {
            columns: self.columns,
            action,
        });
        self.builder
    }

    pub fn ignore(self) -> QueryBuilder {
        self.action(ConflictAction::Ignore)
    }

    /// Update every inserted column. Where clauses appended afterwards restrict the update.
    pub fn merge(self) -> QueryBuilder {
        self.action(ConflictAction::Merge(Merge::All))
    }

    pub fn merge_columns(self, columns: impl IntoIterator<Item = impl Into<String>>) -> QueryBuilder {
        self.action(ConflictAction::Merge(Merge::Columns(names(columns))))
    }

    pub fn merge_with(self, values: Record) -> QueryBuilder {
        self.action(ConflictAction::Merge(Merge::Values(values)))
    }
}

/// Conditions of a join, built through [`QueryBuilder::join_on`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinClause {
    conditions: Vec<JoinCondition>,
}

impl JoinClause {
    fn push(mut self, bool_op: BoolOp, first: String, operator: Operator, second: Operand) -> Self {
        self.conditions.push(JoinCondition {
            bool_op,
            first,
            operator,
            second,
        });
        self
    }

    pub fn on(self, first: impl Into<String>, operator: Operator, second: impl Into<String>) -> Self {
        self.push(
            BoolOp::And,
            first.into(),
            operator,
            Operand::Column(second.into()),
        )
    }

    pub fn or_on(
        self,
        first: impl Into<String>,
        operator: Operator,
        second: impl Into<String>,
    ) -> Self {
        self.push(
            BoolOp::Or,
            first.into(),
            operator,
            Operand::Column(second.into()),
        )
    }

    /// Compare against a bound value instead of a column.
    pub fn on_val(self, first: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        self.push(
            BoolOp::And,
            first.into(),
            operator,
            Operand::Value(value.into()),
        )
    }

    pub fn or_on_val(
        self,
        first: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.push(BoolOp::Or, first.into(), operator, Operand::Value(value.into()))
    }
}
