use crate::{
    BoolOp, Clause, Condition, Grouping, InValues, Operand, Operator, QueryBuilder, Raw, Statement,
    Target, Value,
};

/// Where / having clause appenders, shared by [`QueryBuilder`] and [`Pending`].
///
/// Every method consumes the receiver and gives the builder back, a pending modifier
/// therefore applies to exactly one clause.
pub trait Filter: Sized {
    /// The builder plus the connective and negation to apply to the next clause.
    fn into_parts(self) -> (QueryBuilder, BoolOp, bool);

    fn push_clause(self, grouping: Grouping, condition: Condition) -> QueryBuilder {
        let (mut builder, bool_op, negated) = self.into_parts();
        let clause = Clause {
            bool_op,
            negated,
            condition,
        };
        builder.push_statement(match grouping {
            Grouping::Having => Statement::Having(clause),
            _ => Statement::Where(clause),
        });
        builder
    }

    /// `column = value`, a null value becomes `column is null`.
    fn where_(self, column: impl Into<Target>, value: impl Into<Operand>) -> QueryBuilder {
        self.where_op(column, Operator::Equal, value)
    }

    fn where_op(
        self,
        column: impl Into<Target>,
        operator: Operator,
        value: impl Into<Operand>,
    ) -> QueryBuilder {
        let column = column.into();
        let value = value.into();
        let condition = match (&column, &value, operator) {
            (Target::Column(name), Operand::Value(Value::Null), Operator::Equal) => {
                Condition::Null {
                    column: name.clone(),
                }
            }
            _ => Condition::Basic {
                column,
                operator,
                value,
            },
        };
        self.push_clause(Grouping::Where, condition)
    }

    /// Compares two columns, the right hand side is quoted instead of bound.
    fn where_column(
        self,
        first: impl Into<String>,
        operator: Operator,
        second: impl Into<String>,
    ) -> QueryBuilder {
        self.push_clause(
            Grouping::Where,
            Condition::Basic {
                column: Target::Column(first.into()),
                operator,
                value: Operand::Column(second.into()),
            },
        )
    }

    fn where_like(self, column: impl Into<Target>, pattern: impl Into<Operand>) -> QueryBuilder {
        self.where_op(column, Operator::Like, pattern)
    }

    fn where_ilike(self, column: impl Into<Target>, pattern: impl Into<Operand>) -> QueryBuilder {
        self.where_op(column, Operator::ILike, pattern)
    }

    /// An empty list compiles to a condition that is always false (always true when negated).
    fn where_in(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> QueryBuilder {
        self.push_clause(
            Grouping::Where,
            Condition::In {
                column: column.into(),
                values: InValues::List(values.into_iter().map(Into::into).collect()),
            },
        )
    }

    fn where_in_query(self, column: impl Into<String>, query: QueryBuilder) -> QueryBuilder {
        self.push_clause(
            Grouping::Where,
            Condition::In {
                column: column.into(),
                values: InValues::Query(query.into()),
            },
        )
    }

    fn where_null(self, column: impl Into<String>) -> QueryBuilder {
        self.push_clause(
            Grouping::Where,
            Condition::Null {
                column: column.into(),
            },
        )
    }

    fn where_not_null(self, column: impl Into<String>) -> QueryBuilder {
        let (builder, bool_op, negated) = self.into_parts();
        Pending {
            builder,
            bool_op,
            negated: !negated,
        }
        .where_null(column)
    }

    fn where_between(
        self,
        column: impl Into<String>,
        (low, high): (impl Into<Operand>, impl Into<Operand>),
    ) -> QueryBuilder {
        self.push_clause(
            Grouping::Where,
            Condition::Between {
                column: column.into(),
                low: low.into(),
                high: high.into(),
            },
        )
    }

    fn where_exists(self, query: QueryBuilder) -> QueryBuilder {
        self.push_clause(Grouping::Where, Condition::Exists(query.into()))
    }

    fn where_raw(self, raw: impl Into<Raw>) -> QueryBuilder {
        self.push_clause(Grouping::Where, Condition::Raw(raw.into()))
    }

    /// Parenthesized group of the where clauses appended by `f` on a fresh builder.
    fn where_group(self, f: impl FnOnce(QueryBuilder) -> QueryBuilder) -> QueryBuilder {
        let clauses = f(QueryBuilder::new())
            .statements()
            .iter()
            .filter_map(|v| match v {
                Statement::Where(clause) => Some(clause.clone()),
                _ => None,
            })
            .collect();
        self.push_clause(Grouping::Where, Condition::Group(clauses))
    }

    fn having(
        self,
        column: impl Into<Target>,
        operator: Operator,
        value: impl Into<Operand>,
    ) -> QueryBuilder {
        self.push_clause(
            Grouping::Having,
            Condition::Basic {
                column: column.into(),
                operator,
                value: value.into(),
            },
        )
    }

    fn having_in(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> QueryBuilder {
        self.push_clause(
            Grouping::Having,
            Condition::In {
                column: column.into(),
                values: InValues::List(values.into_iter().map(Into::into).collect()),
            },
        )
    }

    fn having_null(self, column: impl Into<String>) -> QueryBuilder {
        self.push_clause(
            Grouping::Having,
            Condition::Null {
                column: column.into(),
            },
        )
    }

    fn having_between(
        self,
        column: impl Into<String>,
        (low, high): (impl Into<Operand>, impl Into<Operand>),
    ) -> QueryBuilder {
        self.push_clause(
            Grouping::Having,
            Condition::Between {
                column: column.into(),
                low: low.into(),
                high: high.into(),
            },
        )
    }

    fn having_raw(self, raw: impl Into<Raw>) -> QueryBuilder {
        self.push_clause(Grouping::Having, Condition::Raw(raw.into()))
    }
}

/// Builder waiting for its next clause, produced by `.or()` and `.not()`.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a pending modifier does nothing until a clause is appended"]
pub struct Pending {
    builder: QueryBuilder,
    bool_op: BoolOp,
    negated: bool,
}

impl Pending {
    pub(crate) fn new(builder: QueryBuilder, bool_op: BoolOp, negated: bool) -> Self {
        Self {
            builder,
            bool_op,
            negated,
        }
    }

    pub fn or(mut self) -> Self {
        self.bool_op = BoolOp::Or;
        self
    }

    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }
}

impl Filter for Pending {
    fn into_parts(self) -> (QueryBuilder, BoolOp, bool) {
        (self.builder, self.bool_op, self.negated)
    }
}

impl Filter for QueryBuilder {
    fn into_parts(self) -> (QueryBuilder, BoolOp, bool) {
        (self, BoolOp::And, false)
    }
}
