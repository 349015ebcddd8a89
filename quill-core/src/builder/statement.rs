use crate::{Operator, QueryBuilder, Raw, Value};
use rust_decimal::Decimal;
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Boolean connective joining a clause to the previous one of the same grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoolOp {
    #[default]
    And,
    Or,
}

impl BoolOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
        }
    }
}

/// Category of a statement, decides which compiler phase consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grouping {
    With,
    Columns,
    Join,
    Where,
    Union,
    Group,
    Order,
    Having,
}

/// Column name or literal SQL, used wherever the builder accepts "something to select or sort".
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Column(String),
    Raw(Raw),
    /// Parenthesized subquery, followed by the alias given with [`QueryBuilder::as_`].
    Query(Box<QueryBuilder>),
}

impl From<QueryBuilder> for Target {
    fn from(value: QueryBuilder) -> Self {
        Target::Query(value.into())
    }
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        Target::Column(value.into())
    }
}

impl From<String> for Target {
    fn from(value: String) -> Self {
        Target::Column(value)
    }
}

impl From<&String> for Target {
    fn from(value: &String) -> Self {
        Target::Column(value.clone())
    }
}

impl From<Raw> for Target {
    fn from(value: Raw) -> Self {
        Target::Raw(value)
    }
}

/// Right hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    Raw(Raw),
    Query(Box<QueryBuilder>),
    Column(String),
}

impl Operand {
    /// Reference to another column, quoted instead of bound.
    pub fn column(name: impl Into<String>) -> Self {
        Operand::Column(name.into())
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}

impl From<Raw> for Operand {
    fn from(value: Raw) -> Self {
        Operand::Raw(value)
    }
}

impl From<QueryBuilder> for Operand {
    fn from(value: QueryBuilder) -> Self {
        Operand::Query(value.into())
    }
}

macro_rules! impl_operand_from_value {
    ($($source:ty),+ $(,)?) => {
        $(impl From<$source> for Operand {
            fn from(value: $source) -> Self {
                Operand::Value(value.into())
            }
        })+
    };
}

impl_operand_from_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    Decimal,
    &str,
    String,
    Vec<u8>,
    Date,
    Time,
    PrimitiveDateTime,
    Uuid,
);

impl<T> From<Option<T>> for Operand
where
    Value: From<Option<T>>,
{
    fn from(value: Option<T>) -> Self {
        Operand::Value(value.into())
    }
}

/// Values tested by an `in` condition.
#[derive(Debug, Clone, PartialEq)]
pub enum InValues {
    List(Vec<Value>),
    Query(Box<QueryBuilder>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Basic {
        column: Target,
        operator: Operator,
        value: Operand,
    },
    In {
        column: String,
        values: InValues,
    },
    Null {
        column: String,
    },
    Between {
        column: String,
        low: Operand,
        high: Operand,
    },
    Exists(Box<QueryBuilder>),
    Raw(Raw),
    Group(Vec<Clause>),
}

/// A where / having condition with its connective and negation.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub bool_op: BoolOp,
    pub negated: bool,
    pub condition: Condition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    Min,
    Max,
    Sum,
    Avg,
}

impl Aggregate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregate::Count => "count",
            Aggregate::Min => "min",
            Aggregate::Max => "max",
            Aggregate::Sum => "sum",
            Aggregate::Avg => "avg",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Column(Target),
    Aggregate {
        function: Aggregate,
        column: String,
        distinct: bool,
    },
    Query {
        query: Box<QueryBuilder>,
        alias: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub target: Target,
    pub order: Order,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnionSource {
    Query(Box<QueryBuilder>),
    Raw(Raw),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    pub source: UnionSource,
    pub all: bool,
}

/// Body of a common table expression.
#[derive(Debug, Clone, PartialEq)]
pub enum WithSource {
    Query(Box<QueryBuilder>),
    Raw(Raw),
}

impl From<QueryBuilder> for WithSource {
    fn from(value: QueryBuilder) -> Self {
        WithSource::Query(value.into())
    }
}

impl From<Raw> for WithSource {
    fn from(value: Raw) -> Self {
        WithSource::Raw(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct With {
    pub alias: String,
    pub source: WithSource,
    pub recursive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    LeftOuter,
    Right,
    RightOuter,
    FullOuter,
    Cross,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "inner join",
            JoinKind::Left => "left join",
            JoinKind::LeftOuter => "left outer join",
            JoinKind::Right => "right join",
            JoinKind::RightOuter => "right outer join",
            JoinKind::FullOuter => "full outer join",
            JoinKind::Cross => "cross join",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinCondition {
    pub bool_op: BoolOp,
    pub first: String,
    pub operator: Operator,
    pub second: Operand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: Target,
    pub conditions: Vec<JoinCondition>,
}

/// One accumulated clause of a query builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    With(With),
    Columns(Selection),
    Join(Join),
    Where(Clause),
    Union(Union),
    Group(Target),
    Order(OrderBy),
    Having(Clause),
}

impl Statement {
    pub fn grouping(&self) -> Grouping {
        match self {
            Statement::With(..) => Grouping::With,
            Statement::Columns(..) => Grouping::Columns,
            Statement::Join(..) => Grouping::Join,
            Statement::Where(..) => Grouping::Where,
            Statement::Union(..) => Grouping::Union,
            Statement::Group(..) => Grouping::Group,
            Statement::Order(..) => Grouping::Order,
            Statement::Having(..) => Grouping::Having,
        }
    }
}
