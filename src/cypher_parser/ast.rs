use std::fmt;

/// A complete statement: one query plus any number of UNION branches.
///
/// `union_all` is true when any branch was joined with `UNION ALL`,
/// mirroring the flag the SQL generator needs to pick the set operator.
#[derive(Debug, PartialEq, Clone)]
pub struct Query<'a> {
    /// Clauses in the order they appeared in the query text.
    pub clauses: Vec<Clause<'a>>,
    pub unions: Vec<Query<'a>>,
    pub union_all: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Clause<'a> {
    Match(MatchClause<'a>),
    Return(ReturnClause<'a>),
    With(WithClause<'a>),
    Create(CreateClause<'a>),
    Merge(MergeClause<'a>),
    Delete(DeleteClause<'a>),
    Set(SetClause<'a>),
    Remove(RemoveClause<'a>),
    Call(CallClause<'a>),
}

impl Clause<'_> {
    /// Clause keyword, used in error messages.
    pub fn keyword(&self) -> &'static str {
        match self {
            Clause::Match(m) if m.optional => "OPTIONAL MATCH",
            Clause::Match(_) => "MATCH",
            Clause::Return(_) => "RETURN",
            Clause::With(_) => "WITH",
            Clause::Create(_) => "CREATE",
            Clause::Merge(_) => "MERGE",
            Clause::Delete(_) => "DELETE",
            Clause::Set(_) => "SET",
            Clause::Remove(_) => "REMOVE",
            Clause::Call(_) => "CALL",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct MatchClause<'a> {
    pub patterns: Vec<Pattern<'a>>,
    pub where_clause: Option<Expression<'a>>,
    /// OPTIONAL MATCH compiles to LEFT JOINs with constraints in ON.
    pub optional: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ReturnClause<'a> {
    pub items: Vec<Projection<'a>>,
    pub distinct: bool,
    pub order_by: Option<Vec<SortItem<'a>>>,
    pub skip: Option<Expression<'a>>,
    pub limit: Option<Expression<'a>>,
}

/// WITH is RETURN-shaped plus a trailing WHERE that becomes HAVING.
#[derive(Debug, PartialEq, Clone)]
pub struct WithClause<'a> {
    pub items: Vec<Projection<'a>>,
    pub distinct: bool,
    pub order_by: Option<Vec<SortItem<'a>>>,
    pub skip: Option<Expression<'a>>,
    pub limit: Option<Expression<'a>>,
    pub where_clause: Option<Expression<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct CreateClause<'a> {
    pub patterns: Vec<Pattern<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MergeClause<'a> {
    pub pattern: Pattern<'a>,
    pub on_match: Option<Vec<SetItem<'a>>>,
    pub on_create: Option<Vec<SetItem<'a>>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct DeleteClause<'a> {
    pub expressions: Vec<Expression<'a>>,
    pub detach: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub struct SetClause<'a> {
    pub items: Vec<SetItem<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct SetItem<'a> {
    pub variable: &'a str,
    /// `n.age = …` sets one key; None with `value` replaces the whole bag.
    pub property_key: Option<&'a str>,
    pub value: Option<Expression<'a>>,
    /// `n:Label`
    pub label: Option<&'a str>,
    /// `n += {…}`
    pub merge_properties: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub struct RemoveClause<'a> {
    pub items: Vec<RemoveItem<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct RemoveItem<'a> {
    pub variable: &'a str,
    pub property_key: Option<&'a str>,
    pub label: Option<&'a str>,
}

/// CALL procedure(args) [YIELD a, b]
#[derive(Debug, PartialEq, Clone)]
pub struct CallClause<'a> {
    /// Dotted procedure name, e.g. "db.labels".
    pub procedure: &'a str,
    pub arguments: Vec<Expression<'a>>,
    pub yield_items: Option<Vec<&'a str>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Projection<'a> {
    pub expression: Expression<'a>,
    pub alias: Option<&'a str>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct SortItem<'a> {
    pub expression: Expression<'a>,
    pub order: SortOrder,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Pattern<'a> {
    /// `p = (a)-[..]->(b)` binds the whole path to `p`.
    pub path_variable: Option<&'a str>,
    pub elements: Vec<PatternElement<'a>>,
}

/// An alternating node/relationship chain: N, R, N, R, …, N.
/// Invariant: `relationships.len() == nodes.len() - 1`.
#[derive(Debug, PartialEq, Clone)]
pub struct PatternElement<'a> {
    pub nodes: Vec<NodePattern<'a>>,
    pub relationships: Vec<RelationshipPattern<'a>>,
}

pub type MapEntries<'a> = Vec<(&'a str, Expression<'a>)>;

#[derive(Debug, PartialEq, Clone, Default)]
pub struct NodePattern<'a> {
    pub variable: Option<&'a str>,
    pub labels: Vec<&'a str>,
    pub properties: Option<MapEntries<'a>>,
}

impl<'a> NodePattern<'a> {
    pub fn first_label(&self) -> Option<&'a str> {
        self.labels.first().copied()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RelationshipPattern<'a> {
    pub variable: Option<&'a str>,
    /// Type alternation: `[:A|B]` matches either type.
    pub types: Vec<&'a str>,
    pub properties: Option<MapEntries<'a>>,
    pub direction: Direction,
    /// Hop bounds collapsed at parse time: `*` → (1, None), `*n` → (n, n),
    /// `*n..` → (n, None), `*..m` → (1, m), `*n..m` → (n, m).
    /// (None, None) means a plain single-hop relationship.
    pub min_hops: Option<u32>,
    pub max_hops: Option<u32>,
}

impl RelationshipPattern<'_> {
    pub fn is_variable_length(&self) -> bool {
        self.min_hops.is_some() || self.max_hops.is_some()
    }
}

/// Relationship direction. At the simple-join layer `Either` traverses as
/// `Outgoing`; symmetric traversal requires a variable-length expansion or
/// two directed patterns.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Direction {
    Outgoing, // ->
    Incoming, // <-
    Either,   // -
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    /// Unescaped at parse time.
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression<'a> {
    Literal(Literal),
    Variable(&'a str),
    /// `$name`
    Parameter(&'a str),
    List(Vec<Expression<'a>>),
    Map(MapEntries<'a>),
    PropertyAccess(PropertyAccess<'a>),
    IndexAccess(IndexAccess<'a>),
    FunctionCall(FunctionCall<'a>),
    BinaryOp(BinaryOp<'a>),
    UnaryOp(UnaryOp<'a>),
    Comparison(Comparison<'a>),
    Case(CaseExpression<'a>),
    ListComprehension(Box<ListComprehension<'a>>),
    PatternComprehension(Box<PatternComprehension<'a>>),
    Quantifier(Box<Quantifier<'a>>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct PropertyAccess<'a> {
    pub base: Box<Expression<'a>>,
    pub key: &'a str,
}

#[derive(Debug, PartialEq, Clone)]
pub struct IndexAccess<'a> {
    pub base: Box<Expression<'a>>,
    pub index: Box<Expression<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionCall<'a> {
    pub name: &'a str,
    pub args: Vec<Expression<'a>>,
    pub distinct: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub struct BinaryOp<'a> {
    pub left: Box<Expression<'a>>,
    pub operator: BinaryOperator,
    pub right: Box<Expression<'a>>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BinaryOperator {
    And,
    Or,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl BinaryOperator {
    /// SQL spelling; `^` is PostgreSQL's power operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Power => "^",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct UnaryOp<'a> {
    pub operator: UnaryOperator,
    pub operand: Box<Expression<'a>>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum UnaryOperator {
    Not,
    Minus,
}

/// Comparison; `right` is None exactly for the postfix null checks.
#[derive(Debug, PartialEq, Clone)]
pub struct Comparison<'a> {
    pub left: Box<Expression<'a>>,
    pub operator: ComparisonOperator,
    pub right: Option<Box<Expression<'a>>>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    In,
    NotIn,
    Contains,
    StartsWith,
    EndsWith,
    Regex,
    IsNull,
    IsNotNull,
}

impl ComparisonOperator {
    pub fn is_postfix(self) -> bool {
        matches!(self, ComparisonOperator::IsNull | ComparisonOperator::IsNotNull)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct CaseExpression<'a> {
    /// Some for simple CASE (`CASE x WHEN …`), None for searched CASE.
    pub test: Option<Box<Expression<'a>>>,
    pub alternatives: Vec<(Expression<'a>, Expression<'a>)>,
    pub else_expression: Option<Box<Expression<'a>>>,
}

/// `[x IN xs WHERE p | e]`
#[derive(Debug, PartialEq, Clone)]
pub struct ListComprehension<'a> {
    pub variable: &'a str,
    pub list: Expression<'a>,
    pub filter: Option<Expression<'a>>,
    pub map: Option<Expression<'a>>,
}

/// `[p = (a)-[:R]->(b) WHERE pred | e]`
#[derive(Debug, PartialEq, Clone)]
pub struct PatternComprehension<'a> {
    pub path_variable: Option<&'a str>,
    pub pattern: Pattern<'a>,
    pub filter: Option<Expression<'a>>,
    pub map: Expression<'a>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum QuantifierKind {
    All,
    Any,
    None,
    Single,
}

/// `ALL(x IN xs WHERE p)` and friends.
#[derive(Debug, PartialEq, Clone)]
pub struct Quantifier<'a> {
    pub kind: QuantifierKind,
    pub variable: &'a str,
    pub list: Expression<'a>,
    pub filter: Option<Expression<'a>>,
}

impl fmt::Display for Query<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Query")?;
        for (i, clause) in self.clauses.iter().enumerate() {
            writeln!(f, "├── [{}] {}: {:#?}", i, clause.keyword(), clause)?;
        }
        for (i, union) in self.unions.iter().enumerate() {
            let kw = if self.union_all { "UNION ALL" } else { "UNION" };
            writeln!(f, "└── {}[{}]: {}", kw, i, union)?;
        }
        Ok(())
    }
}
