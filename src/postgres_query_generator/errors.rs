use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PostgresQueryGeneratorError {
    #[error("variable '{0}' is not bound by a preceding MATCH")]
    UnboundVariable(String),
    #[error("no value supplied for parameter ${0}")]
    MissingParameter(String),
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(&'static str),
    #[error("unsupported clause: {0}")]
    UnsupportedClause(&'static str),
    #[error("malformed pattern: {nodes} nodes with {relationships} relationships (a chain of N nodes carries N - 1 relationships)")]
    MalformedPattern { nodes: usize, relationships: usize },
    #[error("CREATE and MERGE translate node patterns only; relationship creation is not supported")]
    UnsupportedCreatePattern,
    #[error("property maps must hold literal values here, found {0}")]
    NonLiteralMapValue(&'static str),
    #[error("query has no generatable clause (expected a RETURN or a mutation)")]
    EmptyQuery,
    #[error("failed to serialize literal to JSON: {0}")]
    Serialization(String),
}
