//! Error types for query and mapping construction
//!
//! Query construction is fail-fast and surfaces a single [`DslError`].
//! Mapping construction accumulates every problem into a [`MappingError`]
//! so a caller configuring many fields sees them all in one pass.

use std::fmt;

use crate::mapping::FieldType;
use crate::query::QueryKind;

/// Longest JSON fragment kept on a parse error
const MAX_FRAGMENT_LEN: usize = 256;

/// Category of a [`DslError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FieldRequired,
    ValueRequired,
    QueryRequired,

    InvalidBoost,
    InvalidNegativeBoost,
    InvalidTieBreaker,
    InvalidPrefixLength,
    InvalidMaxExpansions,
    InvalidFuzzyMaxExpansions,
    InvalidMaxShingleSize,
    InvalidDims,

    InvalidRewrite,
    InvalidRelation,
    InvalidZeroTermQuery,
    InvalidScoreMode,
    InvalidBoostMode,
    InvalidModifier,
    InvalidDynamic,
    InvalidTermVector,
    InvalidIndexOptions,
    InvalidOperator,
    InvalidSimilarity,
    InvalidOrientation,
    InvalidMultiMatchType,
    InvalidSpatialRelation,

    InvalidSourceKind,
    InvalidParams,
    InvalidType,
    UnsupportedKind,
    MissingType,

    IntervalsRequired,
    PositiveRequired,
    NegativeRequired,
    OriginRequired,
    ScaleRequired,
    WeightRequired,
    ScriptRequired,
    PathRequired,
    IdRequired,
    IndexRequired,
    DimsRequired,

    MetaLimitExceeded,

    InvalidJson,
    InvalidYaml,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ErrorKind::FieldRequired => "field is required",
            ErrorKind::ValueRequired => "value is required",
            ErrorKind::QueryRequired => "query is required",
            ErrorKind::InvalidBoost => "invalid boost",
            ErrorKind::InvalidNegativeBoost => "negative_boost must be in (0, 1]",
            ErrorKind::InvalidTieBreaker => "tie_breaker must be in [0, 1]",
            ErrorKind::InvalidPrefixLength => "invalid prefix_length",
            ErrorKind::InvalidMaxExpansions => "invalid max_expansions",
            ErrorKind::InvalidFuzzyMaxExpansions => "invalid fuzzy max_expansions",
            ErrorKind::InvalidMaxShingleSize => "max_shingle_size must be 2, 3 or 4",
            ErrorKind::InvalidDims => "dims must be a positive integer",
            ErrorKind::InvalidRewrite => "invalid rewrite",
            ErrorKind::InvalidRelation => "invalid relation",
            ErrorKind::InvalidZeroTermQuery => "invalid zero_terms_query",
            ErrorKind::InvalidScoreMode => "invalid score_mode",
            ErrorKind::InvalidBoostMode => "invalid boost_mode",
            ErrorKind::InvalidModifier => "invalid modifier",
            ErrorKind::InvalidDynamic => "invalid dynamic",
            ErrorKind::InvalidTermVector => "invalid term_vector",
            ErrorKind::InvalidIndexOptions => "invalid index_options",
            ErrorKind::InvalidOperator => "invalid operator",
            ErrorKind::InvalidSimilarity => "invalid similarity",
            ErrorKind::InvalidOrientation => "invalid orientation",
            ErrorKind::InvalidMultiMatchType => "invalid multi_match type",
            ErrorKind::InvalidSpatialRelation => "invalid spatial relation",
            ErrorKind::InvalidSourceKind => "invalid _source",
            ErrorKind::InvalidParams => "invalid params",
            ErrorKind::InvalidType => "invalid type",
            ErrorKind::UnsupportedKind => "unsupported kind",
            ErrorKind::MissingType => "missing type",
            ErrorKind::IntervalsRequired => "intervals are required",
            ErrorKind::PositiveRequired => "positive is required",
            ErrorKind::NegativeRequired => "negative is required",
            ErrorKind::OriginRequired => "origin is required",
            ErrorKind::ScaleRequired => "scale is required",
            ErrorKind::WeightRequired => "weight is required",
            ErrorKind::ScriptRequired => "script is required",
            ErrorKind::PathRequired => "path is required",
            ErrorKind::IdRequired => "id is required",
            ErrorKind::IndexRequired => "index is required",
            ErrorKind::DimsRequired => "dims is required",
            ErrorKind::MetaLimitExceeded => "meta limit exceeded",
            ErrorKind::InvalidJson => "invalid json",
            ErrorKind::InvalidYaml => "invalid yaml",
        };
        f.write_str(message)
    }
}

/// Where an error happened: which clause, field, parameter and input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    pub clause: Option<QueryKind>,
    pub mapping: Option<FieldType>,
    pub role: Option<String>,
    pub field: Option<String>,
    pub param: Option<String>,
    pub received: Option<String>,
    pub detail: Option<String>,
    pub json: Option<String>,
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(clause) = &self.clause {
            write!(f, " [{}]", clause)?;
        }
        if let Some(mapping) = &self.mapping {
            write!(f, " [type {}]", mapping)?;
        }
        if let Some(role) = &self.role {
            write!(f, " in {}", role)?;
        }
        if let Some(field) = &self.field {
            write!(f, " field \"{}\"", field)?;
        }
        if let Some(param) = &self.param {
            write!(f, " param \"{}\"", param)?;
        }
        if let Some(received) = &self.received {
            write!(f, " received {}", received)?;
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        if let Some(json) = &self.json {
            write!(f, " (json: {})", json)?;
        }
        Ok(())
    }
}

/// Error raised while building, mutating or parsing a clause, rule or mapping
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}{context}")]
pub struct DslError {
    kind: ErrorKind,
    context: ErrorContext,
}

impl DslError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: ErrorContext::default(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    pub fn clause(&self) -> Option<QueryKind> {
        self.context.clause
    }

    pub fn mapping(&self) -> Option<FieldType> {
        self.context.mapping
    }

    pub fn role(&self) -> Option<&str> {
        self.context.role.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.context.field.as_deref()
    }

    pub fn param(&self) -> Option<&str> {
        self.context.param.as_deref()
    }

    pub fn json(&self) -> Option<&str> {
        self.context.json.as_deref()
    }

    /// Attach the clause kind unless an inner clause already claimed the error
    pub fn with_clause(mut self, clause: QueryKind) -> Self {
        self.context.clause.get_or_insert(clause);
        self
    }

    pub fn with_mapping(mut self, mapping: FieldType) -> Self {
        self.context.mapping.get_or_insert(mapping);
        self
    }

    /// Attach the occurrence role, prefixing any role set by a nested clause
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        let role = role.into();
        self.context.role = Some(match self.context.role.take() {
            Some(inner) => format!("{}.{}", role, inner),
            None => role,
        });
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field.get_or_insert_with(|| field.into());
        self
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.context.param.get_or_insert_with(|| param.into());
        self
    }

    pub fn with_received(mut self, received: impl fmt::Display) -> Self {
        self.context.received = Some(received.to_string());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.context.detail = Some(detail.into());
        self
    }

    /// Attach the offending JSON fragment, keeping the innermost one
    pub fn with_json(mut self, json: &serde_json::Value) -> Self {
        if self.context.json.is_none() {
            let mut fragment = json.to_string();
            if fragment.len() > MAX_FRAGMENT_LEN {
                let mut end = MAX_FRAGMENT_LEN;
                while !fragment.is_char_boundary(end) {
                    end -= 1;
                }
                fragment.truncate(end);
                fragment.push_str("...");
            }
            self.context.json = Some(fragment);
        }
        self
    }
}

impl From<serde_json::Error> for DslError {
    fn from(err: serde_json::Error) -> Self {
        DslError::new(ErrorKind::InvalidJson).with_detail(err.to_string())
    }
}

impl From<serde_yaml::Error> for DslError {
    fn from(err: serde_yaml::Error) -> Self {
        DslError::new(ErrorKind::InvalidYaml).with_detail(err.to_string())
    }
}

/// Every problem found while building or parsing a set of mappings
#[derive(Debug, Clone, Default, PartialEq, thiserror::Error)]
#[error("{} mapping error(s): {}", .errors.len(), join_errors(.errors))]
pub struct MappingError {
    errors: Vec<DslError>,
}

fn join_errors(errors: &[DslError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl MappingError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: DslError) {
        self.errors.push(err);
    }

    /// Record the error of a fallible step and keep its value, if any
    pub fn collect<T>(&mut self, result: Result<T, DslError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(err);
                None
            }
        }
    }

    /// Record every error of a step that reports several at once
    pub fn merge<T>(&mut self, result: Result<T, MappingError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(other) => {
                self.errors.extend(other.errors);
                None
            }
        }
    }

    /// Merge the errors of a nested mapping, tagging them with the child field
    pub fn absorb(&mut self, field: &str, other: MappingError) {
        for err in other.errors {
            let err = match err.field() {
                Some(inner) => {
                    let path = format!("{}.{}", field, inner);
                    let mut err = err;
                    err.context.field = Some(path);
                    err
                }
                None => err.with_field(field),
            };
            self.errors.push(err);
        }
    }

    pub fn errors(&self) -> &[DslError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.errors.iter().map(|e| e.kind()).collect()
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind() == kind)
    }

    /// `Ok(value)` when nothing was recorded, otherwise the accumulated errors
    pub fn into_result<T>(self, value: T) -> Result<T, MappingError> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<DslError> for MappingError {
    fn from(err: DslError) -> Self {
        Self { errors: vec![err] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_display_includes_context() {
        let err = DslError::new(ErrorKind::InvalidBoost)
            .with_clause(QueryKind::Term)
            .with_field("user.id")
            .with_param("boost")
            .with_received("\"abc\"");
        let msg = err.to_string();
        assert!(msg.starts_with("invalid boost"));
        assert!(msg.contains("[term]"));
        assert!(msg.contains("user.id"));
        assert!(msg.contains("\"abc\""));
    }

    #[test]
    fn test_innermost_clause_wins() {
        let err = DslError::new(ErrorKind::ValueRequired)
            .with_clause(QueryKind::Term)
            .with_clause(QueryKind::Bool);
        assert_eq!(err.clause(), Some(QueryKind::Term));
    }

    #[test]
    fn test_roles_nest_outer_first() {
        let err = DslError::new(ErrorKind::ValueRequired)
            .with_role("must[0]")
            .with_role("positive");
        assert_eq!(err.role(), Some("positive.must[0]"));
    }

    #[test]
    fn test_json_fragment_truncated() {
        let long = "x".repeat(1000);
        let err = DslError::new(ErrorKind::InvalidParams).with_json(&json!({ "f": long }));
        assert!(err.json().unwrap().len() <= MAX_FRAGMENT_LEN + 3);
    }

    #[test]
    fn test_mapping_error_accumulates() {
        let mut errors = MappingError::new();
        assert_eq!(errors.collect::<()>(Ok(())), Some(()));
        errors.push(DslError::new(ErrorKind::DimsRequired));
        errors.collect::<()>(Err(DslError::new(ErrorKind::MetaLimitExceeded)));
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(ErrorKind::MetaLimitExceeded));
        assert!(errors.to_string().starts_with("2 mapping error(s)"));
        assert!(errors.into_result(()).is_err());
    }

    #[test]
    fn test_absorb_prefixes_field_path() {
        let mut inner = MappingError::new();
        inner.push(DslError::new(ErrorKind::DimsRequired).with_field("embedding"));
        let mut outer = MappingError::new();
        outer.absorb("doc", inner);
        assert_eq!(outer.errors()[0].field(), Some("doc.embedding"));
    }
}
