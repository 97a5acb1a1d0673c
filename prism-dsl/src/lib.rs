//! Typed builder and (de)serializer for the Elasticsearch Query DSL
//!
//! Queries are trees of [`Clause`]s held in a [`Query`] envelope. Each
//! clause is built from a parameter record of loose inputs (`TermParams`,
//! `BoolParams`, ...) that is validated once into strict values, or parsed
//! from the engine's JSON. Field mappings follow the same pattern with
//! [`Mapping`] and [`Mappings`], and [`Search`] wraps a query into a full
//! request body.
//!
//! ```
//! use prism_dsl::prelude::*;
//! use prism_dsl::query::{BoolParams, MatchParams, TermParams};
//! use prism_dsl::Query;
//!
//! let query = BoolParams::new()
//!     .must(MatchParams::new("title", "rust"))
//!     .filter(TermParams::new("status", "published"))
//!     .build()
//!     .unwrap();
//! let json = query.to_json();
//! assert_eq!(json["must"][0]["match"]["title"]["query"], "rust");
//!
//! let parsed = Query::from_json_str(r#"{"match": {"title": "rust"}}"#).unwrap();
//! assert_eq!(parsed.match_query().unwrap().query(), "rust");
//! ```

pub mod enums;
pub mod error;
pub mod input;
#[macro_use]
pub mod params;
pub mod mapping;
pub mod query;
pub mod scalar;
pub mod search;

pub use error::{DslError, ErrorKind, MappingError};
pub use input::Loose;
pub use mapping::{FieldType, Fields, Mapping, MappingParams, Mappings};
pub use params::{Param, Parameterized};
pub use query::{Clause, ClauseParams, Query, QueryClauses, QueryKind, QueryParams};
pub use scalar::{Scalar, Strings};
pub use search::Search;

pub type Result<T> = std::result::Result<T, DslError>;

/// Clause body trait and every parameter mixin, for getters and setters
pub mod prelude {
    pub use crate::params::{
        Parameterized, WithAllowLeadingWildcard, WithAnalyzeWildcard, WithAnalyzer,
        WithAutoGenerateSynonymsPhraseQuery, WithBoost, WithBoostMode, WithCaseInsensitive,
        WithCutoffFrequency, WithDefaultOperator, WithFormat, WithFuzziness,
        WithFuzzyMaxExpansions, WithFuzzyPrefixLength, WithFuzzyRewrite,
        WithFuzzyTranspositions, WithLenient, WithMaxBoost, WithMaxDeterminizedStates,
        WithMaxExpansions, WithMinScore, WithMinimumShouldMatch, WithModifier, WithName,
        WithOperator, WithPrefixLength, WithQuoteAnalyzer, WithRelation, WithRewrite,
        WithScoreMode, WithSlop, WithTieBreaker, WithTimeZone, WithTranspositions, WithWeight,
        WithZeroTermsQuery,
    };
    pub use crate::query::ClauseBody;
}
