//! Parameter mixins and the parameter registry
//!
//! Every DSL option (boost, analyzer, fuzziness, ...) is a [`Param`]. A
//! clause stores the options it supports in a shared [`Params`] record and
//! declares which ones it exposes through [`Parameterized::PARAMS`]. The
//! registry half of this module ([`Params::accept`] and [`Params::emit`])
//! turns loose input into strict values and strict values back into JSON,
//! eliding anything equal to its default. The mixin half (`WithBoost`,
//! `WithAnalyzer`, ...) gives each clause typed getters and setters for the
//! options it declared.

use serde_json::{Map, Number, Value};

use crate::enums::{BoostMode, Modifier, Operator, Relation, Rewrite, ScoreMode, ZeroTerms};
use crate::error::{DslError, ErrorKind};
use crate::input::Loose;
use crate::query::QueryKind;

pub const DEFAULT_BOOST: f64 = 1.0;
pub const DEFAULT_MAX_EXPANSIONS: i64 = 50;
pub const DEFAULT_MAX_DETERMINIZED_STATES: i64 = 10_000;
pub const DEFAULT_MAX_BOOST: f64 = f32::MAX as f64;

/// One DSL option, identified by its canonical JSON key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Boost,
    Analyzer,
    QuoteAnalyzer,
    CaseInsensitive,
    Fuzziness,
    FuzzyRewrite,
    Rewrite,
    MaxExpansions,
    FuzzyMaxExpansions,
    PrefixLength,
    FuzzyPrefixLength,
    Operator,
    DefaultOperator,
    Lenient,
    Transpositions,
    FuzzyTranspositions,
    MinimumShouldMatch,
    Name,
    Slop,
    TimeZone,
    Relation,
    Format,
    ZeroTermsQuery,
    CutoffFrequency,
    AutoGenerateSynonymsPhraseQuery,
    ScoreMode,
    BoostMode,
    MinScore,
    MaxBoost,
    MaxDeterminizedStates,
    Modifier,
    Weight,
    TieBreaker,
    AllowLeadingWildcard,
    AnalyzeWildcard,
}

impl Param {
    pub const ALL: &'static [Param] = &[
        Param::Boost,
        Param::Analyzer,
        Param::QuoteAnalyzer,
        Param::CaseInsensitive,
        Param::Fuzziness,
        Param::FuzzyRewrite,
        Param::Rewrite,
        Param::MaxExpansions,
        Param::FuzzyMaxExpansions,
        Param::PrefixLength,
        Param::FuzzyPrefixLength,
        Param::Operator,
        Param::DefaultOperator,
        Param::Lenient,
        Param::Transpositions,
        Param::FuzzyTranspositions,
        Param::MinimumShouldMatch,
        Param::Name,
        Param::Slop,
        Param::TimeZone,
        Param::Relation,
        Param::Format,
        Param::ZeroTermsQuery,
        Param::CutoffFrequency,
        Param::AutoGenerateSynonymsPhraseQuery,
        Param::ScoreMode,
        Param::BoostMode,
        Param::MinScore,
        Param::MaxBoost,
        Param::MaxDeterminizedStates,
        Param::Modifier,
        Param::Weight,
        Param::TieBreaker,
        Param::AllowLeadingWildcard,
        Param::AnalyzeWildcard,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Param::Boost => "boost",
            Param::Analyzer => "analyzer",
            Param::QuoteAnalyzer => "quote_analyzer",
            Param::CaseInsensitive => "case_insensitive",
            Param::Fuzziness => "fuzziness",
            Param::FuzzyRewrite => "fuzzy_rewrite",
            Param::Rewrite => "rewrite",
            Param::MaxExpansions => "max_expansions",
            Param::FuzzyMaxExpansions => "fuzzy_max_expansions",
            Param::PrefixLength => "prefix_length",
            Param::FuzzyPrefixLength => "fuzzy_prefix_length",
            Param::Operator => "operator",
            Param::DefaultOperator => "default_operator",
            Param::Lenient => "lenient",
            Param::Transpositions => "transpositions",
            Param::FuzzyTranspositions => "fuzzy_transpositions",
            Param::MinimumShouldMatch => "minimum_should_match",
            Param::Name => "_name",
            Param::Slop => "slop",
            Param::TimeZone => "time_zone",
            Param::Relation => "relation",
            Param::Format => "format",
            Param::ZeroTermsQuery => "zero_terms_query",
            Param::CutoffFrequency => "cutoff_frequency",
            Param::AutoGenerateSynonymsPhraseQuery => "auto_generate_synonyms_phrase_query",
            Param::ScoreMode => "score_mode",
            Param::BoostMode => "boost_mode",
            Param::MinScore => "min_score",
            Param::MaxBoost => "max_boost",
            Param::MaxDeterminizedStates => "max_determinized_states",
            Param::Modifier => "modifier",
            Param::Weight => "weight",
            Param::TieBreaker => "tie_breaker",
            Param::AllowLeadingWildcard => "allow_leading_wildcard",
            Param::AnalyzeWildcard => "analyze_wildcard",
        }
    }

    pub fn from_key(key: &str) -> Option<Param> {
        Param::ALL.iter().copied().find(|p| p.key() == key)
    }
}

/// Strict parameter values of one clause; `None` means "at default"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    boost: Option<f64>,
    analyzer: Option<String>,
    quote_analyzer: Option<String>,
    case_insensitive: Option<bool>,
    fuzziness: Option<String>,
    fuzzy_rewrite: Option<Rewrite>,
    rewrite: Option<Rewrite>,
    max_expansions: Option<i64>,
    fuzzy_max_expansions: Option<i64>,
    prefix_length: Option<i64>,
    fuzzy_prefix_length: Option<i64>,
    operator: Option<Operator>,
    default_operator: Option<Operator>,
    lenient: Option<bool>,
    transpositions: Option<bool>,
    fuzzy_transpositions: Option<bool>,
    minimum_should_match: Option<String>,
    name: Option<String>,
    slop: Option<i64>,
    time_zone: Option<String>,
    relation: Option<Relation>,
    format: Option<String>,
    zero_terms_query: Option<ZeroTerms>,
    cutoff_frequency: Option<Number>,
    auto_generate_synonyms_phrase_query: Option<bool>,
    score_mode: Option<ScoreMode>,
    boost_mode: Option<BoostMode>,
    min_score: Option<f64>,
    max_boost: Option<f64>,
    max_determinized_states: Option<i64>,
    modifier: Option<Modifier>,
    weight: Option<f64>,
    tie_breaker: Option<f64>,
    allow_leading_wildcard: Option<bool>,
    analyze_wildcard: Option<bool>,
}

fn non_default<T: PartialEq>(value: T, default: T) -> Option<T> {
    (value != default).then_some(value)
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boost(&self) -> f64 {
        self.boost.unwrap_or(DEFAULT_BOOST)
    }

    pub fn analyzer(&self) -> &str {
        self.analyzer.as_deref().unwrap_or_default()
    }

    pub fn quote_analyzer(&self) -> &str {
        self.quote_analyzer.as_deref().unwrap_or_default()
    }

    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive.unwrap_or(false)
    }

    /// Edit distance spec (`AUTO`, `0`, `1`, `2`, `AUTO:3,6`); passed through as is
    pub fn fuzziness(&self) -> &str {
        self.fuzziness.as_deref().unwrap_or_default()
    }

    pub fn fuzzy_rewrite(&self) -> Rewrite {
        self.fuzzy_rewrite.unwrap_or_default()
    }

    pub fn rewrite(&self) -> Rewrite {
        self.rewrite.unwrap_or_default()
    }

    pub fn max_expansions(&self) -> i64 {
        self.max_expansions.unwrap_or(DEFAULT_MAX_EXPANSIONS)
    }

    pub fn fuzzy_max_expansions(&self) -> i64 {
        self.fuzzy_max_expansions.unwrap_or(DEFAULT_MAX_EXPANSIONS)
    }

    pub fn prefix_length(&self) -> i64 {
        self.prefix_length.unwrap_or(0)
    }

    pub fn fuzzy_prefix_length(&self) -> i64 {
        self.fuzzy_prefix_length.unwrap_or(0)
    }

    pub fn operator(&self) -> Operator {
        self.operator.unwrap_or_default()
    }

    pub fn default_operator(&self) -> Operator {
        self.default_operator.unwrap_or_default()
    }

    pub fn lenient(&self) -> bool {
        self.lenient.unwrap_or(false)
    }

    pub fn transpositions(&self) -> bool {
        self.transpositions.unwrap_or(true)
    }

    pub fn fuzzy_transpositions(&self) -> bool {
        self.fuzzy_transpositions.unwrap_or(true)
    }

    /// Integer or percentage, kept as the string the engine will receive
    pub fn minimum_should_match(&self) -> &str {
        self.minimum_should_match.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn slop(&self) -> i64 {
        self.slop.unwrap_or(0)
    }

    pub fn time_zone(&self) -> &str {
        self.time_zone.as_deref().unwrap_or_default()
    }

    pub fn relation(&self) -> Relation {
        self.relation.unwrap_or_default()
    }

    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or_default()
    }

    pub fn zero_terms_query(&self) -> ZeroTerms {
        self.zero_terms_query.unwrap_or_default()
    }

    pub fn cutoff_frequency(&self) -> Option<&Number> {
        self.cutoff_frequency.as_ref()
    }

    pub fn auto_generate_synonyms_phrase_query(&self) -> bool {
        self.auto_generate_synonyms_phrase_query.unwrap_or(true)
    }

    pub fn score_mode(&self) -> ScoreMode {
        self.score_mode.unwrap_or_default()
    }

    pub fn boost_mode(&self) -> BoostMode {
        self.boost_mode.unwrap_or_default()
    }

    pub fn min_score(&self) -> f64 {
        self.min_score.unwrap_or(0.0)
    }

    pub fn max_boost(&self) -> f64 {
        self.max_boost.unwrap_or(DEFAULT_MAX_BOOST)
    }

    pub fn max_determinized_states(&self) -> i64 {
        self.max_determinized_states
            .unwrap_or(DEFAULT_MAX_DETERMINIZED_STATES)
    }

    pub fn modifier(&self) -> Modifier {
        self.modifier.unwrap_or_default()
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    pub fn tie_breaker(&self) -> f64 {
        self.tie_breaker.unwrap_or(0.0)
    }

    pub fn allow_leading_wildcard(&self) -> bool {
        self.allow_leading_wildcard.unwrap_or(true)
    }

    pub fn analyze_wildcard(&self) -> bool {
        self.analyze_wildcard.unwrap_or(false)
    }

    /// True when every parameter is at its default
    pub fn is_default(&self) -> bool {
        *self == Params::default()
    }

    /// Return a parameter to its default
    pub fn reset(&mut self, param: Param) {
        match param {
            Param::Boost => self.boost = None,
            Param::Analyzer => self.analyzer = None,
            Param::QuoteAnalyzer => self.quote_analyzer = None,
            Param::CaseInsensitive => self.case_insensitive = None,
            Param::Fuzziness => self.fuzziness = None,
            Param::FuzzyRewrite => self.fuzzy_rewrite = None,
            Param::Rewrite => self.rewrite = None,
            Param::MaxExpansions => self.max_expansions = None,
            Param::FuzzyMaxExpansions => self.fuzzy_max_expansions = None,
            Param::PrefixLength => self.prefix_length = None,
            Param::FuzzyPrefixLength => self.fuzzy_prefix_length = None,
            Param::Operator => self.operator = None,
            Param::DefaultOperator => self.default_operator = None,
            Param::Lenient => self.lenient = None,
            Param::Transpositions => self.transpositions = None,
            Param::FuzzyTranspositions => self.fuzzy_transpositions = None,
            Param::MinimumShouldMatch => self.minimum_should_match = None,
            Param::Name => self.name = None,
            Param::Slop => self.slop = None,
            Param::TimeZone => self.time_zone = None,
            Param::Relation => self.relation = None,
            Param::Format => self.format = None,
            Param::ZeroTermsQuery => self.zero_terms_query = None,
            Param::CutoffFrequency => self.cutoff_frequency = None,
            Param::AutoGenerateSynonymsPhraseQuery => {
                self.auto_generate_synonyms_phrase_query = None
            }
            Param::ScoreMode => self.score_mode = None,
            Param::BoostMode => self.boost_mode = None,
            Param::MinScore => self.min_score = None,
            Param::MaxBoost => self.max_boost = None,
            Param::MaxDeterminizedStates => self.max_determinized_states = None,
            Param::Modifier => self.modifier = None,
            Param::Weight => self.weight = None,
            Param::TieBreaker => self.tie_breaker = None,
            Param::AllowLeadingWildcard => self.allow_leading_wildcard = None,
            Param::AnalyzeWildcard => self.analyze_wildcard = None,
        }
    }

    /// Coerce loose input into a parameter; `None` resets it to its default
    ///
    /// Values equal to the default are stored as "at default" so they are
    /// never emitted.
    pub fn accept(
        &mut self,
        param: Param,
        value: Option<Loose>,
        owner: Option<QueryKind>,
    ) -> Result<(), DslError> {
        let Some(value) = value else {
            self.reset(param);
            return Ok(());
        };
        let context = |err: DslError| {
            let err = err.with_param(param.key());
            match owner {
                Some(kind) => err.with_clause(kind),
                None => err,
            }
        };
        let fail = |kind: ErrorKind| context(DslError::new(kind).with_received(&value));

        match param {
            Param::Boost => {
                let boost = value
                    .to_f64()
                    .filter(|b| *b >= 0.0)
                    .ok_or_else(|| fail(ErrorKind::InvalidBoost))?;
                self.boost = non_default(boost, DEFAULT_BOOST);
            }
            Param::Analyzer => self.analyzer = non_empty(value.to_text()),
            Param::QuoteAnalyzer => self.quote_analyzer = non_empty(value.to_text()),
            Param::CaseInsensitive => {
                let v = value.to_bool().ok_or_else(|| fail(ErrorKind::InvalidParams))?;
                self.case_insensitive = non_default(v, false);
            }
            Param::Fuzziness => self.fuzziness = non_empty(value.to_text()),
            Param::FuzzyRewrite => {
                let v: Rewrite = value.to_text().parse().map_err(context)?;
                self.fuzzy_rewrite = non_default(v, Rewrite::default());
            }
            Param::Rewrite => {
                let v: Rewrite = value.to_text().parse().map_err(context)?;
                self.rewrite = non_default(v, Rewrite::default());
            }
            Param::MaxExpansions => {
                let kind = if owner == Some(QueryKind::Fuzzy) {
                    ErrorKind::InvalidFuzzyMaxExpansions
                } else {
                    ErrorKind::InvalidMaxExpansions
                };
                let v = value
                    .to_i64()
                    .filter(|v| *v > 0)
                    .ok_or_else(|| fail(kind))?;
                self.max_expansions = non_default(v, DEFAULT_MAX_EXPANSIONS);
            }
            Param::FuzzyMaxExpansions => {
                let v = value
                    .to_i64()
                    .filter(|v| *v > 0)
                    .ok_or_else(|| fail(ErrorKind::InvalidFuzzyMaxExpansions))?;
                self.fuzzy_max_expansions = non_default(v, DEFAULT_MAX_EXPANSIONS);
            }
            Param::PrefixLength => {
                let v = value
                    .to_i64()
                    .filter(|v| *v >= 0)
                    .ok_or_else(|| fail(ErrorKind::InvalidPrefixLength))?;
                self.prefix_length = non_default(v, 0);
            }
            Param::FuzzyPrefixLength => {
                let v = value
                    .to_i64()
                    .filter(|v| *v >= 0)
                    .ok_or_else(|| fail(ErrorKind::InvalidPrefixLength))?;
                self.fuzzy_prefix_length = non_default(v, 0);
            }
            Param::Operator => {
                let v: Operator = value.to_text().parse().map_err(context)?;
                self.operator = non_default(v, Operator::default());
            }
            Param::DefaultOperator => {
                let v: Operator = value.to_text().parse().map_err(context)?;
                self.default_operator = non_default(v, Operator::default());
            }
            Param::Lenient => {
                let v = value.to_bool().ok_or_else(|| fail(ErrorKind::InvalidParams))?;
                self.lenient = non_default(v, false);
            }
            Param::Transpositions => {
                let v = value.to_bool().ok_or_else(|| fail(ErrorKind::InvalidParams))?;
                self.transpositions = non_default(v, true);
            }
            Param::FuzzyTranspositions => {
                let v = value.to_bool().ok_or_else(|| fail(ErrorKind::InvalidParams))?;
                self.fuzzy_transpositions = non_default(v, true);
            }
            Param::MinimumShouldMatch => {
                let v = match &value {
                    Loose::Int(i) => i.to_string(),
                    Loose::Str(s) => s.trim().to_string(),
                    _ => return Err(fail(ErrorKind::InvalidParams)),
                };
                self.minimum_should_match = non_empty(v);
            }
            Param::Name => self.name = non_empty(value.to_text()),
            Param::Slop => {
                let v = value
                    .to_i64()
                    .filter(|v| *v >= 0)
                    .ok_or_else(|| fail(ErrorKind::InvalidParams))?;
                self.slop = non_default(v, 0);
            }
            Param::TimeZone => self.time_zone = non_empty(value.to_text()),
            Param::Relation => {
                let v: Relation = value.to_text().parse().map_err(context)?;
                self.relation = non_default(v, Relation::default());
            }
            Param::Format => self.format = non_empty(value.to_text()),
            Param::ZeroTermsQuery => {
                let v: ZeroTerms = value.to_text().parse().map_err(context)?;
                self.zero_terms_query = non_default(v, ZeroTerms::default());
            }
            Param::CutoffFrequency => {
                let number = match &value {
                    Loose::Int(i) => Some(Number::from(*i)),
                    _ => value.to_f64().and_then(Number::from_f64),
                };
                self.cutoff_frequency =
                    Some(number.ok_or_else(|| fail(ErrorKind::InvalidParams))?);
            }
            Param::AutoGenerateSynonymsPhraseQuery => {
                let v = value.to_bool().ok_or_else(|| fail(ErrorKind::InvalidParams))?;
                self.auto_generate_synonyms_phrase_query = non_default(v, true);
            }
            Param::ScoreMode => {
                let v: ScoreMode = value.to_text().parse().map_err(context)?;
                self.score_mode = non_default(v, ScoreMode::default());
            }
            Param::BoostMode => {
                let v: BoostMode = value.to_text().parse().map_err(context)?;
                self.boost_mode = non_default(v, BoostMode::default());
            }
            Param::MinScore => {
                let v = value.to_f64().ok_or_else(|| fail(ErrorKind::InvalidParams))?;
                self.min_score = (v > 0.0).then_some(v);
            }
            Param::MaxBoost => {
                let v = value
                    .to_f64()
                    .filter(|v| *v >= 0.0)
                    .ok_or_else(|| fail(ErrorKind::InvalidBoost))?;
                self.max_boost = non_default(v, DEFAULT_MAX_BOOST);
            }
            Param::MaxDeterminizedStates => {
                let v = value
                    .to_i64()
                    .filter(|v| *v > 0)
                    .ok_or_else(|| fail(ErrorKind::InvalidParams))?;
                self.max_determinized_states = non_default(v, DEFAULT_MAX_DETERMINIZED_STATES);
            }
            Param::Modifier => {
                let v: Modifier = value.to_text().parse().map_err(context)?;
                self.modifier = non_default(v, Modifier::default());
            }
            Param::Weight => {
                let v = value.to_f64().ok_or_else(|| fail(ErrorKind::InvalidParams))?;
                self.weight = Some(v);
            }
            Param::TieBreaker => {
                let v = value
                    .to_f64()
                    .filter(|v| (0.0..=1.0).contains(v))
                    .ok_or_else(|| fail(ErrorKind::InvalidTieBreaker))?;
                self.tie_breaker = non_default(v, 0.0);
            }
            Param::AllowLeadingWildcard => {
                let v = value.to_bool().ok_or_else(|| fail(ErrorKind::InvalidParams))?;
                self.allow_leading_wildcard = non_default(v, true);
            }
            Param::AnalyzeWildcard => {
                let v = value.to_bool().ok_or_else(|| fail(ErrorKind::InvalidParams))?;
                self.analyze_wildcard = non_default(v, false);
            }
        }
        Ok(())
    }

    /// Accept an optional record value; absent values leave the default in place
    pub(crate) fn apply<V: Into<Loose>>(
        &mut self,
        param: Param,
        value: Option<V>,
        owner: Option<QueryKind>,
    ) -> Result<(), DslError> {
        match value {
            Some(v) => self.accept(param, Some(v.into()), owner),
            None => Ok(()),
        }
    }

    /// Write a parameter into a JSON object unless it is at its default
    pub fn emit(&self, param: Param, map: &mut Map<String, Value>) {
        let value = match param {
            Param::Boost => self.boost.map(Value::from),
            Param::Analyzer => self.analyzer.clone().map(Value::String),
            Param::QuoteAnalyzer => self.quote_analyzer.clone().map(Value::String),
            Param::CaseInsensitive => self.case_insensitive.map(Value::Bool),
            Param::Fuzziness => self.fuzziness.clone().map(Value::String),
            Param::FuzzyRewrite => self.fuzzy_rewrite.map(|v| Value::String(v.as_string())),
            Param::Rewrite => self.rewrite.map(|v| Value::String(v.as_string())),
            Param::MaxExpansions => self.max_expansions.map(Value::from),
            Param::FuzzyMaxExpansions => self.fuzzy_max_expansions.map(Value::from),
            Param::PrefixLength => self.prefix_length.map(Value::from),
            Param::FuzzyPrefixLength => self.fuzzy_prefix_length.map(Value::from),
            Param::Operator => self.operator.map(|v| Value::from(v.as_str())),
            Param::DefaultOperator => self.default_operator.map(|v| Value::from(v.as_str())),
            Param::Lenient => self.lenient.map(Value::Bool),
            Param::Transpositions => self.transpositions.map(Value::Bool),
            Param::FuzzyTranspositions => self.fuzzy_transpositions.map(Value::Bool),
            Param::MinimumShouldMatch => self.minimum_should_match.clone().map(Value::String),
            Param::Name => self.name.clone().map(Value::String),
            Param::Slop => self.slop.map(Value::from),
            Param::TimeZone => self.time_zone.clone().map(Value::String),
            Param::Relation => self.relation.map(|v| Value::from(v.as_str())),
            Param::Format => self.format.clone().map(Value::String),
            Param::ZeroTermsQuery => self.zero_terms_query.map(|v| Value::from(v.as_str())),
            Param::CutoffFrequency => self.cutoff_frequency.clone().map(Value::Number),
            Param::AutoGenerateSynonymsPhraseQuery => {
                self.auto_generate_synonyms_phrase_query.map(Value::Bool)
            }
            Param::ScoreMode => self.score_mode.map(|v| Value::from(v.as_str())),
            Param::BoostMode => self.boost_mode.map(|v| Value::from(v.as_str())),
            Param::MinScore => self.min_score.map(Value::from),
            Param::MaxBoost => self.max_boost.map(Value::from),
            Param::MaxDeterminizedStates => self.max_determinized_states.map(Value::from),
            Param::Modifier => self.modifier.map(|v| Value::from(v.as_str())),
            Param::Weight => self.weight.map(Value::from),
            Param::TieBreaker => self.tie_breaker.map(Value::from),
            Param::AllowLeadingWildcard => self.allow_leading_wildcard.map(Value::Bool),
            Param::AnalyzeWildcard => self.analyze_wildcard.map(Value::Bool),
        };
        if let Some(value) = value {
            map.insert(param.key().to_string(), value);
        }
    }
}

/// A value that carries a [`Params`] record and declares which parameters it exposes
pub trait Parameterized {
    /// Parameters read and written for this holder, in emit order
    const PARAMS: &'static [Param];

    /// Clause kind named in parameter errors
    const OWNER: Option<QueryKind>;

    fn params(&self) -> &Params;

    fn params_mut(&mut self) -> &mut Params;

    fn reset_param(&mut self, param: Param) {
        self.params_mut().reset(param);
    }
}

/// Emit every declared parameter that differs from its default
pub(crate) fn write_params<P: Parameterized>(holder: &P, map: &mut Map<String, Value>) {
    for param in P::PARAMS {
        holder.params().emit(*param, map);
    }
}

/// Read every declared parameter present in a JSON object
pub(crate) fn read_params<P: Parameterized>(
    holder: &mut P,
    map: &Map<String, Value>,
) -> Result<(), DslError> {
    for param in P::PARAMS {
        let Some(raw) = map.get(param.key()) else {
            continue;
        };
        let value = Loose::from_json(raw).map_err(|received| {
            let err = DslError::new(ErrorKind::InvalidParams)
                .with_param(param.key())
                .with_received(received);
            match P::OWNER {
                Some(kind) => err.with_clause(kind),
                None => err,
            }
        })?;
        holder.params_mut().accept(*param, value, P::OWNER)?;
    }
    Ok(())
}

/// Log keys that are neither declared parameters nor payload keys of the holder
pub(crate) fn report_unknown<P: Parameterized>(map: &Map<String, Value>, payload: &[&str]) {
    for key in map.keys() {
        let declared = P::PARAMS.iter().any(|p| p.key() == key);
        if !declared && !payload.contains(&key.as_str()) {
            tracing::debug!(
                clause = ?P::OWNER,
                key = %key,
                "ignoring unknown parameter"
            );
        }
    }
}

macro_rules! mixin {
    ($(#[$doc:meta])* $trait:ident: $param:ident, $getter:ident -> $ret:ty, $setter:ident) => {
        $(#[$doc])*
        pub trait $trait: Parameterized {
            fn $getter(&self) -> $ret {
                self.params().$getter()
            }

            fn $setter<V: Into<Loose>>(&mut self, value: V) -> Result<(), DslError> {
                self.params_mut()
                    .accept(Param::$param, Some(value.into()), Self::OWNER)
            }
        }
    };
}

mixin!(
    /// Relevance multiplier, default 1.0
    WithBoost: Boost, boost -> f64, set_boost
);
mixin!(WithAnalyzer: Analyzer, analyzer -> &str, set_analyzer);
mixin!(WithQuoteAnalyzer: QuoteAnalyzer, quote_analyzer -> &str, set_quote_analyzer);
mixin!(WithCaseInsensitive: CaseInsensitive, case_insensitive -> bool, set_case_insensitive);
mixin!(
    /// Allowed edit distance, passed through to the engine unchanged
    WithFuzziness: Fuzziness, fuzziness -> &str, set_fuzziness
);
mixin!(WithFuzzyRewrite: FuzzyRewrite, fuzzy_rewrite -> Rewrite, set_fuzzy_rewrite);
mixin!(WithRewrite: Rewrite, rewrite -> Rewrite, set_rewrite);
mixin!(WithMaxExpansions: MaxExpansions, max_expansions -> i64, set_max_expansions);
mixin!(
    WithFuzzyMaxExpansions: FuzzyMaxExpansions,
    fuzzy_max_expansions -> i64,
    set_fuzzy_max_expansions
);
mixin!(WithPrefixLength: PrefixLength, prefix_length -> i64, set_prefix_length);
mixin!(
    WithFuzzyPrefixLength: FuzzyPrefixLength,
    fuzzy_prefix_length -> i64,
    set_fuzzy_prefix_length
);
mixin!(WithOperator: Operator, operator -> Operator, set_operator);
mixin!(WithDefaultOperator: DefaultOperator, default_operator -> Operator, set_default_operator);
mixin!(WithLenient: Lenient, lenient -> bool, set_lenient);
mixin!(WithTranspositions: Transpositions, transpositions -> bool, set_transpositions);
mixin!(
    WithFuzzyTranspositions: FuzzyTranspositions,
    fuzzy_transpositions -> bool,
    set_fuzzy_transpositions
);
mixin!(
    /// Number or percentage of optional clauses that must match
    WithMinimumShouldMatch: MinimumShouldMatch,
    minimum_should_match -> &str,
    set_minimum_should_match
);
mixin!(
    /// `_name` label reported back in `matched_queries`
    WithName: Name, name -> &str, set_name
);
mixin!(WithSlop: Slop, slop -> i64, set_slop);
mixin!(WithTimeZone: TimeZone, time_zone -> &str, set_time_zone);
mixin!(WithRelation: Relation, relation -> Relation, set_relation);
mixin!(WithFormat: Format, format -> &str, set_format);
mixin!(WithZeroTermsQuery: ZeroTermsQuery, zero_terms_query -> ZeroTerms, set_zero_terms_query);
mixin!(WithCutoffFrequency: CutoffFrequency, cutoff_frequency -> Option<&Number>, set_cutoff_frequency);
mixin!(
    WithAutoGenerateSynonymsPhraseQuery: AutoGenerateSynonymsPhraseQuery,
    auto_generate_synonyms_phrase_query -> bool,
    set_auto_generate_synonyms_phrase_query
);
mixin!(WithScoreMode: ScoreMode, score_mode -> ScoreMode, set_score_mode);
mixin!(WithBoostMode: BoostMode, boost_mode -> BoostMode, set_boost_mode);
mixin!(
    /// Documents scoring below this are dropped; zero or less resets it
    WithMinScore: MinScore, min_score -> f64, set_min_score
);
mixin!(WithMaxBoost: MaxBoost, max_boost -> f64, set_max_boost);
mixin!(
    WithMaxDeterminizedStates: MaxDeterminizedStates,
    max_determinized_states -> i64,
    set_max_determinized_states
);
mixin!(WithModifier: Modifier, modifier -> Modifier, set_modifier);
mixin!(WithWeight: Weight, weight -> Option<f64>, set_weight);
mixin!(
    /// Weight of non-best matching clauses, in [0, 1]
    WithTieBreaker: TieBreaker, tie_breaker -> f64, set_tie_breaker
);
mixin!(
    WithAllowLeadingWildcard: AllowLeadingWildcard,
    allow_leading_wildcard -> bool,
    set_allow_leading_wildcard
);
mixin!(WithAnalyzeWildcard: AnalyzeWildcard, analyze_wildcard -> bool, set_analyze_wildcard);

/// Implement [`Parameterized`] and the listed mixins for a type with a `params` field
macro_rules! parameterized {
    ($ty:ty, $owner:expr, [$($mixin:ident: $param:ident),* $(,)?]) => {
        impl $crate::params::Parameterized for $ty {
            const PARAMS: &'static [$crate::params::Param] = &[$($crate::params::Param::$param),*];
            const OWNER: Option<$crate::query::QueryKind> = $owner;

            fn params(&self) -> &$crate::params::Params {
                &self.params
            }

            fn params_mut(&mut self) -> &mut $crate::params::Params {
                &mut self.params
            }
        }

        $(impl $crate::params::$mixin for $ty {})*
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Probe {
        params: Params,
    }

    parameterized!(Probe, Some(QueryKind::Match), [
        WithBoost: Boost,
        WithOperator: Operator,
        WithMinScore: MinScore,
        WithTieBreaker: TieBreaker,
        WithName: Name,
    ]);

    #[test]
    fn test_param_keys_round_trip() {
        for param in Param::ALL {
            assert_eq!(Param::from_key(param.key()), Some(*param));
        }
        assert_eq!(Param::from_key("unknown"), None);
    }

    #[test]
    fn test_loose_setters_coerce() {
        let mut probe = Probe::default();
        probe.set_boost("2.5").unwrap();
        assert_eq!(probe.boost(), 2.5);
        probe.set_operator("and").unwrap();
        assert_eq!(probe.operator(), Operator::And);
    }

    #[test]
    fn test_default_values_are_elided() {
        let mut probe = Probe::default();
        probe.set_boost(1.0).unwrap();
        probe.set_operator("OR").unwrap();
        let mut map = Map::new();
        write_params(&probe, &mut map);
        assert!(map.is_empty());
        assert!(probe.params().is_default());
    }

    #[test]
    fn test_invalid_boost_names_param_and_clause() {
        let mut probe = Probe::default();
        let err = probe.set_boost("high").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidBoost);
        assert_eq!(err.param(), Some("boost"));
        assert_eq!(err.clause(), Some(QueryKind::Match));
    }

    #[test]
    fn test_invalid_operator_rejected() {
        let mut probe = Probe::default();
        let err = probe.set_operator("xor").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperator);
    }

    #[test]
    fn test_tie_breaker_bounds() {
        let mut probe = Probe::default();
        probe.set_tie_breaker(0.7).unwrap();
        assert_eq!(probe.tie_breaker(), 0.7);
        assert_eq!(
            probe.set_tie_breaker(1.5).unwrap_err().kind(),
            ErrorKind::InvalidTieBreaker
        );
        assert_eq!(
            probe.set_tie_breaker(-0.1).unwrap_err().kind(),
            ErrorKind::InvalidTieBreaker
        );
    }

    #[test]
    fn test_min_score_resets_on_zero() {
        let mut probe = Probe::default();
        probe.set_min_score(3.0).unwrap();
        assert_eq!(probe.min_score(), 3.0);
        probe.set_min_score(0).unwrap();
        assert_eq!(probe.min_score(), 0.0);
        let mut map = Map::new();
        write_params(&probe, &mut map);
        assert!(!map.contains_key("min_score"));
    }

    #[test]
    fn test_read_params_only_declared() {
        let mut probe = Probe::default();
        let body = json!({"boost": "3", "_name": "q1", "analyzer": "standard"});
        read_params(&mut probe, body.as_object().unwrap()).unwrap();
        assert_eq!(probe.boost(), 3.0);
        assert_eq!(probe.name(), "q1");
        assert_eq!(probe.params().analyzer(), "");
    }

    #[test]
    fn test_read_params_rejects_object_value() {
        let mut probe = Probe::default();
        let body = json!({"boost": {"x": 1}});
        let err = read_params(&mut probe, body.as_object().unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParams);
        assert_eq!(err.param(), Some("boost"));
    }

    #[test]
    fn test_max_expansions_error_depends_on_owner() {
        let mut params = Params::new();
        let err = params
            .accept(Param::MaxExpansions, Some(Loose::Int(0)), Some(QueryKind::Fuzzy))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFuzzyMaxExpansions);
        let err = params
            .accept(Param::MaxExpansions, Some(Loose::Int(0)), Some(QueryKind::Match))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMaxExpansions);
    }

    #[test]
    fn test_minimum_should_match_integer_rendered_as_string() {
        let mut params = Params::new();
        params
            .accept(Param::MinimumShouldMatch, Some(Loose::Int(2)), None)
            .unwrap();
        assert_eq!(params.minimum_should_match(), "2");
        params
            .accept(Param::MinimumShouldMatch, Some(Loose::from("75%")), None)
            .unwrap();
        assert_eq!(params.minimum_should_match(), "75%");
    }

    #[test]
    fn test_null_resets() {
        let mut params = Params::new();
        params.accept(Param::Slop, Some(Loose::Int(3)), None).unwrap();
        assert_eq!(params.slop(), 3);
        params.accept(Param::Slop, None, None).unwrap();
        assert_eq!(params.slop(), 0);
    }
}
