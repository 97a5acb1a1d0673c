//! `function_score`: rescore an inner query with a list of scoring functions
//!
//! Each function is a JSON object holding one function key (`gauss`,
//! `field_value_factor`, ...) beside the shared `filter` and `weight`:
//!
//! ```json
//! {"filter": {"term": {"tag": "a"}}, "gauss": {"date": {"origin": "now", "scale": "10d"}}, "weight": 2}
//! ```
//!
//! A function object with neither a function key nor a `weight` is rejected.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{DslError, ErrorKind};
use crate::input::Loose;
use crate::params::{
    read_params, report_unknown, write_params, Param, Parameterized, Params, WithWeight,
};
use crate::scalar::Scalar;

use super::shape::{flat, float, put, scalar, string};
use super::specialized::Script;
use super::{build_slot, parse_slot, ClauseBody, Query, QueryKind, QueryParams};

/// Discriminator key of a scoring function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Exp,
    Gauss,
    Linear,
    FieldValueFactor,
    ScriptScore,
    RandomScore,
    Weight,
}

impl FunctionKind {
    /// Kinds that appear as a key of the function object
    pub const KEYED: &'static [FunctionKind] = &[
        FunctionKind::Exp,
        FunctionKind::Gauss,
        FunctionKind::Linear,
        FunctionKind::FieldValueFactor,
        FunctionKind::ScriptScore,
        FunctionKind::RandomScore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionKind::Exp => "exp",
            FunctionKind::Gauss => "gauss",
            FunctionKind::Linear => "linear",
            FunctionKind::FieldValueFactor => "field_value_factor",
            FunctionKind::ScriptScore => "script_score",
            FunctionKind::RandomScore => "random_score",
            FunctionKind::Weight => "weight",
        }
    }

    pub fn is_decay(&self) -> bool {
        matches!(
            self,
            FunctionKind::Exp | FunctionKind::Gauss | FunctionKind::Linear
        )
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FunctionKind {
    type Err = DslError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exp" => Ok(FunctionKind::Exp),
            "gauss" => Ok(FunctionKind::Gauss),
            "linear" => Ok(FunctionKind::Linear),
            "field_value_factor" => Ok(FunctionKind::FieldValueFactor),
            "script_score" => Ok(FunctionKind::ScriptScore),
            "random_score" => Ok(FunctionKind::RandomScore),
            "weight" => Ok(FunctionKind::Weight),
            _ => Err(DslError::new(ErrorKind::UnsupportedKind).with_received(format!("{:?}", s))),
        }
    }
}

// ============================================================================
// decay
// ============================================================================

/// `exp`, `gauss` or `linear` decay around an origin
#[derive(Debug, Clone, PartialEq)]
pub struct DecayFunction {
    kind: FunctionKind,
    field: String,
    origin: Scalar,
    scale: Scalar,
    offset: Option<Scalar>,
    decay: Option<f64>,
    multi_value_mode: String,
}

impl DecayFunction {
    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn origin(&self) -> &Scalar {
        &self.origin
    }

    pub fn scale(&self) -> &Scalar {
        &self.scale
    }

    pub fn offset(&self) -> Option<&Scalar> {
        self.offset.as_ref()
    }

    /// Score at `scale` distance from the origin, 0.5 when unset
    pub fn decay(&self) -> f64 {
        self.decay.unwrap_or(0.5)
    }

    pub fn multi_value_mode(&self) -> &str {
        &self.multi_value_mode
    }

    fn validate(
        kind: FunctionKind,
        field: String,
        origin: Option<Scalar>,
        scale: Option<Scalar>,
    ) -> Result<(String, Scalar, Scalar), DslError> {
        if field.is_empty() {
            return Err(DslError::new(ErrorKind::FieldRequired).with_param(kind.as_str()));
        }
        let origin = origin
            .filter(|o| !o.is_empty())
            .ok_or_else(|| DslError::new(ErrorKind::OriginRequired).with_field(field.as_str()))?;
        let scale = scale
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DslError::new(ErrorKind::ScaleRequired).with_field(field.as_str()))?;
        Ok((field, origin, scale))
    }

    fn decay_value(loose: Option<Loose>) -> Result<Option<f64>, DslError> {
        let Some(loose) = loose else {
            return Ok(None);
        };
        let decay = loose
            .to_f64()
            .filter(|d| *d > 0.0 && *d < 1.0)
            .ok_or_else(|| {
                DslError::new(ErrorKind::InvalidParams)
                    .with_param("decay")
                    .with_received(&loose)
            })?;
        Ok((decay != 0.5).then_some(decay))
    }

    fn to_json(&self) -> Value {
        let mut inner = Map::new();
        inner.insert("origin".to_string(), self.origin.to_json());
        inner.insert("scale".to_string(), self.scale.to_json());
        put(&mut inner, "offset", self.offset.as_ref().map(Scalar::to_json));
        put(&mut inner, "decay", self.decay.map(Value::from));
        let mut outer = Map::new();
        outer.insert(self.field.clone(), Value::Object(inner));
        if !self.multi_value_mode.is_empty() {
            outer.insert(
                "multi_value_mode".to_string(),
                Value::from(self.multi_value_mode.as_str()),
            );
        }
        Value::Object(outer)
    }

    fn from_json(kind: FunctionKind, value: &Value) -> Result<Self, DslError> {
        let map = value.as_object().ok_or_else(|| {
            DslError::new(ErrorKind::InvalidParams)
                .with_param(kind.as_str())
                .with_received(value)
        })?;
        let multi_value_mode = string(map, "multi_value_mode")?.unwrap_or_default();
        let mut fields = map.iter().filter(|(key, _)| key.as_str() != "multi_value_mode");
        let (field, inner) = match (fields.next(), fields.next()) {
            (Some((field, Value::Object(inner))), None) => (field.clone(), inner),
            (None, _) => {
                return Err(DslError::new(ErrorKind::FieldRequired).with_param(kind.as_str()))
            }
            _ => {
                return Err(DslError::new(ErrorKind::InvalidParams)
                    .with_param(kind.as_str())
                    .with_detail("expected a single field holding origin and scale"))
            }
        };
        let with_field = |e: DslError| e.with_field(field.as_str());
        let origin = scalar(inner, "origin").map_err(with_field)?;
        let scale = scalar(inner, "scale").map_err(with_field)?;
        let offset = scalar(inner, "offset").map_err(with_field)?;
        let decay = match inner.get("decay") {
            Some(raw) => Loose::from_json(raw).map_err(|received| {
                DslError::new(ErrorKind::InvalidParams)
                    .with_param("decay")
                    .with_received(received)
            })?,
            None => None,
        };
        let decay = Self::decay_value(decay).map_err(with_field)?;
        let (field, origin, scale) = Self::validate(kind, field, origin, scale)?;
        Ok(DecayFunction {
            kind,
            field,
            origin,
            scale,
            offset,
            decay,
            multi_value_mode,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecayParams {
    pub kind: FunctionKind,
    pub field: String,
    pub origin: Option<Scalar>,
    pub scale: Option<Scalar>,
    pub offset: Option<Scalar>,
    pub decay: Option<Loose>,
    pub multi_value_mode: String,
    pub filter: Option<QueryParams>,
    pub weight: Option<Loose>,
}

impl DecayParams {
    pub fn new(kind: FunctionKind, field: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            origin: None,
            scale: None,
            offset: None,
            decay: None,
            multi_value_mode: String::new(),
            filter: None,
            weight: None,
        }
    }

    pub fn gauss(field: impl Into<String>) -> Self {
        Self::new(FunctionKind::Gauss, field)
    }

    pub fn exp(field: impl Into<String>) -> Self {
        Self::new(FunctionKind::Exp, field)
    }

    pub fn linear(field: impl Into<String>) -> Self {
        Self::new(FunctionKind::Linear, field)
    }

    pub fn origin(mut self, origin: impl Into<Scalar>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn scale(mut self, scale: impl Into<Scalar>) -> Self {
        self.scale = Some(scale.into());
        self
    }
}

// ============================================================================
// field_value_factor / random_score
// ============================================================================

/// Score from a numeric field of the document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValueFactorFunction {
    field: String,
    factor: Option<f64>,
    missing: Option<f64>,
    params: Params,
}

parameterized!(FieldValueFactorFunction, Some(QueryKind::FunctionScore), [
    WithModifier: Modifier,
]);

impl FieldValueFactorFunction {
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Multiplier applied to the field value, 1.0 when unset
    pub fn factor(&self) -> f64 {
        self.factor.unwrap_or(1.0)
    }

    pub fn missing(&self) -> Option<f64> {
        self.missing
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("field".to_string(), Value::from(self.field.as_str()));
        put(&mut map, "factor", self.factor.map(Value::from));
        put(&mut map, "missing", self.missing.map(Value::from));
        write_params(self, &mut map);
        Value::Object(map)
    }

    fn from_json(value: &Value) -> Result<Self, DslError> {
        let map = value.as_object().ok_or_else(|| {
            DslError::new(ErrorKind::InvalidParams)
                .with_param("field_value_factor")
                .with_received(value)
        })?;
        let mut function = FieldValueFactorFunction {
            field: string(map, "field")?.unwrap_or_default(),
            factor: float(map, "factor")?.filter(|f| *f != 1.0),
            missing: float(map, "missing")?,
            params: Params::new(),
        };
        if function.field.is_empty() {
            return Err(DslError::new(ErrorKind::FieldRequired).with_param("field_value_factor"));
        }
        read_params(&mut function, map)?;
        report_unknown::<Self>(map, &["field", "factor", "missing"]);
        Ok(function)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValueFactorParams {
    pub field: String,
    pub factor: Option<Loose>,
    pub missing: Option<Loose>,
    pub modifier: Option<Loose>,
    pub filter: Option<QueryParams>,
    pub weight: Option<Loose>,
}

impl FieldValueFactorParams {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Default::default()
        }
    }
}

/// Uniformly random scores, reproducible with `seed` and `field`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RandomScoreFunction {
    seed: Option<Scalar>,
    field: String,
}

impl RandomScoreFunction {
    pub fn seed(&self) -> Option<&Scalar> {
        self.seed.as_ref()
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        put(&mut map, "seed", self.seed.as_ref().map(Scalar::to_json));
        if !self.field.is_empty() {
            map.insert("field".to_string(), Value::from(self.field.as_str()));
        }
        Value::Object(map)
    }

    fn from_json(value: &Value) -> Result<Self, DslError> {
        let Some(map) = flat(value)? else {
            return Ok(Self::default());
        };
        Ok(RandomScoreFunction {
            seed: scalar(map, "seed")?,
            field: string(map, "field")?.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RandomScoreParams {
    pub seed: Option<Scalar>,
    pub field: String,
    pub filter: Option<QueryParams>,
    pub weight: Option<Loose>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptScoreFunctionParams {
    pub script: Option<Script>,
    pub filter: Option<QueryParams>,
    pub weight: Option<Loose>,
}

/// A bare `weight` multiplier, optionally restricted by `filter`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightParams {
    pub weight: Option<Loose>,
    pub filter: Option<QueryParams>,
}

// ============================================================================
// function
// ============================================================================

/// Function-specific part of a scoring function
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Decay(DecayFunction),
    FieldValueFactor(FieldValueFactorFunction),
    ScriptScore(Script),
    RandomScore(RandomScoreFunction),
    Weight,
}

impl FunctionBody {
    pub fn kind(&self) -> FunctionKind {
        match self {
            FunctionBody::Decay(decay) => decay.kind,
            FunctionBody::FieldValueFactor(_) => FunctionKind::FieldValueFactor,
            FunctionBody::ScriptScore(_) => FunctionKind::ScriptScore,
            FunctionBody::RandomScore(_) => FunctionKind::RandomScore,
            FunctionBody::Weight => FunctionKind::Weight,
        }
    }
}

/// One entry of `function_score.functions`
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    body: FunctionBody,
    filter: Option<Box<Query>>,
    params: Params,
}

parameterized!(Function, Some(QueryKind::FunctionScore), [
    WithWeight: Weight,
]);

/// Parameter record of any scoring function
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionParams {
    Decay(DecayParams),
    FieldValueFactor(FieldValueFactorParams),
    ScriptScore(ScriptScoreFunctionParams),
    RandomScore(RandomScoreParams),
    Weight(WeightParams),
}

impl From<DecayParams> for FunctionParams {
    fn from(p: DecayParams) -> Self {
        FunctionParams::Decay(p)
    }
}

impl From<FieldValueFactorParams> for FunctionParams {
    fn from(p: FieldValueFactorParams) -> Self {
        FunctionParams::FieldValueFactor(p)
    }
}

impl From<ScriptScoreFunctionParams> for FunctionParams {
    fn from(p: ScriptScoreFunctionParams) -> Self {
        FunctionParams::ScriptScore(p)
    }
}

impl From<RandomScoreParams> for FunctionParams {
    fn from(p: RandomScoreParams) -> Self {
        FunctionParams::RandomScore(p)
    }
}

impl From<WeightParams> for FunctionParams {
    fn from(p: WeightParams) -> Self {
        FunctionParams::Weight(p)
    }
}

impl FunctionParams {
    pub fn build(self) -> Result<Function, DslError> {
        Function::new(self)
    }
}

impl Function {
    pub fn new(record: FunctionParams) -> Result<Self, DslError> {
        let (body, filter, weight) = match record {
            FunctionParams::Decay(p) => {
                let (field, origin, scale) =
                    DecayFunction::validate(p.kind, p.field, p.origin, p.scale)?;
                let decay = DecayFunction::decay_value(p.decay)?;
                let body = FunctionBody::Decay(DecayFunction {
                    kind: p.kind,
                    field,
                    origin,
                    scale,
                    offset: p.offset,
                    decay,
                    multi_value_mode: p.multi_value_mode,
                });
                (body, p.filter, p.weight)
            }
            FunctionParams::FieldValueFactor(p) => {
                if p.field.is_empty() {
                    return Err(DslError::new(ErrorKind::FieldRequired)
                        .with_clause(QueryKind::FunctionScore)
                        .with_param("field_value_factor"));
                }
                let float_of = |key: &str, loose: Option<Loose>| -> Result<Option<f64>, DslError> {
                    match loose {
                        None => Ok(None),
                        Some(loose) => loose.to_f64().map(Some).ok_or_else(|| {
                            DslError::new(ErrorKind::InvalidParams)
                                .with_param(key)
                                .with_received(&loose)
                        }),
                    }
                };
                let mut function = FieldValueFactorFunction {
                    field: p.field,
                    factor: float_of("factor", p.factor)?.filter(|f| *f != 1.0),
                    missing: float_of("missing", p.missing)?,
                    params: Params::new(),
                };
                function
                    .params
                    .apply(Param::Modifier, p.modifier, FieldValueFactorFunction::OWNER)?;
                (FunctionBody::FieldValueFactor(function), p.filter, p.weight)
            }
            FunctionParams::ScriptScore(p) => {
                let script = Script::required(p.script)?;
                (FunctionBody::ScriptScore(script), p.filter, p.weight)
            }
            FunctionParams::RandomScore(p) => {
                let function = RandomScoreFunction {
                    seed: p.seed,
                    field: p.field,
                };
                (FunctionBody::RandomScore(function), p.filter, p.weight)
            }
            FunctionParams::Weight(p) => {
                if p.weight.is_none() {
                    return Err(DslError::new(ErrorKind::WeightRequired)
                        .with_clause(QueryKind::FunctionScore));
                }
                (FunctionBody::Weight, p.filter, p.weight)
            }
        };
        let mut params = Params::new();
        params.apply(Param::Weight, weight, Self::OWNER)?;
        Ok(Function {
            body,
            filter: build_slot(filter, "filter")?,
            params,
        })
    }

    pub fn kind(&self) -> FunctionKind {
        self.body.kind()
    }

    pub fn body(&self) -> &FunctionBody {
        &self.body
    }

    pub fn filter(&self) -> Option<&Query> {
        self.filter.as_deref()
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        let body = match &self.body {
            FunctionBody::Decay(decay) => Some(decay.to_json()),
            FunctionBody::FieldValueFactor(fvf) => Some(fvf.to_json()),
            FunctionBody::ScriptScore(script) => {
                let mut inner = Map::new();
                inner.insert("script".to_string(), script.to_json());
                Some(Value::Object(inner))
            }
            FunctionBody::RandomScore(random) => Some(random.to_json()),
            FunctionBody::Weight => None,
        };
        put(&mut map, self.kind().as_str(), body);
        if let Some(filter) = &self.filter {
            map.insert("filter".to_string(), filter.to_json());
        }
        write_params(self, &mut map);
        Value::Object(map)
    }

    /// Parse one function object; `filter` and `weight` sit beside the function key
    pub fn from_json(value: &Value) -> Result<Self, DslError> {
        let map = value.as_object().ok_or_else(|| {
            DslError::new(ErrorKind::InvalidParams)
                .with_detail("expected a function object")
                .with_json(value)
        })?;
        Self::from_map(map).map_err(|e| e.with_clause(QueryKind::FunctionScore).with_json(value))
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self, DslError> {
        let mut keyed = FunctionKind::KEYED
            .iter()
            .filter_map(|kind| map.get(kind.as_str()).map(|body| (*kind, body)));
        let found = keyed.next();
        if let Some((second, _)) = keyed.next() {
            return Err(DslError::new(ErrorKind::InvalidParams)
                .with_param(second.as_str())
                .with_detail("a function object holds a single function"));
        }
        let body = match found {
            Some((kind, body)) if kind.is_decay() => {
                FunctionBody::Decay(DecayFunction::from_json(kind, body)?)
            }
            Some((FunctionKind::FieldValueFactor, body)) => {
                FunctionBody::FieldValueFactor(FieldValueFactorFunction::from_json(body)?)
            }
            Some((FunctionKind::ScriptScore, body)) => {
                let script = match body {
                    Value::Object(inner) => match inner.get("script") {
                        Some(raw) => Script::from_json(raw)?,
                        None => Script::default(),
                    },
                    other => {
                        return Err(DslError::new(ErrorKind::InvalidParams)
                            .with_param("script_score")
                            .with_received(other))
                    }
                };
                FunctionBody::ScriptScore(Script::required(Some(script))?)
            }
            Some((FunctionKind::RandomScore, body)) => {
                FunctionBody::RandomScore(RandomScoreFunction::from_json(body)?)
            }
            _ => FunctionBody::Weight,
        };
        let mut function = Function {
            body,
            filter: parse_slot(map, "filter")?,
            params: Params::new(),
        };
        read_params(&mut function, map)?;
        if matches!(function.body, FunctionBody::Weight) && function.weight().is_none() {
            return Err(DslError::new(ErrorKind::WeightRequired));
        }
        Ok(function)
    }
}

// ============================================================================
// function_score
// ============================================================================

const SHORTHAND_KEYS: [&str; 6] = [
    "exp",
    "gauss",
    "linear",
    "field_value_factor",
    "script_score",
    "random_score",
];

/// Rescore `query` (match-all when absent) with scoring functions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionScoreQuery {
    query: Option<Box<Query>>,
    functions: Vec<Function>,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionScoreParams {
    pub query: Option<QueryParams>,
    pub functions: Vec<FunctionParams>,
    pub score_mode: Option<Loose>,
    pub boost_mode: Option<Loose>,
    pub min_score: Option<Loose>,
    pub max_boost: Option<Loose>,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl FunctionScoreParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<QueryParams>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn function(mut self, function: impl Into<FunctionParams>) -> Self {
        self.functions.push(function.into());
        self
    }

    pub fn build(self) -> Result<FunctionScoreQuery, DslError> {
        FunctionScoreQuery::new(self)
    }
}

parameterized!(FunctionScoreQuery, Some(QueryKind::FunctionScore), [
    WithScoreMode: ScoreMode,
    WithBoostMode: BoostMode,
    WithMinScore: MinScore,
    WithMaxBoost: MaxBoost,
    WithBoost: Boost,
    WithName: Name,
]);

impl FunctionScoreQuery {
    pub fn new(record: FunctionScoreParams) -> Result<Self, DslError> {
        let query = build_slot(record.query, "query")?;
        let functions = record
            .functions
            .into_iter()
            .enumerate()
            .map(|(i, f)| {
                Function::new(f).map_err(|e| {
                    e.with_clause(Self::KIND)
                        .with_role(format!("functions[{}]", i))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let owner = Self::OWNER;
        let mut params = Params::new();
        params.apply(Param::ScoreMode, record.score_mode, owner)?;
        params.apply(Param::BoostMode, record.boost_mode, owner)?;
        params.apply(Param::MinScore, record.min_score, owner)?;
        params.apply(Param::MaxBoost, record.max_boost, owner)?;
        params.apply(Param::Boost, record.boost, owner)?;
        params.apply(Param::Name, record.name, owner)?;
        Ok(FunctionScoreQuery {
            query,
            functions,
            params,
        })
    }

    pub fn query(&self) -> Option<&Query> {
        self.query.as_deref()
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn push_function(&mut self, function: Function) {
        self.functions.push(function);
    }
}

impl ClauseBody for FunctionScoreQuery {
    const KIND: QueryKind = QueryKind::FunctionScore;

    fn is_empty(&self) -> bool {
        self.query.is_none() && self.functions.is_empty()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        if let Some(query) = &self.query {
            body.insert("query".to_string(), query.to_json());
        }
        if !self.functions.is_empty() {
            body.insert(
                "functions".to_string(),
                Value::Array(self.functions.iter().map(Function::to_json).collect()),
            );
        }
        write_params(self, &mut body);
        Value::Object(body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some(body) = flat(value)? else {
            return Ok(Self::default());
        };
        let mut functions = match body.get("functions") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    Function::from_json(item).map_err(|e| e.with_role(format!("functions[{}]", i)))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(DslError::new(ErrorKind::InvalidParams)
                    .with_param("functions")
                    .with_received(other))
            }
        };
        // single-function shorthand: the function key sits in the body itself
        let mut shorthand = Map::new();
        for key in SHORTHAND_KEYS {
            if let Some(raw) = body.get(key) {
                shorthand.insert(key.to_string(), raw.clone());
            }
        }
        // weight joins the shorthand function or stands alone as one
        if let Some(weight) = body.get("weight").filter(|w| !w.is_null()) {
            shorthand.insert("weight".to_string(), weight.clone());
        }
        if !shorthand.is_empty() {
            functions.push(Function::from_json(&Value::Object(shorthand))?);
        }
        let mut query = FunctionScoreQuery {
            query: parse_slot(body, "query")?,
            functions,
            params: Params::new(),
        };
        read_params(&mut query, body)?;
        let mut payload = vec!["query", "functions", "weight"];
        payload.extend(SHORTHAND_KEYS);
        report_unknown::<Self>(body, &payload);
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{BoostMode, Modifier, ScoreMode};
    use crate::prelude::*;
    use crate::query::{MatchParams, TermParams};
    use serde_json::json;

    #[test]
    fn test_decay_requires_origin_then_scale() {
        let err = FunctionScoreParams::new()
            .function(DecayParams::gauss("date").scale("10d"))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OriginRequired);
        assert_eq!(err.role(), Some("functions[0]"));

        let err = FunctionScoreParams::new()
            .function(DecayParams::exp("date").origin("2013-09-17"))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ScaleRequired);

        let err = Function::from_json(&json!({"linear": {"price": {"scale": 10}}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OriginRequired);
        assert_eq!(err.field(), Some("price"));
    }

    #[test]
    fn test_function_score_round_trip() {
        let body = json!({
            "query": {"match": {"body": {"query": "foo"}}},
            "functions": [
                {
                    "filter": {"term": {"tag": {"value": "a"}}},
                    "gauss": {"date": {"origin": "2013-09-17", "scale": "10d", "offset": "5d", "decay": 0.3}},
                    "weight": 2.0
                },
                {"field_value_factor": {"field": "likes", "factor": 1.2, "modifier": "sqrt", "missing": 1.0}},
                {"random_score": {"seed": 10, "field": "_seq_no"}},
                {"script_score": {"script": {"source": "_score * 2"}}},
                {"weight": 3.0}
            ],
            "score_mode": "max",
            "boost_mode": "sum",
            "max_boost": 42.0,
            "min_score": 1.5
        });
        let q = FunctionScoreQuery::from_json(&body).unwrap();
        assert_eq!(q.functions().len(), 5);
        assert_eq!(q.score_mode(), ScoreMode::Max);
        assert_eq!(q.boost_mode(), BoostMode::Sum);
        assert_eq!(q.functions()[0].weight(), Some(2.0));
        match q.functions()[1].body() {
            FunctionBody::FieldValueFactor(f) => assert_eq!(f.modifier(), Modifier::Sqrt),
            other => panic!("unexpected function {:?}", other),
        }
        assert_eq!(q.to_json(), body);
    }

    #[test]
    fn test_single_function_shorthand_normalised() {
        let q = FunctionScoreQuery::from_json(&json!({
            "query": {"match_all": {}},
            "random_score": {},
            "boost_mode": "multiply"
        }))
        .unwrap();
        assert_eq!(q.functions().len(), 1);
        assert_eq!(q.functions()[0].kind(), FunctionKind::RandomScore);
        assert_eq!(
            q.to_json(),
            json!({"query": {"match_all": {}}, "functions": [{"random_score": {}}]})
        );
    }

    #[test]
    fn test_bare_weight_is_weight_function() {
        let q = FunctionScoreQuery::from_json(&json!({
            "query": {"match_all": {}},
            "weight": 2
        }))
        .unwrap();
        assert_eq!(q.functions().len(), 1);
        assert_eq!(q.functions()[0].kind(), FunctionKind::Weight);
        assert_eq!(q.functions()[0].weight(), Some(2.0));
        assert_eq!(
            q.to_json(),
            json!({"query": {"match_all": {}}, "functions": [{"weight": 2.0}]})
        );

        let q = FunctionScoreQuery::from_json(&json!({
            "random_score": {"seed": 7, "field": "_seq_no"},
            "weight": 1.5
        }))
        .unwrap();
        assert_eq!(q.functions().len(), 1);
        assert_eq!(q.functions()[0].kind(), FunctionKind::RandomScore);
        assert_eq!(q.functions()[0].weight(), Some(1.5));
    }

    #[test]
    fn test_weight_function_requires_weight() {
        let err = FunctionScoreParams::new()
            .function(WeightParams::default())
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WeightRequired);

        let err = FunctionScoreQuery::from_json(&json!({
            "functions": [{"filter": {"term": {"a": "b"}}}]
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WeightRequired);
    }

    #[test]
    fn test_field_value_factor_requires_field() {
        let err = FunctionScoreParams::new()
            .function(FieldValueFactorParams::default())
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldRequired);
    }

    #[test]
    fn test_function_score_builder() {
        let q = FunctionScoreParams {
            score_mode: Some("sum".into()),
            ..FunctionScoreParams::new()
                .query(MatchParams::new("title", "rust"))
                .function(WeightParams {
                    weight: Some(5.into()),
                    filter: Some(TermParams::new("lang", "en").into()),
                })
        }
        .build()
        .unwrap();
        assert_eq!(
            q.to_json(),
            json!({
                "query": {"match": {"title": {"query": "rust"}}},
                "functions": [{"filter": {"term": {"lang": {"value": "en"}}}, "weight": 5.0}],
                "score_mode": "sum"
            })
        );
    }

    #[test]
    fn test_invalid_score_mode() {
        let err = FunctionScoreQuery::from_json(&json!({"query": {"match_all": {}}, "score_mode": "median"}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidScoreMode);
    }
}
