//! Aggregation grid specifications.
//!
//! A grid is given per axis as `[start, end, delta]`. Numeric axes take
//! numeric bounds and steps, time axes take partial datetimes and ISO 8601
//! periods. An axis named without a delta is collapsed entirely.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CisError, CisResult};
use crate::time::{CalendarDelta, PartialDateTime};

/// One end of a requested grid range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridValue {
    Number(f64),
    Time(PartialDateTime),
}

impl GridValue {
    fn parse(s: &str) -> CisResult<Self> {
        let s = s.trim();
        if let Ok(n) = s.parse::<f64>() {
            return Ok(GridValue::Number(n));
        }
        PartialDateTime::parse(s).map(GridValue::Time)
    }

    pub fn is_time(&self) -> bool {
        matches!(self, GridValue::Time(_))
    }
}

impl fmt::Display for GridValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridValue::Number(n) => write!(f, "{}", n),
            GridValue::Time(t) => write!(f, "{}", t),
        }
    }
}

/// Width of the target grid cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridDelta {
    /// Fixed numeric step in the axis' own units.
    Step(f64),
    /// Calendar period, for time axes.
    Calendar(CalendarDelta),
    /// Collapse the axis to a single value.
    Collapse,
}

impl GridDelta {
    pub fn is_collapse(&self) -> bool {
        matches!(self, GridDelta::Collapse)
    }
}

impl fmt::Display for GridDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridDelta::Step(step) => write!(f, "{}", step),
            GridDelta::Calendar(delta) => write!(f, "{}", delta),
            GridDelta::Collapse => write!(f, "collapse"),
        }
    }
}

/// Target grid for a single axis.
///
/// `start` and `end` may be omitted, in which case the extent of the data is
/// used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GridSpec {
    pub start: Option<GridValue>,
    pub end: Option<GridValue>,
    pub delta: GridDelta,
    pub is_time: bool,
}

impl GridSpec {
    pub fn new(start: Option<GridValue>, end: Option<GridValue>, delta: GridDelta) -> Self {
        let is_time = start.map(|v| v.is_time()).unwrap_or(false)
            || end.map(|v| v.is_time()).unwrap_or(false)
            || matches!(delta, GridDelta::Calendar(_));
        // A bare year such as `2008` parses as a number
        let (start, end) = if is_time {
            (start.map(year_as_time), end.map(year_as_time))
        } else {
            (start, end)
        };
        Self {
            start,
            end,
            delta,
            is_time,
        }
    }

    /// A numeric grid of cells `step` wide covering `[start, end)`.
    pub fn numeric(start: f64, end: f64, step: f64) -> Self {
        Self::new(
            Some(GridValue::Number(start)),
            Some(GridValue::Number(end)),
            GridDelta::Step(step),
        )
    }

    /// A calendar grid covering `[start, end)`.
    pub fn time(start: PartialDateTime, end: PartialDateTime, delta: CalendarDelta) -> Self {
        Self::new(
            Some(GridValue::Time(start)),
            Some(GridValue::Time(end)),
            GridDelta::Calendar(delta),
        )
    }

    /// Collapse the whole axis.
    pub fn collapse() -> Self {
        Self::new(None, None, GridDelta::Collapse)
    }

    /// Parse the bracketed form `[start,end,delta]`. An empty string or
    /// `collapse` collapses the axis, as does a bracket without a delta.
    pub fn parse(s: &str) -> CisResult<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("collapse") {
            return Ok(Self::collapse());
        }

        let inner = s
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| CisError::InvalidGridArgument(s.to_string()))?;

        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [start, end] => Ok(Self::new(
                Some(GridValue::parse(start)?),
                Some(GridValue::parse(end)?),
                GridDelta::Collapse,
            )),
            [start, end, delta] => {
                let start = GridValue::parse(start)?;
                let end = GridValue::parse(end)?;
                let delta = parse_delta(delta)?;
                Ok(Self::new(Some(start), Some(end), delta))
            }
            _ => Err(CisError::InvalidGridArgument(s.to_string())),
        }
    }
}

fn year_as_time(value: GridValue) -> GridValue {
    match value {
        GridValue::Number(n) if n.fract() == 0.0 && n.abs() < 100_000.0 => {
            GridValue::Time(PartialDateTime::year(n as i32))
        }
        other => other,
    }
}

fn parse_delta(s: &str) -> CisResult<GridDelta> {
    if s.starts_with(['P', 'p']) {
        return CalendarDelta::parse_iso8601(s).map(GridDelta::Calendar);
    }
    let step: f64 = s
        .parse()
        .map_err(|_| CisError::InvalidGridArgument(format!("invalid grid step '{}'", s)))?;
    if !step.is_finite() || step <= 0.0 {
        return Err(CisError::InvalidGridArgument(format!(
            "grid step must be positive, got {}",
            s
        )));
    }
    Ok(GridDelta::Step(step))
}

impl fmt::Display for GridSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.start, &self.end, &self.delta) {
            (None, None, GridDelta::Collapse) => write!(f, "collapse"),
            (start, end, delta) => {
                let show = |v: &Option<GridValue>| v.map(|v| v.to_string()).unwrap_or_default();
                match delta {
                    GridDelta::Collapse => write!(f, "[{},{}]", show(start), show(end)),
                    _ => write!(f, "[{},{},{}]", show(start), show(end), delta),
                }
            }
        }
    }
}

impl FromStr for GridSpec {
    type Err = CisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for GridSpec {
    type Error = CisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GridSpec> for String {
    fn from(value: GridSpec) -> Self {
        value.to_string()
    }
}

/// Grid specifications keyed by coordinate name or axis letter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridSpecs(BTreeMap<String, GridSpec>);

impl GridSpecs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, spec: GridSpec) {
        self.0.insert(key.into(), spec);
    }

    pub fn get(&self, key: &str) -> Option<&GridSpec> {
        self.0.get(key)
    }

    /// The stored key together with its spec.
    pub fn get_key_value(&self, key: &str) -> Option<(&str, &GridSpec)> {
        self.0.get_key_value(key).map(|(k, spec)| (k.as_str(), spec))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &GridSpec)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge `other` into this set, replacing entries with the same key.
    pub fn extend(&mut self, other: GridSpecs) {
        self.0.extend(other.0);
    }
}

impl fmt::Display for GridSpecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .0
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{{{}}}", entries.join(", "))
    }
}

impl FromIterator<(String, GridSpec)> for GridSpecs {
    fn from_iter<T: IntoIterator<Item = (String, GridSpec)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parse a command line grid argument.
///
/// Supports:
/// - Gridded axis: `x=[-180,180,10]`
/// - Time axis: `t=[2008-01-01,2009-01-01,P1M]`
/// - Collapsed axis: `y` or `y=[-90,90]`
///
/// Entries are separated by commas outside of brackets.
pub fn parse_grid_arg(s: &str) -> CisResult<GridSpecs> {
    let mut specs = GridSpecs::new();
    for entry in split_top_level(s)? {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (key, spec) = match entry.split_once('=') {
            Some((key, value)) => (key.trim(), GridSpec::parse(value)?),
            None => (entry, GridSpec::collapse()),
        };
        if key.is_empty() {
            return Err(CisError::InvalidGridArgument(entry.to_string()));
        }
        specs.insert(key, spec);
    }
    if specs.is_empty() {
        return Err(CisError::InvalidGridArgument(s.to_string()));
    }
    Ok(specs)
}

fn split_top_level(s: &str) -> CisResult<Vec<&str>> {
    let mut entries = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth < 0 {
                    return Err(CisError::InvalidGridArgument(s.to_string()));
                }
            }
            ',' if depth == 0 => {
                entries.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(CisError::InvalidGridArgument(s.to_string()));
    }
    entries.push(&s[start..]);
    Ok(entries)
}
