use super::OsVersion;
use crate::error::VersionError;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a single specifier clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum Operator {
    #[strum(serialize = "===")]
    Arbitrary,
    #[strum(serialize = "==")]
    Equal,
    #[strum(serialize = "!=")]
    NotEqual,
    #[strum(serialize = "~=")]
    Compatible,
    #[strum(serialize = "<=")]
    LessEqual,
    #[strum(serialize = ">=")]
    GreaterEqual,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = ">")]
    Greater,
}

// Longest operators first so `<=` is not read as `<`.
const OPERATORS: [&str; 8] = ["===", "==", "!=", "~=", "<=", ">=", "<", ">"];

/// One `<op><version>` constraint, e.g. `>=14.0` or `==13.*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecifierClause {
    pub operator: Operator,
    pub version: OsVersion,
    /// `==X.*` / `!=X.*` form.
    pub wildcard: bool,
    raw: String,
}

impl SpecifierClause {
    pub fn parse(clause: &str) -> Result<Self, VersionError> {
        let raw = clause.trim();
        let invalid = |reason: &str| VersionError::InvalidSpecifier {
            clause: raw.to_string(),
            reason: reason.to_string(),
        };

        let op_text = OPERATORS
            .iter()
            .find(|op| raw.starts_with(*op))
            .ok_or_else(|| invalid("missing comparison operator"))?;
        let operator =
            Operator::from_str(op_text).map_err(|_| invalid("unknown comparison operator"))?;
        let mut version_text = raw[op_text.len()..].trim();

        let wildcard = version_text.ends_with(".*");
        if wildcard {
            if !matches!(operator, Operator::Equal | Operator::NotEqual) {
                return Err(invalid("wildcards are only allowed with == and !="));
            }
            version_text = &version_text[..version_text.len() - 2];
        }

        let version = OsVersion::parse(version_text).map_err(|_| invalid("malformed version"))?;
        if operator == Operator::Compatible && version.components().len() < 2 {
            return Err(invalid("~= needs at least two version components"));
        }

        Ok(Self {
            operator,
            version,
            wildcard,
            raw: raw.to_string(),
        })
    }

    pub fn matches(&self, candidate: &OsVersion) -> bool {
        match self.operator {
            Operator::Equal if self.wildcard => candidate.starts_with(self.version.components()),
            Operator::NotEqual if self.wildcard => {
                !candidate.starts_with(self.version.components())
            }
            Operator::Equal => candidate == &self.version,
            Operator::NotEqual => candidate != &self.version,
            Operator::Arbitrary => candidate.to_string() == self.version.to_string(),
            Operator::Less => candidate < &self.version,
            Operator::LessEqual => candidate <= &self.version,
            Operator::Greater => candidate > &self.version,
            Operator::GreaterEqual => candidate >= &self.version,
            Operator::Compatible => {
                let components = self.version.components();
                let prefix = &components[..components.len() - 1];
                candidate >= &self.version && candidate.starts_with(prefix)
            }
        }
    }
}

impl fmt::Display for SpecifierClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A comma-separated set of clauses that must all hold.
///
/// The empty set matches every version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecifierSet {
    clauses: Vec<SpecifierClause>,
}

impl SpecifierSet {
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let clauses = trimmed
            .split(',')
            .map(SpecifierClause::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { clauses })
    }

    pub fn contains(&self, version: &OsVersion) -> bool {
        self.clauses.iter().all(|clause| clause.matches(version))
    }

    pub fn clauses(&self) -> &[SpecifierClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl FromStr for SpecifierSet {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.clauses.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join(","))
    }
}
