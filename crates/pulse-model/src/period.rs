// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

pub const STATE_MAX_LEN: usize = 128;
pub const QUARTER_FILE_SUFFIX: &str = ".json";

/// Lowercase hyphenated state directory name, e.g. `andaman-&-nicobar-islands`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct StateName(String);

impl StateName {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("state must not be empty".to_string()));
        }
        if s.len() > STATE_MAX_LEN {
            return Err(ValidationError(format!(
                "state exceeds max length {STATE_MAX_LEN}"
            )));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '&')
        {
            return Err(ValidationError(format!(
                "state `{s}` must match [a-z0-9&-]+"
            )));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `andhra-pradesh` -> `Andhra Pradesh`.
    #[must_use]
    pub fn display_name(&self) -> String {
        title_case_label(&self.0)
    }
}

impl Display for StateName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Four digit calendar year, stored as text the way the source tree names it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Year(String);

impl Year {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.len() != 4 || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError(format!(
                "year `{s}` must be a four digit number"
            )));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Year {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quarter(u8);

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter(1), Quarter(2), Quarter(3), Quarter(4)];

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (1..=4).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError(format!("quarter {value} is outside 1..=4")))
        }
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        let value = s
            .parse::<u8>()
            .map_err(|_| ValidationError(format!("quarter `{s}` is not a number")))?;
        Self::new(value)
    }

    /// Parses the quarter from a leaf file name such as `3.json`.
    pub fn from_file_name(file_name: &str) -> Result<Self, ValidationError> {
        let stem = file_name
            .strip_suffix(QUARTER_FILE_SUFFIX)
            .unwrap_or(file_name);
        Self::parse(stem)
            .map_err(|e| ValidationError(format!("quarter file `{file_name}`: {e}")))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Quarter {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quarter> for u8 {
    fn from(value: Quarter) -> Self {
        value.0
    }
}

impl Display for Quarter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

/// Identity of one quarter file: every record it yields carries this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct PeriodKey {
    pub state: StateName,
    pub year: Year,
    pub quarter: Quarter,
}

impl PeriodKey {
    #[must_use]
    pub fn new(state: StateName, year: Year, quarter: Quarter) -> Self {
        Self {
            state,
            year,
            quarter,
        }
    }
}

impl Display for PeriodKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.state, self.year, self.quarter)
    }
}

/// Replaces hyphens with spaces and upper-cases the first letter of each word.
#[must_use]
pub fn title_case_label(raw: &str) -> String {
    raw.replace('-', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
