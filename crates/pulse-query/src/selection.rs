// SPDX-License-Identifier: Apache-2.0

use pulse_model::{Quarter, StateName, Year};
use serde::Serialize;

use crate::{QueryError, QueryErrorCode};

pub const DEFAULT_STATE: &str = "tamil-nadu";
pub const DEFAULT_YEARS: [&str; 7] = ["2018", "2019", "2020", "2021", "2022", "2023", "2024"];

/// Filter values shared by every panel of a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub year: Year,
    pub quarter: Quarter,
    pub from_year: Year,
    pub to_year: Year,
    pub state: StateName,
}

impl Selection {
    /// Latest year, first quarter, full year range, default state. Falls
    /// back to the built-in year list when `years` is empty.
    pub fn from_available(years: &[Year]) -> Result<Self, QueryError> {
        let defaults;
        let years = if years.is_empty() {
            defaults = DEFAULT_YEARS
                .iter()
                .map(|y| Year::parse(y))
                .collect::<Result<Vec<_>, _>>()?;
            defaults.as_slice()
        } else {
            years
        };
        let (Some(first), Some(last)) = (years.iter().min(), years.iter().max()) else {
            return Err(QueryError::new(
                QueryErrorCode::Validation,
                "no years to select from",
            ));
        };
        Ok(Self {
            year: last.clone(),
            quarter: Quarter::new(1)?,
            from_year: first.clone(),
            to_year: last.clone(),
            state: StateName::parse(DEFAULT_STATE)?,
        })
    }

    pub fn with_year(mut self, year: &str) -> Result<Self, QueryError> {
        self.year = Year::parse(year)?;
        Ok(self)
    }

    pub fn with_quarter(mut self, quarter: &str) -> Result<Self, QueryError> {
        self.quarter = Quarter::parse(quarter)?;
        Ok(self)
    }

    pub fn with_range(mut self, from: &str, to: &str) -> Result<Self, QueryError> {
        let from = Year::parse(from)?;
        let to = Year::parse(to)?;
        if from > to {
            return Err(QueryError::new(
                QueryErrorCode::Validation,
                format!("year range {from}..{to} is reversed"),
            ));
        }
        self.from_year = from;
        self.to_year = to;
        Ok(self)
    }

    /// Accepts `tamil-nadu` or `Tamil Nadu`.
    pub fn with_state(mut self, state: &str) -> Result<Self, QueryError> {
        let slug = state.trim().to_ascii_lowercase().replace(' ', "-");
        self.state = StateName::parse(&slug)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn years(list: &[&str]) -> Vec<Year> {
        list.iter().map(|y| Year::parse(y).expect("year")).collect()
    }

    #[test]
    fn defaults_follow_available_years() {
        let sel = Selection::from_available(&years(&["2021", "2019", "2020"])).expect("sel");
        assert_eq!(sel.year.as_str(), "2021");
        assert_eq!(sel.from_year.as_str(), "2019");
        assert_eq!(sel.to_year.as_str(), "2021");
        assert_eq!(sel.quarter.get(), 1);
        assert_eq!(sel.state.as_str(), DEFAULT_STATE);
    }

    #[test]
    fn empty_store_uses_builtin_years() {
        let sel = Selection::from_available(&[]).expect("sel");
        assert_eq!(sel.year.as_str(), "2024");
        assert_eq!(sel.from_year.as_str(), "2018");
    }

    #[test]
    fn setters_validate_input() {
        let sel = Selection::from_available(&[]).expect("sel");
        assert!(sel.clone().with_quarter("5").is_err());
        assert!(sel.clone().with_year("22").is_err());
        assert!(sel.clone().with_range("2023", "2019").is_err());
        let sel = sel.with_state("Andhra Pradesh").expect("state");
        assert_eq!(sel.state.as_str(), "andhra-pradesh");
    }
}
