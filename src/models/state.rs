//! US state and territory postal codes.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

macro_rules! us_states {
    ($($variant:ident => ($code:literal, $name:literal)),+ $(,)?) => {
        /// Region code of a ZIP record (USPS two-letter abbreviation).
        ///
        /// Covers the 50 states, DC, the inhabited territories and the
        /// armed forces mail regions. Serialized as the two-letter code.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(into = "&'static str", try_from = "String")]
        pub enum UsState {
            $($variant,)+
        }

        impl UsState {
            /// Two-letter postal code
            pub fn code(&self) -> &'static str {
                match self {
                    $(UsState::$variant => $code,)+
                }
            }

            /// Full name
            pub fn name(&self) -> &'static str {
                match self {
                    $(UsState::$variant => $name,)+
                }
            }

            /// Every region code, in declaration order
            pub fn all() -> &'static [UsState] {
                &[$(UsState::$variant,)+]
            }

            /// Look up a region by its two-letter code (case-insensitive)
            pub fn from_code(code: &str) -> Option<Self> {
                match code.trim().to_ascii_uppercase().as_str() {
                    $($code => Some(UsState::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

us_states! {
    Alabama => ("AL", "Alabama"),
    Alaska => ("AK", "Alaska"),
    Arizona => ("AZ", "Arizona"),
    Arkansas => ("AR", "Arkansas"),
    California => ("CA", "California"),
    Colorado => ("CO", "Colorado"),
    Connecticut => ("CT", "Connecticut"),
    Delaware => ("DE", "Delaware"),
    DistrictOfColumbia => ("DC", "District of Columbia"),
    Florida => ("FL", "Florida"),
    Georgia => ("GA", "Georgia"),
    Hawaii => ("HI", "Hawaii"),
    Idaho => ("ID", "Idaho"),
    Illinois => ("IL", "Illinois"),
    Indiana => ("IN", "Indiana"),
    Iowa => ("IA", "Iowa"),
    Kansas => ("KS", "Kansas"),
    Kentucky => ("KY", "Kentucky"),
    Louisiana => ("LA", "Louisiana"),
    Maine => ("ME", "Maine"),
    Maryland => ("MD", "Maryland"),
    Massachusetts => ("MA", "Massachusetts"),
    Michigan => ("MI", "Michigan"),
    Minnesota => ("MN", "Minnesota"),
    Mississippi => ("MS", "Mississippi"),
    Missouri => ("MO", "Missouri"),
    Montana => ("MT", "Montana"),
    Nebraska => ("NE", "Nebraska"),
    Nevada => ("NV", "Nevada"),
    NewHampshire => ("NH", "New Hampshire"),
    NewJersey => ("NJ", "New Jersey"),
    NewMexico => ("NM", "New Mexico"),
    NewYork => ("NY", "New York"),
    NorthCarolina => ("NC", "North Carolina"),
    NorthDakota => ("ND", "North Dakota"),
    Ohio => ("OH", "Ohio"),
    Oklahoma => ("OK", "Oklahoma"),
    Oregon => ("OR", "Oregon"),
    Pennsylvania => ("PA", "Pennsylvania"),
    RhodeIsland => ("RI", "Rhode Island"),
    SouthCarolina => ("SC", "South Carolina"),
    SouthDakota => ("SD", "South Dakota"),
    Tennessee => ("TN", "Tennessee"),
    Texas => ("TX", "Texas"),
    Utah => ("UT", "Utah"),
    Vermont => ("VT", "Vermont"),
    Virginia => ("VA", "Virginia"),
    Washington => ("WA", "Washington"),
    WestVirginia => ("WV", "West Virginia"),
    Wisconsin => ("WI", "Wisconsin"),
    Wyoming => ("WY", "Wyoming"),
    // Territories
    AmericanSamoa => ("AS", "American Samoa"),
    Guam => ("GU", "Guam"),
    NorthernMarianaIslands => ("MP", "Northern Mariana Islands"),
    PuertoRico => ("PR", "Puerto Rico"),
    VirginIslands => ("VI", "Virgin Islands"),
    // Armed forces
    ArmedForcesAmericas => ("AA", "Armed Forces Americas"),
    ArmedForcesEurope => ("AE", "Armed Forces Europe"),
    ArmedForcesPacific => ("AP", "Armed Forces Pacific"),
}

impl std::fmt::Display for UsState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for UsState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UsState::from_code(s)
            .ok_or_else(|| Error::InvalidRecord(format!("unknown state code '{}'", s)))
    }
}

impl From<UsState> for &'static str {
    fn from(state: UsState) -> Self {
        state.code()
    }
}

impl TryFrom<String> for UsState {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl ToSql for UsState {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for UsState {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_str()?;
        UsState::from_code(code).ok_or_else(|| FromSqlError::Other(Box::new(Error::InvalidRecord(
            format!("unknown state code '{}'", code),
        ))))
    }
}
