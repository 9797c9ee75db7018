use std::fmt;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::FieldValue;
use crate::model::MAX_TEXT_LEN;
use crate::track::{RecordId, Trackable, Validate};

/// Authoring contract kind, stored by its display description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractKind {
    ServiceWork,
    AuthorContract,
    CopyrightObject,
    ExclusiveRightsTransfer,
}

impl ContractKind {
    pub const ALL: [ContractKind; 4] = [
        Self::ServiceWork,
        Self::AuthorContract,
        Self::CopyrightObject,
        Self::ExclusiveRightsTransfer,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            Self::ServiceWork => "Work-for-hire contract",
            Self::AuthorContract => "Author contract",
            Self::CopyrightObject => "Copyright object contract",
            Self::ExclusiveRightsTransfer => "Exclusive rights transfer contract",
        }
    }

    pub fn from_description(description: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.description() == description)
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Computed from the contract end date; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractStatus {
    Active,
    Expired,
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "Active",
            Self::Expired => "Expired",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: RecordId,
    pub surname: String,
    pub given_name: String,
    pub patronymic: String,
    pub contract_kind: ContractKind,
    pub contract_number: i64,
    pub contract_start: NaiveDate,
    pub contract_end: NaiveDate,
    pub pen_name: Option<String>,
    pub staff: bool,
}

impl Employee {
    /// Blank row for add mode: a one-year author contract starting today.
    pub fn contract_template(today: NaiveDate) -> Self {
        Self {
            id: 0,
            surname: String::new(),
            given_name: String::new(),
            patronymic: String::new(),
            contract_kind: ContractKind::AuthorContract,
            contract_number: 0,
            contract_start: today,
            contract_end: today
                .checked_add_months(Months::new(12))
                .unwrap_or(today),
            pen_name: None,
            staff: true,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {} {}", self.surname, self.given_name, self.patronymic)
    }

    pub fn contract_status(&self, today: NaiveDate) -> ContractStatus {
        if self.contract_end >= today {
            ContractStatus::Active
        } else {
            ContractStatus::Expired
        }
    }
}

impl Validate for Employee {
    fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for (label, value) in [
            ("surname", &self.surname),
            ("given name", &self.given_name),
            ("patronymic", &self.patronymic),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{label} is required"));
            } else if value.len() > MAX_TEXT_LEN {
                problems.push(format!("{label} exceeds {MAX_TEXT_LEN} characters"));
            }
        }

        if let Some(pen_name) = &self.pen_name
            && pen_name.len() > MAX_TEXT_LEN
        {
            problems.push(format!("pen name exceeds {MAX_TEXT_LEN} characters"));
        }

        if self.contract_number <= 0 {
            problems.push("contract number must be a positive number".to_string());
        }

        if self.contract_start >= self.contract_end {
            problems.push("contract end date must be later than the start date".to_string());
        }

        problems
    }
}

impl Trackable for Employee {
    const ENTITY: &'static str = "employee";

    fn record_id(&self) -> RecordId {
        self.id
    }

    fn display_label(&self) -> String {
        let name = self.full_name();
        if name.trim().is_empty() {
            format!("employee #{}", self.id)
        } else {
            name
        }
    }

    fn tracked_fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("surname", self.surname.as_str().into()),
            ("given_name", self.given_name.as_str().into()),
            ("patronymic", self.patronymic.as_str().into()),
            ("contract_kind", self.contract_kind.description().into()),
            ("contract_number", self.contract_number.into()),
            ("contract_start", self.contract_start.into()),
            ("contract_end", self.contract_end.into()),
            ("pen_name", self.pen_name.as_deref().into()),
            ("staff", self.staff.into()),
        ]
    }
}
