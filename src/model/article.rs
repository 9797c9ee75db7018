use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{FieldValue, Money};
use crate::model::MAX_TEXT_LEN;
use crate::track::{RecordId, Trackable, Validate};

/// Media outlet an article ran in. The descriptions are the outlet names as
/// they appear in the stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaOutlet {
    Vm,
    Mk,
    RadioMinsk,
    Kacheli,
    MinskNews,
}

impl MediaOutlet {
    pub const ALL: [MediaOutlet; 5] = [
        Self::Vm,
        Self::Mk,
        Self::RadioMinsk,
        Self::Kacheli,
        Self::MinskNews,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            Self::Vm => "VM",
            Self::Mk => "MK",
            Self::RadioMinsk => "Radio-Minsk",
            Self::Kacheli => "Kacheli",
            Self::MinskNews => "minsknews.by",
        }
    }

    pub fn from_description(description: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|outlet| outlet.description() == description)
    }
}

impl fmt::Display for MediaOutlet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Text,
    Video,
    Photo,
    Audio,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [Self::Text, Self::Video, Self::Photo, Self::Audio];

    pub fn description(&self) -> &'static str {
        match self {
            Self::Text => "Text material",
            Self::Video => "Video material",
            Self::Photo => "Photo material",
            Self::Audio => "Audio material",
        }
    }

    pub fn from_description(description: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.description() == description)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: RecordId,
    pub title: String,
    /// Authoring employee, held by identity. Dirty comparison and persistence
    /// use this key; the referenced employee object is never embedded.
    pub employee_id: RecordId,
    pub amount: Money,
    pub bonus_percent: Option<i64>,
    /// Derived payout; see [`Article::recalc_total`].
    pub total: Money,
    pub outlet: MediaOutlet,
    pub advertisement: bool,
    pub publication_id: Option<i64>,
    pub newspaper_line: Option<i64>,
    pub release_date: NaiveDate,
    pub content: ContentKind,
}

impl Article {
    /// Blank row for add mode.
    pub fn draft(release_date: NaiveDate) -> Self {
        Self {
            id: 0,
            title: String::new(),
            employee_id: 0,
            amount: Money::ZERO,
            bonus_percent: None,
            total: Money::ZERO,
            outlet: MediaOutlet::Vm,
            advertisement: false,
            publication_id: None,
            newspaper_line: None,
            release_date,
            content: ContentKind::Text,
        }
    }

    /// `amount + amount × bonus/100`; a missing bonus contributes nothing.
    pub fn computed_total(&self) -> Money {
        match self.bonus_percent {
            Some(percent) => self.amount.with_percent_bonus(percent),
            None => self.amount,
        }
    }

    /// Recompute the derived total. Returns whether the stored value changed,
    /// so a pure display refresh never looks like an edit.
    pub fn recalc_total(&mut self) -> bool {
        let next = self.computed_total();
        if next != self.total {
            self.total = next;
            true
        } else {
            false
        }
    }
}

impl Validate for Article {
    fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.title.trim().is_empty() {
            problems.push("title is required".to_string());
        } else if self.title.len() > MAX_TEXT_LEN {
            problems.push(format!("title exceeds {MAX_TEXT_LEN} characters"));
        }

        if self.employee_id <= 0 {
            problems.push("an authoring employee must be selected".to_string());
        }

        if self.amount.is_negative() || self.amount > Money::MAX_AMOUNT {
            problems.push(format!(
                "amount must be between 0.00 and {}",
                Money::MAX_AMOUNT
            ));
        }

        if let Some(percent) = self.bonus_percent
            && !(0..=100).contains(&percent)
        {
            problems.push("bonus must be between 0 and 100 percent".to_string());
        }

        problems
    }
}

impl Trackable for Article {
    const ENTITY: &'static str = "article";

    fn record_id(&self) -> RecordId {
        self.id
    }

    fn display_label(&self) -> String {
        if self.title.trim().is_empty() {
            format!("article #{}", self.id)
        } else {
            self.title.clone()
        }
    }

    fn tracked_fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("title", self.title.as_str().into()),
            ("employee_id", self.employee_id.into()),
            ("amount", self.amount.into()),
            ("bonus_percent", self.bonus_percent.into()),
            ("total", self.total.into()),
            ("outlet", self.outlet.description().into()),
            ("advertisement", self.advertisement.into()),
            ("publication_id", self.publication_id.into()),
            ("newspaper_line", self.newspaper_line.into()),
            ("release_date", self.release_date.into()),
            ("content", self.content.description().into()),
        ]
    }
}
