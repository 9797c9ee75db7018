use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Money, Result};
use crate::model::{Article, ContentKind, Employee, MediaOutlet};
use crate::store::atomic_write;
use crate::track::RecordId;

/// Which slice of the articles table a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportScope {
    Month { year: i32, month: u32 },
    AllTime,
}

impl ReportScope {
    /// Half-open release-date window; `None` bounds mean unbounded.
    pub fn range(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match *self {
            Self::AllTime => (None, None),
            Self::Month { year, month } => {
                let start = NaiveDate::from_ymd_opt(year, month, 1);
                let end = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)
                };
                (start, end)
            }
        }
    }

    pub fn title(&self) -> String {
        match *self {
            Self::AllTime => "Articles report, all time".to_string(),
            Self::Month { year, month } => {
                format!("Articles report for {}-{:02}", year, month)
            }
        }
    }
}

/// One printable line of the articles report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub surname: String,
    pub given_name: String,
    pub title: String,
    pub outlet: MediaOutlet,
    pub advertisement: bool,
    pub amount: Money,
    pub bonus_percent: Option<i64>,
    pub total: Money,
    pub content: ContentKind,
    pub release_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct ArticlesReport {
    pub title: String,
    pub generated_on: NaiveDate,
    pub rows: Vec<ReportRow>,
}

/// Join articles with their authors into report rows.
///
/// Rejects an empty article set before any file I/O happens. An article whose
/// employee is missing from the lookup still appears, with blank name cells,
/// mirroring how the grid renders a broken reference.
pub fn build_articles_report(
    articles: &[Article],
    employees: &[Employee],
    title: impl Into<String>,
    generated_on: NaiveDate,
) -> Result<ArticlesReport> {
    if articles.is_empty() {
        return Err(AppError::validation_of(
            "report",
            vec!["no data for the report".to_string()],
        ));
    }

    let by_id: HashMap<RecordId, &Employee> = employees
        .iter()
        .map(|employee| (employee.id, employee))
        .collect();

    let rows = articles
        .iter()
        .map(|article| {
            let author = by_id.get(&article.employee_id);
            ReportRow {
                surname: author.map(|a| a.surname.clone()).unwrap_or_default(),
                given_name: author.map(|a| a.given_name.clone()).unwrap_or_default(),
                title: article.title.clone(),
                outlet: article.outlet,
                advertisement: article.advertisement,
                amount: article.amount,
                bonus_percent: article.bonus_percent,
                total: article.computed_total(),
                content: article.content,
                release_date: article.release_date,
            }
        })
        .collect();

    Ok(ArticlesReport {
        title: title.into(),
        generated_on,
        rows,
    })
}

impl ArticlesReport {
    const HEADERS: [&'static str; 11] = [
        "No.",
        "Surname",
        "Given name",
        "Article title",
        "Outlet",
        "Advertisement",
        "Amount",
        "Best material bonus, %",
        "Total",
        "Content kind",
        "Release date",
    ];

    /// Render the report as a standalone HTML document with the same table
    /// layout the desktop export produced.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(out, "<title>{}</title>", escape(&self.title));
        out.push_str(
            "<style>\n\
             body { font-family: 'Times New Roman', serif; }\n\
             h1 { text-align: center; }\n\
             table { border-collapse: collapse; }\n\
             th, td { border: 1px solid #000; padding: 2px 6px; text-align: center; white-space: nowrap; }\n\
             th { background: #d9d9d9; }\n\
             </style>\n</head>\n<body>\n",
        );
        let _ = writeln!(out, "<h1>{}</h1>", escape(&self.title));
        let _ = writeln!(
            out,
            "<p>Generated on: {}</p>",
            self.generated_on.format("%d.%m.%Y")
        );

        out.push_str("<table>\n<tr>");
        for header in Self::HEADERS {
            let _ = write!(out, "<th>{}</th>", escape(header));
        }
        out.push_str("</tr>\n");

        for (index, row) in self.rows.iter().enumerate() {
            out.push_str("<tr>");
            let _ = write!(out, "<td>{}</td>", index + 1);
            let _ = write!(out, "<td>{}</td>", escape(&row.surname));
            let _ = write!(out, "<td>{}</td>", escape(&row.given_name));
            let _ = write!(out, "<td>{}</td>", escape(&row.title));
            let _ = write!(out, "<td>{}</td>", escape(row.outlet.description()));
            let _ = write!(out, "<td>{}</td>", if row.advertisement { "Yes" } else { "No" });
            let _ = write!(out, "<td>{}</td>", row.amount);
            let _ = write!(
                out,
                "<td>{}</td>",
                row.bonus_percent
                    .map(|percent| format!("{percent}%"))
                    .unwrap_or_default()
            );
            let _ = write!(out, "<td>{}</td>", row.total);
            let _ = write!(out, "<td>{}</td>", escape(row.content.description()));
            let _ = write!(out, "<td>{}</td>", row.release_date.format("%d.%m.%Y"));
            out.push_str("</tr>\n");
        }

        out.push_str("</table>\n</body>\n</html>\n");
        out
    }

    /// Write the rendered report to disk (temp-file-then-rename).
    pub async fn export_html(&self, path: &Path) -> Result<()> {
        atomic_write(path, self.to_html().as_bytes()).await
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Suggested file name for an export, mirroring the desktop save dialog's
/// default of title plus timestamp.
pub fn default_file_name(title: &str, now: chrono::NaiveDateTime) -> String {
    let safe: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}.html", safe, now.format("%Y%m%d_%H%M%S"))
}
