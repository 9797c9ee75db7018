use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::auth::AuthGate;
use crate::config::AppConfig;
use crate::core::Money;
use crate::model::{Article, ContentKind, ContractKind, Employee, MediaOutlet};
use crate::notify::{Confirmer, Notifier};
use crate::report::{ReportScope, default_file_name};
use crate::shell::{ArticlesWorkspace, EmployeesWorkspace, ReportsWorkspace};
use crate::store::{ArticleFilter, MemoryStore, RecordStore};
use crate::track::RecordId;

#[derive(Parser)]
#[command(name = "masthead")]
#[command(about = "Employee and article management")]
pub struct Cli {
    /// JSON dataset file
    #[arg(long, default_value = "masthead.json")]
    data: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the dataset file
    Init {
        /// Seed a handful of demo employees and articles
        #[arg(long)]
        demo: bool,
    },
    /// Check a password against the configured gate
    Login { password: String },
    Employees {
        #[command(subcommand)]
        action: EmployeeAction,
    },
    Articles {
        #[command(subcommand)]
        action: ArticleAction,
    },
    Report {
        #[command(subcommand)]
        kind: ReportKind,
    },
}

#[derive(Subcommand)]
enum EmployeeAction {
    /// Print one page of the employee grid
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 15)]
        page_size: usize,
    },
    /// Add one employee through the add-mode validation path
    Add {
        #[arg(long)]
        surname: String,
        #[arg(long)]
        given_name: String,
        #[arg(long)]
        patronymic: String,
        /// One of the contract kind descriptions
        #[arg(long)]
        contract_kind: Option<String>,
        #[arg(long)]
        contract_number: i64,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        pen_name: Option<String>,
        /// Mark as non-staff
        #[arg(long)]
        freelance: bool,
    },
    Delete {
        #[arg(long)]
        id: RecordId,
        /// Confirm the delete (and its cascade) without prompting
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ArticleAction {
    /// Print one page of the article grid for a month
    List {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        page_size: usize,
    },
    /// Add one article through the add-mode validation path
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        employee_id: RecordId,
        #[arg(long)]
        amount: Money,
        #[arg(long)]
        bonus: Option<i64>,
        /// One of the outlet names
        #[arg(long)]
        outlet: Option<String>,
        #[arg(long)]
        advertisement: bool,
        #[arg(long)]
        release_date: NaiveDate,
        /// One of the content kind descriptions
        #[arg(long)]
        content: Option<String>,
    },
    Delete {
        #[arg(long)]
        id: RecordId,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ReportKind {
    /// Articles of the current month
    Monthly {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// All articles ever recorded
    AllTime {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Notifier printing to the terminal with the same markers the desktop
/// snackbar used.
struct TermNotifier;

impl Notifier for TermNotifier {
    fn notify_success(&self, message: &str) {
        println!("✓ {message}");
    }

    fn notify_error(&self, message: &str) {
        eprintln!("✗ {message}");
    }

    fn notify_info(&self, message: &str) {
        println!("🛈 {message}");
    }

    fn notify_warn(&self, message: &str) {
        println!("⚠ {message}");
    }
}

/// The CLI is one-shot, so confirmations reduce to the `--yes` flag.
struct FlagConfirm(bool);

#[async_trait]
impl Confirmer for FlagConfirm {
    async fn confirm(&self, _title: &str, message: &str) -> bool {
        if !self.0 {
            eprintln!("✗ {message} (pass --yes to confirm)");
        }
        self.0
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let notifier: Arc<dyn Notifier> = Arc::new(TermNotifier);

    match cli.command {
        Command::Init { demo } => {
            let store = MemoryStore::new();
            if demo {
                seed_demo(&store).await?;
            }
            store
                .save_snapshot(&cli.data)
                .await
                .context("failed to write the dataset file")?;
            let (employees, articles) = store.counts().await;
            notifier.notify_success(&format!(
                "Created {} ({} employees, {} articles)",
                cli.data.display(),
                employees,
                articles
            ));
        }

        Command::Login { password } => {
            let gate = AuthGate::new(&AppConfig::default().password)
                .context("failed to initialise the login gate")?;
            if gate.verify(&password) {
                notifier.notify_success("Signed in successfully");
            } else {
                notifier.notify_error("Invalid password");
                bail!("authentication failed");
            }
        }

        Command::Employees { action } => {
            let store = open_store(&cli.data).await?;
            run_employee_action(store, notifier, &cli.data, action).await?;
        }

        Command::Articles { action } => {
            let store = open_store(&cli.data).await?;
            run_article_action(store, notifier, &cli.data, action).await?;
        }

        Command::Report { kind } => {
            let store = open_store(&cli.data).await?;
            let mut workspace = ReportsWorkspace::new(store, notifier);
            let (scope, out) = match kind {
                ReportKind::Monthly { out } => {
                    let today = Utc::now().date_naive();
                    (
                        ReportScope::Month {
                            year: today.year(),
                            month: today.month(),
                        },
                        out,
                    )
                }
                ReportKind::AllTime { out } => (ReportScope::AllTime, out),
            };
            workspace.select(scope);
            let out = out.unwrap_or_else(|| {
                PathBuf::from(default_file_name(&scope.title(), Utc::now().naive_utc()))
            });
            workspace.generate(&out, Utc::now().date_naive()).await?;
        }
    }

    Ok(())
}

async fn open_store(path: &PathBuf) -> Result<MemoryStore> {
    MemoryStore::load_snapshot(path)
        .await
        .with_context(|| format!("failed to open '{}'; run `masthead init` first", path.display()))
}

async fn run_employee_action(
    store: MemoryStore,
    notifier: Arc<dyn Notifier>,
    data: &PathBuf,
    action: EmployeeAction,
) -> Result<()> {
    match action {
        EmployeeAction::List {
            search,
            page,
            page_size,
        } => {
            let confirmer: Arc<dyn Confirmer> = Arc::new(FlagConfirm(true));
            let mut workspace =
                EmployeesWorkspace::new(store, notifier, confirmer, page_size);
            workspace.load().await?;
            if let Some(search) = search {
                workspace.set_search(search).await?;
            }
            for _ in 1..page {
                if !workspace.next_page().await? {
                    break;
                }
            }

            let today = Utc::now().date_naive();
            let offset = workspace.page().offset();
            println!(
                "Employees, page {} of {} total match(es)",
                workspace.page().index,
                workspace.total()
            );
            for (index, employee) in workspace.records().enumerate() {
                println!(
                    "{:>3}. [{}] {} | {} #{} | {} .. {} | {} | {}",
                    offset + index + 1,
                    employee.id,
                    employee.full_name(),
                    employee.contract_kind,
                    employee.contract_number,
                    employee.contract_start,
                    employee.contract_end,
                    employee.contract_status(today),
                    if employee.staff { "staff" } else { "freelance" },
                );
            }
        }

        EmployeeAction::Add {
            surname,
            given_name,
            patronymic,
            contract_kind,
            contract_number,
            start,
            end,
            pen_name,
            freelance,
        } => {
            let kind = match contract_kind {
                Some(description) => ContractKind::from_description(&description)
                    .with_context(|| format!("unknown contract kind '{description}'"))?,
                None => ContractKind::AuthorContract,
            };

            let confirmer: Arc<dyn Confirmer> = Arc::new(FlagConfirm(true));
            let mut workspace = EmployeesWorkspace::new(store.clone(), notifier, confirmer, 15);
            workspace.start_adding();
            workspace.add_row();
            let row = workspace
                .new_row_mut(0)
                .expect("a row was just added");
            row.surname = surname;
            row.given_name = given_name;
            row.patronymic = patronymic;
            row.contract_kind = kind;
            row.contract_number = contract_number;
            row.contract_start = start;
            row.contract_end = end;
            row.pen_name = pen_name;
            row.staff = !freelance;

            workspace.save_new_rows().await?;
            store.save_snapshot(data).await?;
        }

        EmployeeAction::Delete { id, yes } => {
            let confirmer: Arc<dyn Confirmer> = Arc::new(FlagConfirm(yes));
            let mut workspace =
                EmployeesWorkspace::new(store.clone(), notifier, confirmer, 100_000);
            workspace.load().await?;
            if workspace.delete(id).await? {
                store.save_snapshot(data).await?;
            }
        }
    }
    Ok(())
}

async fn run_article_action(
    store: MemoryStore,
    notifier: Arc<dyn Notifier>,
    data: &PathBuf,
    action: ArticleAction,
) -> Result<()> {
    let today = Utc::now().date_naive();

    match action {
        ArticleAction::List {
            year,
            month,
            page,
            page_size,
        } => {
            let period = ArticleFilter {
                year: year.unwrap_or_else(|| today.year()),
                month: month.unwrap_or_else(|| today.month()),
            };
            let confirmer: Arc<dyn Confirmer> = Arc::new(FlagConfirm(true));
            let mut workspace =
                ArticlesWorkspace::new(store, notifier, confirmer, page_size, period);
            workspace.load().await?;
            for _ in 1..page {
                if !workspace.next_page().await? {
                    break;
                }
            }

            println!(
                "Articles for {}-{:02}, page {} of {} total match(es)",
                period.year,
                period.month,
                workspace.page().index,
                workspace.total()
            );
            let offset = workspace.page().offset();
            for (index, article) in workspace.records().enumerate() {
                let author = workspace
                    .employee_name(article.employee_id)
                    .unwrap_or_default();
                println!(
                    "{:>3}. [{}] {} | {} | {} | {} + {}% = {} | {} | {}",
                    offset + index + 1,
                    article.id,
                    article.title,
                    author,
                    article.outlet,
                    article.amount,
                    article.bonus_percent.unwrap_or(0),
                    article.total,
                    article.content,
                    article.release_date,
                );
            }
        }

        ArticleAction::Add {
            title,
            employee_id,
            amount,
            bonus,
            outlet,
            advertisement,
            release_date,
            content,
        } => {
            let outlet = match outlet {
                Some(name) => MediaOutlet::from_description(&name)
                    .with_context(|| format!("unknown outlet '{name}'"))?,
                None => MediaOutlet::Vm,
            };
            let content = match content {
                Some(description) => ContentKind::from_description(&description)
                    .with_context(|| format!("unknown content kind '{description}'"))?,
                None => ContentKind::Text,
            };

            let period = ArticleFilter {
                year: release_date.year(),
                month: release_date.month(),
            };
            let confirmer: Arc<dyn Confirmer> = Arc::new(FlagConfirm(true));
            let mut workspace =
                ArticlesWorkspace::new(store.clone(), notifier, confirmer, 10, period);
            workspace.load().await?;
            workspace.start_adding();
            workspace.add_row();
            let row = workspace.new_row_mut(0).expect("a row was just added");
            row.title = title;
            row.employee_id = employee_id;
            row.amount = amount;
            row.bonus_percent = bonus;
            row.outlet = outlet;
            row.advertisement = advertisement;
            row.release_date = release_date;
            row.content = content;

            workspace.save_new_rows().await?;
            store.save_snapshot(data).await?;
        }

        ArticleAction::Delete { id, yes } => {
            let confirmer: Arc<dyn Confirmer> = Arc::new(FlagConfirm(yes));
            let period = ArticleFilter {
                year: today.year(),
                month: today.month(),
            };
            let mut workspace =
                ArticlesWorkspace::new(store.clone(), notifier, confirmer, 100_000, period);
            workspace.load().await?;
            if workspace.delete(id).await? {
                store.save_snapshot(data).await?;
            }
        }
    }
    Ok(())
}

/// A small dataset for trying the tool out.
async fn seed_demo(store: &MemoryStore) -> Result<()> {
    let today = Utc::now().date_naive();
    let employees = vec![
        demo_employee("Ivanova", "Maria", "Petrovna", 101, Some("M. Iva"), true, today),
        demo_employee("Sidorov", "Pavel", "Olegovich", 102, None, true, today),
        demo_employee("Krautsova", "Alena", "Viktorovna", 103, None, false, today),
    ];
    let employees = RecordStore::<Employee>::insert_new(store, employees).await?;

    let mut articles = Vec::new();
    for (index, (title, outlet, content, amount, bonus)) in [
        ("City budget review", MediaOutlet::Vm, ContentKind::Text, 120, Some(10)),
        ("Metro opening photo set", MediaOutlet::MinskNews, ContentKind::Photo, 90, None),
        ("Morning show interview", MediaOutlet::RadioMinsk, ContentKind::Audio, 150, Some(25)),
        ("Weekend festival guide", MediaOutlet::Kacheli, ContentKind::Text, 75, None),
    ]
    .into_iter()
    .enumerate()
    {
        let mut article = Article::draft(
            today.with_day(1).unwrap_or(today) + chrono::Days::new(index as u64 * 3),
        );
        article.title = title.to_string();
        article.employee_id = employees[index % employees.len()].id;
        article.amount = Money::from_major(amount);
        article.bonus_percent = bonus;
        article.outlet = outlet;
        article.content = content;
        article.recalc_total();
        articles.push(article);
    }
    RecordStore::<Article>::insert_new(store, articles).await?;
    Ok(())
}

fn demo_employee(
    surname: &str,
    given_name: &str,
    patronymic: &str,
    contract_number: i64,
    pen_name: Option<&str>,
    staff: bool,
    today: NaiveDate,
) -> Employee {
    let mut employee = Employee::contract_template(today);
    employee.surname = surname.to_string();
    employee.given_name = given_name.to_string();
    employee.patronymic = patronymic.to_string();
    employee.contract_number = contract_number;
    employee.pen_name = pen_name.map(str::to_string);
    employee.staff = staff;
    employee
}
