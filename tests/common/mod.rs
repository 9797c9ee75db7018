#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use masthead::{
    Article, Confirmer, ContentKind, ContractKind, DependentArticles, Employee, EmployeeFilter,
    MediaOutlet, MemoryStore, Money, Notifier, Page, PageRequest, RecordId, RecordStore, Result,
};

/// Notifier that records every message for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(&'static str, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    pub fn contains(&self, kind: &str, needle: &str) -> bool {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .any(|(k, message)| *k == kind && message.contains(needle))
    }
}

impl Notifier for RecordingNotifier {
    fn notify_success(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(("success", message.to_string()));
    }

    fn notify_error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(("error", message.to_string()));
    }

    fn notify_info(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(("info", message.to_string()));
    }

    fn notify_warn(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(("warning", message.to_string()));
    }
}

/// Confirmer answering from a fixed script; anything past the script is "no".
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirm {
    async fn confirm(&self, title: &str, _message: &str) -> bool {
        self.asked.lock().unwrap().push(title.to_string());
        self.answers.lock().unwrap().pop_front().unwrap_or(false)
    }
}

/// Store wrapper whose save path can be switched to fail, for exercising the
/// persistence-failure branch of the guard.
#[derive(Clone)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_saves: std::sync::Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_saves: std::sync::Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore<Employee> for FlakyStore {
    type Filter = EmployeeFilter;

    async fn load_page(
        &self,
        filter: &EmployeeFilter,
        page: PageRequest,
    ) -> Result<Page<Employee>> {
        RecordStore::<Employee>::load_page(&self.inner, filter, page).await
    }

    async fn save_modified(&self, records: &[Employee]) -> Result<usize> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(masthead::AppError::Persistence(
                "connection lost".to_string(),
            ));
        }
        RecordStore::<Employee>::save_modified(&self.inner, records).await
    }

    async fn insert_new(&self, records: Vec<Employee>) -> Result<Vec<Employee>> {
        RecordStore::<Employee>::insert_new(&self.inner, records).await
    }

    async fn delete(&self, id: RecordId) -> Result<()> {
        RecordStore::<Employee>::delete(&self.inner, id).await
    }
}

#[async_trait]
impl DependentArticles for FlakyStore {
    async fn employee_has_articles(&self, employee_id: RecordId) -> Result<bool> {
        self.inner.employee_has_articles(employee_id).await
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn employee(surname: &str, given_name: &str, contract_number: i64) -> Employee {
    Employee {
        id: 0,
        surname: surname.to_string(),
        given_name: given_name.to_string(),
        patronymic: "Testovich".to_string(),
        contract_kind: ContractKind::AuthorContract,
        contract_number,
        contract_start: date(2026, 1, 1),
        contract_end: date(2027, 1, 1),
        pen_name: None,
        staff: true,
    }
}

pub fn article(title: &str, employee_id: RecordId, amount: i64, release: NaiveDate) -> Article {
    let mut article = Article::draft(release);
    article.title = title.to_string();
    article.employee_id = employee_id;
    article.amount = Money::from_major(amount);
    article.outlet = MediaOutlet::Vm;
    article.content = ContentKind::Text;
    article.recalc_total();
    article
}

/// Store with three employees and two May-2026 articles by the first of them.
pub async fn seeded_store() -> (MemoryStore, Vec<Employee>, Vec<Article>) {
    let store = MemoryStore::new();
    let employees = RecordStore::<Employee>::insert_new(
        &store,
        vec![
            employee("Smith", "John", 1),
            employee("Brown", "Anna", 2),
            employee("Taylor", "Mark", 3),
        ],
    )
    .await
    .unwrap();

    let articles = RecordStore::<Article>::insert_new(
        &store,
        vec![
            article("First piece", employees[0].id, 100, date(2026, 5, 3)),
            article("Second piece", employees[0].id, 200, date(2026, 5, 20)),
        ],
    )
    .await
    .unwrap();

    (store, employees, articles)
}
