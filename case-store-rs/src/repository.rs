// case-store-rs/src/repository.rs
// Persistence seam for case records.
//
// Implementation notes:
// - In-memory store keyed by ticket id, ids handed out monotonically.
// - `replace` detaches the prior record and reattaches the new one under a
//   single write lock; on failure the detached record is restored, so a
//   reader sees either the old ticket or the new one, never a mix.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::ticket::{Ticket, TicketError};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("case {0} not found")]
    NotFound(i64),

    #[error("invalid case record: {0}")]
    Invalid(#[from] TicketError),
}

#[async_trait]
pub trait CaseRepository {
    /// Persist a new ticket, assigning its id and case number.
    async fn create(&self, ticket: Ticket) -> Result<Ticket, RepositoryError>;

    async fn get(&self, id: i64) -> Result<Ticket, RepositoryError>;

    /// Replace an existing ticket wholesale. Identity fields are kept.
    async fn replace(&self, id: i64, ticket: Ticket) -> Result<Ticket, RepositoryError>;

    /// Most recent tickets first.
    async fn recent(&self, limit: usize) -> Result<Vec<Ticket>, RepositoryError>;

    /// Most recent tickets that carry a non-empty RCA report.
    async fn recent_with_report(&self, limit: usize) -> Result<Vec<Ticket>, RepositoryError>;
}

#[derive(Debug)]
pub struct InMemoryCaseRepository {
    cases: RwLock<BTreeMap<i64, Ticket>>,
    next_id: AtomicI64,
}

impl Default for InMemoryCaseRepository {
    fn default() -> Self {
        Self {
            cases: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryCaseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.cases.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cases.read().await.is_empty()
    }
}

pub fn case_number(id: i64) -> String {
    format!("CASE-{:06}", id)
}

#[async_trait]
impl CaseRepository for InMemoryCaseRepository {
    #[instrument(skip(self, ticket))]
    async fn create(&self, mut ticket: Ticket) -> Result<Ticket, RepositoryError> {
        ticket.validate()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        ticket.id = id;
        ticket.case_number = case_number(id);
        ticket.created_date = now;
        ticket.updated_date = now;

        self.cases.write().await.insert(id, ticket.clone());
        tracing::info!(case_id = id, case_number = %ticket.case_number, "case created");
        Ok(ticket)
    }

    async fn get(&self, id: i64) -> Result<Ticket, RepositoryError> {
        self.cases
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    #[instrument(skip(self, ticket))]
    async fn replace(&self, id: i64, mut ticket: Ticket) -> Result<Ticket, RepositoryError> {
        let mut cases = self.cases.write().await;

        let previous = cases.remove(&id).ok_or(RepositoryError::NotFound(id))?;

        ticket.id = previous.id;
        ticket.case_number = previous.case_number.clone();
        ticket.created_date = previous.created_date;
        ticket.updated_date = Utc::now();

        if let Err(reason) = ticket.validate() {
            cases.insert(id, previous);
            tracing::warn!(case_id = id, %reason, "case edit rejected, prior record restored");
            return Err(RepositoryError::Invalid(reason));
        }

        cases.insert(id, ticket.clone());
        tracing::info!(case_id = id, "case replaced");
        Ok(ticket)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Ticket>, RepositoryError> {
        let cases = self.cases.read().await;
        Ok(cases.values().rev().take(limit).cloned().collect())
    }

    async fn recent_with_report(&self, limit: usize) -> Result<Vec<Ticket>, RepositoryError> {
        let cases = self.cases.read().await;
        Ok(cases
            .values()
            .rev()
            .filter(|t| t.has_report())
            .take(limit)
            .cloned()
            .collect())
    }
}
