 // case-store-rs/src/lib.rs
 // Library interface for ticket normalization and case storage.
 //
 // Design notes:
 // - Display labels coming from the case form always pass through the
 //   FieldNormalizer before a record reaches the repository.
 // - The repository is a trait seam; the bundled implementation is in-memory.
 // - Edits replace the stored record wholesale.

use std::sync::Arc;

use tracing::instrument;

pub mod history;
pub mod lookup;
pub mod normalizer;
pub mod repository;
pub mod ticket;

#[cfg(test)]
mod tests;

pub use history::{historical_cases, project_case, CaseAttributes};
pub use lookup::{Category, LookupTables, SeverityLevel, Task};
pub use normalizer::{CodedValue, FieldNormalizer, Preference, TicketStatus, DEFAULT_SEVERITY_ID};
pub use repository::{CaseRepository, InMemoryCaseRepository, RepositoryError};
pub use ticket::{Ticket, TicketError, TicketForm};

/// Create/edit/read operations over a case repository.
///
/// ```ignore
/// let desk = CaseDesk::new(Arc::new(InMemoryCaseRepository::new()), FieldNormalizer::default());
/// let ticket = desk.create_case(form).await?;
/// ```
#[derive(Clone)]
pub struct CaseDesk {
    repo: Arc<dyn CaseRepository + Send + Sync>,
    normalizer: FieldNormalizer,
}

impl CaseDesk {
    pub fn new(repo: Arc<dyn CaseRepository + Send + Sync>, normalizer: FieldNormalizer) -> Self {
        Self { repo, normalizer }
    }

    pub fn normalizer(&self) -> &FieldNormalizer {
        &self.normalizer
    }

    pub fn repository(&self) -> &(dyn CaseRepository + Send + Sync) {
        self.repo.as_ref()
    }

    #[instrument(name = "case_create", skip(self, form))]
    pub async fn create_case(&self, form: TicketForm) -> Result<Ticket, RepositoryError> {
        let ticket = Ticket::from_form(form, &self.normalizer);
        self.repo.create(ticket).await
    }

    #[instrument(name = "case_edit", skip(self, form))]
    pub async fn edit_case(&self, id: i64, form: TicketForm) -> Result<Ticket, RepositoryError> {
        let ticket = Ticket::from_form(form, &self.normalizer);
        self.repo.replace(id, ticket).await
    }

    /// Stored ticket with labels re-derived from its codes.
    pub async fn view_case(&self, id: i64) -> Result<Ticket, RepositoryError> {
        let ticket = self.repo.get(id).await?;
        Ok(ticket.denormalized(&self.normalizer))
    }

    /// Attribute maps of the cases bundled into prediction requests.
    pub async fn history(&self, limit: usize) -> Result<Vec<CaseAttributes>, RepositoryError> {
        historical_cases(self.repo.as_ref(), limit).await
    }

    /// Attribute map for a case that has not been saved yet.
    pub fn preview(&self, form: TicketForm) -> CaseAttributes {
        project_case(&Ticket::from_form(form, &self.normalizer))
    }
}
