use std::sync::Arc;

use serde_json::{json, Value};

use crate::lookup::LookupTables;
use crate::repository::{case_number, CaseRepository, InMemoryCaseRepository, RepositoryError};
use crate::{CaseDesk, FieldNormalizer, Ticket, TicketError, TicketForm};

fn desk_with(lookups: LookupTables) -> (CaseDesk, Arc<InMemoryCaseRepository>) {
    let repo = Arc::new(InMemoryCaseRepository::new());
    let desk = CaseDesk::new(repo.clone(), FieldNormalizer::new(Arc::new(lookups)));
    (desk, repo)
}

fn make_form(subject: &str) -> TicketForm {
    TicketForm {
        subject: subject.to_string(),
        description: format!("{} description", subject),
        category: "network".to_string(),
        task: "Incident".to_string(),
        ..TicketForm::default()
    }
}

#[tokio::test]
async fn create_resolves_severity_without_table_row() {
    let (desk, repo) = desk_with(LookupTables::default());
    let form = TicketForm {
        severity_label: Some("Severity 3".to_string()),
        ..make_form("router down")
    };

    let created = desk.create_case(form).await.unwrap();

    assert_eq!(created.id, 1);
    assert_eq!(created.case_number, case_number(1));
    assert_eq!(created.severity_code, 3);
    assert_eq!(created.severity_label, "Severity 3");
    assert_eq!(repo.get(1).await.unwrap().severity_code, 3);
}

#[tokio::test]
async fn create_uses_standard_lookups_for_category_and_task() {
    let (desk, _repo) = desk_with(LookupTables::standard());

    let created = desk.create_case(make_form("dns flapping")).await.unwrap();

    assert_eq!(created.category_id, Some(1));
    assert_eq!(created.category_name, "Network");
    assert_eq!(created.task_id, Some(1));
    assert_eq!(created.severity_code, 1);
    assert_eq!(created.preference_label, "Medium");
    assert_eq!(created.status_label, "Open");
}

#[tokio::test]
async fn edit_normalizes_lowercase_preference() {
    let (desk, repo) = desk_with(LookupTables::standard());
    let created = desk.create_case(make_form("disk full")).await.unwrap();

    let edit = TicketForm {
        preference_label: Some("high".to_string()),
        preference_code: Some(3),
        ..make_form("disk full")
    };
    let edited = desk.edit_case(created.id, edit).await.unwrap();

    assert_eq!(edited.preference_code, 1);
    assert_eq!(edited.preference_label, "High");
    assert_eq!(edited.created_date, created.created_date);
    assert_eq!(repo.get(created.id).await.unwrap().preference_code, 1);
}

#[tokio::test]
async fn edit_of_missing_case_is_not_found() {
    let (desk, _repo) = desk_with(LookupTables::standard());

    let err = desk.edit_case(42, make_form("ghost")).await.unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound(42)));
}

#[tokio::test]
async fn rejected_edit_keeps_prior_record() {
    let (desk, repo) = desk_with(LookupTables::standard());
    let created = desk.create_case(make_form("vpn drops")).await.unwrap();

    let err = desk
        .edit_case(created.id, TicketForm::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::Invalid(TicketError::NoText)));
    let stored = repo.get(created.id).await.unwrap();
    assert_eq!(stored, created);
    assert_eq!(repo.len().await, 1);
}

#[test]
fn validation_names_the_failing_field() {
    let normalizer = FieldNormalizer::new(Arc::new(LookupTables::standard()));
    let ticket = Ticket::from_form(make_form("printer jam"), &normalizer);
    assert_eq!(ticket.validate(), Ok(()));

    let unlabeled = Ticket {
        status_label: "  ".to_string(),
        ..ticket.clone()
    };
    assert_eq!(unlabeled.validate(), Err(TicketError::MissingLabel("status")));
    assert_eq!(
        unlabeled.validate().unwrap_err().to_string(),
        "status label is empty"
    );

    let blank = Ticket {
        subject: String::new(),
        summary: String::new(),
        description: String::new(),
        ..ticket
    };
    assert_eq!(blank.validate(), Err(TicketError::NoText));
}

#[tokio::test]
async fn view_rederives_labels_from_codes() {
    let (desk, repo) = desk_with(LookupTables::standard());
    let created = desk.create_case(make_form("latency")).await.unwrap();

    let mut tampered = repo.get(created.id).await.unwrap();
    tampered.severity_label = "stale".to_string();
    tampered.severity_code = 2;
    repo.replace(created.id, tampered).await.unwrap();

    let viewed = desk.view_case(created.id).await.unwrap();
    assert_eq!(viewed.severity_label, "Severity 2");
}

#[tokio::test]
async fn history_falls_back_to_recent_cases() {
    let (desk, _repo) = desk_with(LookupTables::standard());
    desk.create_case(make_form("first")).await.unwrap();
    desk.create_case(make_form("second")).await.unwrap();

    let history = desk.history(100).await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["Subject"], json!("second"));
    assert_eq!(history[1]["Subject"], json!("first"));
}

#[tokio::test]
async fn history_prefers_cases_with_reports() {
    let (desk, _repo) = desk_with(LookupTables::standard());
    desk.create_case(make_form("no report")).await.unwrap();
    let reported = TicketForm {
        rca_report: "Root cause: expired certificate".to_string(),
        ..make_form("with report")
    };
    desk.create_case(reported).await.unwrap();

    let history = desk.history(100).await.unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["Subject"], json!("with report"));
    assert_eq!(history[0]["RCAReport"], json!("Root cause: expired certificate"));
}

#[tokio::test]
async fn history_respects_limit() {
    let (desk, _repo) = desk_with(LookupTables::standard());
    for i in 0..5 {
        desk.create_case(make_form(&format!("case {}", i))).await.unwrap();
    }

    assert_eq!(desk.history(3).await.unwrap().len(), 3);
}

#[test]
fn preview_projects_unsaved_case() {
    let (desk, _repo) = desk_with(LookupTables::standard());
    let form = TicketForm {
        severity_label: Some("Severity 2".to_string()),
        preference_label: Some("Low".to_string()),
        ..make_form("new outage")
    };

    let attrs = desk.preview(form);

    assert!(!attrs.contains_key("ID"));
    assert!(!attrs.contains_key("CaseNumber"));
    assert_eq!(attrs["Summary"], json!("new outage"));
    assert_eq!(attrs["Priority"], json!("Severity 2"));
    assert_eq!(attrs["PREFERENCE"], json!(3));
    assert_eq!(attrs["PreferenceLevel"], json!("Low"));
    assert_eq!(attrs["CategoryName"], Value::from("Network"));
}
