use chrono::NaiveDate;
use roster_core::{
    today, CloseChoice, CloseDecision, EditSession, InMemoryRosterRepository, RosterRepository,
    RosterService, SessionError, TaskRowPatch, TaskState,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn add_student_selects_it_with_clean_drafts() {
    let repo = InMemoryRosterRepository::new();
    let mut service = RosterService::open(&repo).expect("open roster");
    let mut session = EditSession::new();

    let name = session.add_student(&mut service, " Alice ").expect("add student");

    assert_eq!(name, "Alice");
    assert_eq!(session.selected(), Some("Alice"));
    assert!(session.rows().is_empty());
    assert!(!session.is_dirty());
    assert_eq!(repo.persist_count(), 1);
}

#[test]
fn row_edits_stay_in_drafts_until_save() {
    let repo = InMemoryRosterRepository::new();
    let mut service = RosterService::open(&repo).expect("open roster");
    let mut session = EditSession::new();
    session.add_student(&mut service, "Alice").expect("add student");

    session.set_research("ML");
    let row = session.add_task_row();
    session
        .update_task_row(
            row,
            TaskRowPatch {
                name: Some("survey".to_string()),
                due: Some(date(2024, 1, 1)),
                state: Some(TaskState::InProgress),
            },
        )
        .expect("update task row");
    session.add_task_row();

    assert!(session.is_dirty());
    assert!(service
        .student("Alice")
        .expect("student should exist")
        .tasks
        .is_empty());
    assert_eq!(repo.persist_count(), 1);

    session.save(&mut service).expect("save session");

    assert!(!session.is_dirty());
    let record = repo
        .load()
        .expect("reload roster")
        .get("Alice")
        .cloned()
        .expect("student should be stored");
    assert_eq!(record.research, "ML");
    assert_eq!(record.tasks.len(), 1);
    assert_eq!(record.tasks[0].name, "survey");
    assert_eq!(record.tasks[0].due, date(2024, 1, 1));
    assert_eq!(record.tasks[0].state, TaskState::InProgress);
    assert_eq!(session.rows().len(), 1);
}

#[test]
fn selecting_another_student_loads_its_record() {
    let repo = InMemoryRosterRepository::new();
    let mut service = RosterService::open(&repo).expect("open roster");
    service.add_student("Ann").expect("add student");
    service.add_student("Ben").expect("add student");
    service
        .save_student("Ben", "optics", "lab B", Vec::new())
        .expect("save student");
    let mut session = EditSession::new();

    session.select(&service, "Ann").expect("select student");
    session.set_memo("draft");
    session.select(&service, "Ben").expect("select student");

    assert_eq!(session.research(), "optics");
    assert_eq!(session.memo(), "lab B");
    assert!(!session.is_dirty());
    assert!(matches!(
        session.select(&service, "Nobody"),
        Err(SessionError::StudentNotFound(_))
    ));
}

#[test]
fn deleting_selected_student_clears_drafts() {
    let repo = InMemoryRosterRepository::new();
    let mut service = RosterService::open(&repo).expect("open roster");
    let mut session = EditSession::new();
    session.add_student(&mut service, "Ann").expect("add student");
    session.add_student(&mut service, "Ben").expect("add student");
    session.set_research("unsaved");

    assert!(session.delete_student(&mut service, "Ann").expect("delete student"));
    assert_eq!(session.selected(), Some("Ben"));

    assert!(session.delete_student(&mut service, "Ben").expect("delete student"));
    assert_eq!(session.selected(), None);
    assert!(!session.is_dirty());
    assert!(repo.load().expect("reload roster").is_empty());
}

#[test]
fn close_with_save_persists_and_exits() {
    let repo = InMemoryRosterRepository::new();
    let mut service = RosterService::open(&repo).expect("open roster");
    let mut session = EditSession::new();
    session.add_student(&mut service, "Ann").expect("add student");
    session.set_memo("remember the deadline");
    let row = session.add_task_row();
    session
        .update_task_row(
            row,
            TaskRowPatch {
                name: Some("draft".to_string()),
                ..TaskRowPatch::default()
            },
        )
        .expect("update task row");

    let decision = session
        .on_close(&mut service, || CloseChoice::Save)
        .expect("resolve close");

    assert_eq!(decision, CloseDecision::Exit);
    let record = repo
        .load()
        .expect("reload roster")
        .get("Ann")
        .cloned()
        .expect("student should be stored");
    assert_eq!(record.memo, "remember the deadline");
    assert_eq!(record.tasks[0].due, today());
}

#[test]
fn close_with_discard_exits_without_writing() {
    let repo = InMemoryRosterRepository::new();
    let mut service = RosterService::open(&repo).expect("open roster");
    let mut session = EditSession::new();
    session.add_student(&mut service, "Ann").expect("add student");
    session.set_research("throwaway");

    let decision = session
        .on_close(&mut service, || CloseChoice::Discard)
        .expect("resolve close");

    assert_eq!(decision, CloseDecision::Exit);
    assert_eq!(repo.persist_count(), 1);
    let reloaded = repo.load().expect("reload roster");
    assert_eq!(reloaded.get("Ann").expect("student should be stored").research, "");
}
