use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use kanban_core::{
    Action, BoardSnapshot, KanbanApp, MessageLevel, Mode, Signal, SqliteStoreOpener,
    WorkspaceLocator,
};
use tempfile::TempDir;

fn open_app() -> (TempDir, KanbanApp<SqliteStoreOpener>) {
    let dir = tempfile::tempdir().unwrap();
    let opener = SqliteStoreOpener::new(WorkspaceLocator::new(dir.path()));
    let app = KanbanApp::open(opener, "default").unwrap();
    (dir, app)
}

fn press(app: &mut KanbanApp<SqliteStoreOpener>, code: KeyCode) -> Signal {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_text(app: &mut KanbanApp<SqliteStoreOpener>, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

fn add_task(app: &mut KanbanApp<SqliteStoreOpener>, title: &str) {
    press(app, KeyCode::Char('a'));
    type_text(app, title);
    assert_eq!(press(app, KeyCode::Enter), Signal::Render);
}

fn column_titles(snapshot: &BoardSnapshot, column: usize) -> Vec<String> {
    snapshot.columns[column]
        .tasks
        .iter()
        .map(|task| task.title.clone())
        .collect()
}

fn focused_title(snapshot: &BoardSnapshot) -> Option<String> {
    snapshot
        .columns
        .iter()
        .flat_map(|column| column.tasks.iter())
        .find(|task| task.focused)
        .map(|task| task.title.clone())
}

#[test]
fn add_flow_appends_task_and_focuses_it() {
    let (_dir, mut app) = open_app();
    add_task(&mut app, "First");
    add_task(&mut app, "Second");

    let snapshot = app.snapshot();
    assert_eq!(column_titles(&snapshot, 0), ["First", "Second"]);
    assert_eq!(focused_title(&snapshot).as_deref(), Some("Second"));
    assert_eq!(snapshot.interaction, Mode::Browsing);
}

#[test]
fn add_flow_can_advance_into_description() {
    let (_dir, mut app) = open_app();
    press(&mut app, KeyCode::Char('n'));
    type_text(&mut app, "Title");
    press(&mut app, KeyCode::Tab);
    assert!(matches!(app.snapshot().interaction, Mode::EditingDescription { .. }));
    type_text(&mut app, "more words");
    press(&mut app, KeyCode::Enter);

    let task = &app.snapshot().columns[0].tasks[0];
    assert_eq!(task.title, "Title");
    assert_eq!(task.description.as_deref(), Some("more words"));
}

#[test]
fn letters_are_text_while_editing() {
    let (_dir, mut app) = open_app();
    press(&mut app, KeyCode::Char('a'));
    assert_eq!(press(&mut app, KeyCode::Char('q')), Signal::Render);
    type_text(&mut app, "uit");
    press(&mut app, KeyCode::Home);
    press(&mut app, KeyCode::Char('Q'));
    press(&mut app, KeyCode::Right);
    press(&mut app, KeyCode::Backspace);
    press(&mut app, KeyCode::Enter);

    assert_eq!(column_titles(&app.snapshot(), 0), ["Quit"]);
}

#[test]
fn cancelling_an_edit_leaves_board_and_focus_unchanged() {
    let (_dir, mut app) = open_app();
    add_task(&mut app, "Keep me");
    let before = app.snapshot();

    press(&mut app, KeyCode::Char('e'));
    match &app.snapshot().interaction {
        Mode::EditingTitle { draft } => assert_eq!(draft.title.as_str(), "Keep me"),
        other => panic!("unexpected mode: {other:?}"),
    }
    type_text(&mut app, " changed");
    press(&mut app, KeyCode::Esc);

    assert_eq!(app.snapshot(), before);
}

#[test]
fn confirming_blank_title_reports_error_and_returns_to_browsing() {
    let (_dir, mut app) = open_app();
    press(&mut app, KeyCode::Char('a'));
    type_text(&mut app, "   ");
    press(&mut app, KeyCode::Enter);

    let snapshot = app.snapshot();
    assert_eq!(snapshot.interaction, Mode::Browsing);
    assert_eq!(snapshot.task_count(), 0);
    let message = snapshot.message.expect("error message expected");
    assert_eq!(message.level, MessageLevel::Error);

    press(&mut app, KeyCode::Char('l'));
    assert_eq!(app.snapshot().message, None);
}

#[test]
fn begin_actions_without_focused_task_show_info() {
    let (_dir, mut app) = open_app();
    for key in ['e', 'E', 'm', 'd', 'K'] {
        assert_eq!(press(&mut app, KeyCode::Char(key)), Signal::Render);
        let snapshot = app.snapshot();
        assert_eq!(snapshot.interaction, Mode::Browsing);
        assert_eq!(
            snapshot.message.map(|message| message.level),
            Some(MessageLevel::Info)
        );
    }
}

#[test]
fn edit_description_updates_only_description() {
    let (_dir, mut app) = open_app();
    add_task(&mut app, "Task");
    app.handle_key(KeyEvent::new(KeyCode::Char('E'), KeyModifiers::SHIFT));
    type_text(&mut app, "notes");
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Enter);

    let task = &app.snapshot().columns[0].tasks[0];
    assert_eq!(task.title, "Task");
    assert_eq!(task.description.as_deref(), Some("notes"));
}

#[test]
fn move_flow_sends_task_to_end_of_chosen_column() {
    let (_dir, mut app) = open_app();
    add_task(&mut app, "Done already");
    press(&mut app, KeyCode::Char('m'));
    press(&mut app, KeyCode::Char('3'));
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Char('h'));
    press(&mut app, KeyCode::Char('h'));
    add_task(&mut app, "Ship it");

    press(&mut app, KeyCode::Char('m'));
    match app.snapshot().interaction {
        Mode::SelectingMoveTarget { target, .. } => assert_eq!(target, 0),
        other => panic!("unexpected mode: {other:?}"),
    }
    press(&mut app, KeyCode::Char('l'));
    press(&mut app, KeyCode::Char('l'));
    press(&mut app, KeyCode::Enter);

    let snapshot = app.snapshot();
    assert!(snapshot.columns[0].tasks.is_empty());
    assert_eq!(column_titles(&snapshot, 2), ["Done already", "Ship it"]);
    assert_eq!(focused_title(&snapshot).as_deref(), Some("Ship it"));
    assert!(snapshot.columns[2].focused);
}

#[test]
fn choosing_own_column_as_move_target_keeps_task_in_place() {
    let (_dir, mut app) = open_app();
    for title in ["A", "B", "C"] {
        add_task(&mut app, title);
    }
    press(&mut app, KeyCode::Char('k'));
    press(&mut app, KeyCode::Char('k'));
    assert_eq!(focused_title(&app.snapshot()).as_deref(), Some("A"));

    press(&mut app, KeyCode::Char('m'));
    assert_eq!(press(&mut app, KeyCode::Enter), Signal::Render);

    let snapshot = app.snapshot();
    assert_eq!(snapshot.interaction, Mode::Browsing);
    assert_eq!(column_titles(&snapshot, 0), ["A", "B", "C"]);
    assert_eq!(focused_title(&snapshot).as_deref(), Some("A"));
}

#[test]
fn move_target_cycles_and_cancel_changes_nothing() {
    let (_dir, mut app) = open_app();
    add_task(&mut app, "Stay");
    let before = app.snapshot();

    press(&mut app, KeyCode::Char('m'));
    press(&mut app, KeyCode::Char('h'));
    match app.snapshot().interaction {
        Mode::SelectingMoveTarget { target, .. } => assert_eq!(target, 2),
        other => panic!("unexpected mode: {other:?}"),
    }
    assert_eq!(press(&mut app, KeyCode::Char('9')), Signal::Ignored);
    press(&mut app, KeyCode::Esc);

    assert_eq!(app.snapshot(), before);
}

#[test]
fn delete_flow_focuses_nearest_remaining_task() {
    let (_dir, mut app) = open_app();
    for title in ["A", "B", "C"] {
        add_task(&mut app, title);
    }
    press(&mut app, KeyCode::Up);
    assert_eq!(focused_title(&app.snapshot()).as_deref(), Some("B"));

    press(&mut app, KeyCode::Char('d'));
    press(&mut app, KeyCode::Char('y'));
    assert_eq!(column_titles(&app.snapshot(), 0), ["A", "C"]);
    assert_eq!(focused_title(&app.snapshot()).as_deref(), Some("C"));

    press(&mut app, KeyCode::Char('x'));
    press(&mut app, KeyCode::Enter);
    assert_eq!(focused_title(&app.snapshot()).as_deref(), Some("A"));

    press(&mut app, KeyCode::Delete);
    press(&mut app, KeyCode::Char('y'));
    let snapshot = app.snapshot();
    assert_eq!(snapshot.task_count(), 0);
    assert_eq!(snapshot.focus.task_id(), None);
    assert!(snapshot.columns[0].focused);
}

#[test]
fn delete_cancel_keeps_task() {
    let (_dir, mut app) = open_app();
    add_task(&mut app, "Precious");
    let before = app.snapshot();

    press(&mut app, KeyCode::Char('d'));
    assert!(matches!(
        app.snapshot().interaction,
        Mode::ConfirmingDelete { .. }
    ));
    assert_eq!(press(&mut app, KeyCode::Char('z')), Signal::Ignored);
    press(&mut app, KeyCode::Char('n'));

    assert_eq!(app.snapshot(), before);
}

#[test]
fn reorder_keys_move_focused_task_and_keep_focus() {
    let (_dir, mut app) = open_app();
    for title in ["A", "B", "C"] {
        add_task(&mut app, title);
    }

    app.handle_key(KeyEvent::new(KeyCode::Char('K'), KeyModifiers::SHIFT));
    assert_eq!(column_titles(&app.snapshot(), 0), ["A", "C", "B"]);
    app.handle_key(KeyEvent::new(KeyCode::Char('K'), KeyModifiers::SHIFT));
    app.handle_key(KeyEvent::new(KeyCode::Char('K'), KeyModifiers::SHIFT));
    assert_eq!(column_titles(&app.snapshot(), 0), ["C", "A", "B"]);
    assert_eq!(focused_title(&app.snapshot()).as_deref(), Some("C"));

    app.handle_key(KeyEvent::new(KeyCode::Char('J'), KeyModifiers::SHIFT));
    assert_eq!(column_titles(&app.snapshot(), 0), ["A", "C", "B"]);
}

#[test]
fn illegal_actions_are_ignored_without_clearing_message() {
    let (_dir, mut app) = open_app();
    press(&mut app, KeyCode::Char('e'));
    let message = app.snapshot().message;
    assert!(message.is_some());

    assert_eq!(app.handle_action(Action::Confirm), Signal::Ignored);
    assert_eq!(app.handle_action(Action::InputChar('x')), Signal::Ignored);
    assert_eq!(press(&mut app, KeyCode::F(5)), Signal::Ignored);
    assert_eq!(app.snapshot().message, message);
}

#[test]
fn quit_keys_signal_quit() {
    let (_dir, mut app) = open_app();
    assert_eq!(press(&mut app, KeyCode::Char('q')), Signal::Quit);
    assert_eq!(
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        Signal::Quit
    );
}

#[test]
fn storage_failure_during_confirm_returns_to_browsing_with_error() {
    let (_dir, mut app) = open_app();
    add_task(&mut app, "Before close");
    app.close();

    press(&mut app, KeyCode::Char('a'));
    type_text(&mut app, "After close");
    press(&mut app, KeyCode::Enter);

    let snapshot = app.snapshot();
    assert_eq!(snapshot.interaction, Mode::Browsing);
    assert_eq!(column_titles(&snapshot, 0), ["Before close"]);
    assert_eq!(
        snapshot.message.map(|message| message.level),
        Some(MessageLevel::Error)
    );
}

#[test]
fn snapshot_serializes_mode_tag_and_buffers() {
    let (_dir, mut app) = open_app();
    press(&mut app, KeyCode::Char('a'));
    type_text(&mut app, "hi");

    let value = serde_json::to_value(app.snapshot()).unwrap();
    assert_eq!(value["workspace"], "default");
    assert_eq!(value["interaction"]["mode"], "editing_title");
    assert_eq!(value["interaction"]["draft"]["title"]["input"], "hi");
    assert_eq!(value["interaction"]["draft"]["title"]["cursor"], 2);
    assert_eq!(value["columns"][1]["id"], "in_progress");
    assert_eq!(value["message"], serde_json::Value::Null);
}
