use kanban_core::{Board, BoardService, ColumnId, SqliteBoardStore, TaskId};
use proptest::prelude::*;

const COLUMNS: [&str; 3] = ["todo", "in_progress", "done"];

#[derive(Debug, Clone)]
enum Op {
    Add { column: usize, title: String },
    Edit { task: usize, title: String },
    Move { task: usize, column: usize, position: usize },
    Reorder { task: usize, position: usize },
    Delete { task: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..3usize, "[a-z ]{0,6}").prop_map(|(column, title)| Op::Add { column, title }),
        1 => (any::<usize>(), "[a-z ]{0,6}").prop_map(|(task, title)| Op::Edit { task, title }),
        2 => (any::<usize>(), 0..3usize, 0..6usize)
            .prop_map(|(task, column, position)| Op::Move { task, column, position }),
        1 => (any::<usize>(), 0..6usize).prop_map(|(task, position)| Op::Reorder { task, position }),
        1 => any::<usize>().prop_map(|task| Op::Delete { task }),
    ]
}

fn nth_task(board: &Board, index: usize) -> Option<TaskId> {
    let ids: Vec<TaskId> = board
        .columns()
        .iter()
        .flat_map(|column| column.tasks().iter().map(|task| task.id))
        .collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()])
    }
}

fn run(service: &mut BoardService<SqliteBoardStore>, op: &Op) {
    let board = service.board().clone();
    // Errors are allowed (blank titles); the invariants must hold either way.
    let _ = match op {
        Op::Add { column, title } => service
            .add_task(&ColumnId::new(COLUMNS[*column]), title)
            .map(|_| ()),
        Op::Edit { task, title } => match nth_task(&board, *task) {
            Some(id) => service.edit_task(id, Some(title), None),
            None => Ok(()),
        },
        Op::Move { task, column, position } => match nth_task(&board, *task) {
            Some(id) => service.move_task(id, &ColumnId::new(COLUMNS[*column]), *position),
            None => Ok(()),
        },
        Op::Reorder { task, position } => match nth_task(&board, *task) {
            Some(id) => service.reorder_task(id, *position),
            None => Ok(()),
        },
        Op::Delete { task } => match nth_task(&board, *task) {
            Some(id) => service.delete_task(id).map(|_| ()),
            None => Ok(()),
        },
    };
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn positions_stay_contiguous_and_single_parent(ops in prop::collection::vec(op(), 0..40)) {
        let mut service = BoardService::load(SqliteBoardStore::open_in_memory().unwrap()).unwrap();
        for op in &ops {
            run(&mut service, op);
            prop_assert!(service.board().check_invariants().is_ok(), "{:?}", service.board().check_invariants());
        }
    }

    #[test]
    fn reload_reproduces_board(ops in prop::collection::vec(op(), 0..30)) {
        let mut service = BoardService::load(SqliteBoardStore::open_in_memory().unwrap()).unwrap();
        for op in &ops {
            run(&mut service, op);
        }
        let expected = service.board().clone();

        let reloaded = BoardService::load(service.into_store()).unwrap();
        prop_assert_eq!(reloaded.board(), &expected);
    }

    #[test]
    fn failed_add_leaves_board_unchanged(title in "[ \t]{0,4}") {
        let mut service = BoardService::load(SqliteBoardStore::open_in_memory().unwrap()).unwrap();
        service.add_task(&ColumnId::new("todo"), "seed").unwrap();
        let before = service.board().clone();

        prop_assert!(service.add_task(&ColumnId::new("todo"), &title).is_err());
        prop_assert_eq!(service.board(), &before);
    }
}
