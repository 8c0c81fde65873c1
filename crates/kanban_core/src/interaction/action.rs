/// Semantic actions the interaction machine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Navigation
    FocusPrevColumn,
    FocusNextColumn,
    FocusPrevTask,
    FocusNextTask,

    // Task actions
    BeginAdd,
    BeginEditTitle,
    BeginEditDescription,
    BeginMove,
    BeginDelete,
    ReorderUp,
    ReorderDown,
    Quit,

    // Text input
    InputChar(char),
    InputBackspace,
    InputLeft,
    InputRight,
    InputHome,
    InputEnd,
    AdvanceField,

    // Move target selection
    TargetPrevColumn,
    TargetNextColumn,
    JumpToColumn(usize),

    // Shared by editing, move selection and delete confirmation
    Confirm,
    Cancel,

    // No-op
    None,
}
