//! Key bindings for form navigation.
//!
//! Every field copies the part of the [`KeyMap`] it needs in `with_keymap`,
//! then toggles `prev`/`next`/`submit` according to its
//! [`FieldPosition`](crate::FieldPosition).

use termloop::Binding;

/// Keybindings for every field type.
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Abort the form.
    pub quit: Binding,
    pub input: InputKeyMap,
    pub text: TextKeyMap,
    pub select: SelectKeyMap,
    pub multi_select: MultiSelectKeyMap,
    pub confirm: ConfirmKeyMap,
    pub note: NoteKeyMap,
    pub table: TableKeyMap,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyMap {
    /// Creates the default keymap.
    pub fn new() -> Self {
        Self {
            quit: Binding::new().keys(&["ctrl+c"]),
            input: InputKeyMap::default(),
            text: TextKeyMap::default(),
            select: SelectKeyMap::default(),
            multi_select: MultiSelectKeyMap::default(),
            confirm: ConfirmKeyMap::default(),
            note: NoteKeyMap::default(),
            table: TableKeyMap::default(),
        }
    }
}

fn prev() -> Binding {
    Binding::new().keys(&["shift+tab"]).help("shift+tab", "back")
}

fn submit() -> Binding {
    Binding::new().keys(&["enter"]).help("enter", "submit")
}

/// Keybindings for single-line inputs.
#[derive(Debug, Clone)]
pub struct InputKeyMap {
    pub accept_suggestion: Binding,
    pub next: Binding,
    pub prev: Binding,
    pub submit: Binding,
}

impl Default for InputKeyMap {
    fn default() -> Self {
        Self {
            accept_suggestion: Binding::new().keys(&["ctrl+e"]).help("ctrl+e", "complete"),
            next: Binding::new().keys(&["enter", "tab"]).help("enter", "next"),
            prev: prev(),
            submit: submit(),
        }
    }
}

/// Keybindings for multi-line text.
#[derive(Debug, Clone)]
pub struct TextKeyMap {
    pub next: Binding,
    pub prev: Binding,
    pub new_line: Binding,
    pub submit: Binding,
}

impl Default for TextKeyMap {
    fn default() -> Self {
        Self {
            next: Binding::new().keys(&["tab", "enter"]).help("enter", "next"),
            prev: prev(),
            new_line: Binding::new()
                .keys(&["alt+enter", "ctrl+j"])
                .help("alt+enter / ctrl+j", "new line"),
            submit: submit(),
        }
    }
}

/// Keybindings for single selection.
///
/// `left`/`right` replace `up`/`down` in inline mode.
#[derive(Debug, Clone)]
pub struct SelectKeyMap {
    pub next: Binding,
    pub prev: Binding,
    pub up: Binding,
    pub down: Binding,
    pub left: Binding,
    pub right: Binding,
    pub filter: Binding,
    pub set_filter: Binding,
    pub clear_filter: Binding,
    pub goto_top: Binding,
    pub goto_bottom: Binding,
    pub submit: Binding,
}

impl Default for SelectKeyMap {
    fn default() -> Self {
        Self {
            next: Binding::new().keys(&["enter", "tab"]).help("enter", "select"),
            prev: prev(),
            up: Binding::new().keys(&["up", "k", "ctrl+k", "ctrl+p"]).help("↑", "up"),
            down: Binding::new()
                .keys(&["down", "j", "ctrl+j", "ctrl+n"])
                .help("↓", "down"),
            left: Binding::new()
                .keys(&["h", "left"])
                .help("←", "left")
                .set_enabled(false),
            right: Binding::new()
                .keys(&["l", "right"])
                .help("→", "right")
                .set_enabled(false),
            filter: Binding::new().keys(&["/"]).help("/", "filter"),
            set_filter: Binding::new()
                .keys(&["enter"])
                .help("enter", "set filter")
                .set_enabled(false),
            clear_filter: Binding::new()
                .keys(&["esc"])
                .help("esc", "clear filter")
                .set_enabled(false),
            goto_top: Binding::new().keys(&["home", "g"]).help("g/home", "go to start"),
            goto_bottom: Binding::new().keys(&["end", "G"]).help("G/end", "go to end"),
            submit: submit(),
        }
    }
}

/// Keybindings for multiple selection.
#[derive(Debug, Clone)]
pub struct MultiSelectKeyMap {
    pub next: Binding,
    pub prev: Binding,
    pub up: Binding,
    pub down: Binding,
    pub toggle: Binding,
    pub filter: Binding,
    pub set_filter: Binding,
    pub clear_filter: Binding,
    pub goto_top: Binding,
    pub goto_bottom: Binding,
    pub select_all: Binding,
    pub select_none: Binding,
    pub submit: Binding,
}

impl Default for MultiSelectKeyMap {
    fn default() -> Self {
        Self {
            next: Binding::new().keys(&["enter", "tab"]).help("enter", "confirm"),
            prev: prev(),
            up: Binding::new().keys(&["up", "k", "ctrl+p"]).help("↑", "up"),
            down: Binding::new().keys(&["down", "j", "ctrl+n"]).help("↓", "down"),
            toggle: Binding::new().keys(&[" ", "x"]).help("x", "toggle"),
            filter: Binding::new().keys(&["/"]).help("/", "filter"),
            set_filter: Binding::new()
                .keys(&["enter"])
                .help("enter", "set filter")
                .set_enabled(false),
            clear_filter: Binding::new()
                .keys(&["esc"])
                .help("esc", "clear filter")
                .set_enabled(false),
            goto_top: Binding::new().keys(&["home", "g"]).help("g/home", "go to start"),
            goto_bottom: Binding::new().keys(&["end", "G"]).help("G/end", "go to end"),
            select_all: Binding::new().keys(&["ctrl+a"]).help("ctrl+a", "select all"),
            select_none: Binding::new()
                .keys(&["ctrl+a"])
                .help("ctrl+a", "select none")
                .set_enabled(false),
            submit: submit(),
        }
    }
}

/// Keybindings for yes/no confirmation.
#[derive(Debug, Clone)]
pub struct ConfirmKeyMap {
    pub next: Binding,
    pub prev: Binding,
    pub toggle: Binding,
    pub accept: Binding,
    pub reject: Binding,
    pub submit: Binding,
}

impl Default for ConfirmKeyMap {
    fn default() -> Self {
        Self {
            next: Binding::new().keys(&["enter", "tab"]).help("enter", "next"),
            prev: prev(),
            toggle: Binding::new()
                .keys(&["h", "l", "right", "left"])
                .help("←/→", "toggle"),
            accept: Binding::new().keys(&["y", "Y"]).help("y", "Yes"),
            reject: Binding::new().keys(&["n", "N"]).help("n", "No"),
            submit: submit(),
        }
    }
}

/// Keybindings for notes.
#[derive(Debug, Clone)]
pub struct NoteKeyMap {
    pub next: Binding,
    pub prev: Binding,
    pub submit: Binding,
}

impl Default for NoteKeyMap {
    fn default() -> Self {
        Self {
            next: Binding::new().keys(&["enter", "tab"]).help("enter", "next"),
            prev: prev(),
            submit: submit(),
        }
    }
}

/// Keybindings for tables.
#[derive(Debug, Clone)]
pub struct TableKeyMap {
    pub next: Binding,
    pub prev: Binding,
    pub up: Binding,
    pub down: Binding,
    pub goto_top: Binding,
    pub goto_bottom: Binding,
    pub submit: Binding,
}

impl Default for TableKeyMap {
    fn default() -> Self {
        Self {
            next: Binding::new().keys(&["enter", "tab"]).help("enter", "select"),
            prev: prev(),
            up: Binding::new().keys(&["up", "k"]).help("↑", "up"),
            down: Binding::new().keys(&["down", "j"]).help("↓", "down"),
            goto_top: Binding::new().keys(&["home", "g"]).help("g/home", "go to start"),
            goto_bottom: Binding::new().keys(&["end", "G"]).help("G/end", "go to end"),
            submit: submit(),
        }
    }
}
