//! Groups: one page of fields.

use termloop::help::short_help_view;
use termloop::{Cmd, KeyMsg, Message, batch};

use crate::field::{Field, FieldPosition, NextFieldMsg, NextGroupMsg, PrevFieldMsg, PrevGroupMsg};
use crate::keymap::KeyMap;
use crate::theme::Theme;

type HideFn = Box<dyn Fn() -> bool + Send + Sync>;

/// An ordered set of fields shown together as one page of a form.
///
/// The group owns focus within the page. Key presses go to the focused
/// field only; every other message is broadcast so that blurred fields can
/// keep their dynamic content current. When focus runs off either end, the
/// group asks the form to change page with [`NextGroupMsg`] or
/// [`PrevGroupMsg`].
pub struct Group {
    fields: Vec<Box<dyn Field>>,
    current: usize,
    title: String,
    description: String,
    width: usize,
    height: usize,
    theme: Theme,
    theme_override: Option<Theme>,
    keymap_override: Option<KeyMap>,
    hide: Option<HideFn>,
    show_help: bool,
    show_errors: bool,
    active: bool,
    initialized: bool,
}

impl Default for Group {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Group {
    /// Creates a group with the given fields.
    pub fn new(fields: Vec<Box<dyn Field>>) -> Self {
        Self {
            fields,
            current: 0,
            title: String::new(),
            description: String::new(),
            width: 0,
            height: 0,
            theme: Theme::default(),
            theme_override: None,
            keymap_override: None,
            hide: None,
            show_help: true,
            show_errors: true,
            active: false,
            initialized: false,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Hides the group from navigation.
    pub fn hide(mut self, hide: bool) -> Self {
        self.hide = Some(Box::new(move || hide));
        self
    }

    /// Decides visibility each time the form pages. Usually reads a
    /// [`Value`](crate::Value) bound to an earlier field.
    pub fn hide_func<F: Fn() -> bool + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.hide = Some(Box::new(f));
        self
    }

    /// Uses `theme` for this group instead of the form's.
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme.clone();
        self.theme_override = Some(theme);
        self
    }

    /// Uses `keymap` for this group's fields instead of the form's.
    pub fn keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap_override = Some(keymap);
        self
    }

    pub fn width(mut self, width: usize) -> Self {
        self.set_width(width);
        self
    }

    /// Clips the group to `height` lines, scrolled to keep the focused
    /// field in view. 0 means unclipped.
    pub fn height(mut self, height: usize) -> Self {
        self.set_height(height);
        self
    }

    pub fn show_help(mut self, show: bool) -> Self {
        self.show_help = show;
        self
    }

    pub fn show_errors(mut self, show: bool) -> Self {
        self.show_errors = show;
        self
    }

    /// Returns whether the group is hidden right now.
    pub fn is_hidden(&self) -> bool {
        self.hide.as_ref().is_some_and(|f| f())
    }

    /// Returns whether any field can take focus.
    pub fn is_focusable(&self) -> bool {
        (0..self.fields.len()).any(|i| self.focusable(i))
    }

    /// Returns whether the form can page to this group.
    pub fn is_reachable(&self) -> bool {
        !self.is_hidden() && self.is_focusable()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Index of the focused field.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_field(&self) -> Option<&dyn Field> {
        self.fields.get(self.current).map(|f| f.as_ref())
    }

    pub fn fields(&self) -> &[Box<dyn Field>] {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut [Box<dyn Field>] {
        &mut self.fields
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Field errors, in field order.
    pub fn errors(&self) -> Vec<&str> {
        self.fields.iter().filter_map(|f| f.error()).collect()
    }

    /// A lone field is focusable even if it asks to be skipped, so every
    /// non-empty group has somewhere to put focus.
    fn focusable(&self, i: usize) -> bool {
        self.fields.len() == 1 || !self.fields[i].skip()
    }

    fn first_focusable(&self) -> Option<usize> {
        (0..self.fields.len()).find(|&i| self.focusable(i))
    }

    fn last_focusable(&self) -> Option<usize> {
        (0..self.fields.len()).rev().find(|&i| self.focusable(i))
    }

    pub(crate) fn apply_theme(&mut self, theme: &Theme) {
        let theme = self.theme_override.as_ref().unwrap_or(theme).clone();
        for field in &mut self.fields {
            field.with_theme(&theme);
        }
        self.theme = theme;
    }

    pub(crate) fn apply_keymap(&mut self, keymap: &KeyMap) {
        let keymap = self.keymap_override.as_ref().unwrap_or(keymap);
        for field in &mut self.fields {
            field.with_keymap(keymap);
        }
    }

    pub(crate) fn set_width(&mut self, width: usize) {
        self.width = width;
        for field in &mut self.fields {
            field.with_width(width);
        }
    }

    /// A lone field gets the whole height; otherwise fields size
    /// themselves.
    pub(crate) fn set_height(&mut self, height: usize) {
        self.height = height;
        if let [field] = self.fields.as_mut_slice() {
            field.with_height(height);
        }
    }

    /// Applies the form height unless the group set its own.
    pub(crate) fn default_height(&mut self, height: usize) {
        if self.height == 0 {
            self.set_height(height);
        }
    }

    pub(crate) fn set_show_help(&mut self, show: bool) {
        self.show_help = show;
    }

    pub(crate) fn set_show_errors(&mut self, show: bool) {
        self.show_errors = show;
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Recomputes every field's position. `group` is this group's index and
    /// `first_group`/`last_group` bound the reachable pages.
    pub(crate) fn set_positions(
        &mut self,
        group: usize,
        group_count: usize,
        first_group: usize,
        last_group: usize,
    ) {
        let first_field = self.first_focusable().unwrap_or(0);
        let last_field = self.last_focusable().unwrap_or(0);
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.with_position(FieldPosition {
                group,
                field: i,
                first_field,
                last_field,
                group_count,
                first_group,
                last_group,
            });
        }
    }

    /// Runs every field's one-time setup.
    pub fn init(&mut self) -> Option<Cmd> {
        self.initialized = true;
        batch(self.fields.iter_mut().map(|f| f.init()).collect())
    }

    /// Makes this the form's active page, focusing the first focusable
    /// field, or the last one when entered backwards.
    pub fn activate(&mut self, from_end: bool) -> Option<Cmd> {
        self.active = true;
        let target = if from_end {
            self.last_focusable()
        } else {
            self.first_focusable()
        };
        self.current = target.unwrap_or(0);
        self.fields.get_mut(self.current)?.focus()
    }

    /// Blurs the focused field and stops taking input.
    pub fn deactivate(&mut self) -> Option<Cmd> {
        self.active = false;
        self.fields.get_mut(self.current)?.blur()
    }

    fn move_focus(&mut self, to: usize) -> Option<Cmd> {
        let blur = self.fields.get_mut(self.current).and_then(|f| f.blur());
        self.current = to;
        tracing::trace!(field = to, "focus moved");
        let focus = self.fields.get_mut(self.current).and_then(|f| f.focus());
        batch(vec![blur, focus])
    }

    /// Focuses the next focusable field, or asks for the next page.
    pub fn next_field(&mut self) -> Option<Cmd> {
        match (self.current + 1..self.fields.len()).find(|&i| self.focusable(i)) {
            Some(i) => self.move_focus(i),
            None => Some(Cmd::message(NextGroupMsg)),
        }
    }

    /// Focuses the previous focusable field, or asks for the previous page.
    pub fn prev_field(&mut self) -> Option<Cmd> {
        match (0..self.current).rev().find(|&i| self.focusable(i)) {
            Some(i) => self.move_focus(i),
            None => Some(Cmd::message(PrevGroupMsg)),
        }
    }

    /// Handles one message.
    pub fn update(&mut self, msg: &Message) -> Option<Cmd> {
        if msg.is::<NextFieldMsg>() {
            return self.next_field();
        }
        if msg.is::<PrevFieldMsg>() {
            return self.prev_field();
        }
        if msg.is::<KeyMsg>() {
            if !self.active {
                return None;
            }
            return self.fields.get_mut(self.current)?.update(msg);
        }
        batch(self.fields.iter_mut().map(|f| f.update(msg)).collect())
    }

    /// Title, description and fields, clipped to the group height.
    pub fn content(&self) -> String {
        let mut header = Vec::new();
        if !self.title.is_empty() {
            header.push(self.theme.group.title.render(&self.title));
        }
        if !self.description.is_empty() {
            header.push(self.theme.group.description.render(&self.description));
        }

        if self.active
            && let Some(field) = self.fields.get(self.current)
            && field.zoom()
        {
            header.push(field.view());
            return header.join("\n");
        }

        let separator = self.theme.field_separator.render("");
        let mut body = String::new();
        let mut focus_span = (0, 0);
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                body.push_str(&separator);
            }
            let view = field.view();
            if i == self.current {
                let start = body.matches('\n').count();
                focus_span = (start, start + view.matches('\n').count() + 1);
            }
            body.push_str(&view);
        }

        let body = if self.height > 0 {
            clip(&body, self.height, focus_span)
        } else {
            body
        };
        header.push(body);
        header.join("\n")
    }

    /// Error messages and the help line.
    pub fn footer(&self) -> String {
        let mut lines = Vec::new();
        if self.show_errors {
            let style = &self.theme.focused.error_message;
            lines.extend(self.errors().into_iter().map(|err| style.render(err)));
        }
        if self.show_help
            && let Some(field) = self.fields.get(self.current)
        {
            let binds = field.key_binds();
            let refs: Vec<_> = binds.iter().collect();
            let help = short_help_view(&refs, self.width, &self.theme.help);
            if !help.is_empty() {
                lines.push(help);
            }
        }
        lines.join("\n")
    }

    /// Content followed by the footer.
    pub fn view(&self) -> String {
        let footer = self.footer();
        if footer.is_empty() {
            self.content()
        } else {
            format!("{}\n\n{footer}", self.content())
        }
    }
}

/// Keeps `height` lines of `body`, scrolled so that the lines in `focus`
/// (start inclusive, end exclusive) are visible.
fn clip(body: &str, height: usize, focus: (usize, usize)) -> String {
    let lines: Vec<&str> = body.split('\n').collect();
    if lines.len() <= height {
        return body.to_string();
    }
    let (start, end) = focus;
    let offset = end.saturating_sub(height).min(start);
    let offset = offset.min(lines.len() - height);
    lines[offset..offset + height].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Value;
    use crate::field::{Input, Note};
    use termloop::KeyType;
    use termloop::style::strip_ansi;

    fn three_with_note() -> Group {
        let mut group = Group::new(vec![
            Box::new(Input::new().key("a").title("A")),
            Box::new(Note::new().title("Just so you know")),
            Box::new(Input::new().key("c").title("C")),
        ]);
        group.set_positions(0, 1, 0, 0);
        group.init();
        group.activate(false);
        group
    }

    fn single_message(cmd: Option<Cmd>) -> Message {
        let mut msgs = cmd.unwrap().into_messages();
        assert_eq!(msgs.len(), 1);
        msgs.remove(0)
    }

    #[test]
    fn test_next_skips_note() {
        let mut group = three_with_note();
        assert_eq!(group.current(), 0);
        group.update(&Message::new(NextFieldMsg));
        assert_eq!(group.current(), 2);
        group.update(&Message::new(PrevFieldMsg));
        assert_eq!(group.current(), 0);
    }

    #[test]
    fn test_edges_bubble_group_messages() {
        let mut group = three_with_note();
        assert!(single_message(group.prev_field()).is::<PrevGroupMsg>());
        group.next_field();
        assert!(single_message(group.next_field()).is::<NextGroupMsg>());
        assert_eq!(group.current(), 2);
    }

    #[test]
    fn test_all_skipped_group_bubbles_immediately() {
        let mut group = Group::new(vec![
            Box::new(Note::new()),
            Box::new(Note::new()),
        ]);
        assert!(!group.is_focusable());
        group.activate(false);
        assert!(single_message(group.next_field()).is::<NextGroupMsg>());
        assert!(single_message(group.prev_field()).is::<PrevGroupMsg>());
    }

    #[test]
    fn test_lone_skipped_field_is_focusable() {
        let group = Group::new(vec![Box::new(Note::new())]);
        assert!(group.is_focusable());
    }

    #[test]
    fn test_keys_reach_only_focused_field() {
        let a = Value::new(String::new());
        let c = Value::new(String::new());
        let mut group = Group::new(vec![
            Box::new(Input::new().accessor(a.clone())),
            Box::new(Input::new().accessor(c.clone())),
        ]);
        group.set_positions(0, 1, 0, 0);
        group.activate(false);
        group.update(&Message::new(KeyMsg::from_char('x')));
        assert_eq!(a.get(), "x");
        assert_eq!(c.get(), "");

        group.deactivate();
        group.update(&Message::new(KeyMsg::from_char('y')));
        assert_eq!(a.get(), "x");
    }

    #[test]
    fn test_errors_render_in_footer() {
        let mut group = Group::new(vec![Box::new(
            Input::new().validate(crate::validate::required("Name")),
        )]);
        group.apply_theme(&crate::theme::theme_base());
        group.activate(false);
        group.update(&Message::new(KeyMsg::from_type(KeyType::Enter)));
        assert_eq!(group.errors(), vec!["Name is required"]);
        assert!(strip_ansi(&group.view()).contains("Name is required"));
    }

    #[test]
    fn test_view_is_idempotent() {
        let group = three_with_note();
        assert_eq!(group.view(), group.view());
    }

    #[test]
    fn test_clip_keeps_focus_visible() {
        let body = "0\n1\n2\n3\n4\n5";
        assert_eq!(clip(body, 2, (0, 1)), "0\n1");
        assert_eq!(clip(body, 2, (4, 5)), "3\n4");
        assert_eq!(clip(body, 3, (5, 6)), "3\n4\n5");
        assert_eq!(clip(body, 10, (5, 6)), body);
    }
}
