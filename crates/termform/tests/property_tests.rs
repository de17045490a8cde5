#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]

//! Property-based tests for focus traversal and paging.

use proptest::prelude::*;
use termform::field::{NextGroupMsg, PrevGroupMsg};
use termform::{Field, Form, FormState, Group, Input, Note};
use termloop::simulator::ProgramSimulator;
use termloop::{Cmd, KeyMsg, KeyType, Model};

fn group_from(pattern: &[bool]) -> Group {
    let fields: Vec<Box<dyn Field>> = pattern
        .iter()
        .map(|&skip| -> Box<dyn Field> {
            if skip {
                Box::new(Note::new().title("note"))
            } else {
                Box::new(Input::new())
            }
        })
        .collect();
    Group::new(fields)
}

fn asks_for<T: Send + 'static>(cmd: Option<Cmd>) -> bool {
    cmd.map(Cmd::into_messages)
        .unwrap_or_default()
        .iter()
        .any(|m| m.is::<T>())
}

proptest! {
    #[test]
    fn forward_traversal_visits_focusable_fields_in_order(
        pattern in prop::collection::vec(any::<bool>(), 2..10)
    ) {
        let expected: Vec<usize> = (0..pattern.len()).filter(|&i| !pattern[i]).collect();
        prop_assume!(!expected.is_empty());

        let mut group = group_from(&pattern);
        group.init();
        group.activate(false);

        let mut visited = vec![group.current()];
        loop {
            let cmd = group.next_field();
            if asks_for::<NextGroupMsg>(cmd) {
                break;
            }
            visited.push(group.current());
            prop_assert!(visited.len() <= pattern.len());
        }
        prop_assert_eq!(visited, expected);
    }

    #[test]
    fn backward_traversal_mirrors_forward(
        pattern in prop::collection::vec(any::<bool>(), 2..10)
    ) {
        let mut expected: Vec<usize> = (0..pattern.len()).filter(|&i| !pattern[i]).collect();
        prop_assume!(!expected.is_empty());
        expected.reverse();

        let mut group = group_from(&pattern);
        group.init();
        group.activate(true);

        let mut visited = vec![group.current()];
        loop {
            let cmd = group.prev_field();
            if asks_for::<PrevGroupMsg>(cmd) {
                break;
            }
            visited.push(group.current());
            prop_assert!(visited.len() <= pattern.len());
        }
        prop_assert_eq!(visited, expected);
    }

    #[test]
    fn all_skippable_group_pages_on_immediately(len in 2usize..8) {
        let mut group = group_from(&vec![true; len]);
        group.init();
        group.activate(false);
        prop_assert!(!group.is_focusable());
        prop_assert!(asks_for::<NextGroupMsg>(group.next_field()));
    }

    #[test]
    fn entering_through_visible_pages_completes(hidden in prop::collection::vec(any::<bool>(), 1..6)) {
        let groups = hidden
            .iter()
            .map(|&h| Group::new(vec![Box::new(Input::new()) as Box<dyn Field>]).hide(h))
            .collect();
        let visible = hidden.iter().filter(|&&h| !h).count();

        let mut sim = ProgramSimulator::new(Form::new(groups));
        sim.init();
        sim.run_until_empty();
        for _ in 0..visible {
            prop_assert!(!sim.is_quit());
            prop_assert!(!sim.model().groups()[sim.model().current_group()].is_hidden());
            sim.send_key(KeyMsg::from_type(KeyType::Enter));
            sim.run_until_empty();
        }
        prop_assert!(sim.is_quit());
        prop_assert_eq!(sim.model().state(), FormState::Completed);
    }

    #[test]
    fn view_is_stable_without_input(titles in prop::collection::vec("[a-z]{1,8}", 1..4)) {
        let groups = titles
            .iter()
            .map(|t| Group::new(vec![Box::new(Input::new().title(t.clone())) as Box<dyn Field>]))
            .collect();
        let mut form = Form::new(groups);
        form.init();
        let first = form.view();
        prop_assert_eq!(&first, &form.view());
        prop_assert!(termloop::style::strip_ansi(&first).contains(titles[0].as_str()));
    }
}
