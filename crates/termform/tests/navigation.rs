//! Focus and paging driven through the headless simulator.

use termform::{Form, FormState, Group, Input, MultiSelect, Note, Select, Value, new_options};
use termloop::simulator::ProgramSimulator;
use termloop::style::strip_ansi;
use termloop::{KeyMsg, KeyType};

fn key(kt: KeyType) -> KeyMsg {
    KeyMsg::from_type(kt)
}

fn press(sim: &mut ProgramSimulator<Form>, keys: &[KeyType]) {
    for &k in keys {
        sim.send_key(key(k));
    }
    sim.run_until_empty();
}

fn hardness_form(hardness: &Value<String>, name: &Value<String>) -> Form {
    Form::new(vec![
        Group::new(vec![Box::new(
            Select::new()
                .key("hardness")
                .title("Hardness")
                .options(new_options(["Soft", "Hard"]))
                .validate(|v: &String| (v == "Hard").then(|| "Hard is sold out".to_string()))
                .accessor(hardness.clone()),
        )]),
        Group::new(vec![Box::new(
            Input::new().key("name").title("Name").accessor(name.clone()),
        )]),
    ])
}

#[test]
fn rejected_choice_keeps_group_and_shows_error() {
    let hardness = Value::new(String::new());
    let name = Value::new(String::new());
    let mut sim = ProgramSimulator::new(hardness_form(&hardness, &name));
    sim.init();

    press(&mut sim, &[KeyType::Down, KeyType::Enter]);
    assert_eq!(sim.model().current_group(), 0);
    assert_eq!(sim.model().errors(), vec!["Hard is sold out"]);
    assert!(strip_ansi(sim.last_view().unwrap()).contains("Hard is sold out"));
    assert_eq!(hardness.get(), "");

    press(&mut sim, &[KeyType::Up, KeyType::Enter]);
    assert_eq!(sim.model().current_group(), 1);
    assert!(sim.model().errors().is_empty());
    assert_eq!(hardness.get(), "Soft");
    assert_eq!(sim.model().get_string("hardness"), "Soft");
}

#[test]
fn cursor_moves_alone_never_commit() {
    let hardness = Value::new(String::new());
    let name = Value::new(String::new());
    let mut sim = ProgramSimulator::new(hardness_form(&hardness, &name));
    sim.init();

    press(&mut sim, &[KeyType::Down, KeyType::Up, KeyType::Down]);
    assert_eq!(hardness.get(), "");
}

#[test]
fn note_is_skipped_both_ways() {
    let mut sim = ProgramSimulator::new(Form::new(vec![Group::new(vec![
        Box::new(Input::new().key("first").title("First")),
        Box::new(Note::new().title("Between")),
        Box::new(Input::new().key("third").title("Third")),
    ])]));
    sim.init();
    let current = |sim: &ProgramSimulator<Form>| sim.model().groups()[0].current();

    assert_eq!(current(&sim), 0);
    press(&mut sim, &[KeyType::Tab]);
    assert_eq!(current(&sim), 2);
    press(&mut sim, &[KeyType::ShiftTab]);
    assert_eq!(current(&sim), 0);
}

#[test]
fn typing_writes_through_and_submit_completes() {
    let hardness = Value::new("Soft".to_string());
    let name = Value::new(String::new());
    let mut sim = ProgramSimulator::new(hardness_form(&hardness, &name));
    sim.init();

    press(&mut sim, &[KeyType::Enter]);
    assert_eq!(sim.model().current_group(), 1);
    for c in "Ada".chars() {
        sim.send_key(KeyMsg::from_char(c));
    }
    sim.run_until_empty();
    assert_eq!(name.get(), "Ada");

    press(&mut sim, &[KeyType::Enter]);
    assert!(sim.is_quit());
    assert_eq!(sim.model().state(), FormState::Completed);
}

#[test]
fn shift_tab_returns_to_previous_group_last_field() {
    let mut sim = ProgramSimulator::new(Form::new(vec![
        Group::new(vec![
            Box::new(Input::new().key("a")),
            Box::new(Input::new().key("b")),
        ]),
        Group::new(vec![Box::new(Input::new().key("c"))]),
    ]));
    sim.init();

    press(&mut sim, &[KeyType::Tab, KeyType::Tab]);
    assert_eq!(sim.model().current_group(), 1);
    press(&mut sim, &[KeyType::ShiftTab]);
    assert_eq!(sim.model().current_group(), 0);
    assert_eq!(sim.model().groups()[0].current(), 1);
}

#[test]
fn interrupt_aborts_and_keeps_committed_values() {
    let hardness = Value::new(String::new());
    let name = Value::new(String::new());
    let mut sim = ProgramSimulator::new(hardness_form(&hardness, &name));
    sim.init();

    press(&mut sim, &[KeyType::Enter]);
    sim.send(termloop::Message::new(termloop::InterruptMsg));
    sim.run_until_empty();
    assert!(sim.is_quit());
    assert_eq!(sim.model().state(), FormState::Aborted);
    assert_eq!(hardness.get(), "Soft");
}

fn sizes(size: &Value<String>) -> Select<String> {
    Select::new()
        .key("size")
        .title("Size")
        .options(new_options(["Small", "Medium", "Large"]))
        .accessor(size.clone())
}

#[test]
fn preset_choice_can_be_changed() {
    let size = Value::new("Small".to_string());
    let mut sim = ProgramSimulator::new(Form::new(vec![Group::new(vec![Box::new(sizes(&size))])]));
    sim.init();

    press(&mut sim, &[KeyType::Down]);
    assert_eq!(size.get(), "Small");
    assert!(strip_ansi(sim.last_view().unwrap()).contains("> Medium"));

    press(&mut sim, &[KeyType::Enter]);
    assert_eq!(size.get(), "Medium");
    assert_eq!(sim.model().state(), FormState::Completed);
}

#[test]
fn returning_to_a_committed_choice_and_changing_it() {
    let size = Value::new(String::new());
    let mut sim = ProgramSimulator::new(Form::new(vec![
        Group::new(vec![Box::new(sizes(&size))]),
        Group::new(vec![Box::new(Input::new().key("name"))]),
    ]));
    sim.init();

    press(&mut sim, &[KeyType::Enter]);
    assert_eq!(size.get(), "Small");
    assert_eq!(sim.model().current_group(), 1);

    press(&mut sim, &[KeyType::ShiftTab]);
    assert_eq!(sim.model().current_group(), 0);
    press(&mut sim, &[KeyType::Down, KeyType::Down]);
    assert_eq!(size.get(), "Small");

    press(&mut sim, &[KeyType::Enter]);
    assert_eq!(size.get(), "Large");
    assert_eq!(sim.model().current_group(), 1);
}

#[test]
fn preset_selection_can_be_changed() {
    let extras = Value::new(vec!["Cheese".to_string()]);
    let mut sim = ProgramSimulator::new(Form::new(vec![Group::new(vec![Box::new(
        MultiSelect::new()
            .key("extras")
            .options(new_options(["Cheese", "Bacon", "Onion"]))
            .accessor(extras.clone()),
    )])]));
    sim.init();

    sim.send_key(key(KeyType::Down));
    sim.send_key(KeyMsg::from_char('x'));
    sim.send_key(key(KeyType::Up));
    sim.send_key(KeyMsg::from_char('x'));
    sim.run_until_empty();
    assert_eq!(extras.get(), vec!["Cheese".to_string()]);

    press(&mut sim, &[KeyType::Enter]);
    assert_eq!(extras.get(), vec!["Bacon".to_string()]);
    assert_eq!(sim.model().get_strings("extras"), vec!["Bacon".to_string()]);
}
