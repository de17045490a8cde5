//! Accessible mode: the whole form as line-oriented prompts.

use std::io::{self, Cursor};
use std::sync::{Arc, Mutex};

use termform::{
    Confirm, Form, FormError, FormState, Group, Input, MultiSelect, Note, Select, Value,
    new_options,
};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

#[test]
fn whole_form_runs_as_prompts() {
    let name = Value::new(String::new());
    let size = Value::new(String::new());
    let extras = Value::new(Vec::<String>::new());
    let ok = Value::new(false);

    let form = Form::new(vec![
        Group::new(vec![
            Box::new(Note::new().title("Burger order")),
            Box::new(
                Input::new()
                    .title("Name")
                    .validate(termform::validate::required("Name"))
                    .accessor(name.clone()),
            ),
        ]),
        Group::new(vec![
            Box::new(
                Select::new()
                    .title("Size")
                    .options(new_options(["Small", "Large"]))
                    .accessor(size.clone()),
            ),
            Box::new(
                MultiSelect::new()
                    .title("Extras")
                    .options(new_options(["Cheese", "Bacon"]))
                    .accessor(extras.clone()),
            ),
            Box::new(Confirm::new().title("Place order?").accessor(ok.clone())),
        ]),
    ]);

    let out = SharedBuf::default();
    let mut form = form
        .accessible(true)
        .input(Cursor::new(b"\nAda\n2\n2\n0\ny\n".to_vec()))
        .output(out.clone());
    form.run().unwrap();

    assert_eq!(form.state(), FormState::Completed);
    assert_eq!(name.get(), "Ada");
    assert_eq!(size.get(), "Large");
    assert_eq!(extras.get(), vec!["Bacon".to_string()]);
    assert!(ok.get());

    let text = out.text();
    assert!(text.contains("Burger order"));
    assert!(text.contains("Name is required"));
}

#[test]
fn hidden_groups_are_skipped_by_earlier_answers() {
    let wants_drink = Value::new(false);
    let drink = Value::new(String::new());
    let w = wants_drink.clone();

    let mut form = Form::new(vec![
        Group::new(vec![Box::new(
            Confirm::new().title("Drink?").accessor(wants_drink.clone()),
        )]),
        Group::new(vec![Box::new(Input::new().title("Which?").accessor(drink.clone()))])
            .hide_func(move || !w.get()),
    ]);

    let mut out = Vec::new();
    let mut input: &[u8] = b"n\n";
    form.run_accessible(&mut out, &mut input).unwrap();
    assert!(!wants_drink.get());
    assert!(!String::from_utf8(out).unwrap().contains("Which?"));
}

#[test]
fn running_out_of_answers_is_an_io_error() {
    let mut form = Form::new(vec![Group::new(vec![Box::new(Input::new().title("Name"))])]);
    let mut out = Vec::new();
    let mut input: &[u8] = b"";
    let err = form.run_accessible(&mut out, &mut input).unwrap_err();
    assert!(matches!(err, FormError::Io(_)));
    assert!(!err.is_recoverable());
}
