#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Termform
//!
//! Interactive multi-page forms and prompts for the terminal.
//!
//! A [`Form`] is a sequence of [`Group`]s, each a page of fields. Fields
//! write their answers into caller-owned [`Value`] handles:
//!
//! - [`Input`] and [`Text`] for free text, [`Confirm`] for yes/no; these
//!   store every edit as it happens
//! - [`Select`], [`MultiSelect`] and [`Table`] for choices; these store the
//!   choice only once the user confirms it
//! - [`Note`] for static text
//!
//! Titles, descriptions, placeholders and option lists can be computed from
//! other answers with `*_func(f, bindings)`. The computation runs off the
//! event loop and is cached per bindings fingerprint; see [`Eval`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use termform::{Confirm, Form, Group, Input, Select, Value, new_options};
//!
//! let name = Value::new(String::new());
//! let color = Value::new(String::new());
//! let sure = Value::new(false);
//!
//! let mut form = Form::new(vec![
//!     Group::new(vec![
//!         Box::new(Input::new()
//!             .key("name")
//!             .title("What's your name?")
//!             .accessor(name.clone())),
//!         Box::new(Select::new()
//!             .key("color")
//!             .title("Favorite color?")
//!             .options(new_options(["Red", "Green", "Blue"]))
//!             .accessor(color.clone())),
//!     ]),
//!     Group::new(vec![
//!         Box::new(Confirm::new()
//!             .key("confirm")
//!             .title("Are you sure?")
//!             .accessor(sure.clone())),
//!     ]),
//! ]);
//!
//! form.run()?;
//! println!("Name: {}, Color: {}, Confirmed: {}", name.get(), color.get(), sure.get());
//! ```

pub mod accessible;
pub mod accessor;
pub mod config;
pub mod error;
pub mod eval;
pub mod field;
pub mod form;
pub mod group;
pub mod keymap;
pub mod layout;
pub mod theme;
pub mod validate;

pub use accessor::{Accessor, EmbeddedAccessor, Value};
pub use config::{FormConfig, LayoutKind};
pub use error::{FormError, Result};
pub use eval::{Bindings, BindingsFn, Eval, EvalTarget};
pub use field::{
    Confirm, EchoMode, Field, FieldPosition, Input, MultiSelect, Note, Select, SelectOption, Table,
    Text, new_options,
};
pub use form::{Form, FormState};
pub use group::Group;
pub use keymap::KeyMap;
pub use layout::Layout;
pub use theme::{Theme, ThemeName};
