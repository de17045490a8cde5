//! # Burger
//!
//! A multi-page order form exercising every field type.
//!
//! ```bash
//! cargo run -p termform --example burger
//! cargo run -p termform --example burger -- --accessible
//! cargo run -p termform --example burger -- --layout columns --timeout 60000
//! RUST_LOG=termform=debug cargo run -p termform --example burger 2>trace.log
//! ```

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use termform::{
    Confirm, Form, FormConfig, FormError, Group, Input, LayoutKind, MultiSelect, Note, Select,
    SelectOption, Text, ThemeName, Value, new_options, validate,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "burger", about = "Order a burger from the terminal")]
struct Cli {
    /// Ask questions line by line instead of drawing the form
    #[arg(long, env = "ACCESSIBLE")]
    accessible: bool,

    /// How pages are arranged on screen
    #[arg(long, value_enum, default_value = "default")]
    layout: LayoutArg,

    /// Theme preset: base, charm, dracula or base16
    #[arg(long, env = "TERMFORM_THEME")]
    theme: Option<String>,

    /// Give up after this many milliseconds (0 waits forever)
    #[arg(long, default_value_t = 0)]
    timeout: u64,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum LayoutArg {
    Default,
    Stack,
    Columns,
    Grid,
}

impl From<LayoutArg> for LayoutKind {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Default => Self::Default,
            LayoutArg::Stack => Self::Stack,
            LayoutArg::Columns => Self::Columns { columns: 2 },
            LayoutArg::Grid => Self::Grid { rows: 2, columns: 2 },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
enum Spice {
    #[default]
    Mild,
    Medium,
    Hot,
}

#[derive(Default)]
struct Order {
    bun: Value<String>,
    patty: Value<String>,
    spice: Value<Spice>,
    toppings: Value<Vec<String>>,
    sauces: Value<Vec<String>>,
    name: Value<String>,
    instructions: Value<String>,
    discount: Value<bool>,
}

fn build_form(order: &Order) -> Form {
    let patty = order.patty.clone();
    let name = order.name.clone();

    Form::new(vec![
        Group::new(vec![
            Box::new(
                Note::new()
                    .title("Charmburger")
                    .description("Welcome to _Charmburger™_.\n\nHow may we take your order?")
                    .next(true),
            ),
        ]),
        Group::new(vec![
            Box::new(
                Select::new()
                    .key("bun")
                    .title("Choose your bun")
                    .options(new_options(["Sesame", "Brioche", "Pretzel", "Lettuce wrap"]))
                    .accessor(order.bun.clone()),
            ),
            Box::new(
                Select::new()
                    .key("patty")
                    .title("Choose your patty")
                    .options(new_options(["Beef", "Chicken", "Black bean", "Halloumi"]))
                    .validate(|p: &String| {
                        (p == "Halloumi").then(|| "sorry, we're out of halloumi".to_string())
                    })
                    .accessor(order.patty.clone()),
            ),
            Box::new(
                Select::new()
                    .key("spice")
                    .title("Spice level")
                    .options(vec![
                        SelectOption::new("Mild", Spice::Mild),
                        SelectOption::new("Medium", Spice::Medium),
                        SelectOption::new("Hot", Spice::Hot),
                    ])
                    .inline(true)
                    .accessor(order.spice.clone()),
            ),
        ]),
        Group::new(vec![
            Box::new(
                MultiSelect::new()
                    .key("toppings")
                    .title_func(
                        move || match patty.get().as_str() {
                            "" => "Toppings".to_string(),
                            p => format!("Toppings for your {p} burger"),
                        },
                        order.patty.clone(),
                    )
                    .description("Choose up to 4.")
                    .options(new_options(["Lettuce", "Tomatoes", "Jalapeños", "Cheese", "Onions"]))
                    .limit(4)
                    .accessor(order.toppings.clone()),
            ),
            Box::new(
                MultiSelect::new()
                    .key("sauces")
                    .title("Sauces")
                    .options(new_options(["Ketchup", "Mustard", "Mayo", "Chipotle"]))
                    .validate(|s: &Vec<String>| {
                        s.is_empty().then(|| "pick at least one sauce".to_string())
                    })
                    .accessor(order.sauces.clone()),
            ),
        ]),
        Group::new(vec![
            Box::new(
                Input::new()
                    .key("name")
                    .title("What's your name?")
                    .placeholder("Ada")
                    .validate(validate::required("name"))
                    .accessor(order.name.clone()),
            ),
            Box::new(
                Text::new()
                    .key("instructions")
                    .title("Special instructions")
                    .placeholder("Just put it in the mailbox please")
                    .char_limit(400)
                    .lines(4)
                    .accessor(order.instructions.clone()),
            ),
            Box::new(
                Confirm::new()
                    .key("discount")
                    .title_func(
                        move || match name.get().trim() {
                            "" => "Would you like 15% off?".to_string(),
                            n => format!("{n}, would you like 15% off?"),
                        },
                        order.name.clone(),
                    )
                    .affirmative("Yes!")
                    .negative("No.")
                    .accessor(order.discount.clone()),
            ),
        ]),
    ])
}

fn config_from(cli: &Cli) -> anyhow::Result<FormConfig> {
    let mut config = FormConfig::from_env()?;
    config.accessible |= cli.accessible;
    config.layout = cli.layout.into();
    config.timeout_ms = cli.timeout;
    if let Some(name) = &cli.theme {
        config.theme =
            ThemeName::parse(name).ok_or_else(|| anyhow::anyhow!("unknown theme {name:?}"))?;
    }
    Ok(config)
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Computations that panic are recovered by the form; keep their messages
    // off the screen it is drawing.
    std::panic::set_hook(Box::new(|info| {
        tracing::warn!(%info, "computation panicked");
    }));

    let cli = Cli::parse();
    let config = config_from(&cli)?;
    tracing::debug!(?config, "starting order form");

    let order = Order::default();
    let mut form = build_form(&order).with_config(&config);

    match form.run() {
        Ok(()) => {}
        Err(FormError::UserAborted) => {
            println!("Order cancelled.");
            return Ok(ExitCode::from(130));
        }
        Err(FormError::Timeout) => {
            println!("Took too long, the kitchen closed.");
            return Ok(ExitCode::from(124));
        }
        Err(e) => return Err(e.into()),
    }

    let toppings = order.toppings.get();
    println!("A {} {} burger", order.bun.get(), order.patty.get());
    println!("Spice: {:?}", order.spice.get());
    if !toppings.is_empty() {
        println!("Toppings: {}", toppings.join(", "));
    }
    println!("Sauces: {}", order.sauces.get().join(", "));
    let instructions = order.instructions.get();
    if !instructions.is_empty() {
        println!("Notes: {instructions}");
    }
    println!(
        "Thanks for your order, {}!{}",
        order.name.get(),
        if order.discount.get() { " Enjoy 15% off." } else { "" }
    );
    Ok(ExitCode::SUCCESS)
}
