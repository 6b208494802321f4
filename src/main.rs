use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use thiserror::Error;
use tmenu::{
    error::{LoadError, MenuError},
    logging,
    menu::{Menu, MenuContext, MenuDefinition, MenuItem, Returned},
    settings::Settings,
};

#[derive(Parser, Debug)]
#[clap(version, author, about, name = "tmenu")]
struct Args {
    #[clap(help = "Menu definition to show, json5 or toml. Shows a demo menu if omitted")]
    menu_file: Option<PathBuf>,
    #[clap(long, help = "Settings file to use instead of the default one")]
    settings: Option<PathBuf>,
    #[clap(long, action, help = "Don't show the exit item")]
    no_exit: bool,
    #[clap(short, long, action, help = "Show config path and quit")]
    show_config_path: bool,
    #[clap(short, long, action, help = "Reset config to default and quit")]
    reset_config: bool,
    #[clap(short, long, action, help = "Print collected logs after the menu closes")]
    verbose: bool,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("{0}")]
    Menu(#[from] MenuError),
    #[error("{0}")]
    Load(#[from] LoadError),
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();
    let settings_path = args.settings.clone().unwrap_or_else(Settings::default_path);

    if args.reset_config {
        Settings::reset_config(&settings_path)?;
        return Ok(());
    }

    if args.show_config_path {
        if let Some(s) = settings_path.to_str() {
            println!("{}", s);
        } else {
            println!("{:?}", settings_path);
        }
        return Ok(());
    }

    better_panic::install();

    let level = if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Warn
    };
    if let Err(err) = logging::init(level) {
        eprintln!("Failed to set up logging: {}", err);
    }

    let settings = Settings::load_or_default(&settings_path);
    let ctx = MenuContext::crossterm(&settings);

    let menu = match &args.menu_file {
        Some(path) => MenuDefinition::load(path)?.build(&ctx)?,
        None => demo_menu(&ctx)?,
    };

    let result = menu.show(args.no_exit.then_some(false));

    // the terminal is ours again, safe to print what was logged meanwhile
    let logs = logging::get_logger().drain();
    if args.verbose {
        for message in logs {
            eprintln!("{}", message);
        }
    }

    result?;

    if let Some(value) = menu.returned_value() {
        println!("{}", describe(&value));
    }

    Ok(())
}

fn describe(value: &Returned) -> String {
    if let Some(text) = value.downcast_ref::<String>() {
        text.clone()
    } else if let Some(index) = value.downcast_ref::<usize>() {
        index.to_string()
    } else if let Some(code) = value.downcast_ref::<i32>() {
        format!("exit code {}", code)
    } else {
        "<value>".to_string()
    }
}

fn demo_menu(ctx: &Arc<MenuContext>) -> Result<Menu, MenuError> {
    let menu = Menu::new(ctx, "tmenu", "Move with arrows or digits, Enter selects");

    menu.append_item(MenuItem::value("Say hello", "hello".to_string()))?;
    menu.append_item(MenuItem::try_function("Type something", || {
        println!("Type a line and press Enter:");
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok(line.trim_end().to_string())
    }))?;
    menu.append_item(MenuItem::command(
        "Print working directory",
        if cfg!(windows) { "cd" } else { "pwd" },
        Vec::<String>::new(),
    ))?;

    let colors = Menu::new(ctx, "Colors", "Pick one, its index is returned");
    for (index, color) in ["red", "green", "blue"].into_iter().enumerate() {
        colors.append_item(MenuItem::selection(color, index))?;
    }
    menu.append_item(MenuItem::submenu("Colors", colors))?;

    Ok(menu)
}
