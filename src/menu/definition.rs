use std::{path::Path, sync::Arc};

use serde::Deserialize;

use crate::{
    error::{LoadError, MenuError},
    settings::load_by_path,
};

use super::{Menu, MenuContext, MenuItem};

/// Menu tree as written in a json5 or toml file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(debug_assertions, serde(deny_unknown_fields))]
pub struct MenuDefinition {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub show_exit_option: Option<bool>,
    #[serde(default)]
    pub items: Vec<ItemDefinition>,
}

/// One entry of a [`MenuDefinition`]. `items` makes it a submenu, then
/// `command`, then `value`, otherwise it is a plain item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[cfg_attr(debug_assertions, serde(deny_unknown_fields))]
pub struct ItemDefinition {
    pub text: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub items: Option<Vec<ItemDefinition>>,
}

impl MenuDefinition {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        log::debug!("Loading menu from {:?}", path);
        load_by_path(path)
    }

    pub fn build(&self, ctx: &Arc<MenuContext>) -> Result<Menu, MenuError> {
        build_menu(
            ctx,
            &self.title,
            &self.subtitle,
            self.show_exit_option,
            &self.items,
        )
    }
}

impl ItemDefinition {
    pub fn build(&self, ctx: &Arc<MenuContext>) -> Result<MenuItem, MenuError> {
        let item = if let Some(items) = &self.items {
            let submenu = build_menu(ctx, &self.text, &self.subtitle, None, items)?;
            MenuItem::submenu(&self.text, submenu)
        } else if let Some(command) = &self.command {
            MenuItem::command(&self.text, command, &self.args)
        } else if let Some(value) = &self.value {
            MenuItem::value(&self.text, value.clone())
        } else {
            MenuItem::new(&self.text)
        };

        Ok(item.terminating(self.exit))
    }
}

fn build_menu(
    ctx: &Arc<MenuContext>,
    title: &str,
    subtitle: &str,
    show_exit_option: Option<bool>,
    items: &[ItemDefinition],
) -> Result<Menu, MenuError> {
    let menu = Menu::new(ctx, title, subtitle);
    if let Some(show) = show_exit_option {
        menu.set_show_exit_option(show);
    }
    for item in items {
        menu.append_item(item.build(ctx)?)?;
    }
    Ok(menu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dims::Dims,
        menu::ItemKind,
        settings::parse_by_extension,
        terminal::Key,
    };

    const JSON: &str = r#"{
        // trailing commas and comments are fine
        title: "Tools",
        subtitle: "pick a tool",
        items: [
            { text: "List", command: "ls", args: ["-l", "-a"] },
            { text: "Answer", value: "42", exit: true },
            {
                text: "More",
                subtitle: "nested",
                items: [{ text: "Nothing" }],
            },
        ],
    }"#;

    #[test]
    fn parses_json5() {
        let def: MenuDefinition = parse_by_extension(Path::new("menu.json5"), JSON).unwrap();

        assert_eq!(def.title, "Tools");
        assert_eq!(def.items.len(), 3);
        assert_eq!(def.items[0].args, ["-l", "-a"]);
        assert!(def.items[1].exit);
        assert_eq!(def.items[2].items.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn parses_toml() {
        let content = r#"
            title = "Tools"
            show_exit_option = false

            [[items]]
            text = "Echo"
            command = "echo"
            args = ["hi"]
        "#;
        let def: MenuDefinition = parse_by_extension(Path::new("menu.toml"), content).unwrap();

        assert_eq!(def.subtitle, "");
        assert_eq!(def.show_exit_option, Some(false));
        assert_eq!(def.items[0].command.as_deref(), Some("echo"));
    }

    #[test]
    fn builds_menu_tree() {
        let (ctx, _) = MenuContext::headless(Dims(40, 20));
        let def: MenuDefinition = parse_by_extension(Path::new("menu.json5"), JSON).unwrap();
        let menu = def.build(&ctx).unwrap();

        assert_eq!(menu.title(), "Tools");
        let items = menu.items();
        assert_eq!(items.len(), 3);
        assert!(matches!(
            items[0].kind(),
            ItemKind::Command { command, arguments } if command == "ls" && arguments.len() == 2
        ));
        assert!(items[1].terminates_menu());

        let ItemKind::Submenu(submenu) = items[2].kind() else {
            panic!("expected a submenu, got {:?}", items[2].kind());
        };
        assert_eq!(submenu.title(), "More");
        assert_eq!(submenu.subtitle(), "nested");
        assert_eq!(submenu.parent(), Some(menu.clone()));
    }

    #[test]
    fn value_item_ends_menu_with_its_value() {
        let (ctx, term) = MenuContext::headless(Dims(40, 20));
        let def: MenuDefinition = parse_by_extension(Path::new("menu.json5"), JSON).unwrap();
        let menu = def.build(&ctx).unwrap();

        term.press_all([Key::Char('2'), Key::Enter]);
        menu.show(None).unwrap();

        assert_eq!(menu.returned_as::<String>().as_deref(), Some("42"));
    }
}
