use crossterm::style::{Attribute, Attributes, ContentStyle};
use serde::{de::Error, Deserialize};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(debug_assertions, serde(deny_unknown_fields))]
pub struct Style {
    #[serde(default)]
    pub fg: Option<Color>,
    #[serde(default)]
    pub bg: Option<Color>,
    #[serde(skip)]
    pub attr: Attributes,
}

impl Style {
    pub fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            ..Self::default()
        }
    }

    pub fn bg(color: Color) -> Self {
        Self {
            bg: Some(color),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, attr: Attribute) -> Self {
        self.attr.set(attr);
        self
    }

    pub fn to_cross(self) -> ContentStyle {
        self.into()
    }
}

impl From<Style> for ContentStyle {
    fn from(value: Style) -> Self {
        ContentStyle {
            foreground_color: value.fg.map(|c| c.into()),
            background_color: value.bg.map(|c| c.into()),
            attributes: value.attr,
            ..ContentStyle::default()
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Named(NamedColor),
    #[serde(deserialize_with = "deserialize_hex")]
    Hex(u8, u8, u8),
}

impl From<Color> for crossterm::style::Color {
    fn from(value: Color) -> Self {
        match value {
            Color::Named(named) => named.into(),
            Color::Hex(r, g, b) => crossterm::style::Color::Rgb { r, g, b },
        }
    }
}

fn deserialize_hex<'de, D>(deserializer: D) -> Result<(u8, u8, u8), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let invalid = || {
        D::Error::custom(format!(
            "invalid hex color, expected format `#RGB` or `#RRGGBB`: {:?}",
            s
        ))
    };

    let Some(digits) = s.strip_prefix('#') else {
        return Err(invalid());
    };
    if !digits.is_ascii() {
        return Err(invalid());
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(D::Error::custom)
    };

    match digits.len() {
        6 => Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok((channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17)),
        _ => Err(invalid()),
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    DarkGrey,
    Red,
    DarkRed,
    Green,
    DarkGreen,
    Yellow,
    DarkYellow,
    Blue,
    DarkBlue,
    Magenta,
    DarkMagenta,
    Cyan,
    DarkCyan,
    White,
    Grey,
}

impl From<NamedColor> for crossterm::style::Color {
    fn from(value: NamedColor) -> Self {
        use crossterm::style::Color as C;
        match value {
            NamedColor::Black => C::Black,
            NamedColor::DarkGrey => C::DarkGrey,
            NamedColor::Red => C::Red,
            NamedColor::DarkRed => C::DarkRed,
            NamedColor::Green => C::Green,
            NamedColor::DarkGreen => C::DarkGreen,
            NamedColor::Yellow => C::Yellow,
            NamedColor::DarkYellow => C::DarkYellow,
            NamedColor::Blue => C::Blue,
            NamedColor::DarkBlue => C::DarkBlue,
            NamedColor::Magenta => C::Magenta,
            NamedColor::DarkMagenta => C::DarkMagenta,
            NamedColor::Cyan => C::Cyan,
            NamedColor::DarkCyan => C::DarkCyan,
            NamedColor::White => C::White,
            NamedColor::Grey => C::Grey,
        }
    }
}

/// The two color attributes a menu draws with, plus the text emphasis
/// derived from them for the title and subtitle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuStyles {
    pub normal: Style,
    pub highlight: Style,
}

impl MenuStyles {
    pub fn title(&self) -> Style {
        self.normal.with_attribute(Attribute::Reverse)
    }

    pub fn subtitle(&self) -> Style {
        self.normal.with_attribute(Attribute::Bold)
    }

    pub fn item(&self, highlighted: bool) -> Style {
        if highlighted {
            self.highlight
        } else {
            self.normal
        }
    }
}

impl Default for MenuStyles {
    fn default() -> Self {
        Self {
            normal: Style::default(),
            highlight: Style {
                fg: Some(Color::Named(NamedColor::Black)),
                bg: Some(Color::Named(NamedColor::White)),
                attr: Attributes::default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_color() {
        assert_eq!(json5::from_str(r##""#FF0000""##), Ok(Color::Hex(255, 0, 0)));
        assert_eq!(json5::from_str(r##""#F00""##), Ok(Color::Hex(255, 0, 0)));
        assert_eq!(
            json5::from_str::<Color>(r##""#123""##),
            json5::from_str(r##""#112233""##)
        );
        assert_eq!(
            json5::from_str(r#""dark_grey""#),
            Ok(Color::Named(NamedColor::DarkGrey))
        );
        assert!(json5::from_str::<Color>(r###""##23""###).is_err());
        assert!(json5::from_str::<Color>(r###""123""###).is_err());
        assert!(json5::from_str::<Color>(r###""#12""###).is_err());
        assert!(json5::from_str::<Color>(r###""#1234""###).is_err());
    }

    #[test]
    fn title_and_subtitle_keep_normal_colors() {
        let styles = MenuStyles {
            normal: Style::fg(Color::Named(NamedColor::Green)),
            ..MenuStyles::default()
        };

        assert_eq!(styles.title().fg, Some(Color::Named(NamedColor::Green)));
        assert!(styles.title().attr.has(Attribute::Reverse));
        assert!(styles.subtitle().attr.has(Attribute::Bold));
        assert_eq!(styles.item(true), styles.highlight);
        assert_eq!(styles.item(false), styles.normal);
    }
}
