//! Color themes, diff tint styles and user theme files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ratatui::style::Color;
use serde::Deserialize;

pub use crate::core::DiffStyle;
use crate::highlight::StyleId;

/// Every color used by the static printer and the interactive viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Theme {
    // Diff line backgrounds
    pub deleted_bg: Color,
    pub added_bg: Color,
    pub unchanged_bg: Color,
    pub stripe_bg: Color,

    // Diff line text
    pub deleted_fg: Color,
    pub added_fg: Color,
    pub unchanged_fg: Color,

    // Intraline changes
    pub inline_deleted_bg: Color,
    pub inline_added_bg: Color,
    pub inline_deleted_fg: Color,
    pub inline_added_fg: Color,

    // Gutter
    pub line_num_deleted: Color,
    pub line_num_added: Color,
    pub line_num_unchanged: Color,

    // File headers and hunk gaps
    pub file_header_bg: Color,
    pub file_header_fg: Color,
    pub separator: Color,

    // Chrome
    pub bg: Color,
    pub bg_surface: Color,
    pub bg_selected: Color,
    pub border: Color,
    pub border_active: Color,
    pub text_muted: Color,
    pub text_normal: Color,
    pub text_bright: Color,
    pub accent: Color,
    pub success: Color,
    pub error: Color,
    pub warning: Color,

    // Syntax
    pub syn_keyword: Color,
    pub syn_type: Color,
    pub syn_function: Color,
    pub syn_string: Color,
    pub syn_number: Color,
    pub syn_comment: Color,
    pub syn_operator: Color,
    pub syn_punctuation: Color,
    pub syn_constant: Color,
    pub syn_property: Color,
    pub syn_attribute: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::builtin_default()
    }
}

/// Names of the themes compiled into the binary.
pub const BUILTIN_THEMES: [&str; 5] = ["default", "catppuccin", "dracula", "gruvbox", "nord"];

impl Theme {
    /// Theme by name: a user theme file wins over a built-in of the same
    /// name. Unknown names fall back to the default theme.
    pub fn load(name: &str) -> Self {
        if let Some(theme) = load_user_theme(name) {
            return theme;
        }
        Self::builtin(name).unwrap_or_else(Self::builtin_default)
    }

    /// Built-in theme by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Some(Self::builtin_default()),
            "catppuccin" => Some(Self::catppuccin()),
            "dracula" => Some(Self::dracula()),
            "gruvbox" => Some(Self::gruvbox()),
            "nord" => Some(Self::nord()),
            _ => None,
        }
    }

    /// Built-in and user theme names, sorted.
    pub fn list() -> Vec<String> {
        list_in(user_themes_dir().as_deref())
    }

    /// Retint changed lines for a [`DiffStyle`].
    pub fn with_style(mut self, style: DiffStyle) -> Self {
        match style {
            DiffStyle::Default => {}
            DiffStyle::Patch => {
                self.deleted_bg = Color::Reset;
                self.added_bg = Color::Reset;
                self.stripe_bg = Color::Reset;
            }
            DiffStyle::Filled => {
                self.deleted_bg = self.inline_deleted_bg;
                self.added_bg = self.inline_added_bg;
                self.inline_deleted_bg = lighten(self.inline_deleted_bg, 40);
                self.inline_added_bg = lighten(self.inline_added_bg, 40);
            }
        }
        self
    }

    /// Replace the added/deleted text colors with `#rrggbb` values.
    /// Values that do not parse are ignored.
    pub fn with_overrides(mut self, added: Option<&str>, deleted: Option<&str>) -> Self {
        if let Some(color) = added.and_then(parse_hex) {
            self.added_fg = color;
        }
        if let Some(color) = deleted.and_then(parse_hex) {
            self.deleted_fg = color;
        }
        self
    }

    /// Foreground for a syntax token class. `None` for plain text, which
    /// keeps the line's own foreground.
    pub fn syntax_color(&self, style: StyleId) -> Option<Color> {
        match style {
            StyleId::Default | StyleId::Variable => None,
            StyleId::Keyword => Some(self.syn_keyword),
            StyleId::Type => Some(self.syn_type),
            StyleId::Function => Some(self.syn_function),
            StyleId::String => Some(self.syn_string),
            StyleId::Number => Some(self.syn_number),
            StyleId::Comment => Some(self.syn_comment),
            StyleId::Operator => Some(self.syn_operator),
            StyleId::Punctuation => Some(self.syn_punctuation),
            StyleId::Constant => Some(self.syn_constant),
            StyleId::Property => Some(self.syn_property),
            StyleId::Attribute => Some(self.syn_attribute),
        }
    }

    /// Dark default with muted red/green tints.
    pub fn builtin_default() -> Self {
        Self {
            deleted_bg: Color::Rgb(58, 32, 32),
            added_bg: Color::Rgb(32, 58, 32),
            unchanged_bg: Color::Reset,
            stripe_bg: Color::Rgb(26, 26, 26),

            deleted_fg: Color::Rgb(200, 107, 107),
            added_fg: Color::Rgb(107, 200, 107),
            unchanged_fg: Color::Rgb(160, 160, 160),

            inline_deleted_bg: Color::Rgb(107, 44, 44),
            inline_added_bg: Color::Rgb(44, 107, 44),
            inline_deleted_fg: Color::Rgb(255, 238, 238),
            inline_added_fg: Color::Rgb(238, 255, 238),

            line_num_deleted: Color::Rgb(122, 95, 95),
            line_num_added: Color::Rgb(95, 122, 95),
            line_num_unchanged: Color::Rgb(74, 74, 74),

            file_header_bg: Color::Rgb(42, 42, 42),
            file_header_fg: Color::Rgb(208, 208, 208),
            separator: Color::Rgb(85, 85, 85),

            bg: Color::Rgb(18, 18, 18),
            bg_surface: Color::Rgb(26, 26, 26),
            bg_selected: Color::Rgb(50, 50, 58),
            border: Color::Rgb(51, 51, 51),
            border_active: Color::Rgb(95, 175, 215),
            text_muted: Color::Rgb(110, 110, 110),
            text_normal: Color::Rgb(190, 190, 190),
            text_bright: Color::Rgb(235, 235, 235),
            accent: Color::Rgb(95, 175, 215),
            success: Color::Rgb(107, 200, 107),
            error: Color::Rgb(215, 95, 95),
            warning: Color::Rgb(215, 175, 95),

            syn_keyword: Color::Rgb(198, 120, 221),
            syn_type: Color::Rgb(229, 192, 123),
            syn_function: Color::Rgb(97, 175, 239),
            syn_string: Color::Rgb(152, 195, 121),
            syn_number: Color::Rgb(209, 154, 102),
            syn_comment: Color::Rgb(110, 115, 125),
            syn_operator: Color::Rgb(171, 178, 191),
            syn_punctuation: Color::Rgb(130, 130, 140),
            syn_constant: Color::Rgb(86, 182, 194),
            syn_property: Color::Rgb(224, 108, 117),
            syn_attribute: Color::Rgb(229, 192, 123),
        }
    }

    /// Catppuccin Mocha.
    pub fn catppuccin() -> Self {
        Self {
            deleted_bg: Color::Rgb(60, 36, 48),
            added_bg: Color::Rgb(36, 60, 48),
            stripe_bg: Color::Rgb(36, 39, 58),
            deleted_fg: Color::Rgb(243, 139, 168),
            added_fg: Color::Rgb(166, 227, 161),
            unchanged_fg: Color::Rgb(186, 194, 222),
            inline_deleted_bg: Color::Rgb(110, 54, 72),
            inline_added_bg: Color::Rgb(54, 110, 72),
            line_num_deleted: Color::Rgb(150, 100, 120),
            line_num_added: Color::Rgb(100, 150, 120),
            line_num_unchanged: Color::Rgb(88, 91, 112),
            file_header_bg: Color::Rgb(49, 50, 68),
            file_header_fg: Color::Rgb(205, 214, 244),
            separator: Color::Rgb(108, 112, 134),
            bg: Color::Rgb(30, 30, 46),
            bg_surface: Color::Rgb(36, 39, 58),
            bg_selected: Color::Rgb(69, 71, 90),
            border: Color::Rgb(69, 71, 90),
            border_active: Color::Rgb(137, 180, 250),
            text_muted: Color::Rgb(127, 132, 156),
            text_normal: Color::Rgb(205, 214, 244),
            accent: Color::Rgb(137, 180, 250),
            success: Color::Rgb(166, 227, 161),
            error: Color::Rgb(243, 139, 168),
            warning: Color::Rgb(249, 226, 175),
            syn_keyword: Color::Rgb(203, 166, 247),
            syn_type: Color::Rgb(249, 226, 175),
            syn_function: Color::Rgb(137, 180, 250),
            syn_string: Color::Rgb(166, 227, 161),
            syn_number: Color::Rgb(250, 179, 135),
            syn_comment: Color::Rgb(108, 112, 134),
            syn_constant: Color::Rgb(250, 179, 135),
            syn_property: Color::Rgb(137, 220, 235),
            syn_attribute: Color::Rgb(249, 226, 175),
            ..Self::builtin_default()
        }
    }

    /// Dracula.
    pub fn dracula() -> Self {
        Self {
            deleted_bg: Color::Rgb(68, 30, 36),
            added_bg: Color::Rgb(30, 68, 36),
            stripe_bg: Color::Rgb(33, 34, 44),
            deleted_fg: Color::Rgb(255, 85, 85),
            added_fg: Color::Rgb(80, 250, 123),
            unchanged_fg: Color::Rgb(248, 248, 242),
            inline_deleted_bg: Color::Rgb(120, 40, 48),
            inline_added_bg: Color::Rgb(40, 120, 56),
            line_num_unchanged: Color::Rgb(98, 114, 164),
            file_header_bg: Color::Rgb(68, 71, 90),
            file_header_fg: Color::Rgb(248, 248, 242),
            separator: Color::Rgb(98, 114, 164),
            bg: Color::Rgb(40, 42, 54),
            bg_surface: Color::Rgb(33, 34, 44),
            bg_selected: Color::Rgb(68, 71, 90),
            border: Color::Rgb(68, 71, 90),
            border_active: Color::Rgb(189, 147, 249),
            text_muted: Color::Rgb(98, 114, 164),
            text_normal: Color::Rgb(248, 248, 242),
            text_bright: Color::Rgb(255, 255, 255),
            accent: Color::Rgb(139, 233, 253),
            success: Color::Rgb(80, 250, 123),
            error: Color::Rgb(255, 85, 85),
            warning: Color::Rgb(241, 250, 140),
            syn_keyword: Color::Rgb(255, 121, 198),
            syn_type: Color::Rgb(139, 233, 253),
            syn_function: Color::Rgb(80, 250, 123),
            syn_string: Color::Rgb(241, 250, 140),
            syn_number: Color::Rgb(189, 147, 249),
            syn_comment: Color::Rgb(98, 114, 164),
            syn_operator: Color::Rgb(255, 121, 198),
            syn_punctuation: Color::Rgb(248, 248, 242),
            syn_constant: Color::Rgb(189, 147, 249),
            syn_property: Color::Rgb(139, 233, 253),
            syn_attribute: Color::Rgb(80, 250, 123),
            ..Self::builtin_default()
        }
    }

    /// Gruvbox dark.
    pub fn gruvbox() -> Self {
        Self {
            deleted_bg: Color::Rgb(66, 36, 30),
            added_bg: Color::Rgb(50, 56, 30),
            stripe_bg: Color::Rgb(40, 40, 40),
            deleted_fg: Color::Rgb(251, 73, 52),
            added_fg: Color::Rgb(184, 187, 38),
            unchanged_fg: Color::Rgb(213, 196, 161),
            inline_deleted_bg: Color::Rgb(120, 48, 36),
            inline_added_bg: Color::Rgb(90, 100, 30),
            line_num_unchanged: Color::Rgb(102, 92, 84),
            file_header_bg: Color::Rgb(60, 56, 54),
            file_header_fg: Color::Rgb(235, 219, 178),
            separator: Color::Rgb(124, 111, 100),
            bg: Color::Rgb(29, 32, 33),
            bg_surface: Color::Rgb(40, 40, 40),
            bg_selected: Color::Rgb(80, 73, 69),
            border: Color::Rgb(80, 73, 69),
            border_active: Color::Rgb(250, 189, 47),
            text_muted: Color::Rgb(146, 131, 116),
            text_normal: Color::Rgb(235, 219, 178),
            accent: Color::Rgb(250, 189, 47),
            success: Color::Rgb(184, 187, 38),
            error: Color::Rgb(251, 73, 52),
            warning: Color::Rgb(254, 128, 25),
            syn_keyword: Color::Rgb(251, 73, 52),
            syn_type: Color::Rgb(250, 189, 47),
            syn_function: Color::Rgb(184, 187, 38),
            syn_string: Color::Rgb(184, 187, 38),
            syn_number: Color::Rgb(211, 134, 155),
            syn_comment: Color::Rgb(146, 131, 116),
            syn_operator: Color::Rgb(254, 128, 25),
            syn_punctuation: Color::Rgb(168, 153, 132),
            syn_constant: Color::Rgb(211, 134, 155),
            syn_property: Color::Rgb(131, 165, 152),
            syn_attribute: Color::Rgb(142, 192, 124),
            ..Self::builtin_default()
        }
    }

    /// Nord.
    pub fn nord() -> Self {
        Self {
            deleted_bg: Color::Rgb(67, 46, 54),
            added_bg: Color::Rgb(48, 64, 58),
            stripe_bg: Color::Rgb(59, 66, 82),
            deleted_fg: Color::Rgb(191, 97, 106),
            added_fg: Color::Rgb(163, 190, 140),
            unchanged_fg: Color::Rgb(216, 222, 233),
            inline_deleted_bg: Color::Rgb(110, 60, 70),
            inline_added_bg: Color::Rgb(70, 100, 80),
            line_num_unchanged: Color::Rgb(76, 86, 106),
            file_header_bg: Color::Rgb(67, 76, 94),
            file_header_fg: Color::Rgb(236, 239, 244),
            separator: Color::Rgb(97, 110, 136),
            bg: Color::Rgb(46, 52, 64),
            bg_surface: Color::Rgb(59, 66, 82),
            bg_selected: Color::Rgb(67, 76, 94),
            border: Color::Rgb(67, 76, 94),
            border_active: Color::Rgb(136, 192, 208),
            text_muted: Color::Rgb(97, 110, 136),
            text_normal: Color::Rgb(216, 222, 233),
            accent: Color::Rgb(136, 192, 208),
            success: Color::Rgb(163, 190, 140),
            error: Color::Rgb(191, 97, 106),
            warning: Color::Rgb(235, 203, 139),
            syn_keyword: Color::Rgb(129, 161, 193),
            syn_type: Color::Rgb(143, 188, 187),
            syn_function: Color::Rgb(136, 192, 208),
            syn_string: Color::Rgb(163, 190, 140),
            syn_number: Color::Rgb(180, 142, 173),
            syn_comment: Color::Rgb(97, 110, 136),
            syn_operator: Color::Rgb(129, 161, 193),
            syn_punctuation: Color::Rgb(236, 239, 244),
            syn_constant: Color::Rgb(180, 142, 173),
            syn_property: Color::Rgb(136, 192, 208),
            syn_attribute: Color::Rgb(143, 188, 187),
            ..Self::builtin_default()
        }
    }

    /// Mutable slot for a camelCase theme-file key.
    fn slot_mut(&mut self, key: &str) -> Option<&mut Color> {
        let slot = match key {
            "deletedBg" => &mut self.deleted_bg,
            "addedBg" => &mut self.added_bg,
            "unchangedBg" => &mut self.unchanged_bg,
            "stripeBg" => &mut self.stripe_bg,
            "deletedFg" => &mut self.deleted_fg,
            "addedFg" => &mut self.added_fg,
            "unchangedFg" => &mut self.unchanged_fg,
            "inlineDeletedBg" => &mut self.inline_deleted_bg,
            "inlineAddedBg" => &mut self.inline_added_bg,
            "inlineDeletedFg" => &mut self.inline_deleted_fg,
            "inlineAddedFg" => &mut self.inline_added_fg,
            "lineNumDeleted" => &mut self.line_num_deleted,
            "lineNumAdded" => &mut self.line_num_added,
            "lineNumUnchanged" => &mut self.line_num_unchanged,
            "fileHeaderBg" => &mut self.file_header_bg,
            "fileHeaderFg" => &mut self.file_header_fg,
            "separator" => &mut self.separator,
            "bg" => &mut self.bg,
            "bgSurface" => &mut self.bg_surface,
            "bgSelected" => &mut self.bg_selected,
            "border" => &mut self.border,
            "borderActive" => &mut self.border_active,
            "textMuted" => &mut self.text_muted,
            "textNormal" => &mut self.text_normal,
            "textBright" => &mut self.text_bright,
            "accent" => &mut self.accent,
            "success" => &mut self.success,
            "error" => &mut self.error,
            "warning" => &mut self.warning,
            "synKeyword" => &mut self.syn_keyword,
            "synType" => &mut self.syn_type,
            "synFunction" => &mut self.syn_function,
            "synString" => &mut self.syn_string,
            "synNumber" => &mut self.syn_number,
            "synComment" => &mut self.syn_comment,
            "synOperator" => &mut self.syn_operator,
            "synPunctuation" => &mut self.syn_punctuation,
            "synConstant" => &mut self.syn_constant,
            "synProperty" => &mut self.syn_property,
            "synAttribute" => &mut self.syn_attribute,
            _ => return None,
        };
        Some(slot)
    }
}

/// Theme file: named color definitions plus camelCase field overrides.
///
/// ```json
/// { "defs": { "red": "#ff5555" }, "theme": { "deletedFg": "red", "addedFg": "#50fa7b" } }
/// ```
///
/// Fields not listed keep the default theme's value.
#[derive(Debug, Default, Deserialize)]
pub struct ThemeFile {
    /// Named colors usable as values in `theme`.
    #[serde(default)]
    pub defs: HashMap<String, String>,
    /// Field name to hex color or def name.
    #[serde(default)]
    pub theme: HashMap<String, String>,
}

impl ThemeFile {
    /// Resolve onto the default theme.
    pub fn resolve(&self) -> Theme {
        let mut theme = Theme::builtin_default();
        for (key, value) in &self.theme {
            let Some(color) = resolve_color(value, &self.defs) else {
                continue;
            };
            if let Some(slot) = theme.slot_mut(key) {
                *slot = color;
            }
        }
        theme
    }
}

/// Theme names from the built-ins plus `*.json` files in `dir`.
fn list_in(dir: Option<&Path>) -> Vec<String> {
    let mut names: Vec<String> = BUILTIN_THEMES.iter().map(|s| s.to_string()).collect();

    let entries = dir.and_then(|dir| std::fs::read_dir(dir).ok());
    for entry in entries.into_iter().flatten().flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "json") {
            if let Some(stem) = path.file_stem() {
                let name = stem.to_string_lossy().into_owned();
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
    }

    names.sort();
    names
}

fn user_themes_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("critica").join("themes"))
}

fn load_user_theme(name: &str) -> Option<Theme> {
    let path = user_themes_dir()?.join(format!("{name}.json"));
    let content = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str::<ThemeFile>(&content) {
        Ok(file) => Some(file.resolve()),
        Err(e) => {
            eprintln!("Warning: ignoring theme {}: {e}", path.display());
            None
        }
    }
}

/// `#rrggbb` or `rrggbb` to an RGB color.
pub fn parse_hex(s: &str) -> Option<Color> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 || !s.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn resolve_color(value: &str, defs: &HashMap<String, String>) -> Option<Color> {
    if value.starts_with('#') {
        parse_hex(value)
    } else {
        defs.get(value).and_then(|def| parse_hex(def))
    }
}

fn lighten(color: Color, amount: u8) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            r.saturating_add(amount),
            g.saturating_add(amount),
            b.saturating_add(amount),
        ),
        other => other,
    }
}
