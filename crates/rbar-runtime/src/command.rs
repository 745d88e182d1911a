#![forbid(unsafe_code)]

//! The `/raidbars` subcommand surface.
//!
//! [`parse`] turns whitespace-split arguments (without the command name)
//! into a [`Subcommand`] and touches nothing. Applying it is the overlay's
//! job, so a malformed command can never leave settings half-changed.

use rbar_core::category::parse_category_list;

use crate::error::UsageError;
use crate::settings::{BAR_HEIGHT_LIMIT, BAR_WIDTH_LIMIT, PositionConfig};

/// Usage lines, one per subcommand.
pub mod usage {
    pub const ENABLE: &str = "Usage: /raidbars <on | off | toggle>";
    pub const MANAGE: &str = "Usage: /raidbars manage <on | off>";
    pub const POSITION: &str = "Usage: /raidbars position <left> <top> [<right> <bottom>]";
    pub const POSITION_NOTE: &str =
        "Note: right and bottom are screen coordinates relative to upper left (0 = screen edge)";
    pub const GRID: &str = "Usage: /raidbars grid <num_rows> <num_cols> (auto-calcs right and bottom)";
    pub const BACKGROUND: &str =
        "Usage: /raidbars background <alpha> (0 to 100 = invisible to solid black)";
    pub const BAR_SIZE: &str = "Usage: /raidbars [barheight | barwidth] <value> (0 = autoscale to font)";
    pub const FONT: &str = "Usage: /raidbars font <font_name>";
    pub const CLICKABLE: &str = "Usage: /raidbars clickable <on | off>";
    pub const GROUPS: &str = "Usage: /raidbars groups <on | off | toggle>";
    pub const SHOW_ALL: &str = "Usage: /raidbars showall <on | off | toggle>";
    pub const ALWAYS: &str = "Usage: /raidbars always <class list> where list is like 'WAR PAL SHD'";
    pub const NEVER: &str = "Usage: /raidbars never <class list> where list is like 'WAR PAL SHD'";
    pub const PRIORITY: &str =
        "Usage: /raidbars priority <class list> where list is like 'WAR PAL SHD ENC'";
    pub const FILTER: &str = "Usage: /raidbars filter <class list> where list is like 'WAR PAL SHD'";
    pub const THRESHOLD: &str =
        "Usage: /raidbars threshold <value> (filtered class shown with hp % <= value)";

    /// The full block printed for unknown input.
    pub const ALL: &[&str] = &[
        ENABLE, MANAGE, POSITION, POSITION_NOTE, GRID, BACKGROUND, BAR_SIZE, FONT, CLICKABLE,
        GROUPS, SHOW_ALL, ALWAYS, NEVER, PRIORITY, FILTER, THRESHOLD,
    ];
}

/// `on`, `off` or `toggle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
    Toggle,
}

impl Switch {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "on" => Some(Self::On),
            "off" => Some(Self::Off),
            "toggle" => Some(Self::Toggle),
            _ => None,
        }
    }

    /// Resolve against the current value.
    #[must_use]
    pub const fn apply(self, current: bool) -> bool {
        match self {
            Self::On => true,
            Self::Off => false,
            Self::Toggle => !current,
        }
    }
}

/// Which class-list setting a list subcommand targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassListKind {
    Priority,
    Always,
    Never,
    Filter,
}

impl ClassListKind {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::Always => "always",
            Self::Never => "never",
            Self::Filter => "filter",
        }
    }
}

/// A parsed subcommand. `None` payloads are bare queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subcommand {
    Enable(Switch),
    Manage(Option<bool>),
    Position(Option<PositionConfig>),
    Grid { rows: i32, cols: i32 },
    Groups(Option<Switch>),
    ShowAll(Option<Switch>),
    Clickable(Option<bool>),
    Background(Option<u8>),
    BarWidth(Option<i32>),
    BarHeight(Option<i32>),
    Font(Option<String>),
    Threshold(Option<u8>),
    /// Upper-cased class list; unknown class names are kept in the text
    /// and ignored when the list is read.
    ClassList {
        kind: ClassListKind,
        list: Option<String>,
    },
}

/// Parse subcommand arguments.
///
/// # Errors
///
/// [`UsageError::Unknown`] for unrecognized input, otherwise
/// [`UsageError::Invalid`] carrying the subcommand's usage line.
pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Subcommand, UsageError> {
    let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
    let Some((&keyword, rest)) = args.split_first() else {
        return Err(UsageError::Unknown(String::new()));
    };

    match keyword {
        "on" | "off" | "toggle" if rest.is_empty() => {
            Ok(Subcommand::Enable(Switch::parse(keyword).unwrap_or(Switch::Toggle)))
        }
        "manage" => match rest {
            [] => Ok(Subcommand::Manage(None)),
            [flag] => on_off(flag, usage::MANAGE).map(|on| Subcommand::Manage(Some(on))),
            _ => Err(UsageError::invalid("expected on or off", usage::MANAGE)),
        },
        "position" => parse_position(rest),
        "grid" => match rest {
            [rows, cols] => Ok(Subcommand::Grid {
                rows: number(rows, usage::GRID)?,
                cols: number(cols, usage::GRID)?,
            }),
            _ => Err(UsageError::invalid("expected rows and columns", usage::GRID)),
        },
        "groups" => switch(rest, usage::GROUPS).map(Subcommand::Groups),
        "showall" => switch(rest, usage::SHOW_ALL).map(Subcommand::ShowAll),
        "clickable" => match rest {
            [] => Ok(Subcommand::Clickable(None)),
            [flag] => on_off(flag, usage::CLICKABLE).map(|on| Subcommand::Clickable(Some(on))),
            _ => Err(UsageError::invalid("expected on or off", usage::CLICKABLE)),
        },
        "background" => percent(rest, usage::BACKGROUND).map(Subcommand::Background),
        "threshold" => percent(rest, usage::THRESHOLD).map(Subcommand::Threshold),
        "barwidth" => bar_size(rest, BAR_WIDTH_LIMIT).map(Subcommand::BarWidth),
        "barheight" => bar_size(rest, BAR_HEIGHT_LIMIT).map(Subcommand::BarHeight),
        "font" => match rest {
            [] => Ok(Subcommand::Font(None)),
            [name] => Ok(Subcommand::Font(Some((*name).to_owned()))),
            _ => Err(UsageError::invalid("expected one font name", usage::FONT)),
        },
        "priority" => Ok(class_list(ClassListKind::Priority, rest)),
        "always" => Ok(class_list(ClassListKind::Always, rest)),
        "never" => Ok(class_list(ClassListKind::Never, rest)),
        "filter" => Ok(class_list(ClassListKind::Filter, rest)),
        _ => Err(UsageError::Unknown(args.join(" "))),
    }
}

fn on_off(token: &str, usage: &'static str) -> Result<bool, UsageError> {
    match token {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(UsageError::invalid(format!("expected on or off, got {other:?}"), usage)),
    }
}

fn switch(rest: &[&str], usage: &'static str) -> Result<Option<Switch>, UsageError> {
    match rest {
        [] => Ok(None),
        [token] => Switch::parse(token).map(Some).ok_or_else(|| {
            UsageError::invalid(format!("expected on, off or toggle, got {token:?}"), usage)
        }),
        _ => Err(UsageError::invalid("too many arguments", usage)),
    }
}

fn number(token: &str, usage: &'static str) -> Result<i32, UsageError> {
    token
        .parse()
        .map_err(|_| UsageError::invalid(format!("{token:?} is not a number"), usage))
}

fn percent(rest: &[&str], usage: &'static str) -> Result<Option<u8>, UsageError> {
    match rest {
        [] => Ok(None),
        [token] => {
            let value = number(token, usage)?;
            u8::try_from(value)
                .ok()
                .filter(|value| *value <= 100)
                .map(Some)
                .ok_or_else(|| UsageError::invalid("value must be 0 to 100", usage))
        }
        _ => Err(UsageError::invalid("too many arguments", usage)),
    }
}

fn bar_size(rest: &[&str], limit: i32) -> Result<Option<i32>, UsageError> {
    match rest {
        [] => Ok(None),
        [token] => {
            let value = number(token, usage::BAR_SIZE)?;
            if (0..=limit).contains(&value) {
                Ok(Some(value))
            } else {
                Err(UsageError::invalid(
                    format!("value must be 0 to {limit}"),
                    usage::BAR_SIZE,
                ))
            }
        }
        _ => Err(UsageError::invalid("too many arguments", usage::BAR_SIZE)),
    }
}

fn parse_position(rest: &[&str]) -> Result<Subcommand, UsageError> {
    let numbers = rest
        .iter()
        .map(|token| number(token, usage::POSITION))
        .collect::<Result<Vec<_>, _>>()?;
    let position = match numbers.as_slice() {
        [] => return Ok(Subcommand::Position(None)),
        &[left, top] => PositionConfig {
            left,
            top,
            right: 0,
            bottom: 0,
        },
        &[left, top, right, bottom] => PositionConfig {
            left,
            top,
            right,
            bottom,
        },
        _ => {
            return Err(UsageError::invalid(
                "expected 2 or 4 coordinates",
                usage::POSITION,
            ));
        }
    };
    if let Some(problem) = position.problems().into_iter().next() {
        return Err(UsageError::invalid(
            format!("Invalid position coordinates: {problem}"),
            usage::POSITION,
        ));
    }
    Ok(Subcommand::Position(Some(position)))
}

fn class_list(kind: ClassListKind, rest: &[&str]) -> Subcommand {
    let list = (!rest.is_empty()).then(|| rest.join(" ").to_ascii_uppercase());
    Subcommand::ClassList { kind, list }
}

/// Classes in `text` that were not recognized, for a warning line.
#[must_use]
pub fn unknown_classes(text: &str) -> Vec<String> {
    parse_category_list(text).unknown
}
