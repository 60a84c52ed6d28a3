//! `#style` directive lookup.
//!
//! A directive is any line starting with `#style` (case-insensitive), followed
//! by `=` and/or whitespace and a style name:
//!
//! ```text
//! #style=Omegapple
//! #STYLE rose
//! #style = modernblue
//! ```
//!
//! Names the service may know but this crate does not are skipped, so a later
//! directive with a known name still wins.

use std::str::FromStr;

use crate::error::ParseStyleError;
use crate::types::Style;

pub const STYLE_DIRECTIVE: &str = "#style";

impl FromStr for Style {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Style::ALL
            .iter()
            .copied()
            .find(|style| style.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseStyleError { name: s.to_owned() })
    }
}

/// Return the first style named by a `#style` directive in `lines`.
pub fn resolve_style<'a, I>(lines: I) -> Option<Style>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter(|line| is_directive(line))
        .filter_map(directive_argument)
        .find_map(|name| name.parse::<Style>().ok())
}

fn is_directive(line: &str) -> bool {
    line.get(..STYLE_DIRECTIVE.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(STYLE_DIRECTIVE))
}

fn directive_argument(line: &str) -> Option<&str> {
    line.split(|c: char| c.is_whitespace() || c == '=')
        .filter(|token| !token.is_empty())
        .nth(1)
}
