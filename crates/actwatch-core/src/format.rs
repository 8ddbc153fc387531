//! Display formatting: state/result labels, activity descriptions, log lines.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Activity, ActivityResult, ActivityState, LogItem, TimestampMode};

pub const STYLE_EMPHASIS: &str = "\x1b[4m";
pub const STYLE_ERROR: &str = "\x1b[1;31m";
pub const STYLE_SUCCESS: &str = "\x1b[32m";
pub const STYLE_INFO: &str = "\x1b[36m";
pub const STYLE_RESET: &str = "\x1b[0m";

static OPENING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^/>][^>]*>").expect("static regex"));
static CLOSING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</[^>]*>").expect("static regex"));

pub fn format_state(state: &ActivityState) -> String {
    state.label().to_owned()
}

/// Result label; with `decorate`, a failure is wrapped in the error style.
pub fn format_result(result: &ActivityResult, decorate: bool) -> String {
    let label = result.label();
    if decorate && *result == ActivityResult::Failure {
        format!("{STYLE_ERROR}{label}{STYLE_RESET}")
    } else {
        label.to_owned()
    }
}

/// Wrap `text` in `style` when `color` is set.
pub fn styled(text: &str, style: &str, color: bool) -> String {
    if color {
        format!("{style}{text}{STYLE_RESET}")
    } else {
        text.to_owned()
    }
}

/// Render an activity description for the terminal.
///
/// Undecorated output is plain text. Decorated output turns every opening
/// markup tag into the emphasis style and every closing tag into a reset.
/// Entities are decoded only after the tags are rewritten, so an encoded
/// `&lt;b&gt;` ends up as the literal text `<b>` and never as styling.
pub fn formatted_description(activity: &Activity, with_decoration: bool) -> String {
    if !with_decoration {
        return match &activity.text {
            Some(text) => text.clone(),
            None => decode_entities(&strip_tags(&activity.description)),
        };
    }
    let styled = OPENING_TAG.replace_all(&activity.description, STYLE_EMPHASIS);
    let styled = CLOSING_TAG.replace_all(&styled, STYLE_RESET);
    decode_entities(&styled)
}

fn strip_tags(markup: &str) -> String {
    let without_open = OPENING_TAG.replace_all(markup, "");
    CLOSING_TAG.replace_all(&without_open, "").into_owned()
}

/// Decode the standard named entities plus decimal/hex character references.
/// Unknown or malformed entities are left as-is.
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end))) {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// One printable line for a log item.
pub fn format_log_item(item: &LogItem, mode: &TimestampMode) -> String {
    match (mode, item.timestamp) {
        (TimestampMode::Format(pattern), Some(ts)) => {
            format!("[{}] {}", ts.format(pattern), item.message)
        }
        _ => item.message.clone(),
    }
}

/// Elapsed seconds as `42s` or `3m07s`.
pub fn format_elapsed(secs: u64) -> String {
    if secs >= 60 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}

/// Per-state counts like `2 in progress, 1 complete`, in first-seen order.
pub fn state_summary(activities: &[Activity]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for activity in activities {
        let label = activity.state.label();
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    }
    counts
        .iter()
        .map(|(label, n)| format!("{n} {label}"))
        .collect::<Vec<_>>()
        .join(", ")
}
