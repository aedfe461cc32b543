//! Narration templates.
//!
//! Templates name projected context attributes with placeholders:
//!
//! | Placeholder    | Renders                                   |
//! |----------------|-------------------------------------------|
//! | `{t}`          | context kind                              |
//! | `{p}`          | the player                                |
//! | `{ps}`         | the players, comma separated              |
//! | `{ps:N}`       | the N-th player                           |
//! | `{c}`          | the card (its cardback when face down)    |
//! | `{s}`          | the source                                |
//! | `{n}`, `{nth}` | the number, plain or as an ordinal        |
//! | `{po}`         | the play option                           |
//! | `{po:mode}`, `{po:targets}`, `{po:target}`, `{po:<param>}` | parts of the play option |
//! | `{e}`          | the triggering context of a quick play    |
//!
//! Values come from the projection being labelled, so every observer reads
//! only what their projection holds. Unknown placeholders are left as they are.

use crate::visibility::Projected;

const UNSET: &str = "unknown";

/// Render `template` against projected attributes.
pub fn render<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a Projected>) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let token = &after[..close];
        match placeholder(token, &lookup) {
            Some(text) => out.push_str(&text),
            None => {
                out.push('{');
                out.push_str(token);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

fn placeholder<'a>(token: &str, lookup: &impl Fn(&str) -> Option<&'a Projected>) -> Option<String> {
    let show = |value: Option<&Projected>| value.map_or_else(|| UNSET.to_string(), ToString::to_string);
    let text = match token {
        "t" => show(lookup("type")),
        "p" => show(lookup("player")),
        "ps" => lookup("players").map_or_else(|| UNSET.to_string(), join),
        "c" => show(lookup("card")),
        "s" => show(lookup("source")),
        "n" => show(lookup("number")),
        "nth" => lookup("number")
            .and_then(Projected::as_int)
            .map_or_else(|| UNSET.to_string(), ordinal),
        "po" => show(lookup("play_option")),
        "e" => show(lookup("trigger")),
        _ => {
            if let Some(index) = token.strip_prefix("ps:") {
                let index: usize = index.parse().ok()?;
                let player = lookup("players")
                    .and_then(Projected::as_list)
                    .and_then(|players| players.get(index));
                show(player)
            } else if let Some(part) = token.strip_prefix("po:") {
                play_option_part(lookup("play_option"), part)
            } else {
                return None;
            }
        }
    };
    Some(text)
}

fn play_option_part(option: Option<&Projected>, part: &str) -> String {
    let Some(option) = option.and_then(Projected::as_entity) else {
        return UNSET.to_string();
    };
    match part {
        "mode" => option.text("mode").unwrap_or(UNSET).to_string(),
        "targets" => option.get("targets").map_or_else(|| UNSET.to_string(), join),
        "target" => option
            .get("targets")
            .and_then(Projected::as_list)
            .and_then(<[Projected]>::first)
            .map_or_else(|| UNSET.to_string(), ToString::to_string),
        param => match option.get("parameters") {
            Some(Projected::Map(params)) => params
                .get(param)
                .map_or_else(|| format!("{UNSET} [{param}]"), ToString::to_string),
            _ => format!("{UNSET} [{param}]"),
        },
    }
}

/// Comma-separated list, or "nobody" when empty.
fn join(value: &Projected) -> String {
    match value.as_list() {
        Some([]) => "nobody".to_string(),
        Some(items) => items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
        None => value.to_string(),
    }
}

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 21st.
#[must_use]
pub fn ordinal(n: i64) -> String {
    let suffix = match (n.rem_euclid(10), n.rem_euclid(100)) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
