//! Filter rendering: turns predicate lists into DQL filter expressions.
//!
//! Per field, positive predicates are alternatives (`OR`) and negated
//! predicates are exclusions that always apply (`AND NOT`). Fields are
//! combined with `AND`.

use super::predicate::{Predicate, Value};

/// Render one predicate as a DQL function call.
pub fn render_predicate(pred: &Predicate) -> String {
    match pred {
        Predicate::Eq { field, value } => format!("eq({field}, {})", render_value(value)),
        Predicate::Has { field } => format!("has({field})"),
        Predicate::Contains { field, value } => {
            format!("regexp({field}, /.*{}.*/i)", escape_regex(value))
        }
        Predicate::EndsWith { field, value } => {
            format!("regexp({field}, /.*{}$/i)", escape_regex(value))
        }
        Predicate::Gt { field, value } => format!("gt({field}, {value})"),
        Predicate::Lt { field, value } => format!("lt({field}, {value})"),
        Predicate::Not(inner) => format!("NOT {}", render_predicate(inner)),
    }
}

/// Combine the predicates collected for one field.
///
/// Returns `None` for an empty list.
pub fn render_field(preds: &[Predicate]) -> Option<String> {
    let (negated, positive): (Vec<&Predicate>, Vec<&Predicate>) =
        preds.iter().partition(|p| p.is_negated());

    let mut terms = Vec::new();
    match positive.len() {
        0 => {}
        1 => terms.push(render_predicate(positive[0])),
        _ => terms.push(format!(
            "({})",
            positive
                .iter()
                .map(|p| render_predicate(p))
                .collect::<Vec<_>>()
                .join(" OR ")
        )),
    }
    terms.extend(negated.iter().map(|p| format!("({})", render_predicate(p))));

    match terms.len() {
        0 => None,
        1 => terms.pop(),
        _ => Some(format!("({})", terms.join(" AND "))),
    }
}

/// Build the `@filter(...)` directive for a node, or an empty string.
pub fn render_filters<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = &'a [Predicate]>,
{
    let parts: Vec<String> = fields.into_iter().filter_map(render_field).collect();
    if parts.is_empty() {
        return String::new();
    }
    format!("@filter({})", parts.join(" AND "))
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Str(s) => quote(s),
        Value::Int(i) => i.to_string(),
    }
}

/// Quote a string literal for DQL.
///
/// JSON string escaping is a subset of what the DQL lexer unquotes.
pub(crate) fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// Escape a literal for use inside a `/.../` regexp; the delimiter included.
fn escape_regex(s: &str) -> String {
    regex::escape(s).replace('/', "\\/")
}
