//! `${name}` expression evaluation.
//!
//! Grammar: `${name[,name2...][:default]}`. The first name the resolver
//! knows wins; otherwise the default is used; otherwise the expression is
//! kept literally. `$$` is an escaped `$`, `${/}` expands to the file
//! separator and `${:}` to the path-list separator. Braces nested inside a
//! reference (`${a:${b}}`) are balanced, not treated as its end.

use std::collections::HashMap;

/// Source of values for `${name}` references.
pub trait PropertyResolver {
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Knows no properties. Only defaults and the separators take effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProperties;

impl PropertyResolver for NoProperties {
    fn resolve(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Reads properties from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvResolver;

impl PropertyResolver for EnvResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl PropertyResolver for HashMap<String, String> {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Initial,
    GotDollar,
    GotOpenBrace,
    Resolved,
    Default,
}

/// Evaluates every `${...}` reference in `expression`.
///
/// ```
/// use dmr::expression::{replace_properties, NoProperties};
///
/// assert_eq!(replace_properties("${missing:8080}", &NoProperties), "8080");
/// assert_eq!(replace_properties("${a,b:x}", &NoProperties), "x");
/// assert_eq!(replace_properties("${missing}", &NoProperties), "${missing}");
/// ```
pub fn replace_properties(expression: &str, resolver: &dyn PropertyResolver) -> String {
    let mut out = String::with_capacity(expression.len());
    let mut state = State::Initial;
    // Byte offsets; every delimiter is ASCII so slicing stays on char
    // boundaries.
    let mut open = 0;
    let mut start = 0;
    let mut name_start = 0;
    let mut nest = 0usize;

    for (i, ch) in expression.char_indices() {
        match state {
            State::Initial => {
                if ch == '$' {
                    state = State::GotDollar;
                } else {
                    out.push(ch);
                }
            }
            State::GotDollar => match ch {
                '$' => {
                    out.push('$');
                    state = State::Initial;
                }
                '{' => {
                    open = i - 1;
                    name_start = i + 1;
                    state = State::GotOpenBrace;
                }
                _ => {
                    out.push('$');
                    out.push(ch);
                    state = State::Initial;
                }
            },
            State::GotOpenBrace => {
                match ch {
                    '{' => {
                        nest += 1;
                        continue;
                    }
                    ':' if name_start == i => continue,
                    ':' | '}' | ',' => {}
                    _ => continue,
                }
                if nest > 0 {
                    if ch == '}' {
                        nest -= 1;
                    }
                    continue;
                }
                let after = if ch == '}' {
                    State::Initial
                } else {
                    State::Resolved
                };
                if let Some(value) = resolve_part(expression[name_start..i].trim(), resolver) {
                    out.push_str(&value);
                    state = after;
                } else if ch == ',' {
                    name_start = i + 1;
                } else if ch == ':' {
                    start = i + 1;
                    state = State::Default;
                } else {
                    out.push_str(&expression[open..=i]);
                    state = State::Initial;
                }
            }
            State::Resolved | State::Default => match ch {
                '{' => nest += 1,
                '}' if nest > 0 => nest -= 1,
                '}' => {
                    if state == State::Default {
                        out.push_str(&expression[start..i]);
                    }
                    state = State::Initial;
                }
                _ => {}
            },
        }
    }

    match state {
        State::GotDollar => out.push('$'),
        State::Default | State::GotOpenBrace => out.push_str(&expression[open..]),
        State::Initial | State::Resolved => {}
    }
    out
}

fn resolve_part(name: &str, resolver: &dyn PropertyResolver) -> Option<String> {
    match name {
        "/" => Some(std::path::MAIN_SEPARATOR.to_string()),
        ":" => Some(PATH_LIST_SEPARATOR.to_owned()),
        _ => resolver.resolve(name),
    }
}

const PATH_LIST_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };
