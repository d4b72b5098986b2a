//! Shell-style splitting of one option string into engine option tokens
//!
//! The engine's option parser wants discrete tokens, the way a shell would
//! hand them to `main`. Callers pass one free-form string instead, so this
//! module performs word splitting with quoting and escaping, dispatching
//! each completed token eagerly so that later options can override earlier
//! ones in application order.
//!
//! The rules are deliberately not any particular shell's:
//!   - single quotes are fully literal (backslash included),
//!   - backslash escapes exactly one following character everywhere else,
//!     including inside double quotes,
//!   - an unquoted space terminates the current token, empty or not,
//!   - an input ending mid-quote finalizes the accumulated token rather
//!     than reporting a syntax error.

use crate::{Error, Result};

/// Longest accepted option token, in bytes.
pub const MAX_TOKEN_LEN: usize = 255;

/// Split `arg` into option tokens, feeding each one to `dispatch` as it
/// completes.
///
/// Tokens arrive left to right. An unquoted space dispatches the pending
/// token even when it is empty; a trailing token is dispatched only when
/// non-empty. Once a token has accumulated [`MAX_TOKEN_LEN`] bytes, any
/// further character aborts with [`Error::OptionTooLong`]; tokens already
/// dispatched stay applied.
pub fn split_options<F>(arg: &str, mut dispatch: F) -> Result<()>
where
    F: FnMut(&str),
{
    let mut token = String::new();
    let mut is_escaped = false;
    let mut is_single_quoted = false;
    let mut is_double_quoted = false;

    for ch in arg.chars() {
        if token.len() >= MAX_TOKEN_LEN {
            return Err(Error::OptionTooLong);
        } else if is_single_quoted {
            if ch == '\'' {
                is_single_quoted = false;
            } else {
                token.push(ch);
            }
        } else if is_escaped {
            is_escaped = false;
            token.push(ch);
        } else if ch == '\\' {
            is_escaped = true;
        } else if is_double_quoted {
            if ch == '"' {
                is_double_quoted = false;
            } else {
                token.push(ch);
            }
        } else if ch == '\'' {
            is_single_quoted = true;
        } else if ch == '"' {
            is_double_quoted = true;
        } else if ch == ' ' {
            dispatch(&token);
            token.clear();
        } else {
            token.push(ch);
        }
    }
    if !token.is_empty() {
        dispatch(&token);
    }
    Ok(())
}
