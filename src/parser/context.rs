//! Call-site extraction with conditional/loop context (spec.md §4.3.4).
//!
//! A single left-to-right scan over the (comment-stripped) function body.
//! Control-flow headers (`if`, `else if`, `else`, `for`, `while`) are only
//! recognized when they begin a logical line, after whitespace and after
//! any run of closing braces belonging to the previous construct — e.g.
//! `} else if (` is one logical line-start for this purpose. Everything
//! else is a generic scan for `identifier(` call sites and brace/semicolon
//! bookkeeping.

use crate::model::FunctionCall;
use crate::parser::{is_reserved, scan_balanced};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    If,
    Else,
    Loop,
}

struct Frame {
    kind: FrameKind,
    condition: Option<String>,
    explicit_block: bool,
    /// Depth value representing this block's interior; only meaningful
    /// when `explicit_block` is true.
    push_depth: i32,
}

const MAX_CONDITION_SCAN: usize = 20_000;
const BRACE_LOOKAHEAD: usize = 400;

pub fn extract_calls(body: &str) -> Vec<FunctionCall> {
    let bytes = body.as_bytes();
    let len = bytes.len();
    let mut calls = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut depth: i32 = 0;
    let mut last_if_condition: Option<String> = None;

    let mut i = 0usize;
    let mut at_line_start = true;

    while i < len {
        if at_line_start {
            let mut j = skip_hspace(body, i);
            // Leading closing braces belong to the previous construct.
            loop {
                j = skip_hspace(body, j);
                if j < len && bytes[j] == b'}' {
                    pop_explicit_at(&mut stack, depth);
                    depth -= 1;
                    j += 1;
                } else {
                    break;
                }
            }
            j = skip_hspace(body, j);

            if let Some(next) = try_match_header(body, j, &mut stack, &mut last_if_condition, &mut depth) {
                i = next;
                at_line_start = false;
                continue;
            }
            i = j;
            at_line_start = false;
            continue;
        }

        let ch = match body[i..].chars().next() {
            Some(c) => c,
            None => break,
        };

        match ch {
            '\n' => {
                at_line_start = true;
                i += 1;
            }
            '"' => i = skip_literal(body, i, '"'),
            '\'' => i = skip_literal(body, i, '\''),
            '{' => {
                depth += 1;
                i += 1;
            }
            '}' => {
                pop_explicit_at(&mut stack, depth);
                depth -= 1;
                i += 1;
            }
            ';' => {
                cascade_pop_pending(&mut stack);
                i += 1;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                let mut k = i + c.len_utf8();
                while k < len {
                    let c2 = body[k..].chars().next().unwrap();
                    if c2.is_alphanumeric() || c2 == '_' {
                        k += c2.len_utf8();
                    } else {
                        break;
                    }
                }
                let ident = &body[start..k];
                let m = skip_hspace(body, k);
                if m < len && bytes[m] == b'(' && !is_reserved(ident) {
                    calls.push(make_call(ident, &stack));
                }
                i = k;
            }
            _ => i += ch.len_utf8(),
        }
    }

    calls
}

fn pop_explicit_at(stack: &mut Vec<Frame>, depth: i32) {
    if let Some(top) = stack.last() {
        if top.explicit_block && top.push_depth == depth {
            stack.pop();
        }
    }
}

fn cascade_pop_pending(stack: &mut Vec<Frame>) {
    while let Some(top) = stack.last() {
        if !top.explicit_block {
            stack.pop();
        } else {
            break;
        }
    }
}

fn make_call(name: &str, stack: &[Frame]) -> FunctionCall {
    let if_frame = stack
        .iter()
        .rev()
        .find(|f| matches!(f.kind, FrameKind::If | FrameKind::Else));
    let loop_frame = stack.iter().rev().find(|f| matches!(f.kind, FrameKind::Loop));
    FunctionCall {
        callee_name: name.to_string(),
        is_conditional: if_frame.is_some(),
        condition_text: if_frame.and_then(|f| f.condition.clone()),
        is_loop: loop_frame.is_some(),
        loop_condition_text: loop_frame.and_then(|f| f.condition.clone()),
    }
}

/// Skip horizontal whitespace (spaces/tabs) only — never crosses a
/// newline, since callers use this to stay within "this line" semantics.
fn skip_hspace(text: &str, from: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = from;
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    i
}

fn skip_ws_and_newlines(text: &str, from: usize, max: usize) -> usize {
    let bytes = text.as_bytes();
    let limit = (from + max).min(bytes.len());
    let mut i = from;
    while i < limit && matches!(bytes[i], b' ' | b'\t' | b'\n' | b'\r') {
        i += 1;
    }
    i
}

fn skip_literal(text: &str, start: usize, quote: char) -> usize {
    let bytes = text.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() {
        let c = bytes[i];
        if c == b'\\' {
            i += 2;
            continue;
        }
        if c == quote as u8 {
            return i + 1;
        }
        i += 1;
    }
    i
}

/// Check whether `rest` (the text starting right after any leading
/// whitespace/closing-braces) opens an `if`/`else if`/`else`/`for`/`while`
/// header. On a match, pushes the frame, advances `depth` if the header
/// is followed by an explicit `{`, and returns the absolute body offset
/// to resume generic scanning from.
fn try_match_header(
    body: &str,
    rest_start: usize,
    stack: &mut Vec<Frame>,
    last_if_condition: &mut Option<String>,
    depth: &mut i32,
) -> Option<usize> {
    let rest = &body[rest_start..];

    if let Some(after_kw) = match_word(rest, "else") {
        let after_kw_ws = skip_hspace(body, rest_start + after_kw);
        if let Some(after_if) = match_word(&body[after_kw_ws..], "if") {
            let paren_start = skip_hspace(body, after_kw_ws + after_if);
            if body.as_bytes().get(paren_start) == Some(&b'(') {
                return push_condition_frame(body, paren_start, FrameKind::If, stack, Some(last_if_condition), depth);
            }
        }
        // bare `else`: must be a word boundary (not `elseX`)
        let next_char = body[rest_start + after_kw..].chars().next();
        if !next_char.is_some_and(|c| c.is_alphanumeric() || c == '_') {
            let condition = last_if_condition.clone();
            return Some(push_frame(stack, FrameKind::Else, condition, body, rest_start + after_kw, depth));
        }
        return None;
    }

    if let Some(after_kw) = match_word(rest, "if") {
        let paren_start = skip_hspace(body, rest_start + after_kw);
        if body.as_bytes().get(paren_start) == Some(&b'(') {
            return push_condition_frame(body, paren_start, FrameKind::If, stack, Some(last_if_condition), depth);
        }
        return None;
    }

    if let Some(after_kw) = match_word(rest, "for") {
        let paren_start = skip_hspace(body, rest_start + after_kw);
        if body.as_bytes().get(paren_start) == Some(&b'(') {
            return push_condition_frame(body, paren_start, FrameKind::Loop, stack, None, depth);
        }
        return None;
    }

    if let Some(after_kw) = match_word(rest, "while") {
        let paren_start = skip_hspace(body, rest_start + after_kw);
        if body.as_bytes().get(paren_start) == Some(&b'(') {
            return push_condition_frame(body, paren_start, FrameKind::Loop, stack, None, depth);
        }
        return None;
    }

    None
}

/// Match `word` at the start of `text` with a trailing word boundary;
/// returns the byte length consumed (word only, not trailing space).
fn match_word(text: &str, word: &str) -> Option<usize> {
    if !text.starts_with(word) {
        return None;
    }
    let after = text[word.len()..].chars().next();
    if after.is_some_and(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(word.len())
}

fn push_condition_frame(
    body: &str,
    paren_start: usize,
    kind: FrameKind,
    stack: &mut Vec<Frame>,
    last_if_condition: Option<&mut Option<String>>,
    depth: &mut i32,
) -> Option<usize> {
    let cond_end = scan_balanced(body, paren_start + 1, '(', ')', MAX_CONDITION_SCAN)?;
    let raw_condition = &body[paren_start + 1..cond_end];
    let condition = sanitize_condition(raw_condition);
    if let Some(slot) = last_if_condition {
        if kind == FrameKind::If {
            *slot = Some(condition.clone());
        }
    }
    Some(push_frame(stack, kind, Some(condition), body, cond_end + 1, depth))
}

fn push_frame(
    stack: &mut Vec<Frame>,
    kind: FrameKind,
    condition: Option<String>,
    body: &str,
    after_header: usize,
    depth: &mut i32,
) -> usize {
    let probe = skip_ws_and_newlines(body, after_header, BRACE_LOOKAHEAD);
    let explicit_block = body.as_bytes().get(probe) == Some(&b'{');
    if explicit_block {
        *depth += 1;
        stack.push(Frame {
            kind,
            condition,
            explicit_block: true,
            push_depth: *depth,
        });
        probe + 1
    } else {
        stack.push(Frame {
            kind,
            condition,
            explicit_block: false,
            push_depth: 0,
        });
        after_header
    }
}

/// Sanitize a raw condition: drop embedded preprocessor-directive lines,
/// strip braces/semicolons, collapse interior whitespace, and remove any
/// parenthesis left unbalanced by the stripping above.
fn sanitize_condition(raw: &str) -> String {
    let no_preproc = raw
        .lines()
        .filter(|l| !l.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join(" ");
    let collapsed = no_preproc.split_whitespace().collect::<Vec<_>>().join(" ");
    let no_braces_semicolons: String = collapsed.chars().filter(|&c| c != '{' && c != '}' && c != ';').collect();
    balance_parens(&no_braces_semicolons).trim().to_string()
}

fn balance_parens(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut remove = vec![false; chars.len()];
    let mut stack = Vec::new();
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '(' => stack.push(i),
            ')' => {
                if stack.pop().is_none() {
                    remove[i] = true;
                }
            }
            _ => {}
        }
    }
    for idx in stack {
        remove[idx] = true;
    }
    chars
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !remove[*i])
        .map(|(_, c)| c)
        .collect()
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
