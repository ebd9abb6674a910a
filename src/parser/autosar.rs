//! AUTOSAR macro parser (spec.md §4.2): recognizes the `FUNC`/`FUNC_P2VAR`/
//! `FUNC_P2CONST` function-definition macros and the `VAR`/`P2VAR`/
//! `P2CONST`/`CONST` parameter macros. Header recognition is a manual
//! line scan rather than a regex — the macro vocabulary is a fixed, short
//! set of literal tokens, so there is no backtracking risk to bound
//! against in the first place.

use super::{find_body, scan_balanced, split_top_level_commas, LineIndex};
use crate::model::{FunctionInfo, FunctionKind, Parameter};

const MAX_MACRO_ARGS_SCAN: usize = 500;
const MAX_NAME_LEN: usize = 60;
const MAX_PARAM_LIST_SCAN: usize = 5_000;

#[derive(Clone, Copy)]
enum FuncMacro {
    Func,
    FuncP2Var,
    FuncP2Const,
}

impl FuncMacro {
    fn token(self) -> &'static str {
        match self {
            Self::Func => "FUNC",
            Self::FuncP2Var => "FUNC_P2VAR",
            Self::FuncP2Const => "FUNC_P2CONST",
        }
    }

    fn kind(self) -> FunctionKind {
        match self {
            Self::Func => FunctionKind::AutosarFunc,
            Self::FuncP2Var => FunctionKind::AutosarFuncP2Var,
            Self::FuncP2Const => FunctionKind::AutosarFuncP2Const,
        }
    }
}

// Longest first: FUNC_P2VAR/FUNC_P2CONST both start with "FUNC" but are
// distinct tokens, so order doesn't actually matter for correctness here,
// kept longest-first for readability only.
const FUNC_MACROS: &[FuncMacro] = &[FuncMacro::FuncP2Var, FuncMacro::FuncP2Const, FuncMacro::Func];

pub fn parse(text: &str, file_path: &str, line_index: &LineIndex) -> Vec<FunctionInfo> {
    let mut out = Vec::new();
    let mut line_start = 0usize;

    while line_start < text.len() {
        let line_end = text[line_start..].find('\n').map(|i| line_start + i).unwrap_or(text.len());
        let line = &text[line_start..line_end];
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        let mut cursor = line_start + indent;

        let mut is_static = false;
        if word_boundary(&text[cursor..line_end], "static").is_some() {
            is_static = true;
            cursor = skip_ws(text, cursor + "static".len());
        }

        let remainder = &text[cursor..line_end];
        if let Some(found) = match_func_macro(remainder) {
            if let Some((info, resume)) = parse_one(text, file_path, cursor, found, is_static, line_index) {
                out.push(info);
                line_start = resume;
                continue;
            }
        }

        line_start = line_end + 1;
    }

    out
}

fn word_boundary<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    if !text.starts_with(word) {
        return None;
    }
    let after = text[word.len()..].chars().next();
    if after.is_some_and(|c| c.is_whitespace()) {
        Some(&text[word.len()..])
    } else {
        None
    }
}

fn match_func_macro(remainder: &str) -> Option<FuncMacro> {
    for &m in FUNC_MACROS {
        if let Some(rest) = remainder.strip_prefix(m.token()) {
            let mut rest = rest;
            rest = rest.trim_start();
            if rest.starts_with('(') {
                return Some(m);
            }
        }
    }
    None
}

fn skip_ws(text: &str, from: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = from;
    while i < bytes.len() && (bytes[i] as char).is_whitespace() {
        i += 1;
    }
    i
}

/// Parse one `FUNC`-family invocation starting at `cursor` (the first
/// character of the macro token). Returns the built `FunctionInfo` plus
/// the absolute offset to resume line scanning from (just past the body,
/// or the macro header if no body was found — a bare prototype is not
/// indexed but we still need to skip past it).
fn parse_one(
    text: &str,
    file_path: &str,
    cursor: usize,
    macro_kind: FuncMacro,
    is_static: bool,
    line_index: &LineIndex,
) -> Option<(FunctionInfo, usize)> {
    let after_token = cursor + macro_kind.token().len();
    let paren = skip_ws(text, after_token);
    if text.as_bytes().get(paren) != Some(&b'(') {
        return None;
    }
    let args_end = scan_balanced(text, paren + 1, '(', ')', MAX_MACRO_ARGS_SCAN)?;
    let args: Vec<String> = split_top_level_commas(&text[paren + 1..args_end])
        .into_iter()
        .map(|s| s.trim().to_string())
        .collect();

    let (return_type, memory_class) = match macro_kind {
        FuncMacro::Func => {
            if args.len() < 2 {
                return None;
            }
            (args[0].clone(), Some(args[1].clone()))
        }
        FuncMacro::FuncP2Var => {
            if args.len() < 2 {
                return None;
            }
            (format!("{}*", args[0]), Some(args[1].clone()))
        }
        FuncMacro::FuncP2Const => {
            if args.len() < 2 {
                return None;
            }
            (format!("const {}*", args[0]), Some(args[1].clone()))
        }
    };

    let name_start = skip_ws(text, args_end + 1);
    let name_end = scan_identifier(text, name_start, MAX_NAME_LEN)?;
    let name = text[name_start..name_end].to_string();

    let params_open = skip_ws(text, name_end);
    if text.as_bytes().get(params_open) != Some(&b'(') {
        return None;
    }
    let params_close = scan_balanced(text, params_open + 1, '(', ')', MAX_PARAM_LIST_SCAN)?;
    let params_text = &text[params_open + 1..params_close];
    let parameters = parse_parameters(params_text);

    let (body_text, body_end) = find_body(text, params_close + 1)?;
    let line_number = line_index.line_of(name_start);
    let calls = super::context::extract_calls(&body_text);

    let info = FunctionInfo {
        name: name.clone(),
        file_path: file_path.to_string(),
        line_number,
        return_type,
        is_static,
        kind: macro_kind.kind(),
        memory_class,
        macro_type: Some(macro_kind.token().to_string()),
        parameters,
        calls,
        called_by: Vec::new(),
        qualified_name: Some(FunctionInfo::compute_qualified_name(file_path, &name)),
        sw_module: None,
    };

    Some((info, body_end))
}

fn scan_identifier(text: &str, start: usize, max_len: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = start;
    if i >= bytes.len() || !(bytes[i].is_ascii_alphabetic() || bytes[i] == b'_') {
        return None;
    }
    while i < bytes.len() && i - start < max_len && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    Some(i)
}

fn parse_parameters(params_text: &str) -> Vec<Parameter> {
    let trimmed = params_text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("void") {
        return Vec::new();
    }

    split_top_level_commas(params_text)
        .into_iter()
        .filter_map(|raw| parse_one_parameter(raw.trim()))
        .collect()
}

const PARAM_MACROS: &[(&str, bool, bool)] = &[
    // (token, is_pointer, is_const)
    ("P2CONST", true, true),
    ("P2VAR", true, false),
    ("CONST", false, true),
    ("VAR", false, false),
];

fn parse_one_parameter(raw: &str) -> Option<Parameter> {
    for &(token, is_pointer, is_const) in PARAM_MACROS {
        if let Some(rest) = raw.strip_prefix(token) {
            let rest = rest.trim_start();
            if let Some(args_str) = rest.strip_prefix('(') {
                if let Some(close_rel) = scan_balanced(args_str, 0, '(', ')', MAX_PARAM_LIST_SCAN - 1) {
                    let args: Vec<&str> = split_top_level_commas(&args_str[..close_rel]);
                    let base_type = args.first().map(|s| s.trim().to_string()).unwrap_or_default();
                    let memory_class = args.get(1).map(|s| s.trim().to_string());
                    let name = args_str[close_rel + 1..].trim().to_string();
                    if name.is_empty() {
                        return None;
                    }
                    return Some(Parameter {
                        name,
                        base_type,
                        is_pointer,
                        is_const,
                        memory_class,
                    });
                }
            }
        }
    }
    parse_plain_parameter(raw)
}

/// Best-effort fallback for a plain (non-macro) C-style parameter mixed
/// into an otherwise AUTOSAR parameter list.
fn parse_plain_parameter(raw: &str) -> Option<Parameter> {
    if raw.is_empty() {
        return None;
    }
    let is_const = raw.split_whitespace().any(|w| w == "const");
    let last_star = raw.rfind('*');
    let (type_part, name_part) = match raw.rsplit_once(|c: char| c.is_whitespace() || c == '*') {
        Some((t, n)) if !n.is_empty() => (t, n),
        _ => return None,
    };
    let is_pointer = last_star.is_some();
    Some(Parameter {
        name: name_part.trim_matches('*').trim().to_string(),
        base_type: type_part.trim().trim_start_matches("const").trim().to_string(),
        is_pointer,
        is_const,
        memory_class: None,
    })
}

#[cfg(test)]
#[path = "autosar_tests.rs"]
mod tests;
