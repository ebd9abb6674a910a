//! Plain-C declaration matcher (spec.md §4.3.1-§4.3.3): line-by-line
//! scanning with a bounded-quantifier header regex, reserved-keyword
//! rejection, and brace-depth body extraction. The only regex in the
//! parser — every quantifier in it is bounded, and it runs once per
//! line rather than once over the whole file, so a pathological line
//! can cost at most a bounded amount of backtracking, never unbounded.

use regex::Regex;

use super::{find_body, is_reserved, scan_balanced, split_top_level_commas, LineIndex};
use crate::model::{FunctionInfo, FunctionKind, Parameter};

const MAX_PARAM_SCAN: usize = 10_000;

fn header_regex() -> Regex {
    // return-type: up to 100 chars; name: up to 50 chars; both bounded
    // per spec.md §4.3.1 to rule out catastrophic backtracking.
    Regex::new(r"^[ \t]*(static\s+)?([A-Za-z_][A-Za-z0-9_ \t\*]{0,99})\s+([A-Za-z_][A-Za-z0-9_]{0,49})\s*\(").unwrap()
}

pub fn parse(text: &str, file_path: &str, line_index: &LineIndex) -> Vec<FunctionInfo> {
    let re = header_regex();
    let mut out = Vec::new();
    let mut line_start = 0usize;

    while line_start < text.len() {
        let line_end = text[line_start..].find('\n').map(|i| line_start + i).unwrap_or(text.len());
        let line = &text[line_start..line_end];

        if !line.contains('(') {
            line_start = line_end + 1;
            continue;
        }
        if line_is_declaration_only(line) {
            line_start = line_end + 1;
            continue;
        }

        if let Some(caps) = re.captures(line) {
            let whole = caps.get(0).unwrap();
            let name_group = caps.get(3).unwrap();
            let name = name_group.as_str();

            if is_reserved(name) {
                line_start = line_end + 1;
                continue;
            }

            let is_static = caps.get(1).is_some();
            let return_type = caps.get(2).unwrap().as_str().trim().to_string();
            let name_abs = line_start + name_group.start();
            let params_open = line_start + whole.end() - 1;

            if let Some((info, resume)) = build_function(
                text, file_path, params_open, name, name_abs, is_static, return_type, line_index,
            ) {
                out.push(info);
                line_start = resume;
                continue;
            } else {
                // matched header but no body within range (prototype, or
                // body beyond the bounded scan window) — resume just
                // past the parameter list so we don't rescan it.
                if let Some(close) = scan_balanced(text, params_open + 1, '(', ')', MAX_PARAM_SCAN) {
                    line_start = close + 1;
                    continue;
                }
            }
        }

        line_start = line_end + 1;
    }

    out
}

/// Quick reject per spec.md §4.3.1: a line whose first top-level `;`
/// precedes its first top-level `{` is a declaration, not a definition.
fn line_is_declaration_only(line: &str) -> bool {
    let semi = find_top_level(line, ';');
    let brace = find_top_level(line, '{');
    match (semi, brace) {
        (Some(s), Some(b)) => s < b,
        (Some(_), None) => true,
        _ => false,
    }
}

fn find_top_level(line: &str, needle: char) -> Option<usize> {
    let mut in_string = false;
    let mut in_char = false;
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if in_string {
            match ch {
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        if in_char {
            match ch {
                '\\' => escaped = true,
                '\'' => in_char = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '\'' => in_char = true,
            c if c == needle => return Some(idx),
            _ => {}
        }
    }
    None
}

#[allow(clippy::too_many_arguments)]
fn build_function(
    text: &str,
    file_path: &str,
    params_open: usize,
    name: &str,
    name_abs: usize,
    is_static: bool,
    return_type: String,
    line_index: &LineIndex,
) -> Option<(FunctionInfo, usize)> {
    let params_close = scan_balanced(text, params_open + 1, '(', ')', MAX_PARAM_SCAN)?;
    let params_text = &text[params_open + 1..params_close];
    let (body_text, body_end) = find_body(text, params_close + 1)?;

    let info = FunctionInfo {
        name: name.to_string(),
        file_path: file_path.to_string(),
        line_number: line_index.line_of(name_abs),
        return_type,
        is_static,
        kind: FunctionKind::TraditionalC,
        memory_class: None,
        macro_type: None,
        parameters: parse_parameters(params_text),
        calls: super::context::extract_calls(&body_text),
        called_by: Vec::new(),
        qualified_name: Some(FunctionInfo::compute_qualified_name(file_path, name)),
        sw_module: None,
    };

    Some((info, body_end))
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

fn parse_one_parameter(raw: &str) -> Option<Parameter> {
    if raw.is_empty() {
        return None;
    }
    let is_const = raw.split_whitespace().any(|w| w == "const");
    let is_pointer = raw.contains('*');
    let (type_part, name_part) = raw.rsplit_once(|c: char| c.is_whitespace() || c == '*')?;
    if name_part.trim().is_empty() {
        return None;
    }
    Some(Parameter {
        name: name_part.trim_matches('*').trim().to_string(),
        base_type: type_part.trim().trim_start_matches("const").trim().to_string(),
        is_pointer,
        is_const,
        memory_class: None,
    })
}

#[cfg(test)]
#[path = "c_tests.rs"]
mod tests;
