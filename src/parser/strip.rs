//! Comment stripping: `/* ... */` (possibly multi-line) and `// ...`,
//! with string/character literals respected so a `/*` inside `"..."` is
//! not mistaken for a comment start.
//!
//! Deliberately a hand-written single pass rather than a regex: comment
//! stripping runs once over the whole file and a regex with an
//! unbounded `.*?` spanning newlines is exactly the kind of pattern
//! spec.md §9 warns against.

pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    let mut in_string = false;
    let mut in_char = false;

    while let Some((_, ch)) = chars.next() {
        if in_string {
            out.push(ch);
            if ch == '\\' {
                if let Some(&(_, next)) = chars.peek() {
                    out.push(next);
                    chars.next();
                }
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        if in_char {
            out.push(ch);
            if ch == '\\' {
                if let Some(&(_, next)) = chars.peek() {
                    out.push(next);
                    chars.next();
                }
            } else if ch == '\'' {
                in_char = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '\'' => {
                in_char = true;
                out.push(ch);
            }
            '/' => match chars.peek().map(|&(_, c)| c) {
                Some('*') => {
                    chars.next(); // consume '*'
                    let mut prev_star = false;
                    for (_, c) in chars.by_ref() {
                        if prev_star && c == '/' {
                            break;
                        }
                        prev_star = c == '*';
                        if c == '\n' {
                            out.push('\n'); // preserve line numbering
                        }
                    }
                }
                Some('/') => {
                    for (_, c) in chars.by_ref() {
                        if c == '\n' {
                            out.push('\n');
                            break;
                        }
                    }
                }
                _ => out.push(ch),
            },
            _ => out.push(ch),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_comment() {
        let src = "int x; // trailing note\nint y;";
        let out = strip_comments(src);
        assert!(!out.contains("trailing"));
        assert!(out.contains("int x;"));
        assert!(out.contains("int y;"));
    }

    #[test]
    fn strips_block_comment_single_line() {
        let out = strip_comments("int /* inline */ x;");
        assert!(!out.contains("inline"));
    }

    #[test]
    fn strips_multiline_block_comment_preserving_line_count() {
        let src = "a\n/* one\ntwo\nthree */\nb";
        let out = strip_comments(src);
        assert_eq!(src.lines().count(), out.lines().count());
        assert!(!out.contains("two"));
    }

    #[test]
    fn respects_string_literals() {
        let src = r#"char *s = "/* not a comment */"; int y;"#;
        let out = strip_comments(src);
        assert!(out.contains("/* not a comment */"));
        assert!(out.contains("int y;"));
    }

    #[test]
    fn respects_char_literals() {
        let src = r"char c = '/'; int after = 1;";
        let out = strip_comments(src);
        assert!(out.contains("int after = 1;"));
    }

    #[test]
    fn handles_escaped_quote_in_string() {
        let src = r#"char *s = "a\"/* still string */\""; int z;"#;
        let out = strip_comments(src);
        assert!(out.contains("int z;"));
        assert!(out.contains("still string"));
    }
}
