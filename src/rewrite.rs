//! Source pre-processing for the console's Lua dialect
//!
//! Cartridge programs use two shorthands stock Lua rejects: a line starting
//! with `?` as a print statement, and compound assignment (`a += 1`).
//! Embedders whose interpreter lacks the console's patched parser run the
//! program through [`prepare_source`] before handing it over.
//!
//! The cartridge loaders never call this: stored source stays verbatim, and
//! the transform remains a separate, individually testable pass.

/// Rewrite console shorthand into plain Lua, line by line.
pub fn prepare_source(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for (i, line) in source.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&rewrite_line(line));
    }
    out
}

fn rewrite_line(line: &str) -> String {
    // `?expr` in the first column prints the expression.
    if let Some(rest) = line.strip_prefix('?') {
        return format!("print({})", rest);
    }

    if let Some((pos, op)) = find_compound_op(line) {
        let lhs = &line[..pos];
        let target = lhs.trim();
        let rhs = line[pos + 2..].trim();
        if !target.is_empty() && !rhs.is_empty() && is_simple_target(lhs) {
            // `a += b` becomes `a = a + (b)`; the parentheses keep the
            // right-hand side's precedence intact.
            return format!("{}= {} {} ({})", lhs, target, op, rhs);
        }
    }

    line.to_string()
}

/// First compound-assignment operator outside strings and comments.
fn find_compound_op(line: &str) -> Option<(usize, char)> {
    let bytes = line.as_bytes();
    let mut in_string: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match in_string {
            Some(quote) => {
                if c == b'\\' {
                    i += 1; // skip the escaped character
                } else if c == quote {
                    in_string = None;
                }
            }
            None => {
                if matches!(c, b'+' | b'-' | b'*' | b'/' | b'%')
                    && bytes.get(i + 1) == Some(&b'=')
                {
                    return Some((i, c as char));
                }
                if c == b'-' && bytes.get(i + 1) == Some(&b'-') {
                    return None; // rest of the line is a comment
                }
                if c == b'"' || c == b'\'' {
                    in_string = Some(c);
                }
            }
        }
        i += 1;
    }
    None
}

/// Whether everything left of the operator looks like one assignment target.
///
/// Lines like `s="+=" x += 1` would corrupt under the textual rewrite, so
/// anything with quotes or operators in the target position is left alone.
fn is_simple_target(lhs: &str) -> bool {
    lhs.chars().all(|c| {
        c.is_alphanumeric() || matches!(c, '_' | '.' | '[' | ']' | '(' | ')' | ' ' | '\t')
    })
}
