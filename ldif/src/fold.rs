//! LDIF line folding (RFC 2849 continuation lines).

/// Fold width used when a document asks for width 0.
pub const DEFAULT_FOLD_WIDTH: usize = 76;

/// Resolve a document fold width: `None` disables folding.
pub fn effective_width(width: i32) -> Option<usize> {
    match width {
        w if w < 0 => None,
        0 => Some(DEFAULT_FOLD_WIDTH),
        // A continuation line must carry at least one byte after its space.
        w => Some((w as usize).max(2)),
    }
}

/// Folds one logical line at `width` bytes.
///
/// The first physical line is `width` bytes long, every continuation line
/// is a single space followed by up to `width - 1` bytes. No trailing newline
/// is added. Fold points never split a UTF-8 sequence.
#[must_use]
pub fn fold_line(line: &str, width: i32) -> String {
    let Some(width) = effective_width(width) else {
        return line.to_string();
    };
    if line.len() <= width {
        return line.to_string();
    }

    let mut folded = String::with_capacity(line.len() + 2 * (line.len() / (width - 1) + 1));
    let (head, mut rest) = line.split_at(floor_boundary(line, width));
    folded.push_str(head);

    while rest.len() > width - 1 {
        let (segment, tail) = rest.split_at(floor_boundary(rest, width - 1));
        folded.push_str("\n ");
        folded.push_str(segment);
        rest = tail;
    }
    if !rest.is_empty() {
        folded.push_str("\n ");
        folded.push_str(rest);
    }
    folded
}

/// Largest char boundary at or below `at`, but at least one character in.
fn floor_boundary(s: &str, at: usize) -> usize {
    let mut i = at;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    if i == 0 {
        // A single character wider than the segment: emit it whole.
        i = s.chars().next().map_or(0, char::len_utf8);
    }
    i
}

/// Reverses `fold_line`: every newline followed by a single space is removed.
#[must_use]
pub fn unfold(text: &str) -> String {
    text.replace("\n ", "")
}
