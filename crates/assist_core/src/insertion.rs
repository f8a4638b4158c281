/// How an editable surface accepts text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Content-editable element: text lives in child nodes, caret is a DOM range.
    RichText,
    /// Value-bearing control such as a textarea: text is a string value.
    PlainText,
}

/// The single content-mutating primitive an insertion performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionStrategy {
    /// Replace the active selection inside a rich-text surface with a text node.
    RangeInsert,
    /// Rich-text without a selection: rendered text + payload, assigned once.
    Append,
    /// Rich-text: payload + rendered text, assigned once.
    Prepend,
    /// Plain-text with a selection range: payload spliced over `[start, end)`.
    Splice,
    /// Plain-text without a selection range: value replaced by the payload.
    Replace,
}

pub fn plan_rich_text(selection_inside_surface: bool) -> InsertionStrategy {
    if selection_inside_surface {
        InsertionStrategy::RangeInsert
    } else {
        InsertionStrategy::Append
    }
}

pub fn plan_plain_text(has_selection_range: bool) -> InsertionStrategy {
    if has_selection_range {
        InsertionStrategy::Splice
    } else {
        InsertionStrategy::Replace
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceResult {
    pub value: String,
    /// Caret position (in chars) just after the inserted text.
    pub caret: usize,
}

/// Splices `text` over the char range `[start, end)` of `value`.
///
/// Offsets are clamped to the value length and reordered when `start > end`,
/// matching how browsers normalize a selection range.
pub fn splice_at(value: &str, start: usize, end: usize, text: &str) -> SpliceResult {
    let len = value.chars().count();
    let (start, end) = {
        let a = start.min(len);
        let b = end.min(len);
        (a.min(b), a.max(b))
    };
    let start_byte = char_to_byte(value, start);
    let end_byte = char_to_byte(value, end);

    let mut spliced = String::with_capacity(value.len() + text.len());
    spliced.push_str(&value[..start_byte]);
    spliced.push_str(text);
    spliced.push_str(&value[end_byte..]);

    SpliceResult {
        value: spliced,
        caret: start + text.chars().count(),
    }
}

/// Text inserted ahead of the existing compose content by the summarize action.
pub fn summary_block(summary: &str) -> String {
    format!("Summary:\n\n{summary}\n\n---\n\n")
}

fn char_to_byte(value: &str, chars: usize) -> usize {
    value
        .char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or(value.len())
}
