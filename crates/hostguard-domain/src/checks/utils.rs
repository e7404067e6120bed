/// Cap captured output at `max` bytes (on a char boundary) for diagnostics.
pub fn truncate_output(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…[truncated {} bytes]", &text[..end], text.len() - end)
}

pub fn format_mode(mode: u32) -> String {
    format!("{mode:04o}")
}
