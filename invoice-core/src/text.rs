/// Greedy word-wrap against a width budget.
///
/// Words are accumulated onto a line until appending the next word
/// (plus its separating space) would exceed `max_width` as reported
/// by `measure`; the line is then flushed and a new one started. A
/// single word wider than the budget gets a line of its own rather
/// than being broken. Joining the returned lines with single spaces
/// reproduces the whitespace-normalized input.
pub fn wrap_text<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", line, word);
        if measure(&candidate) > max_width {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
