//! Small text helpers shared by the plugins and the CLI.

/// Uppercase the first letter of every alphabetic run and lowercase the rest.
///
/// `light rain` becomes `Light Rain`, `exit_code` becomes `Exit_Code`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
