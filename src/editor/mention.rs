use super::document::is_word_separator;

/// An active `@name` trigger: a half-open char-index range into the
/// flattened text covering the partial name (the `@` itself is excluded),
/// plus the name typed so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub begin: usize,
    pub end: usize,
    pub name: String,
}

/// Scan for an active mention trigger. Walks `left` backward from the caret:
/// a separator before any `@` means no trigger; an `@` first means the
/// trigger is live and extends through `flattened` to the next separator or
/// end-of-text.
pub(crate) fn scan_mention(left: &str, flattened: &str) -> Option<Mention> {
    let mut at_index = None;
    let mut idx = left.chars().count();
    for c in left.chars().rev() {
        idx -= 1;
        if is_word_separator(c) {
            break;
        }
        if c == '@' {
            at_index = Some(idx);
            break;
        }
    }
    let at_index = at_index?;

    let begin = at_index + 1;
    let name: String = flattened
        .chars()
        .skip(begin)
        .take_while(|c| !is_word_separator(*c))
        .collect();
    let end = begin + name.chars().count();
    Some(Mention { begin, end, name })
}
