//! Text rules applied to sayings: normalization for duplicate comparison,
//! cleanup on insertion and the optional legacy decoding on retrieval.

/// Prefix that keeps its periods when leading junk is stripped
pub const LEADING_ELLIPSIS: &str = "...";

/// Keeps alphanumeric characters only, lowercased.
///
/// Two sayings with the same normalized form are duplicates.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Cleans common messes out of submitted text.
///
/// Leading spaces, tabs and periods are stripped, unless the text (ignoring
/// leading whitespace) opens with an ellipsis, in which case the periods stay.
/// Replacement characters (U+FFFD) become apostrophes.
pub fn clean_text(text: &str) -> String {
    let stripped = if starts_with_ellipsis(text) {
        text.trim_start_matches([' ', '\t'])
    } else {
        text.trim_start_matches([' ', '.', '\t'])
    };
    stripped.replace(char::REPLACEMENT_CHARACTER, "'")
}

fn starts_with_ellipsis(text: &str) -> bool {
    text.trim_start().starts_with(LEADING_ELLIPSIS)
}

/// Undoes double encoding in old databases: the text is encoded as ISO-8859-1,
/// dropping anything above U+00FF, and the bytes are decoded again as UTF-8,
/// dropping invalid sequences.
pub fn legacy_decode(text: &str) -> String {
    let latin1: Vec<u8> = text
        .chars()
        .filter_map(|c| u8::try_from(u32::from(c)).ok())
        .collect();

    let mut decoded = String::with_capacity(latin1.len());
    let mut rest = latin1.as_slice();
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                decoded.push_str(valid);
                return decoded;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                // valid_up_to guarantees this prefix decodes
                decoded.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(len) => rest = &after[len..],
                    // truncated sequence at the end
                    None => return decoded,
                }
            }
        }
    }
}
