//! Askama template filters.

/// Render underscore blank runs as a uniform visible blank.
///
/// Usage in templates:
/// ```html
/// <span class="prompt">{{ prompt|blanks }}</span>
/// ```
#[askama::filter_fn]
pub fn blanks(prompt: impl std::fmt::Display, _: &dyn askama::Values) -> askama::Result<String> {
    Ok(collapse_blank_runs(&prompt.to_string()))
}

fn collapse_blank_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_blank = false;
    for c in text.chars() {
        if c == '_' {
            if !in_blank {
                out.push_str("______");
                in_blank = true;
            }
        } else {
            in_blank = false;
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_runs_are_uniform() {
        assert_eq!(collapse_blank_runs("I ___ home."), "I ______ home.");
        assert_eq!(collapse_blank_runs("a _ b ________ c"), "a ______ b ______ c");
    }

    #[test]
    fn test_text_without_blanks_unchanged() {
        assert_eq!(collapse_blank_runs("dog"), "dog");
    }
}
