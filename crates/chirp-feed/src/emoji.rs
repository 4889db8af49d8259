/// Emoji for a GitHub-style shortcode name (`tada`, `+1`, `heart_eyes`).
/// Unknown codes are left untouched by the caller.
fn lookup(code: &str) -> Option<&'static str> {
    emojis::get_by_shortcode(code).map(|emoji| emoji.as_str())
}

fn is_code_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '+' || c == '-'
}

/// Replace `:name:` shortcodes with emoji. Safe to run repeatedly over the
/// same text.
pub fn expand_shortcodes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(':') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let code_len = after.find(|c: char| !is_code_char(c)).unwrap_or(after.len());
        let code = &after[..code_len];
        let closed = after[code_len..].starts_with(':');

        match (closed, lookup(code)) {
            (true, Some(emoji)) if !code.is_empty() => {
                out.push_str(emoji);
                rest = &after[code_len + 1..];
            }
            _ => {
                // Not a shortcode; keep the colon and rescan from the next char
                // so "x:y z:smile:" still finds the trailing code.
                out.push(':');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_known_codes() {
        assert_eq!(expand_shortcodes("ship it :rocket:"), "ship it \u{1F680}");
        assert_eq!(expand_shortcodes(":+1::fire:"), "\u{1F44D}\u{1F525}");
    }

    #[test]
    fn leaves_unknown_and_unclosed_codes() {
        assert_eq!(expand_shortcodes("time 10:30"), "time 10:30");
        assert_eq!(expand_shortcodes(":notacode: ok"), ":notacode: ok");
        assert_eq!(expand_shortcodes("trailing :smile"), "trailing :smile");
        assert_eq!(expand_shortcodes("x:y z:smile:"), "x:y z\u{1F604}");
    }

    #[test]
    fn covers_standard_codes() {
        assert_eq!(expand_shortcodes(":tada:"), "\u{1F389}");
        assert_eq!(expand_shortcodes(":heart_eyes:"), "\u{1F60D}");
        assert_eq!(expand_shortcodes(":100: :smiley:"), "\u{1F4AF} \u{1F603}");
        assert_eq!(expand_shortcodes(":thumbsup:"), expand_shortcodes(":+1:"));
        assert_eq!(expand_shortcodes(":party:"), ":party:");
    }

    #[test]
    fn expansion_is_idempotent() {
        let once = expand_shortcodes("hi :wave: there :x:");
        assert_eq!(expand_shortcodes(&once), once);
    }
}
