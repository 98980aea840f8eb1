/// Split `s` on its first `=`, trimming surrounding whitespace from both
/// halves. Returns `None` when there's no `=` at all.
pub fn split_key_value(s: &str) -> Option<(&str, &str)> {
    let (key, value) = s.split_once('=')?;
    Some((key.trim(), value.trim()))
}

#[cfg(test)]
mod tests {
    use super::split_key_value;

    #[test]
    fn test_split_trims_and_uses_first_separator() {
        assert_eq!(split_key_value("  a = b=c  "), Some(("a", "b=c")));
        assert_eq!(split_key_value("key="), Some(("key", "")));
        assert_eq!(split_key_value("no separator"), None);
    }

    #[test]
    fn test_split_keeps_empty_key() {
        assert_eq!(split_key_value("=value"), Some(("", "value")));
        assert_eq!(split_key_value(" = "), Some(("", "")));
    }
}
