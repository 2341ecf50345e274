/// A trait to extend functionality for types that can be represented as "on" or "off" strings.
pub trait OnOffExt {
    fn as_on_off_str(&self) -> &'static str;
}

/// Extension trait for the `bool` type to provide a method for converting
/// the boolean value to a string representation of "on" or "off".
///
/// # Examples
///
/// ```
/// use telemetria::util::OnOffExt;
///
/// assert_eq!(true.as_on_off_str(), "on");
/// assert_eq!(false.as_on_off_str(), "off");
/// ```
impl OnOffExt for bool {
    fn as_on_off_str(&self) -> &'static str {
        if *self {
            "on"
        } else {
            "off"
        }
    }
}

/// Converts a string into a boolean value.
///
/// Accepts `1`, `on`, `true`, `yes` and their negatives, case insensitive.
///
/// # Examples
///
/// ```
/// use telemetria::util::string_try_into_bool;
///
/// assert_eq!(string_try_into_bool("on"), Ok(true));
/// assert_eq!(string_try_into_bool("FALSE"), Ok(false));
/// ```
pub fn string_try_into_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Ok(true),
        "0" | "off" | "false" | "no" => Ok(false),
        other => Err(format!("invalid boolean value: '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_try_into_bool() {
        assert_eq!(string_try_into_bool("1"), Ok(true));
        assert_eq!(string_try_into_bool(" True "), Ok(true));
        assert_eq!(string_try_into_bool("off"), Ok(false));
        assert!(string_try_into_bool("maybe").is_err());
    }
}
