//! Vendor status code catalog.
//!
//! Maps the numeric status codes returned by the scanner driver to the fixed
//! English phrases reported to clients. The lookup is total: codes outside the
//! documented table resolve to a generic phrase.

/// Phrase returned for any code the catalog does not know.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Look up the phrase for a vendor status code.
///
/// # Examples
///
/// ```
/// use scanbridge_core::catalog::lookup;
///
/// assert_eq!(lookup(54), "Time out");
/// assert_eq!(lookup(-1), "Unknown error");
/// ```
pub fn lookup(code: i32) -> &'static str {
    match code {
        0 => "Error none",
        1 => "Can not create object",
        2 => "Function failed",
        3 => "Invalid parameter",
        4 => "Not used function",
        5 => "Can not create object",
        6 => "Can not load device driver",
        7 => "Can not load sgfpamx.dll",
        51 => "Can not load driver kernel file",
        52 => "Failed to initialize the device",
        53 => "Data transmission is not good",
        54 => "Time out",
        55 => "Device not found",
        56 => "Can not load driver file",
        57 => "Wrong image",
        58 => "Lack of USB bandwidth",
        59 => "Device is already opened",
        60 => "Device serial number error",
        61 => "Unsupported device",
        101 => "The number of minutiae is too small",
        102 => "Template is invalid",
        103 => "1st template is invalid",
        104 => "2nd template is invalid",
        105 => "Minutiae extraction failed",
        106 => "Matching failed",
        _ => UNKNOWN_ERROR,
    }
}

/// Render the diagnostic line for a failed driver primitive.
///
/// # Examples
///
/// ```
/// use scanbridge_core::catalog::describe;
///
/// assert_eq!(describe("GetImage", 54), "GetImage() error #54: Time out");
/// ```
pub fn describe(primitive: &str, code: i32) -> String {
    format!("{primitive}() error #{code}: {}", lookup(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "Error none")]
    #[case(3, "Invalid parameter")]
    #[case(7, "Can not load sgfpamx.dll")]
    #[case(52, "Failed to initialize the device")]
    #[case(55, "Device not found")]
    #[case(61, "Unsupported device")]
    #[case(102, "Template is invalid")]
    #[case(106, "Matching failed")]
    fn test_lookup_known(#[case] code: i32, #[case] expected: &str) {
        assert_eq!(lookup(code), expected);
    }

    #[rstest]
    #[case(8)]
    #[case(50)]
    #[case(62)]
    #[case(100)]
    #[case(107)]
    #[case(-1)]
    #[case(i32::MIN)]
    #[case(i32::MAX)]
    fn test_lookup_unknown(#[case] code: i32) {
        assert_eq!(lookup(code), UNKNOWN_ERROR);
    }

    #[test]
    fn test_documented_codes_have_specific_phrases() {
        let documented = (0..=7).chain(51..=61).chain(101..=106);
        for code in documented {
            let phrase = lookup(code);
            assert!(!phrase.is_empty());
            assert_ne!(phrase, UNKNOWN_ERROR, "code {code} fell through");
        }
    }

    #[test]
    fn test_describe_includes_primitive_and_code() {
        let text = describe("MatchTemplate", 103);
        assert!(text.contains("MatchTemplate()"));
        assert!(text.contains("#103"));
        assert!(text.ends_with("1st template is invalid"));
    }
}
