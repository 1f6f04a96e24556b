//! Search text normalization.
//!
//! Customer and product listings are searched accent- and case-insensitively.
//! The searchable fields are folded into a `search_text` column on write with
//! [`search_text`], and the user's query is folded with
//! [`normalize_search_text`]. A row matches when every word of the folded
//! query occurs in its `search_text`, in any order.

use unicode_normalization::UnicodeNormalization;

/// Fold a string for search comparison.
///
/// 1. Lowercase
/// 2. Expand letters that do not decompose (`đ` -> `d`, `ß` -> `ss`, ...)
/// 3. NFD decomposition, then drop the combining marks
/// 4. Keep letters, digits, whitespace and the characters common in codes,
///    phone numbers and emails (`@ . - _ +`)
/// 5. Collapse and trim whitespace
///
/// `"Nguyễn Văn Đức"` becomes `"nguyen van duc"`.
pub fn normalize_search_text(s: &str) -> String {
    s.to_lowercase()
        .replace('đ', "d")
        .replace('ß', "ss")
        .replace('æ', "ae")
        .replace('œ', "oe")
        .nfd()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || "@.-_+".contains(*c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the stored `search_text` value from the searchable fields.
pub fn search_text<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    fields
        .into_iter()
        .flatten()
        .map(normalize_search_text)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize an optional query term, treating blank input as no filter.
pub fn search_term(raw: Option<&str>) -> Option<String> {
    raw.map(normalize_search_text).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        assert_eq!(normalize_search_text("acme"), "acme");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(normalize_search_text("ACME Corp"), "acme corp");
    }

    #[test]
    fn test_vietnamese_diacritics() {
        assert_eq!(normalize_search_text("Nguyễn Văn Đức"), "nguyen van duc");
        assert_eq!(normalize_search_text("Hà Nội"), "ha noi");
        assert_eq!(normalize_search_text("đường"), "duong");
    }

    #[test]
    fn test_latin_accents_and_ligatures() {
        assert_eq!(normalize_search_text("Café"), "cafe");
        assert_eq!(normalize_search_text("Straße"), "strasse");
        assert_eq!(normalize_search_text("cœur"), "coeur");
    }

    #[test]
    fn test_contact_characters_survive() {
        assert_eq!(normalize_search_text("Sales@Acme.com"), "sales@acme.com");
        assert_eq!(normalize_search_text("+84 901-234"), "+84 901-234");
        assert_eq!(normalize_search_text("SKU_001"), "sku_001");
    }

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(normalize_search_text("  a   b  "), "a b");
        assert_eq!(normalize_search_text("   "), "");
    }

    #[test]
    fn test_search_text_skips_missing_fields() {
        let text = search_text([Some("C001"), Some("Trần Thị B"), None, Some("  ")]);
        assert_eq!(text, "c001 tran thi b");
    }

    #[test]
    fn test_search_term() {
        assert_eq!(search_term(Some(" Đức ")), Some("duc".to_string()));
        assert_eq!(search_term(Some("  ")), None);
        assert_eq!(search_term(None), None);
    }
}
