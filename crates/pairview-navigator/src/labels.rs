//! Localized display strings.
//!
//! Every string a navigator shows to the user lives here, so one navigator
//! implementation serves every locale. Persian is the default.

use serde::{Deserialize, Serialize};

/// Display strings for one locale.
///
/// Deserializing a partial document keeps the Persian value for every
/// missing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Leading word of a selector label ("compare").
    pub compare: String,
    /// Joins the two section ids in a selector label ("and").
    pub and: String,
    /// Used when a record has no first-section id.
    pub default_section_1: String,
    /// Used when a record has no second-section id.
    pub default_section_2: String,

    pub heading_section_1: String,
    pub heading_section_1_rules: String,
    pub heading_section_2: String,
    pub heading_section_2_rules: String,
    pub heading_relation: String,

    pub missing_section_1: String,
    pub missing_section_1_rules: String,
    pub missing_section_2: String,
    pub missing_section_2_rules: String,
    pub missing_relation: String,

    /// Counter separator: "(3 <of> 10)".
    pub of: String,

    pub success_title: String,
    pub error_title: String,
    pub load_succeeded: String,
    /// Prefix of the load-failure message; the parse error follows it.
    pub load_failed: String,
}

impl Labels {
    pub fn persian() -> Self {
        Self {
            compare: "مقایسه".into(),
            and: "و".into(),
            default_section_1: "بخش ۱".into(),
            default_section_2: "بخش ۲".into(),
            heading_section_1: "بخش اول".into(),
            heading_section_1_rules: "قوانین بخش اول".into(),
            heading_section_2: "بخش دوم".into(),
            heading_section_2_rules: "قوانین بخش دوم".into(),
            heading_relation: "تحلیل رابطه".into(),
            missing_section_1: "(محتوای بخش اول موجود نیست)".into(),
            missing_section_1_rules: "(قوانین بخش اول موجود نیست)".into(),
            missing_section_2: "(محتوای بخش دوم موجود نیست)".into(),
            missing_section_2_rules: "(قوانین بخش دوم موجود نیست)".into(),
            missing_relation: "(تحلیل رابطه موجود نیست)".into(),
            of: "از".into(),
            success_title: "موفقیت".into(),
            error_title: "خطا".into(),
            load_succeeded: "فایل با موفقیت بارگذاری شد.".into(),
            load_failed: "فایل JSON نامعتبر است:".into(),
        }
    }

    pub fn english() -> Self {
        Self {
            compare: "Compare".into(),
            and: "and".into(),
            default_section_1: "Section 1".into(),
            default_section_2: "Section 2".into(),
            heading_section_1: "First section".into(),
            heading_section_1_rules: "First section rules".into(),
            heading_section_2: "Second section".into(),
            heading_section_2_rules: "Second section rules".into(),
            heading_relation: "Relation analysis".into(),
            missing_section_1: "(first section content not available)".into(),
            missing_section_1_rules: "(first section rules not available)".into(),
            missing_section_2: "(second section content not available)".into(),
            missing_section_2_rules: "(second section rules not available)".into(),
            missing_relation: "(relation analysis not available)".into(),
            of: "of".into(),
            success_title: "Success".into(),
            error_title: "Error".into(),
            load_succeeded: "File loaded successfully.".into(),
            load_failed: "Invalid JSON file:".into(),
        }
    }

    /// Look up a built-in locale by code (`fa`, `en`).
    pub fn for_locale(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "fa" | "fa-ir" | "persian" => Some(Self::persian()),
            "en" | "en-us" | "english" => Some(Self::english()),
            _ => None,
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::persian()
    }
}
