use serde::{Deserialize, Serialize};

/// Regional indicator symbol A minus ASCII 'A'.
const REGIONAL_INDICATOR_OFFSET: u32 = 0x1F1E6 - 'A' as u32;
const WHITE_FLAG: &str = "\u{1F3F3}\u{FE0F}";
const EU_FLAG: &str = "\u{1F1EA}\u{1F1FA}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
    pub currency: String,
}

impl Country {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            currency: currency.into(),
        }
    }

    pub fn flag_emoji(&self) -> String {
        flag_emoji(&self.code)
    }
}

/// Flag emoji for a two-letter country code.
///
/// `EU` maps to the European Union flag; anything that is not two ASCII
/// letters maps to a white flag.
pub fn flag_emoji(code: &str) -> String {
    let upper = code.to_ascii_uppercase();
    if upper.len() != 2 || !upper.bytes().all(|b| b.is_ascii_uppercase()) {
        return WHITE_FLAG.to_string();
    }
    if upper == "EU" {
        return EU_FLAG.to_string();
    }

    upper
        .chars()
        .filter_map(|c| char::from_u32(c as u32 + REGIONAL_INDICATOR_OFFSET))
        .collect()
}
