use std::sync::OnceLock;

use regex::Regex;

macro_rules! re {
    ($name:ident, $pat:expr) => {
        pub(crate) fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Date, optionally followed by the HH:MM[:SS] the report prints next to it.
re!(re_date_anchor,
    r"(\d{4}-\d{2}-\d{2})(?:\s+(\d{2}:\d{2}(?::\d{2})?)\b)?");
re!(re_date,
    r"\d{4}-\d{2}-\d{2}");
re!(re_amount,
    r"\b\d+\.\d{2}\b");
re!(re_leading_time,
    r"^\d{1,2}:\d{2}(?::\d{2})?\b");
