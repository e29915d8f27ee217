//! `[Name]` placeholders in text objects.

use std::borrow::Cow;
use std::collections::HashMap;

/// Placeholder name (without brackets) to the literal text that replaces it.
pub type VariableMap = HashMap<String, String>;

/// Labels offered for quick insertion as text objects.
pub const PRESET_VARIABLES: [&str; 7] = [
    "RO # [RONumber]",
    "Date: [Date]",
    "Mileage: [Mileage]",
    "Oil: [OilDesc]",
    "Next Date: [NextDate]",
    "Next Mileage: [NextMileage]",
    "[Notes]",
];

/// Values used by the print preview when no real job data is supplied.
pub fn sample_variables() -> VariableMap {
    [
        ("RONumber", "1523"),
        ("Mileage", "10005"),
        ("OilDesc", "5W 40"),
        ("Date", "11/17/2023"),
        ("NextDate", "05/17/2024"),
        ("NextMileage", "20005"),
        ("Notes", "NOTES"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_owned(), value.to_owned()))
    .collect()
}

/// Replaces every `[Name]` in `text` whose name is in `vars`.
///
/// Substitution is literal and single-pass per variable; placeholders with
/// no entry are left as written. Borrows `text` when nothing matched.
pub fn substitute<'a>(text: &'a str, vars: &VariableMap) -> Cow<'a, str> {
    if !text.contains('[') {
        return Cow::Borrowed(text);
    }

    let mut result = Cow::Borrowed(text);
    // Sorted so overlapping replacements apply in a stable order.
    let mut names: Vec<&String> = vars.keys().collect();
    names.sort();
    for name in names {
        let token = format!("[{name}]");
        if result.contains(&token) {
            let replaced = result.replace(&token, &vars[name]);
            result = Cow::Owned(replaced);
        }
    }
    result
}

/// Names of every `[Name]` token in `text`, in order of appearance.
pub fn placeholders(text: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        match after.find(']') {
            Some(close) => {
                let name = &after[..close];
                if !name.is_empty() && !name.contains('[') {
                    names.push(name);
                }
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    names
}
