/// Editorial categories offered by the admin editor.
///
/// Posts may carry any category string; this list only drives the picker.
pub const CATEGORIES: &[&str] = &[
    "Engineering",
    "Revenue",
    "Sales",
    "Productivity",
    "Workflows",
    "Strategy",
    "TalkLY",
];
