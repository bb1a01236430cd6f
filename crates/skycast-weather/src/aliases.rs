//! Static alias table for city names that are ambiguous across regions.
//!
//! Order matters: the first alias is the most likely intended place.

/// Lowercase city key → ordered provider query strings.
const CITY_ALIASES: &[(&str, &[&str])] = &[
    (
        "hyderabad",
        &[
            "Hyderabad,IN",
            "Hyderabad,Telangana,IN",
            "Hyderabad,India",
            "Hyderabad,TS,IN",
        ],
    ),
    (
        "mumbai",
        &["Mumbai,IN", "Mumbai,Maharashtra,IN", "Mumbai,India"],
    ),
    ("delhi", &["Delhi,IN", "New Delhi,IN", "Delhi,India"]),
    (
        "bangalore",
        &["Bengaluru,IN", "Bangalore,IN", "Bengaluru,Karnataka,IN"],
    ),
    (
        "chennai",
        &["Chennai,IN", "Chennai,Tamil Nadu,IN", "Chennai,India"],
    ),
    (
        "kolkata",
        &["Kolkata,IN", "Kolkata,West Bengal,IN", "Kolkata,India"],
    ),
    ("pune", &["Pune,IN", "Pune,Maharashtra,IN", "Pune,India"]),
];

/// Lookup key for a raw search string.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Precomputed aliases for a normalized key.
pub fn aliases_for(key: &str) -> Option<&'static [&'static str]> {
    CITY_ALIASES
        .iter()
        .find(|(city, _)| *city == key)
        .map(|(_, aliases)| *aliases)
}

/// Build the fallback chain for a search.
///
/// Mapped cities use their alias list. Anything else is tried as typed and
/// then with each suffix appended, e.g. `["Pune", "Pune,India", "Pune,IN"]`.
pub fn search_candidates(raw: &str, fallback_suffixes: &[String]) -> Vec<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Vec::new();
    }

    if let Some(aliases) = aliases_for(&normalize_key(name)) {
        tracing::debug!("Found alias mappings for {}", name);
        return aliases.iter().map(|a| a.to_string()).collect();
    }

    std::iter::once(name.to_string())
        .chain(
            fallback_suffixes
                .iter()
                .map(|suffix| format!("{},{}", name, suffix)),
        )
        .collect()
}
