use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Direction for reordering a pattern within the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Rotation settings. There is exactly one instance per store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Week that uses the first pattern in `pattern_order`
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub pattern_start_date: Option<NaiveDate>,
    /// Pattern ids in rotation order (no duplicates)
    #[serde(default)]
    pub pattern_order: Vec<String>,
}

impl Settings {
    pub fn new(pattern_start_date: Option<NaiveDate>, pattern_order: Vec<String>) -> Self {
        Self {
            pattern_start_date,
            pattern_order,
        }
    }

    /// Both a start date and at least one pattern are set.
    pub fn is_configured(&self) -> bool {
        self.pattern_start_date.is_some() && !self.pattern_order.is_empty()
    }

    /// Append a pattern to the rotation. Returns false if it was already present.
    pub fn append_pattern(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.pattern_order.contains(&id) {
            return false;
        }
        self.pattern_order.push(id);
        true
    }

    /// Swap a pattern with its neighbour. No-op at either end or for an unknown id.
    pub fn move_pattern(&mut self, id: &str, direction: MoveDirection) -> bool {
        let Some(index) = self.pattern_order.iter().position(|p| p == id) else {
            return false;
        };
        let next = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|&n| n < self.pattern_order.len()),
        };
        match next {
            Some(next) => {
                self.pattern_order.swap(index, next);
                true
            }
            None => false,
        }
    }

    pub fn remove_pattern(&mut self, id: &str) -> bool {
        let len_before = self.pattern_order.len();
        self.pattern_order.retain(|p| p != id);
        self.pattern_order.len() != len_before
    }

    /// Whether the order lists any id twice.
    pub fn has_duplicate_patterns(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        !self.pattern_order.iter().all(|id| seen.insert(id.as_str()))
    }
}

/// Accepts a missing, null or empty date as "unset".
fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => crate::calendar::from_iso_date(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_is_configured() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 9);
        assert!(Settings::new(date, order(&["p1"])).is_configured());
        assert!(!Settings::new(None, order(&["p1"])).is_configured());
        assert!(!Settings::new(date, vec![]).is_configured());
    }

    #[test]
    fn test_append_pattern_rejects_duplicates() {
        let mut settings = Settings::default();
        assert!(settings.append_pattern("p1"));
        assert!(!settings.append_pattern("p1"));
        assert_eq!(settings.pattern_order, order(&["p1"]));
    }

    #[test]
    fn test_move_pattern() {
        let mut settings = Settings::new(None, order(&["p1", "p2", "p3"]));

        assert!(settings.move_pattern("p2", MoveDirection::Up));
        assert_eq!(settings.pattern_order, order(&["p2", "p1", "p3"]));

        assert!(settings.move_pattern("p1", MoveDirection::Down));
        assert_eq!(settings.pattern_order, order(&["p2", "p3", "p1"]));

        // Ends and unknown ids are no-ops
        assert!(!settings.move_pattern("p2", MoveDirection::Up));
        assert!(!settings.move_pattern("p1", MoveDirection::Down));
        assert!(!settings.move_pattern("zz", MoveDirection::Up));
        assert_eq!(settings.pattern_order, order(&["p2", "p3", "p1"]));
    }

    #[test]
    fn test_remove_pattern() {
        let mut settings = Settings::new(None, order(&["p1", "p2"]));
        assert!(settings.remove_pattern("p1"));
        assert!(!settings.remove_pattern("p1"));
        assert_eq!(settings.pattern_order, order(&["p2"]));
    }

    #[test]
    fn test_has_duplicate_patterns() {
        assert!(!Settings::new(None, order(&["p1", "p2"])).has_duplicate_patterns());
        assert!(Settings::new(None, order(&["p1", "p2", "p1"])).has_duplicate_patterns());
    }

    #[test]
    fn test_empty_start_date_deserializes_as_unset() {
        let settings: Settings =
            serde_json::from_str(r#"{"patternStartDate":"","patternOrder":["p1"]}"#).unwrap();
        assert_eq!(settings.pattern_start_date, None);

        let settings: Settings = serde_json::from_str(r#"{"patternOrder":[]}"#).unwrap();
        assert_eq!(settings.pattern_start_date, None);
    }

    #[test]
    fn test_start_date_roundtrip() {
        let settings = Settings::new(NaiveDate::from_ymd_opt(2026, 2, 9), order(&["p1"]));
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains(r#""patternStartDate":"2026-02-09""#));

        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_invalid_start_date_is_an_error() {
        let result: Result<Settings, _> =
            serde_json::from_str(r#"{"patternStartDate":"2026-13-40","patternOrder":[]}"#);
        assert!(result.is_err());
    }
}
