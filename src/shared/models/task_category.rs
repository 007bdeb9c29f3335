use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::validation::InvalidEnumValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Work,
    Personal,
    Study,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 3] = [TaskCategory::Work, TaskCategory::Personal, TaskCategory::Study];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskCategory::Work => "work",
            TaskCategory::Personal => "personal",
            TaskCategory::Study => "study",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskCategory {
    type Err = InvalidEnumValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| InvalidEnumValue {
                field: "category",
                value: value.to_string(),
                expected: "work, personal, study",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("work", TaskCategory::Work)]
    #[case("personal", TaskCategory::Personal)]
    #[case("study", TaskCategory::Study)]
    fn parses_known_categories(#[case] raw: &str, #[case] expected: TaskCategory) {
        assert_eq!(raw.parse::<TaskCategory>().unwrap(), expected);
    }

    #[rstest]
    #[case("Work")]
    #[case("hobby")]
    #[case("")]
    fn rejects_unknown_categories(#[case] raw: &str) {
        let err = raw.parse::<TaskCategory>().unwrap_err();
        assert_eq!(err.field, "category");
        assert_eq!(err.value, raw);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&[TaskCategory::Study, TaskCategory::Work]).unwrap();
        assert_eq!(json, r#"["study","work"]"#);
        assert!(serde_json::from_str::<TaskCategory>(r#""invalid_category""#).is_err());
    }
}
