//! Pre-formatted display rows

use serde::{Deserialize, Serialize};

/// Four display columns: rank label, short name, metric, secondary metric.
///
/// On the home screen the columns are driver code, lap time, gap and lap number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedRow(pub [String; 4]);

impl FormattedRow {
    pub fn new(
        label: impl Into<String>,
        name: impl Into<String>,
        metric: impl Into<String>,
        secondary: impl Into<String>,
    ) -> Self {
        Self([label.into(), name.into(), metric.into(), secondary.into()])
    }

    pub fn columns(&self) -> &[String; 4] {
        &self.0
    }

    /// Single-line rendering with space-separated columns.
    pub fn joined(&self) -> String {
        self.0.iter().filter(|c| !c.is_empty()).map(String::as_str).collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joined_skips_empty_columns() {
        let row = FormattedRow::new("P1", "VER", "", "9 wins");
        assert_eq!(row.joined(), "P1 VER 9 wins");
    }
}
