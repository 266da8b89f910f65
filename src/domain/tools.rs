use std::fmt;

use serde::{Deserialize, Serialize};

/// Generation options forwarded to the workflow backend with every
/// decomposition request.
///
/// Field names and enum values follow the backend vocabulary exactly; the
/// backend ignores anything it does not recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tools {
    /// Ask the backend to enrich the decomposition with external research.
    pub research: bool,
    /// Ask the backend to level indicators against the target audience.
    pub leveling: bool,
    /// Target difficulty of the generated indicators.
    pub difficulty: Difficulty,
    /// Granularity of the generated indicators.
    pub indicator_size: IndicatorSize,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            research: false,
            leveling: true,
            difficulty: Difficulty::default(),
            indicator_size: IndicatorSize::default(),
        }
    }
}

/// Difficulty level of the generated indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    /// School level.
    #[serde(rename = "escolar")]
    School,
    /// Standard (higher education) level.
    #[default]
    #[serde(rename = "estándar")]
    Standard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::School => f.write_str("school"),
            Self::Standard => f.write_str("standard"),
        }
    }
}

/// How much each generated indicator covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorSize {
    /// One observable behaviour per indicator.
    #[serde(rename = "atómico")]
    Atomic,
    /// The backend's default granularity.
    #[default]
    #[serde(rename = "estándar")]
    Standard,
    /// Indicators that integrate several behaviours.
    #[serde(rename = "integrador")]
    Integrative,
}

impl fmt::Display for IndicatorSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Atomic => f.write_str("atomic"),
            Self::Standard => f.write_str("standard"),
            Self::Integrative => f.write_str("integrative"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tools_match_backend_vocabulary() {
        let json = serde_json::to_value(Tools::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "research": false,
                "leveling": true,
                "difficulty": "estándar",
                "indicatorSize": "estándar",
            })
        );
    }

    #[test]
    fn non_default_values_serialize_accented_names() {
        let tools = Tools {
            research: true,
            leveling: false,
            difficulty: Difficulty::School,
            indicator_size: IndicatorSize::Atomic,
        };
        let json = serde_json::to_value(tools).unwrap();
        assert_eq!(json["difficulty"], "escolar");
        assert_eq!(json["indicatorSize"], "atómico");
    }
}
