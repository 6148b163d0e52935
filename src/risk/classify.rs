//! Score → band classification under named, swappable threshold policies.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    /// Top band; labelled per policy ("Critical" or "Imminent")
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64, policy: &ThresholdPolicy) -> Self {
        if score >= policy.critical {
            RiskLevel::Critical
        } else if score >= policy.high {
            RiskLevel::High
        } else if score >= policy.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Inclusive lower bounds for each band above Low.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdPolicy {
    pub name: String,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
    /// Display label of the top band
    pub top_label: String,
}

impl ThresholdPolicy {
    /// 0.35 / 0.60 / 0.75, top band "Critical". Web dashboards and alerting use this.
    pub fn standard() -> Self {
        Self {
            name: "standard".to_string(),
            medium: 0.35,
            high: 0.60,
            critical: 0.75,
            top_label: "Critical".to_string(),
        }
    }

    /// 0.60 / 0.75 / 0.90, top band "Imminent". Mobile map screen.
    pub fn strict() -> Self {
        Self {
            name: "strict".to_string(),
            medium: 0.60,
            high: 0.75,
            critical: 0.90,
            top_label: "Imminent".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(Self::standard()),
            "strict" => Some(Self::strict()),
            _ => None,
        }
    }

    pub fn classify(&self, score: f64) -> RiskLevel {
        RiskLevel::from_score(score, self)
    }

    pub fn label(&self, level: RiskLevel) -> &str {
        match level {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => &self.top_label,
        }
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_bands() {
        let p = ThresholdPolicy::standard();
        assert_eq!(p.classify(0.80), RiskLevel::Critical);
        assert_eq!(p.classify(0.65), RiskLevel::High);
        assert_eq!(p.classify(0.40), RiskLevel::Medium);
        assert_eq!(p.classify(0.10), RiskLevel::Low);
    }

    #[test]
    fn lower_bounds_are_inclusive() {
        let p = ThresholdPolicy::standard();
        assert_eq!(p.classify(0.75), RiskLevel::Critical);
        assert_eq!(p.classify(0.60), RiskLevel::High);
        assert_eq!(p.classify(0.35), RiskLevel::Medium);
        assert_eq!(p.classify(0.3499), RiskLevel::Low);
    }

    #[test]
    fn strict_policy_is_distinct() {
        let p = ThresholdPolicy::strict();
        assert_eq!(p.classify(0.80), RiskLevel::High);
        assert_eq!(p.classify(0.90), RiskLevel::Critical);
        assert_eq!(p.classify(0.40), RiskLevel::Low);
        assert_eq!(p.label(RiskLevel::Critical), "Imminent");
        assert_eq!(ThresholdPolicy::standard().label(RiskLevel::Critical), "Critical");
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(ThresholdPolicy::by_name("strict"), Some(ThresholdPolicy::strict()));
        assert!(ThresholdPolicy::by_name("lenient").is_none());
    }

    #[test]
    fn nan_is_low() {
        assert_eq!(ThresholdPolicy::standard().classify(f64::NAN), RiskLevel::Low);
    }
}
