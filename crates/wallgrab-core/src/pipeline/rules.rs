//! Geometry and size rules. Pure, conjunctive, inclusive at the bounds.

use crate::config::FilterConfig;
use crate::types::{FilterDecision, ImageMetadata, RuleViolation};

/// Evaluates [`ImageMetadata`] against a fixed set of acceptance rules.
#[derive(Debug, Clone)]
pub struct RuleEvaluator {
    rules: FilterConfig,
}

impl RuleEvaluator {
    pub fn new(rules: FilterConfig) -> Self {
        Self { rules }
    }

    /// Check every rule and report all violations.
    pub fn evaluate(&self, meta: &ImageMetadata) -> FilterDecision {
        let rules = &self.rules;
        let mut violations = Vec::new();

        if meta.width < rules.min_width {
            violations.push(RuleViolation::MinWidth {
                actual: meta.width,
                required: rules.min_width,
            });
        }
        if meta.height < rules.min_height {
            violations.push(RuleViolation::MinHeight {
                actual: meta.height,
                required: rules.min_height,
            });
        }

        let aspect = meta.aspect_ratio();
        if aspect < rules.min_aspect {
            violations.push(RuleViolation::MinAspect {
                actual: aspect,
                required: rules.min_aspect,
            });
        }
        if aspect > rules.max_aspect {
            violations.push(RuleViolation::MaxAspect {
                actual: aspect,
                allowed: rules.max_aspect,
            });
        }

        if meta.byte_size < rules.min_size_bytes {
            violations.push(RuleViolation::MinSize {
                actual: meta.byte_size,
                required: rules.min_size_bytes,
            });
        }

        FilterDecision { violations }
    }
}
