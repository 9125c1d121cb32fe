//! Classifier lookup tables: explicit patterns, emoji shortcuts, and the
//! scan severity map.
//!
//! The tables are construction data handed to `SignalClassifier`, not
//! module globals, so tests (and unusual deployments) can substitute
//! alternates. `ClassifierTables::default()` builds the curated set.

use regex::Regex;

use super::level::PriorityLevel;

/// Confidence assigned to an explicit pattern match.
pub const PATTERN_CONFIDENCE: f64 = 0.95;
/// Confidence assigned to an emoji shortcut match.
pub const EMOJI_CONFIDENCE: f64 = 0.9;
/// Confidence assigned to a scan severity mapping.
pub const SEVERITY_CONFIDENCE: f64 = 0.9;

/// Lookup tables consumed by the classification strategies, checked in
/// declaration order within each table.
pub struct ClassifierTables {
    /// Explicit keyword/regex patterns per level, most severe first.
    pub patterns: Vec<(Regex, PriorityLevel)>,
    /// Emoji shortcut table (substring match).
    pub emoji: Vec<(String, PriorityLevel)>,
    /// Scan finding severity map (lowercased severity string).
    pub severity: Vec<(String, PriorityLevel)>,
}

impl Default for ClassifierTables {
    fn default() -> Self {
        let patterns = vec![
            (
                r"(?i)\b(p0|sev[ -]?0|critical|urgent|emergency|asap|blocker|drop everything)\b|🚨|prod(?:uction)? (?:is )?down",
                PriorityLevel::P0,
            ),
            (
                r"(?i)\b(p1|sev[ -]?1|high priority|important|blocking|this week|soon)\b",
                PriorityLevel::P1,
            ),
            (
                r"(?i)\b(p2|medium priority|normal priority|next sprint|when you can)\b",
                PriorityLevel::P2,
            ),
            (
                r"(?i)\b(p3|low priority|backlog|someday|eventually|whenever)\b|(?i:nice[ -]to[ -]have|no rush)",
                PriorityLevel::P3,
            ),
        ]
        .into_iter()
        // Built-in patterns; a failure here is a programming error.
        .map(|(re, level)| (Regex::new(re).unwrap(), level))
        .collect();

        let emoji = [
            ("🔴", PriorityLevel::P0),
            ("🚨", PriorityLevel::P0),
            ("🔥", PriorityLevel::P0),
            ("🟠", PriorityLevel::P1),
            ("⚡", PriorityLevel::P1),
            ("🟡", PriorityLevel::P2),
            ("🔵", PriorityLevel::P2),
            ("🟢", PriorityLevel::P3),
            ("📋", PriorityLevel::P3),
        ]
        .into_iter()
        .map(|(e, level)| (e.to_string(), level))
        .collect();

        let severity = [
            ("critical", PriorityLevel::P0),
            ("high", PriorityLevel::P1),
            ("medium", PriorityLevel::P2),
            ("low", PriorityLevel::P3),
        ]
        .into_iter()
        .map(|(s, level)| (s.to_string(), level))
        .collect();

        ClassifierTables {
            patterns,
            emoji,
            severity,
        }
    }
}

impl ClassifierTables {
    /// First explicit pattern matching `text`, in table order.
    pub fn match_pattern(&self, text: &str) -> Option<(PriorityLevel, String)> {
        for (re, level) in &self.patterns {
            if let Some(m) = re.find(text) {
                return Some((*level, m.as_str().to_string()));
            }
        }
        None
    }

    /// First emoji shortcut present in `text`, in table order.
    pub fn match_emoji(&self, text: &str) -> Option<(PriorityLevel, &str)> {
        self.emoji
            .iter()
            .find(|(e, _)| text.contains(e.as_str()))
            .map(|(e, level)| (*level, e.as_str()))
    }

    /// Map a finding severity string. Unknown severities land in the
    /// neutral P2 bucket rather than erroring.
    pub fn map_severity(&self, severity: &str) -> PriorityLevel {
        let needle = severity.trim().to_lowercase();
        match self.severity.iter().find(|(s, _)| *s == needle) {
            Some((_, level)) => *level,
            None => {
                log::debug!("Unknown scan severity '{}', using neutral bucket", severity);
                PriorityLevel::P2
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_table_checks_severe_levels_first() {
        let tables = ClassifierTables::default();
        // "urgent" (P0) and "backlog" (P3) both present; P0 row wins.
        let (level, matched) = tables.match_pattern("urgent backlog cleanup").unwrap();
        assert_eq!(level, PriorityLevel::P0);
        assert_eq!(matched.to_lowercase(), "urgent");
    }

    #[test]
    fn siren_emoji_is_also_an_explicit_pattern() {
        let tables = ClassifierTables::default();
        let (level, _) = tables.match_pattern("🚨 prod is down").unwrap();
        assert_eq!(level, PriorityLevel::P0);
    }

    #[test]
    fn emoji_table_maps_both_ends() {
        let tables = ClassifierTables::default();
        assert_eq!(tables.match_emoji("🔥 look at this").unwrap().0, PriorityLevel::P0);
        assert_eq!(tables.match_emoji("📋 triage later").unwrap().0, PriorityLevel::P3);
        assert!(tables.match_emoji("plain text").is_none());
    }

    #[test]
    fn severity_map_handles_case_and_unknowns() {
        let tables = ClassifierTables::default();
        assert_eq!(tables.map_severity("CRITICAL"), PriorityLevel::P0);
        assert_eq!(tables.map_severity("low"), PriorityLevel::P3);
        assert_eq!(tables.map_severity("informational"), PriorityLevel::P2);
    }
}
