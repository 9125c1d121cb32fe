//! Layered signal classification.
//!
//! Strategies run in strict precedence order (explicit patterns, emoji
//! shortcuts, scan severity) and the first match wins. Only when none
//! match does the text go to the model provider, bounded by a timeout.
//! Nothing here returns an error to the caller: every failure path lands
//! on the default classification.

use std::sync::Arc;
use std::time::Duration;

use super::level::PriorityLevel;
use super::provider::ClassifyProvider;
use super::tables::{
    ClassifierTables, EMOJI_CONFIDENCE, PATTERN_CONFIDENCE, SEVERITY_CONFIDENCE,
};
use crate::types::{Classification, SignalMetadata, SignalSource};

/// Default deadline for the model fallback call. The provider's own HTTP
/// timeout is usually tighter; this is the hard ceiling.
const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(15);

/// One matching attempt from a pure strategy.
struct StrategyMatch {
    level: PriorityLevel,
    confidence: f64,
    explicit: bool,
    reasoning: String,
}

/// A pure, synchronous classification strategy. Returns None to pass the
/// signal to the next strategy in the list.
trait MatchStrategy: Send + Sync {
    fn try_classify(
        &self,
        text: &str,
        source: SignalSource,
        metadata: Option<&SignalMetadata>,
    ) -> Option<StrategyMatch>;
}

/// Curated regex/keyword table per level.
struct ExplicitPatterns {
    tables: Arc<ClassifierTables>,
}

impl MatchStrategy for ExplicitPatterns {
    fn try_classify(
        &self,
        text: &str,
        _source: SignalSource,
        _metadata: Option<&SignalMetadata>,
    ) -> Option<StrategyMatch> {
        let (level, matched) = self.tables.match_pattern(text)?;
        Some(StrategyMatch {
            level,
            confidence: PATTERN_CONFIDENCE,
            explicit: true,
            reasoning: format!("explicit pattern match: \"{matched}\""),
        })
    }
}

/// Fixed emoji shortcut table.
struct EmojiShortcuts {
    tables: Arc<ClassifierTables>,
}

impl MatchStrategy for EmojiShortcuts {
    fn try_classify(
        &self,
        text: &str,
        _source: SignalSource,
        _metadata: Option<&SignalMetadata>,
    ) -> Option<StrategyMatch> {
        let (level, emoji) = self.tables.match_emoji(text)?;
        Some(StrategyMatch {
            level,
            confidence: EMOJI_CONFIDENCE,
            explicit: false,
            reasoning: format!("emoji shortcut {emoji}"),
        })
    }
}

/// Finding-severity map, applied only to scan-sourced signals that carry
/// a severity in their metadata.
struct ScanSeverity {
    tables: Arc<ClassifierTables>,
}

impl MatchStrategy for ScanSeverity {
    fn try_classify(
        &self,
        _text: &str,
        source: SignalSource,
        metadata: Option<&SignalMetadata>,
    ) -> Option<StrategyMatch> {
        if source != SignalSource::Scan {
            return None;
        }
        let severity = metadata.and_then(|m| m.severity.as_deref())?;
        let level = self.tables.map_severity(severity);
        Some(StrategyMatch {
            level,
            confidence: SEVERITY_CONFIDENCE,
            explicit: false,
            reasoning: format!("scan finding severity \"{severity}\""),
        })
    }
}

/// Classifies one raw signal into a level, score, and confidence.
pub struct SignalClassifier {
    strategies: Vec<Box<dyn MatchStrategy>>,
    provider: Arc<dyn ClassifyProvider>,
    provider_timeout: Duration,
}

impl SignalClassifier {
    pub fn new(tables: ClassifierTables, provider: Arc<dyn ClassifyProvider>) -> Self {
        let tables = Arc::new(tables);
        let strategies: Vec<Box<dyn MatchStrategy>> = vec![
            Box::new(ExplicitPatterns {
                tables: tables.clone(),
            }),
            Box::new(EmojiShortcuts {
                tables: tables.clone(),
            }),
            Box::new(ScanSeverity { tables }),
        ];
        Self {
            strategies,
            provider,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Override the model-fallback deadline.
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// The classification used when nothing matched and the model path
    /// failed. Score is fixed at 50, not band-derived.
    pub fn default_classification() -> Classification {
        Classification {
            level: PriorityLevel::P2,
            score: 50,
            confidence: 0.5,
            explicit: false,
            reasoning: "default — no clear priority indicators".to_string(),
        }
    }

    /// Classify one raw signal. Strategy order is fixed; the first match
    /// wins with no fall-through. Never errors.
    pub async fn classify(
        &self,
        text: &str,
        source: SignalSource,
        metadata: Option<&SignalMetadata>,
    ) -> Classification {
        for strategy in &self.strategies {
            if let Some(m) = strategy.try_classify(text, source, metadata) {
                return Classification {
                    level: m.level,
                    score: m.level.score_for_confidence(m.confidence),
                    confidence: m.confidence,
                    explicit: m.explicit,
                    reasoning: m.reasoning,
                };
            }
        }

        match tokio::time::timeout(self.provider_timeout, self.provider.classify_text(text)).await
        {
            Ok(Ok(guess)) => Classification {
                level: guess.level,
                score: guess.level.score_for_confidence(guess.confidence),
                confidence: guess.confidence,
                explicit: false,
                reasoning: guess.reasoning,
            },
            Ok(Err(e)) => {
                log::warn!("Model classification failed, using default: {}", e);
                Self::default_classification()
            }
            Err(_) => {
                log::warn!(
                    "Model classification timed out after {:?}, using default",
                    self.provider_timeout
                );
                Self::default_classification()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priority::provider::{ProviderClassification, ProviderError};
    use async_trait::async_trait;

    /// Deterministic stub: returns a fixed result or a fixed error.
    struct StubProvider {
        result: Result<ProviderClassification, &'static str>,
    }

    #[async_trait]
    impl ClassifyProvider for StubProvider {
        async fn classify_text(
            &self,
            _text: &str,
        ) -> Result<ProviderClassification, ProviderError> {
            self.result
                .clone()
                .map_err(|e| ProviderError::Request(e.to_string()))
        }
    }

    /// Stub that never resolves within any reasonable deadline.
    struct HangingProvider;

    #[async_trait]
    impl ClassifyProvider for HangingProvider {
        async fn classify_text(
            &self,
            _text: &str,
        ) -> Result<ProviderClassification, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(ProviderError::Unconfigured)
        }
    }

    fn classifier_with(provider: Arc<dyn ClassifyProvider>) -> SignalClassifier {
        SignalClassifier::new(ClassifierTables::default(), provider)
    }

    fn failing_classifier() -> SignalClassifier {
        classifier_with(Arc::new(StubProvider {
            result: Err("connection refused"),
        }))
    }

    #[tokio::test]
    async fn pattern_match_wins_over_emoji_with_fixed_confidence() {
        let c = failing_classifier();
        // 🚨 is in both the pattern table and the emoji table; pattern
        // precedence decides, so confidence is 0.95 not 0.9.
        let result = c
            .classify("🚨 prod is down", SignalSource::ChatInterface, None)
            .await;
        assert_eq!(result.level, PriorityLevel::P0);
        assert_eq!(result.confidence, 0.95);
        assert!(result.explicit);
        assert!(result.score >= 90 && result.score <= 100);
    }

    #[tokio::test]
    async fn pattern_confidence_ignores_source() {
        let c = failing_classifier();
        for source in [
            SignalSource::ChatInterface,
            SignalSource::IssueTracker,
            SignalSource::Dashboard,
            SignalSource::Scan,
            SignalSource::Orchestrator,
        ] {
            let result = c.classify("this is urgent", source, None).await;
            assert_eq!(result.level, PriorityLevel::P0);
            assert_eq!(result.confidence, 0.95);
        }
    }

    #[tokio::test]
    async fn nice_to_have_lands_in_p3_band() {
        let c = failing_classifier();
        let result = c
            .classify("nice to have: dark mode", SignalSource::IssueTracker, None)
            .await;
        assert_eq!(result.level, PriorityLevel::P3);
        assert!(result.score <= 39);
    }

    #[tokio::test]
    async fn emoji_shortcut_applies_when_no_pattern_matches() {
        let c = failing_classifier();
        let result = c
            .classify("🟢 polish the empty state", SignalSource::ChatInterface, None)
            .await;
        assert_eq!(result.level, PriorityLevel::P3);
        assert_eq!(result.confidence, 0.9);
        assert!(!result.explicit);
    }

    #[tokio::test]
    async fn scan_severity_maps_critical_to_p0() {
        let c = failing_classifier();
        let metadata = SignalMetadata {
            severity: Some("critical".to_string()),
        };
        let result = c
            .classify("finding: exposed bucket", SignalSource::Scan, Some(&metadata))
            .await;
        assert_eq!(result.level, PriorityLevel::P0);
        assert_eq!(result.confidence, 0.9);
    }

    #[tokio::test]
    async fn severity_is_ignored_for_non_scan_sources() {
        let c = failing_classifier();
        let metadata = SignalMetadata {
            severity: Some("critical".to_string()),
        };
        // No pattern/emoji match either, so this falls through to the
        // (failing) provider and comes back as the default.
        let result = c
            .classify(
                "please take a look at the report",
                SignalSource::IssueTracker,
                Some(&metadata),
            )
            .await;
        assert_eq!(result, SignalClassifier::default_classification());
    }

    #[tokio::test]
    async fn provider_result_is_scored_through_the_band() {
        let c = classifier_with(Arc::new(StubProvider {
            result: Ok(ProviderClassification {
                level: PriorityLevel::P1,
                confidence: 0.8,
                reasoning: "sounds time-sensitive".to_string(),
            }),
        }));
        let result = c
            .classify("can we revisit the rollout?", SignalSource::ChatInterface, None)
            .await;
        assert_eq!(result.level, PriorityLevel::P1);
        assert!(!result.explicit);
        // 70 + round(19 * 0.8) = 85
        assert_eq!(result.score, 85);
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_default() {
        let c = failing_classifier();
        let result = c
            .classify("ambiguous request", SignalSource::Orchestrator, None)
            .await;
        assert_eq!(result.level, PriorityLevel::P2);
        assert_eq!(result.score, 50);
        assert_eq!(result.confidence, 0.5);
        assert!(!result.explicit);
    }

    #[tokio::test]
    async fn provider_timeout_degrades_to_default() {
        let c = classifier_with(Arc::new(HangingProvider))
            .with_provider_timeout(Duration::from_millis(20));
        let result = c
            .classify("ambiguous request", SignalSource::ChatInterface, None)
            .await;
        assert_eq!(result, SignalClassifier::default_classification());
    }

    #[tokio::test]
    async fn classification_is_deterministic() {
        let c = failing_classifier();
        let a = c
            .classify("P1: fix the flaky importer", SignalSource::IssueTracker, None)
            .await;
        let b = c
            .classify("P1: fix the flaky importer", SignalSource::IssueTracker, None)
            .await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn every_classification_score_sits_in_its_band() {
        let c = failing_classifier();
        let samples = [
            "urgent: checkout 500s",
            "🔥",
            "high priority cleanup",
            "P2 refactor",
            "no rush on this one",
            "completely ambiguous words",
        ];
        for text in samples {
            let result = c.classify(text, SignalSource::ChatInterface, None).await;
            let band = result.level.score_band();
            assert!(
                band.contains(result.score),
                "{text:?} scored {} outside {:?} band",
                result.score,
                result.level
            );
        }
    }
}
