//! Evaluation harness
//!
//! Runs several extractors over the same document and samples their output
//! for manual review. Extractors are independent: their records are neither
//! merged nor deduplicated, and one failing does not stop the others.

use futures::future::join_all;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use triplex_core::{Document, RelationRecord, Result, TriplexError};

use crate::RelationExtractor;

/// Output of one extractor on one document
#[derive(Debug)]
pub struct ExtractorReport {
    pub name: String,
    pub records: Result<Vec<RelationRecord>>,
}

impl ExtractorReport {
    /// Up to `n` distinct records, chosen at random
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<&RelationRecord> {
        match &self.records {
            Ok(records) => sample_records(records, n, rng),
            Err(_) => Vec::new(),
        }
    }
}

/// A named set of extractors run side by side
pub struct Evaluation {
    extractors: Vec<(String, Box<dyn RelationExtractor>)>,
}

impl Evaluation {
    /// Pair extractors with display names.
    ///
    /// Fails before anything runs when the two lists differ in length.
    pub fn new(extractors: Vec<Box<dyn RelationExtractor>>, names: Vec<String>) -> Result<Self> {
        if extractors.len() != names.len() {
            return Err(TriplexError::ValidationError(format!(
                "{} extractors but {} names; both lists must have the same length",
                extractors.len(),
                names.len()
            )));
        }

        Ok(Self {
            extractors: names.into_iter().zip(extractors).collect(),
        })
    }

    /// Use each extractor's own name
    pub fn from_extractors(extractors: Vec<Box<dyn RelationExtractor>>) -> Self {
        Self {
            extractors: extractors
                .into_iter()
                .map(|e| (e.name().to_string(), e))
                .collect(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.extractors.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Run every extractor on `document`; reports keep registration order
    pub async fn run(&self, document: &Document) -> Vec<ExtractorReport> {
        let runs = self.extractors.iter().map(|(name, extractor)| async move {
            let records = extractor.extract(document).await;
            match &records {
                Ok(found) => info!(extractor = %name, records = found.len(), "extraction done"),
                Err(e) => warn!(extractor = %name, error = %e, "extraction failed"),
            }
            ExtractorReport {
                name: name.clone(),
                records,
            }
        });

        join_all(runs).await
    }
}

/// Up to `n` distinct records chosen uniformly at random
pub fn sample_records<'a, R: Rng + ?Sized>(
    records: &'a [RelationRecord],
    n: usize,
    rng: &mut R,
) -> Vec<&'a RelationRecord> {
    records.choose_multiple(rng, n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PatternExtractor, StructuralExtractor};
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use triplex_core::{DepLabel, DocumentBuilder, PartOfSpeech};

    struct Broken;

    #[async_trait]
    impl RelationExtractor for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn extract(&self, _document: &Document) -> Result<Vec<RelationRecord>> {
            Err(TriplexError::LlmError("offline".to_string()))
        }
    }

    fn sentence() -> Document {
        let mut b = DocumentBuilder::new();
        b.push("Pitt", PartOfSpeech::ProperNoun, DepLabel::NominalSubject, 1);
        b.push("married", PartOfSpeech::Verb, DepLabel::Other, 1);
        b.push("Aniston", PartOfSpeech::ProperNoun, DepLabel::DirectObject, 1);
        b.build().unwrap()
    }

    #[test]
    fn test_mismatched_lengths_fail_fast() {
        let result = Evaluation::new(
            vec![Box::new(StructuralExtractor), Box::new(PatternExtractor)],
            vec!["Complex Extractor".to_string()],
        );
        assert!(matches!(result, Err(TriplexError::ValidationError(_))));
    }

    #[test]
    fn test_custom_names() {
        let evaluation = Evaluation::new(
            vec![Box::new(PatternExtractor), Box::new(StructuralExtractor)],
            vec!["Simple".to_string(), "Complex".to_string()],
        )
        .unwrap();
        assert_eq!(evaluation.names().collect::<Vec<_>>(), vec!["Simple", "Complex"]);
    }

    #[tokio::test]
    async fn test_run_keeps_order_and_isolates_failures() {
        let evaluation = Evaluation::from_extractors(vec![
            Box::new(PatternExtractor),
            Box::new(Broken),
            Box::new(StructuralExtractor),
        ]);

        let reports = evaluation.run(&sentence()).await;
        let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["pattern", "broken", "structural"]);

        let expected = vec![RelationRecord::new("Pitt", "married", "Aniston")];
        assert_eq!(reports[0].records.as_ref().unwrap(), &expected);
        assert!(reports[1].records.is_err());
        assert_eq!(reports[2].records.as_ref().unwrap(), &expected);
    }

    #[test]
    fn test_sample_is_bounded_and_distinct() {
        let records: Vec<RelationRecord> = (0..10)
            .map(|i| RelationRecord::new(format!("S{i}"), "met", "O"))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);

        let sample = sample_records(&records, 5, &mut rng);
        assert_eq!(sample.len(), 5);
        let mut unique = sample.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 5);

        assert_eq!(sample_records(&records[..3], 5, &mut rng).len(), 3);
        assert!(sample_records(&[], 5, &mut rng).is_empty());
    }

    #[test]
    fn test_failed_report_samples_nothing() {
        let report = ExtractorReport {
            name: "llm".to_string(),
            records: Err(TriplexError::LlmError("offline".to_string())),
        };
        assert!(report.sample(5, &mut StdRng::seed_from_u64(1)).is_empty());
    }
}
