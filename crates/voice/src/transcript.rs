/// Collapses the interim transcript stream of one utterance into a draft.
#[derive(Debug, Default, Clone)]
pub struct TranscriptAssembler {
    draft: String,
}

impl TranscriptAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the draft with the latest set of recognizer results. Each
    /// result is trimmed and results are joined with single spaces.
    pub fn update<S: AsRef<str>>(&mut self, results: &[S]) -> &str {
        self.draft = results
            .iter()
            .map(|result| result.as_ref().trim())
            .filter(|result| !result.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        &self.draft
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Final string for the utterance, clearing the draft. Empty utterances
    /// yield `None`.
    pub fn finish(&mut self) -> Option<String> {
        let draft = std::mem::take(&mut self.draft);
        Some(draft).filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_trimmed_results() {
        let mut transcript = TranscriptAssembler::new();
        transcript.update(&[" find ", "the price  "]);
        assert_eq!(transcript.draft(), "find the price");
    }

    #[test]
    fn later_results_replace_the_draft() {
        let mut transcript = TranscriptAssembler::new();
        transcript.update(&["fin"]);
        transcript.update(&["find the", "price"]);
        assert_eq!(transcript.finish().as_deref(), Some("find the price"));
        assert_eq!(transcript.draft(), "");
    }

    #[test]
    fn silence_finishes_empty() {
        let mut transcript = TranscriptAssembler::new();
        transcript.update(&["  ", ""]);
        assert!(transcript.finish().is_none());
    }
}
