use serde::{Deserialize, Serialize};

/// Closed set of analysis stages a pipeline can be assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Cleaner,
    Tagger,
    Sentencizer,
    Parser,
    Ner,
    Summarizer,
    RougeScorer,
    HealthAnalyzer,
    Readability,
    ReportCollector,
    StoryGenerator,
}

impl StageId {
    pub const ALL: [Self; 11] = [
        Self::Cleaner,
        Self::Tagger,
        Self::Sentencizer,
        Self::Parser,
        Self::Ner,
        Self::Summarizer,
        Self::RougeScorer,
        Self::HealthAnalyzer,
        Self::Readability,
        Self::ReportCollector,
        Self::StoryGenerator,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cleaner => "cleaner",
            Self::Tagger => "tagger",
            Self::Sentencizer => "sentencizer",
            Self::Parser => "parser",
            Self::Ner => "ner",
            Self::Summarizer => "summarizer",
            Self::RougeScorer => "rouge_scorer",
            Self::HealthAnalyzer => "health_analyzer",
            Self::Readability => "readability",
            Self::ReportCollector => "report_collector",
            Self::StoryGenerator => "story_generator",
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StageId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cleaner" => Ok(Self::Cleaner),
            "tagger" => Ok(Self::Tagger),
            "sentencizer" => Ok(Self::Sentencizer),
            "parser" => Ok(Self::Parser),
            "ner" => Ok(Self::Ner),
            "summarizer" => Ok(Self::Summarizer),
            "rouge_scorer" => Ok(Self::RougeScorer),
            "health_analyzer" => Ok(Self::HealthAnalyzer),
            "readability" => Ok(Self::Readability),
            "report_collector" => Ok(Self::ReportCollector),
            "story_generator" => Ok(Self::StoryGenerator),
            _ => Err(crate::Error::UnknownStage(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for id in StageId::ALL {
            assert_eq!(id.as_str().parse::<StageId>().unwrap(), id);
        }
    }

    #[test]
    fn test_unknown_name() {
        assert!(matches!(
            "lemmatizer".parse::<StageId>(),
            Err(crate::Error::UnknownStage(name)) if name == "lemmatizer"
        ));
    }

    #[test]
    fn test_serde_uses_stage_names() {
        assert_eq!(
            serde_json::to_string(&StageId::RougeScorer).unwrap(),
            "\"rouge_scorer\""
        );
    }
}
