use async_trait::async_trait;

use super::text::join_natural;
use crate::pipeline::{Annotation, DocumentState, Stage, StageError, StageId};
use crate::report::most_common;

const STORY_ENTITIES: usize = 3;

/// Build a short digest from the main entities and the summary's lead.
pub fn compose_story(entities: &[&str], summary: &[String]) -> Option<String> {
    let mut parts = Vec::new();

    if !entities.is_empty() {
        parts.push(format!("This text is mainly about {}.", join_natural(entities)));
    }
    if let Some(lead) = summary.first() {
        parts.push(format!("In short: {lead}"));
    }
    if let Some(next) = summary.get(1) {
        parts.push(format!("It goes on: {next}"));
    }

    (!parts.is_empty()).then(|| parts.join(" "))
}

/// Templated digest of the document.
pub struct StoryGenerator;

#[async_trait]
impl Stage for StoryGenerator {
    fn id(&self) -> StageId {
        StageId::StoryGenerator
    }

    async fn compute_annotation(&self, state: &DocumentState) -> Result<Annotation, StageError> {
        let top: Vec<String> = match state.annotation(StageId::Ner).await? {
            Some(Annotation::Entities(entities)) => {
                most_common(entities.iter().map(|e| e.text.as_str()), STORY_ENTITIES)
                    .into_iter()
                    .map(|(text, _)| text)
                    .collect()
            }
            _ => Vec::new(),
        };
        let summary: &[String] = match state.annotation(StageId::Summarizer).await? {
            Some(Annotation::Summary(sentences)) => sentences.as_slice(),
            _ => &[],
        };

        let names: Vec<&str> = top.iter().map(String::as_str).collect();
        Ok(compose_story(&names, summary).map_or(Annotation::Empty, Annotation::Story))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_from_entities_and_summary() {
        let story = compose_story(
            &["Mayo Clinic", "Berlin"],
            &[
                "Knee pain is common.".to_string(),
                "Rest helps.".to_string(),
                "Ice too.".to_string(),
            ],
        );
        assert_eq!(
            story.as_deref(),
            Some(
                "This text is mainly about Mayo Clinic and Berlin. \
                 In short: Knee pain is common. It goes on: Rest helps."
            )
        );
    }

    #[test]
    fn test_story_from_summary_only() {
        let story = compose_story(&[], &["Knee pain is common.".to_string()]);
        assert_eq!(story.as_deref(), Some("In short: Knee pain is common."));
    }

    #[test]
    fn test_no_material_no_story() {
        assert_eq!(compose_story(&[], &[]), None);
    }
}
