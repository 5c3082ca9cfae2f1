use async_trait::async_trait;
use tracing::warn;

use crate::pipeline::{
    ActiveStages, Annotation, Applied, DocumentState, PosTag, Stage, StageError, StageId, Token,
};

/// Maximal runs of determiners, modifiers and nouns that contain a noun.
pub fn noun_chunks(text: &str, tokens: &[Token], tags: &[PosTag]) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut run: Option<(usize, usize)> = None;
    let mut has_noun = false;

    let mut close = |run: &mut Option<(usize, usize)>, has_noun: &mut bool| {
        if let Some((start, end)) = run.take() {
            if *has_noun {
                chunks.push(text[start..end].to_string());
            }
        }
        *has_noun = false;
    };

    for (token, tag) in tokens.iter().zip(tags) {
        match tag {
            PosTag::Noun | PosTag::Propn => {
                has_noun = true;
                run = Some(run.map_or((token.start, token.end), |(start, _)| (start, token.end)));
            }
            // a modifier after the head noun starts a new phrase
            PosTag::Det | PosTag::Adj | PosTag::Num if !has_noun => {
                run = Some(run.map_or((token.start, token.end), |(start, _)| (start, token.end)));
            }
            PosTag::Det | PosTag::Adj | PosTag::Num => {
                close(&mut run, &mut has_noun);
                run = Some((token.start, token.end));
            }
            _ => close(&mut run, &mut has_noun),
        }
    }
    close(&mut run, &mut has_noun);

    chunks
}

/// Noun-chunk extraction over the tagger's output.
pub struct Parser;

#[async_trait]
impl Stage for Parser {
    fn id(&self) -> StageId {
        StageId::Parser
    }

    fn apply(&self, _state: &mut DocumentState, active: &ActiveStages) -> Result<Applied, StageError> {
        if !active.contains(StageId::Tagger) {
            warn!("Parser needs the tagger; noun chunks will be empty");
            return Ok(Applied::Ready(Annotation::Empty));
        }
        Ok(Applied::Deferred)
    }

    async fn compute_annotation(&self, state: &DocumentState) -> Result<Annotation, StageError> {
        match state.annotation(StageId::Tagger).await? {
            Some(Annotation::Tags(tags)) => Ok(Annotation::NounChunks(noun_chunks(
                state.text(),
                state.tokens(),
                tags,
            ))),
            _ => Ok(Annotation::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::tagger::tag_tokens;
    use crate::pipeline::tokenize;
    use std::collections::HashSet;

    fn chunks(text: &str) -> Vec<String> {
        let tokens = tokenize(text, &HashSet::new());
        let tags = tag_tokens(&tokens);
        noun_chunks(text, &tokens, &tags)
    }

    #[test]
    fn test_noun_chunks() {
        assert_eq!(
            chunks("The chronic knee pain affects the patient."),
            vec!["The chronic knee pain", "the patient"]
        );
    }

    #[test]
    fn test_modifier_without_noun_is_dropped() {
        assert_eq!(chunks("It is chronic."), Vec::<String>::new());
    }
}
