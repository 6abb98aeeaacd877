//! Built-in classroom tools
//!
//! Each tool builds a single prompt from its inputs and renders the model's
//! answer under a fixed heading.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;

use super::handler::{InputField, RenderedOutput, ToolContext, ToolDescriptor, ToolError, ToolHandler, ToolInput};

const RESULT_TITLE: &str = "Result";

pub const CONCEPT_EXPLAINER: &str = "concept_explainer";
pub const EXCUSE_GENERATOR: &str = "excuse_generator";
pub const LYRICIST: &str = "lyricist";
pub const EMOJI_ENCODER: &str = "emoji_encoder";

/// Default display order
pub const DEFAULT_TOOLS: &[&str] = &[CONCEPT_EXPLAINER, EXCUSE_GENERATOR, LYRICIST, EMOJI_ENCODER];

type Factory = fn() -> Arc<dyn ToolHandler>;

static CATALOG: Lazy<HashMap<&'static str, Factory>> = Lazy::new(|| {
    let mut catalog: HashMap<&'static str, Factory> = HashMap::new();
    catalog.insert(CONCEPT_EXPLAINER, || Arc::new(ConceptExplainer) as Arc<dyn ToolHandler>);
    catalog.insert(EXCUSE_GENERATOR, || Arc::new(ExcuseGenerator) as Arc<dyn ToolHandler>);
    catalog.insert(LYRICIST, || Arc::new(Lyricist) as Arc<dyn ToolHandler>);
    catalog.insert(EMOJI_ENCODER, || Arc::new(EmojiEncoder) as Arc<dyn ToolHandler>);
    catalog
});

/// Instantiate a built-in tool by name
pub fn create(name: &str) -> Option<Arc<dyn ToolHandler>> {
    CATALOG.get(name).map(|factory| factory())
}

const AUDIENCES: &[&str] = &["Five-year-old", "High-school student", "University professor"];

/// Explains a concept at a chosen level
pub struct ConceptExplainer;

#[async_trait]
impl ToolHandler for ConceptExplainer {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            title: "Concept Explainer".to_string(),
            description: "Enter a complex concept and choose the target audience.".to_string(),
            fields: vec![
                InputField::long_text("topic", "Concept to explain"),
                InputField::choice("audience", "Target audience", AUDIENCES),
            ],
        }
    }

    async fn run(&self, ctx: &ToolContext<'_>, input: &ToolInput) -> Result<RenderedOutput, ToolError> {
        let topic = input.required_text("topic", "Please enter a topic first.")?;
        let audience = AUDIENCES[input.choice("audience", AUDIENCES)?];

        let prompt = format!(
            "Explain the concept '{}' specifically for a {}.",
            topic,
            audience.to_lowercase()
        );
        let answer = ctx.query(&prompt).await?;
        Ok(RenderedOutput::new(RESULT_TITLE, answer))
    }
}

/// Produces an excuse for a social slip, with adjustable absurdity
pub struct ExcuseGenerator;

impl ExcuseGenerator {
    const MIN_ABSURDITY: i64 = 1;
    const MAX_ABSURDITY: i64 = 10;
    const DEFAULT_ABSURDITY: i64 = 5;
}

#[async_trait]
impl ToolHandler for ExcuseGenerator {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            title: "Excuse Generator".to_string(),
            description: "Create an excuse for a social slip.".to_string(),
            fields: vec![
                InputField::text("situation", "What went wrong? (e.g. 'I forgot my homework')"),
                InputField::range(
                    "absurdity",
                    "Absurdity level",
                    Self::MIN_ABSURDITY,
                    Self::MAX_ABSURDITY,
                    Self::DEFAULT_ABSURDITY,
                ),
            ],
        }
    }

    async fn run(&self, ctx: &ToolContext<'_>, input: &ToolInput) -> Result<RenderedOutput, ToolError> {
        let situation = input.required_text("situation", "Please describe what went wrong first.")?;
        let absurdity = input.range(
            "absurdity",
            Self::MIN_ABSURDITY,
            Self::MAX_ABSURDITY,
            Self::DEFAULT_ABSURDITY,
        )?;

        let prompt = format!(
            "Write a short excuse for this situation: '{}'. \
             On a scale from 1 (entirely believable) to 10 (completely absurd), \
             the excuse should be a {}.",
            situation, absurdity
        );
        let answer = ctx.query(&prompt).await?;
        Ok(RenderedOutput::new("Your excuse", answer))
    }
}

const STYLES: &[&str] = &["Old School", "Trap", "Mumble Rap"];

/// Writes hip-hop lyrics on a topic
pub struct Lyricist;

#[async_trait]
impl ToolHandler for Lyricist {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            title: "Hip-Hop Lyricist".to_string(),
            description: "Give a style and a topic.".to_string(),
            fields: vec![
                InputField::text("topic", "Topic (e.g. 'Quantum Physics', 'The school canteen')"),
                InputField::choice("style", "Style", STYLES),
            ],
        }
    }

    async fn run(&self, ctx: &ToolContext<'_>, input: &ToolInput) -> Result<RenderedOutput, ToolError> {
        let topic = input.required_text("topic", "Please enter a topic first.")?;
        let style = STYLES[input.choice("style", STYLES)?];

        let prompt = format!(
            "Write a verse and a chorus of {} hip-hop lyrics about '{}'.",
            style, topic
        );
        let answer = ctx.query(&prompt).await?;
        Ok(RenderedOutput::new("Lyrics", answer))
    }
}

/// Re-encodes a message using only emojis
pub struct EmojiEncoder;

#[async_trait]
impl ToolHandler for EmojiEncoder {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            title: "Emoji Encoder".to_string(),
            description: "Translate your text into emojis only.".to_string(),
            fields: vec![InputField::long_text("message", "Message to encode")],
        }
    }

    async fn run(&self, ctx: &ToolContext<'_>, input: &ToolInput) -> Result<RenderedOutput, ToolError> {
        let message = input.required_text("message", "Please enter a message first.")?;

        let prompt = format!(
            "Translate the following message using only emojis, with no words: '{}'",
            message
        );
        let answer = ctx.query(&prompt).await?;
        Ok(RenderedOutput::new("Encoded", answer))
    }
}
