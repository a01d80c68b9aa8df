use std::time::Duration;

use anyhow::{ensure, Result};
use async_trait::async_trait;

use crate::config::GENERATION_DELAY;

/// Prompts offered on the dashboard when no prompt is given.
pub const SUGGESTIONS: [&str; 5] = [
    "Todo app with categories",
    "Weather app with forecasts",
    "Recipe sharing platform",
    "Expense tracker",
    "Fitness workout planner",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub prompt: String,
    pub summary: String,
    pub sections: Vec<Section>,
    pub closing: String,
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn submit(&self, prompt: &str) -> Result<GeneratedArtifact>;
}

/// Answers every prompt with the same plan after a fixed delay.
#[derive(Debug, Clone)]
pub struct CannedGenerator {
    pub delay: Duration,
}

impl Default for CannedGenerator {
    fn default() -> Self {
        Self {
            delay: GENERATION_DELAY,
        }
    }
}

fn section(title: &str, items: &[&str]) -> Section {
    Section {
        title: title.to_string(),
        items: items.iter().map(|item| (*item).to_string()).collect(),
    }
}

const CLOSING: &str =
    "This app will be production-ready. Would you like me to proceed with the development?";

pub fn validate_prompt(prompt: &str) -> Result<&str> {
    let prompt = prompt.trim();

    ensure!(
        !prompt.is_empty(),
        "Please enter a prompt to generate your app"
    );

    Ok(prompt)
}

#[async_trait]
impl Generator for CannedGenerator {
    async fn submit(&self, prompt: &str) -> Result<GeneratedArtifact> {
        let prompt = validate_prompt(prompt)?;

        log::debug!("generating for {prompt:?} in {:?}", self.delay);
        tokio::time::sleep(self.delay).await;

        Ok(GeneratedArtifact {
            prompt: prompt.to_string(),
            summary: format!(
                "I'll help you build \"{prompt}\". Here's what I can create for you:"
            ),
            sections: vec![
                section(
                    "App Structure",
                    &[
                        "Modern React Native interface",
                        "User authentication system",
                        "Data persistence with local storage",
                        "Responsive design for all devices",
                    ],
                ),
                section(
                    "Core Features",
                    &[
                        "Clean, intuitive user interface",
                        "Real-time data synchronization",
                        "Push notifications",
                        "Offline functionality",
                    ],
                ),
                section(
                    "Design Elements",
                    &[
                        "Modern Material Design",
                        "Custom color scheme",
                        "Smooth animations",
                        "Accessibility features",
                    ],
                ),
            ],
            closing: CLOSING.to_string(),
        })
    }
}
