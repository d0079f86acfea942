use std::time::Duration;

use async_trait::async_trait;

use super::{GenerationError, ResponseGenerator};
use crate::email::Email;

pub const DEFAULT_TEMPLATE_DELAY: Duration = Duration::from_millis(2000);

/// Placeholder generator that fills a canned reply after a simulated
/// delay. Stands in for a model until one is configured.
#[derive(Clone, Debug)]
pub struct TemplateGenerator {
    delay: Duration,
}

impl Default for TemplateGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE_DELAY)
    }
}

impl TemplateGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn render(email: &Email) -> String {
        format!(
            "Hello {},\n\nThank you for contacting our support team regarding \"{}\". I understand your concern and I'm here to help.\n\n[AI-generated response would be more specific based on the email content]\n\nPlease let me know if you need any further assistance.\n\nBest regards,\nSupport Team",
            email.sender_local_part(),
            email.subject
        )
    }
}

#[async_trait]
impl ResponseGenerator for TemplateGenerator {
    async fn generate(&self, email: &Email) -> Result<String, GenerationError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Self::render(email))
    }

    fn name(&self) -> &'static str {
        "template"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::Corpus;

    #[tokio::test]
    async fn it_fills_the_template() {
        let corpus = Corpus::seed();
        let email = corpus.get("3").unwrap();
        let text = TemplateGenerator::new(Duration::ZERO)
            .generate(email)
            .await
            .unwrap();

        assert!(text.starts_with("Hello lisa.chen,\n\n"));
        assert!(text.contains("regarding \"Feature Request - Bulk Data Export\""));
        assert!(text.ends_with("Best regards,\nSupport Team"));
    }
}
