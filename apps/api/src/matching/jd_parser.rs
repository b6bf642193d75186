//! JD Parser: extracts title, skills and requirement lines from a raw job description.

use std::sync::Arc;

use tracing::debug;

use crate::errors::AppError;
use crate::llm_client::{generate_json, TextGenerator};
use crate::matching::prompts::{JD_PARSE_PROMPT_TEMPLATE, JD_PARSE_SYSTEM};
use crate::models::job::JobDescriptionMetadata;

#[derive(Clone)]
pub struct JdParser {
    llm: Arc<dyn TextGenerator>,
}

impl JdParser {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    /// Parses a job description with the model. A blank description yields empty
    /// metadata without a model call.
    pub async fn parse(&self, jd_text: &str) -> Result<JobDescriptionMetadata, AppError> {
        if jd_text.trim().is_empty() {
            return Ok(JobDescriptionMetadata::default());
        }

        let prompt = JD_PARSE_PROMPT_TEMPLATE.replace("{jd_text}", jd_text);
        let mut metadata: JobDescriptionMetadata =
            generate_json(self.llm.as_ref(), &prompt, JD_PARSE_SYSTEM).await?;
        metadata.raw_text = jd_text.to_string();

        debug!(
            "JD parsed: {} skills, {} requirements",
            metadata.skills.len(),
            metadata.requirements.len()
        );
        Ok(metadata)
    }
}
