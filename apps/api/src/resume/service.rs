//! Resume analysis: document text to LLM to job search parameters.
//!
//! Unlike job analysis, provider errors are not absorbed here: a failed
//! resume analysis has no meaningful degraded form.

use std::sync::Arc;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::errors::AppError;
use crate::llm_client::parser::extract_json_object;
use crate::llm_client::LlmClient;
use crate::resume::extract::{extract_text, DocumentKind};
use crate::resume::prompts::{resume_analysis_prompt, RESUME_ANALYSIS_TEMPERATURE};

/// Search parameters derived from a resume, shaped for `POST /api/scrape`
/// and the analysis constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeSearchParams {
    pub search_term: String,
    pub location: String,
    pub experience_years: u32,
    pub required_skills: Vec<String>,
}

pub struct ResumeAnalysisService {
    llm: Arc<dyn LlmClient>,
}

impl ResumeAnalysisService {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn analyze_resume(
        &self,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<ResumeSearchParams, AppError> {
        info!("Starting resume analysis ({content_type}, {} bytes)", content.len());

        // Reject unsupported types before doing any work.
        let kind = DocumentKind::from_mime(content_type)?;
        let text = extract_text(kind, content).await.map_err(|e| {
            error!("Error extracting resume text: {e:#}");
            AppError::Validation(format!("{e:#}"))
        })?;

        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "No text could be extracted from the uploaded document".to_string(),
            ));
        }

        let prompt = resume_analysis_prompt(&text);
        let response = self
            .llm
            .generate(&prompt, None, RESUME_ANALYSIS_TEMPERATURE)
            .await
            .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))?;

        let params = parse_resume_analysis(&response).map_err(|e| {
            error!("Error parsing resume analysis response: {e}");
            AppError::Internal(e)
        })?;

        info!("Resume analysis completed successfully");
        Ok(params)
    }
}

/// Reads the first `{` … last `}` span of the model output. Missing or
/// mistyped fields fall back to empty values; no object at all is an error.
pub fn parse_resume_analysis(response: &str) -> anyhow::Result<ResumeSearchParams> {
    let json = extract_json_object(response)
        .ok_or_else(|| anyhow!("No JSON object found in response"))?;
    let parsed: Value = serde_json::from_str(json)?;

    let text = |key: &str| {
        parsed
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let experience_years = match parsed.get("experience_years") {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    };

    let required_skills = parsed
        .get("required_skills")
        .and_then(Value::as_array)
        .map(|skills| {
            skills
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Ok(ResumeSearchParams {
        search_term: text("search_term"),
        location: text("location"),
        experience_years,
        required_skills,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use docx_rs::{Docx, Paragraph, Run};

    use super::*;
    use crate::llm_client::testing::ScriptedLlm;
    use crate::resume::extract::DOCX_MIME;

    fn resume_docx() -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Jane Doe")))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Backend engineer, Rust, 6 years, Berlin")))
            .build()
            .pack(&mut buf)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_parse_resume_analysis_reads_embedded_object() {
        let response = r#"Here you go:
        {"search_term": "Backend Engineer", "location": "Berlin", "experience_years": 6, "required_skills": ["Rust", "Kafka"]}
        Good luck!"#;

        let params = parse_resume_analysis(response).unwrap();
        assert_eq!(
            params,
            ResumeSearchParams {
                search_term: "Backend Engineer".to_string(),
                location: "Berlin".to_string(),
                experience_years: 6,
                required_skills: vec!["Rust".to_string(), "Kafka".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_resume_analysis_defaults_missing_fields() {
        let params = parse_resume_analysis(r#"{"search_term": "SRE"}"#).unwrap();
        assert_eq!(params.search_term, "SRE");
        assert_eq!(params.location, "");
        assert_eq!(params.experience_years, 0);
        assert!(params.required_skills.is_empty());
    }

    #[test]
    fn test_parse_resume_analysis_tolerates_loose_experience_values() {
        assert_eq!(
            parse_resume_analysis(r#"{"experience_years": 4.6}"#).unwrap().experience_years,
            5
        );
        assert_eq!(
            parse_resume_analysis(r#"{"experience_years": "3"}"#).unwrap().experience_years,
            3
        );
        assert_eq!(
            parse_resume_analysis(r#"{"experience_years": -1}"#).unwrap().experience_years,
            0
        );
    }

    #[test]
    fn test_parse_resume_analysis_without_object_is_error() {
        assert!(parse_resume_analysis("I could not read this resume.").is_err());
    }

    #[tokio::test]
    async fn test_unsupported_type_is_rejected_before_calling_the_model() {
        let llm = Arc::new(ScriptedLlm::replying("{}"));
        let service = ResumeAnalysisService::new(llm.clone());

        let err = service
            .analyze_resume(b"plain text".to_vec(), "text/plain")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnsupportedMediaType(_)));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_docx_resume_end_to_end() {
        let llm = Arc::new(ScriptedLlm::replying(
            r#"{"search_term": "Backend Engineer", "location": "Berlin", "experience_years": 6, "required_skills": ["Rust"]}"#,
        ));
        let service = ResumeAnalysisService::new(llm.clone());

        let params = service.analyze_resume(resume_docx(), DOCX_MIME).await.unwrap();

        assert_eq!(params.search_term, "Backend Engineer");
        assert_eq!(params.experience_years, 6);

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].0.contains("Backend engineer, Rust, 6 years, Berlin"));
        assert!((prompts[0].1 - RESUME_ANALYSIS_TEMPERATURE).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_provider_errors_propagate() {
        let llm = Arc::new(ScriptedLlm::failing());
        let service = ResumeAnalysisService::new(llm);

        let err = service.analyze_resume(resume_docx(), DOCX_MIME).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
