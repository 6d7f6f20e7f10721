// Prompt templates for job analysis and validation.
// The JSON schema in ANALYSIS_SCHEMA must stay aligned with llm_client::parser::validate.

use crate::models::analysis::SummaryLength;

/// System prompt shared by every job analysis call.
pub const SYSTEM_PROMPT: &str = "You are a job analysis assistant. \
    Your task is to analyze job descriptions and provide structured information about \
    the job requirements, skills, and company culture. \
    Be precise and factual in your analysis.";

const ANALYSIS_SCHEMA: &str = r#"{
    "valid": boolean,
    "summary": string,
    "key_skills": string[],
    "required_experience": string,
    "company_culture": string,
    "estimated_salary_range": string
}"#;

/// Prompt for the cheap yes/no check used to revalidate cached analyses.
pub fn validation_prompt(
    job_description: &str,
    experience_years: Option<u32>,
    required_skills: Option<&[String]>,
) -> String {
    let mut prompt = format!(
        "Quickly validate if the following job description matches the specified requirements.\n\n\
         Job Description:\n{job_description}\n\n"
    );

    push_constraints(
        &mut prompt,
        experience_years.map(|years| format!("Required Experience: {years} years")),
        required_skills,
    );

    prompt.push_str(
        "\nRespond with a simple boolean value (true/false) indicating whether the job matches the requirements.\n\
         Focus on the key requirements and skills, ignoring minor mismatches.\n",
    );
    prompt
}

/// Prompt for a full structured analysis of a job description.
pub fn analysis_prompt(
    job_description: &str,
    focus_areas: &[String],
    summary_length: SummaryLength,
    experience_years: Option<u32>,
    required_skills: Option<&[String]>,
) -> String {
    let mut prompt = format!(
        "Analyze the following job description and provide a structured response in JSON format.\n\n\
         Job Description:\n{job_description}\n\n\
         Focus Areas: {}\n\
         Summary Length: {}\n\
         Make sure estimated salary range is very concise and to the point, should not exceed 10 words.\n",
        focus_areas.join(", "),
        summary_length.as_str(),
    );

    push_constraints(
        &mut prompt,
        experience_years.map(|years| format!("Experience Years: {years}")),
        required_skills,
    );

    prompt.push_str("\nProvide a JSON response with the following structure:\n");
    prompt.push_str(ANALYSIS_SCHEMA);
    prompt.push('\n');
    prompt
}

fn push_constraints(
    prompt: &mut String,
    experience_line: Option<String>,
    required_skills: Option<&[String]>,
) {
    if let Some(line) = experience_line {
        prompt.push_str(&line);
        prompt.push('\n');
    }
    if let Some(skills) = required_skills.filter(|s| !s.is_empty()) {
        prompt.push_str(&format!("Required Skills: {}\n", skills.join(", ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JD: &str = "Senior Rust Engineer. 5+ years building distributed systems.";

    #[test]
    fn test_analysis_prompt_embeds_schema_keys_expected_by_parser() {
        let prompt = analysis_prompt(JD, &["skills".to_string()], SummaryLength::Short, None, None);
        for key in [
            "\"valid\"",
            "\"summary\"",
            "\"key_skills\"",
            "\"required_experience\"",
            "\"company_culture\"",
            "\"estimated_salary_range\"",
        ] {
            assert!(prompt.contains(key), "missing {key}");
        }
    }

    #[test]
    fn test_analysis_prompt_embeds_focus_areas_and_length() {
        let focus = vec!["skills".to_string(), "culture".to_string()];
        let prompt = analysis_prompt(JD, &focus, SummaryLength::Long, None, None);
        assert!(prompt.contains(JD));
        assert!(prompt.contains("Focus Areas: skills, culture"));
        assert!(prompt.contains("Summary Length: long"));
    }

    #[test]
    fn test_analysis_prompt_includes_optional_constraints_only_when_present() {
        let without = analysis_prompt(JD, &[], SummaryLength::Medium, None, None);
        assert!(!without.contains("Experience Years"));
        assert!(!without.contains("Required Skills"));

        let skills = vec!["Rust".to_string(), "Tokio".to_string()];
        let with = analysis_prompt(JD, &[], SummaryLength::Medium, Some(4), Some(skills.as_slice()));
        assert!(with.contains("Experience Years: 4\n"));
        assert!(with.contains("Required Skills: Rust, Tokio"));
    }

    #[test]
    fn test_empty_required_skills_are_omitted() {
        let none: Vec<String> = Vec::new();
        let prompt = validation_prompt(JD, None, Some(none.as_slice()));
        assert!(!prompt.contains("Required Skills"));
    }

    #[test]
    fn test_validation_prompt_asks_for_boolean() {
        let skills = vec!["Rust".to_string()];
        let prompt = validation_prompt(JD, Some(0), Some(skills.as_slice()));
        assert!(prompt.contains("Required Experience: 0 years"));
        assert!(prompt.contains("Required Skills: Rust"));
        assert!(prompt.contains("(true/false)"));
    }
}
