// Resume analysis prompt. The JSON keys must match service::parse_resume_analysis.

pub const RESUME_ANALYSIS_TEMPERATURE: f32 = 0.3;

/// Resume analysis prompt template. Replace `{resume_text}` before sending.
pub const RESUME_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following resume and extract relevant information for job searching.
Return the information in a JSON format that can be used to search for matching jobs.

Resume:
{resume_text}

Extract the following information:
1. Job title or role that best matches the candidate's experience and skills
2. Preferred location (if mentioned)
3. Years of relevant experience
4. Key skills and technologies

Return the information in this JSON format:
{
    "search_term": "string (job title/role)",
    "location": "string (preferred location)",
    "experience_years": number,
    "required_skills": ["string", "string", ...]
}

Make sure to:
- Use the most recent and relevant job title/role
- Include only the most important and relevant skills
- If location is not specified, leave it as an empty string
- Calculate experience years based on the most relevant experience
"#;

pub fn resume_analysis_prompt(resume_text: &str) -> String {
    RESUME_ANALYSIS_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_resume_text_and_requested_keys() {
        let prompt = resume_analysis_prompt("Jane Doe, Rust developer since 2019");
        assert!(prompt.contains("Jane Doe, Rust developer since 2019"));
        assert!(!prompt.contains("{resume_text}"));
        for key in ["search_term", "location", "experience_years", "required_skills"] {
            assert!(prompt.contains(key), "missing {key}");
        }
    }
}
