use serde::{Deserialize, Serialize};

/// Sentinel for free-text analysis fields the model left out.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Target length of the generated summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
        }
    }
}

/// Request body for `POST /api/v1/summarize`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisQuery {
    pub description: String,
    /// Cache key. Treated as an opaque identifier, never fetched.
    pub url: String,
    #[serde(default)]
    pub focus_areas: Option<Vec<String>>,
    #[serde(default)]
    pub summary_length: Option<SummaryLength>,
    #[serde(default)]
    pub experience_years: Option<u32>,
    #[serde(default)]
    pub required_skills: Option<Vec<String>>,
}

impl AnalysisQuery {
    pub fn focus_areas(&self) -> Vec<String> {
        self.focus_areas
            .clone()
            .unwrap_or_else(default_focus_areas)
    }

    pub fn summary_length(&self) -> SummaryLength {
        self.summary_length.unwrap_or_default()
    }
}

pub fn default_focus_areas() -> Vec<String> {
    ["skills", "requirements", "culture"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Fully validated result of analysing one job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Whether the job matched the constraints of the query that produced it.
    pub valid: bool,
    pub summary: String,
    pub key_skills: Vec<String>,
    pub required_experience: String,
    pub company_culture: String,
    pub estimated_salary_range: String,
}

impl AnalysisRecord {
    /// Splits off the query-specific `valid` bit from the cacheable analysis.
    pub fn split(self) -> (bool, JobAnalysis) {
        (
            self.valid,
            JobAnalysis {
                summary: self.summary,
                key_skills: self.key_skills,
                required_experience: self.required_experience,
                company_culture: self.company_culture,
                estimated_salary_range: self.estimated_salary_range,
            },
        )
    }
}

/// The part of an analysis that describes the posting itself and can be
/// shared across queries. This is what the cache stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAnalysis {
    pub summary: String,
    pub key_skills: Vec<String>,
    pub required_experience: String,
    pub company_culture: String,
    pub estimated_salary_range: String,
}

/// Response envelope of the analysis endpoint. `valid` is always evaluated
/// against the current query, `analysis` may come from the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub valid: bool,
    pub analysis: JobAnalysis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults_when_optional_fields_missing() {
        let json = serde_json::json!({
            "description": "Rust engineer",
            "url": "https://jobs.example.com/1"
        });
        let query: AnalysisQuery = serde_json::from_value(json).unwrap();
        assert_eq!(query.focus_areas(), vec!["skills", "requirements", "culture"]);
        assert_eq!(query.summary_length(), SummaryLength::Medium);
        assert!(query.experience_years.is_none());
        assert!(query.required_skills.is_none());
    }

    #[test]
    fn test_summary_length_serde_is_lowercase() {
        let length: SummaryLength = serde_json::from_str(r#""short""#).unwrap();
        assert_eq!(length, SummaryLength::Short);
        assert_eq!(serde_json::to_string(&SummaryLength::Long).unwrap(), r#""long""#);
    }

    #[test]
    fn test_unknown_summary_length_is_rejected() {
        let json = serde_json::json!({
            "description": "d",
            "url": "u",
            "summary_length": "epic"
        });
        assert!(serde_json::from_value::<AnalysisQuery>(json).is_err());
    }

    #[test]
    fn test_negative_experience_years_is_rejected() {
        let json = serde_json::json!({
            "description": "d",
            "url": "u",
            "experience_years": -2
        });
        assert!(serde_json::from_value::<AnalysisQuery>(json).is_err());
    }

    #[test]
    fn test_split_drops_valid_and_keeps_everything_else() {
        let record = AnalysisRecord {
            valid: true,
            summary: "Backend role".to_string(),
            key_skills: vec!["Rust".to_string(), "Postgres".to_string()],
            required_experience: "3+ years".to_string(),
            company_culture: "Remote-first".to_string(),
            estimated_salary_range: "$120k-$150k".to_string(),
        };

        let (valid, analysis) = record.clone().split();
        assert!(valid);
        assert_eq!(analysis.summary, record.summary);
        assert_eq!(analysis.key_skills, record.key_skills);
        assert_eq!(analysis.required_experience, record.required_experience);
        assert_eq!(analysis.company_culture, record.company_culture);
        assert_eq!(analysis.estimated_salary_range, record.estimated_salary_range);

        let value = serde_json::to_value(&analysis).unwrap();
        assert!(value.get("valid").is_none());
    }
}
