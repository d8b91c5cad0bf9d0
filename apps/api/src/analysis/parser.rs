//! Validates the assistant's reply against the recommendation schema.

use thiserror::Error;

use crate::analysis::models::RecommendationResult;
use crate::llm_client::strip_json_fences;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("AI response does not match the recommendation schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("No recommendations in AI response")]
    EmptyRecommendations,
}

/// Parses raw assistant content into a `RecommendationResult`.
///
/// Structural checks only: the reply must deserialize and carry at least one
/// recommendation. Scores and titles are taken as given.
pub fn parse_recommendations(raw: &str) -> Result<RecommendationResult, ParseError> {
    let result: RecommendationResult = serde_json::from_str(strip_json_fences(raw))?;
    if result.recommendations.is_empty() {
        return Err(ParseError::EmptyRecommendations);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::Recommendation;

    const ONE_ENTRY: &str = r#"{
        "skills": ["Java", "Spring Boot"],
        "gaps": ["Cloud deployment"],
        "recommendations": [{
            "title": "AWS Cloud Practitioner Essentials",
            "provider": "Coursera",
            "matchScore": 92,
            "reason": "Backend experience without any cloud exposure",
            "skillGapAddressed": "Cloud deployment",
            "estimatedTimeToComplete": "4 weeks",
            "difficultyLevel": "Beginner",
            "prerequisites": ["Basic networking"],
            "careerImpact": "Opens DevOps-adjacent roles"
        }]
    }"#;

    #[test]
    fn test_parses_single_recommendation_field_by_field() {
        let result = parse_recommendations(ONE_ENTRY).unwrap();
        assert_eq!(result.skills, vec!["Java", "Spring Boot"]);
        assert_eq!(result.gaps, vec!["Cloud deployment"]);
        assert_eq!(
            result.recommendations,
            vec![Recommendation {
                title: "AWS Cloud Practitioner Essentials".into(),
                provider: "Coursera".into(),
                match_score: 92.0,
                reason: "Backend experience without any cloud exposure".into(),
                skill_gap_addressed: "Cloud deployment".into(),
                estimated_time_to_complete: "4 weeks".into(),
                difficulty_level: "Beginner".into(),
                prerequisites: vec!["Basic networking".into()],
                career_impact: "Opens DevOps-adjacent roles".into(),
            }]
        );
    }

    #[test]
    fn test_missing_recommendations_key_is_schema_error() {
        let result = parse_recommendations(r#"{"skills": ["Go"], "gaps": []}"#);
        assert!(matches!(result, Err(ParseError::Schema(_))));
    }

    #[test]
    fn test_empty_recommendations_rejected() {
        let result = parse_recommendations(r#"{"recommendations": []}"#);
        assert!(matches!(result, Err(ParseError::EmptyRecommendations)));
    }

    #[test]
    fn test_non_json_reply_is_schema_error() {
        let result = parse_recommendations("Sure! Here are some courses you might like.");
        assert!(matches!(result, Err(ParseError::Schema(_))));
    }

    #[test]
    fn test_wrong_field_type_is_schema_error() {
        let raw = ONE_ENTRY.replace(r#""matchScore": 92"#, r#""matchScore": "high""#);
        assert!(matches!(
            parse_recommendations(&raw),
            Err(ParseError::Schema(_))
        ));
    }

    #[test]
    fn test_missing_recommendation_field_is_schema_error() {
        let raw = ONE_ENTRY.replace(r#""careerImpact": "Opens DevOps-adjacent roles""#, r#""x": 1"#);
        assert!(matches!(
            parse_recommendations(&raw),
            Err(ParseError::Schema(_))
        ));
    }

    #[test]
    fn test_fenced_reply_is_accepted() {
        let fenced = format!("```json\n{ONE_ENTRY}\n```");
        let result = parse_recommendations(&fenced).unwrap();
        assert_eq!(result.recommendations.len(), 1);
    }

    #[test]
    fn test_skills_and_gaps_default_to_empty() {
        let raw = r#"{"recommendations": [{
            "title": "t", "provider": "p", "matchScore": 50.5, "reason": "r",
            "skillGapAddressed": "s", "estimatedTimeToComplete": "1 week",
            "difficultyLevel": "Expert", "prerequisites": [], "careerImpact": "c"
        }]}"#;
        let result = parse_recommendations(raw).unwrap();
        assert!(result.skills.is_empty());
        assert!(result.gaps.is_empty());
        assert_eq!(result.recommendations[0].difficulty_level, "Expert");
    }
}
