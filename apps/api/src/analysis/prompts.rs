// CV analysis prompt template.
// The model receives this as a single user message; there is no system prompt.

pub const CV_CONTENT_PLACEHOLDER: &str = "{cv_content}";

pub const CV_ANALYSIS_PROMPT: &str = r#"As an AI career advisor, analyze this CV and provide personalized course recommendations based on the following criteria:

PROBLEM STATEMENT:
The user has uploaded their CV and needs AI-powered course recommendations that will:
1. Address skill gaps identified in their CV
2. Align with their career goals and experience level
3. Provide practical, industry-relevant learning paths
4. Consider current market demands and trends

CV CONTENT:
{cv_content}

REQUIREMENTS:
1. Analyze the CV for:
   - Current technical skills and proficiency levels
   - Work experience and industry focus
   - Educational background
   - Career progression and goals
   - Identified skill gaps or areas for improvement

2. Provide 3 course recommendations in the following JSON format:
{
  "skills": ["skill1", "skill2", ...],
  "gaps": ["gap1", "gap2", ...],
  "recommendations": [
    {
      "title": "Course Name",
      "provider": "Provider Name",
      "matchScore": 95,
      "reason": "Detailed explanation",
      "skillGapAddressed": "Specific skill gap",
      "estimatedTimeToComplete": "X weeks/months",
      "difficultyLevel": "Beginner/Intermediate/Advanced",
      "prerequisites": ["Required skills"],
      "careerImpact": "Impact description"
    }
  ]
}

IMPORTANT:
1. Respond ONLY with the JSON object, no additional text or explanation.
2. Make sure to analyze the CV content thoroughly and provide personalized recommendations.
3. The recommendations should be based on the actual content of the CV.
4. Include specific skills and gaps identified from the CV.
5. DO NOT use any pre-defined or static recommendations.
"#;

/// Renders the analysis prompt with the CV text inserted verbatim.
pub fn build_prompt(cv_text: &str) -> String {
    CV_ANALYSIS_PROMPT.replacen(CV_CONTENT_PLACEHOLDER, cv_text, 1)
}
