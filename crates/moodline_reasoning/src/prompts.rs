use moodline_core::Emotion;

pub const CLASSIFIER_SYSTEM_PROMPT: &str = "You are an empathetic mental health assistant that \
analyzes mood journal entries to identify emotions. Always respond in valid JSON format.";

pub const RECOMMENDER_SYSTEM_PROMPT: &str = "You are an empathetic mental health support assistant. \
Provide compassionate, practical advice to help people manage their emotions and wellbeing. \
Always respond in valid JSON format.";

pub fn classifier_prompt(entry_text: &str) -> String {
    format!(
        r#"Analyze the following mood journal entry and determine the primary emotion. Choose only ONE emotion from this list: {taxonomy}.

Journal Entry:
"{entry_text}"

Respond in JSON format with:
{{
  "emotion": "the primary emotion from the list",
  "confidence": a number between 0 and 1 indicating confidence,
  "reasoning": "brief explanation of why this emotion was chosen"
}}

Be empathetic and consider the overall tone and context."#,
        taxonomy = Emotion::taxonomy_list(),
    )
}

pub fn recommendation_prompt(emotion: Emotion, entry_text: &str) -> String {
    format!(
        r#"Based on the following mood journal entry where the person is feeling "{emotion}", provide 3 helpful, empathetic, and actionable recommendations or tips to help them. Make the suggestions specific, supportive, and practical.

Journal Entry:
"{entry_text}"

Respond in JSON format with:
{{
  "recommendations": [
    "First actionable recommendation",
    "Second actionable recommendation",
    "Third actionable recommendation"
  ]
}}

Keep each recommendation brief (1-2 sentences) and focused on immediate, helpful actions."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_prompt_lists_whole_taxonomy() {
        let prompt = classifier_prompt("meh");
        for emotion in Emotion::ALL {
            assert!(prompt.contains(emotion.as_str()));
        }
        assert!(prompt.contains("\"meh\""));
    }

    #[test]
    fn test_recommendation_prompt_names_emotion() {
        let prompt = recommendation_prompt(Emotion::Loneliness, "nobody called");
        assert!(prompt.contains("feeling \"loneliness\""));
        assert!(prompt.contains("nobody called"));
    }
}
