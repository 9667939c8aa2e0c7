//! Static self-care advice, used whenever AI recommendations are unavailable.

use crate::emotion::Emotion;

pub type Advice = [&'static str; 3];

/// Used when a label has no catalog entry.
pub const GENERIC_ADVICE: Advice = [
    "Take a few moments to breathe deeply and center yourself.",
    "Consider talking to someone you trust about how you're feeling.",
    "Be kind to yourself - all emotions are valid and temporary.",
];

/// Canned advice for a taxonomy member.
pub fn advice_for(emotion: Emotion) -> &'static Advice {
    match emotion {
        Emotion::Joy => &[
            "Share your happiness with someone you care about.",
            "Practice gratitude by writing down three things you're thankful for.",
            "Channel this positive energy into a creative activity.",
        ],
        Emotion::Sadness => &[
            "It's okay to feel sad. Give yourself permission to feel your emotions.",
            "Connect with a friend or loved one for support.",
            "Try gentle physical activity like a walk in nature.",
        ],
        Emotion::Anxiety => &[
            "Practice deep breathing: inhale for 4, hold for 4, exhale for 4.",
            "Ground yourself by naming 5 things you can see, 4 you can touch, 3 you can hear.",
            "Consider talking to a mental health professional if anxiety persists.",
        ],
        Emotion::Anger => &[
            "Take a few deep breaths before responding to what's making you angry.",
            "Try physical exercise to release tension in a healthy way.",
            "Write about your feelings to process them constructively.",
        ],
        Emotion::Fear => &[
            "Remember that it's normal to feel afraid sometimes.",
            "Focus on what you can control in the present moment.",
            "Reach out to someone you trust to share your concerns.",
        ],
        Emotion::Contentment => &[
            "Savor this peaceful feeling and notice what brings you contentment.",
            "Use this calm energy to reflect on your goals and values.",
            "Practice mindfulness to extend this sense of wellbeing.",
        ],
        Emotion::Excitement => &[
            "Channel your energy into something productive or creative.",
            "Share your excitement with others who will celebrate with you.",
            "Plan ahead to make the most of whatever you're excited about.",
        ],
        Emotion::Frustration => &[
            "Step away from the situation temporarily to gain perspective.",
            "Break down what's frustrating you into smaller, manageable parts.",
            "Be patient with yourself - progress takes time.",
        ],
        Emotion::Loneliness => &[
            "Reach out to someone - even a small connection can help.",
            "Join a community activity or group that interests you.",
            "Remember that feeling lonely is temporary and you're not alone in feeling this way.",
        ],
        Emotion::Hope => &[
            "Write down what you're hopeful about to reinforce these positive feelings.",
            "Take a small action toward what you're hoping for.",
            "Share your hope with others to inspire them too.",
        ],
        Emotion::Overwhelmed => &[
            "Prioritize one task at a time instead of trying to do everything at once.",
            "It's okay to say no and set boundaries.",
            "Consider breaking down larger tasks into smaller, achievable steps.",
        ],
        Emotion::Peaceful => &[
            "Take time to appreciate this moment of peace.",
            "Notice what creates peace for you so you can recreate it later.",
            "Use this calm state for reflection or meditation.",
        ],
        Emotion::Confused => &[
            "It's okay not to have all the answers right now.",
            "Try writing down your thoughts to clarify what's confusing you.",
            "Talk to someone who might offer a different perspective.",
        ],
        Emotion::Grateful => &[
            "Keep a gratitude journal to capture what you're thankful for.",
            "Express your appreciation to someone who has helped you.",
            "Reflect on how gratitude contributes to your overall wellbeing.",
        ],
        Emotion::Stressed => &[
            "Take short breaks throughout your day to reset.",
            "Practice progressive muscle relaxation to release physical tension.",
            "Identify what's causing stress and consider what you can change or accept.",
        ],
    }
}

/// Lookup by raw label. Unknown labels get [`GENERIC_ADVICE`].
pub fn advice_for_label(label: &str) -> &'static Advice {
    match Emotion::from_label(label) {
        Some(emotion) => advice_for(emotion),
        None => &GENERIC_ADVICE,
    }
}

/// Owned copy of [`advice_for_label`], ready to persist.
pub fn fallback_recommendations(label: &str) -> Vec<String> {
    advice_for_label(label).iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_emotion_has_three_distinct_tips() {
        for emotion in Emotion::ALL {
            let advice = advice_for(emotion);
            assert_eq!(advice.len(), 3);
            assert!(advice.iter().all(|tip| !tip.trim().is_empty()));
            assert_ne!(advice, &GENERIC_ADVICE, "{} should not use the generic set", emotion);
        }
    }

    #[test]
    fn test_label_lookup_ignores_case() {
        assert_eq!(advice_for_label("ANGER"), advice_for(Emotion::Anger));
    }

    #[test]
    fn test_unknown_label_gets_generic_advice() {
        assert_eq!(advice_for_label("bewildered"), &GENERIC_ADVICE);
        let owned = fallback_recommendations("");
        assert_eq!(owned.len(), 3);
        assert_eq!(owned[0], GENERIC_ADVICE[0]);
    }
}
