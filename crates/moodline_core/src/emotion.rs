//! The closed emotion taxonomy.
//!
//! Every emotion stored on a mood entry is one of these fifteen labels. The
//! model is asked to choose from this list, and anything it answers outside
//! of it is normalized before it reaches storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Anxiety,
    Anger,
    Fear,
    Contentment,
    Excitement,
    Frustration,
    Loneliness,
    Hope,
    Overwhelmed,
    Peaceful,
    Confused,
    Grateful,
    Stressed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not in the emotion taxonomy")]
pub struct UnknownEmotion(pub String);

impl Emotion {
    /// The taxonomy in prompt order.
    pub const ALL: [Emotion; 15] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anxiety,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Contentment,
        Emotion::Excitement,
        Emotion::Frustration,
        Emotion::Loneliness,
        Emotion::Hope,
        Emotion::Overwhelmed,
        Emotion::Peaceful,
        Emotion::Confused,
        Emotion::Grateful,
        Emotion::Stressed,
    ];

    /// Catch-all label used when the model answers outside the taxonomy.
    pub const CATCH_ALL: Emotion = Emotion::Confused;

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anxiety => "anxiety",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Contentment => "contentment",
            Emotion::Excitement => "excitement",
            Emotion::Frustration => "frustration",
            Emotion::Loneliness => "loneliness",
            Emotion::Hope => "hope",
            Emotion::Overwhelmed => "overwhelmed",
            Emotion::Peaceful => "peaceful",
            Emotion::Confused => "confused",
            Emotion::Grateful => "grateful",
            Emotion::Stressed => "stressed",
        }
    }

    /// Case-insensitive lookup. Surrounding whitespace is ignored.
    pub fn from_label(label: &str) -> Option<Emotion> {
        let needle = label.trim();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(needle))
    }

    /// Comma-separated label list for prompts.
    pub fn taxonomy_list() -> String {
        Self::ALL
            .iter()
            .map(Emotion::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::from_label(s).ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}
