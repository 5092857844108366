// SPDX-License-Identifier: MIT

//! Supported translation languages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuillError;
use crate::workflow::{RouteLabel, WorkflowState};

/// A language the pipeline can translate into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Hindi,
    French,
    Hausa,
    Yoruba,
    Igbo,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Hindi,
        Language::French,
        Language::Hausa,
        Language::Yoruba,
        Language::Igbo,
    ];

    /// Lower-case identifier, also used as the branch label
    pub fn id(&self) -> &'static str {
        match self {
            Language::Hindi => "hindi",
            Language::French => "french",
            Language::Hausa => "hausa",
            Language::Yoruba => "yoruba",
            Language::Igbo => "igbo",
        }
    }

    /// Name embedded in translation prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Hindi => "Hindi (हिंदी)",
            Language::French => "French (Français)",
            Language::Hausa => {
                "Hausa (a West African language spoken primarily in Nigeria and Niger)"
            }
            Language::Yoruba => {
                "Yoruba (a West African language spoken primarily in Nigeria and Benin)"
            }
            Language::Igbo => "Igbo (a West African language spoken primarily in Nigeria)",
        }
    }

    /// Name of the graph node that translates into this language
    pub fn node_name(&self) -> String {
        format!("{}_translation", self.id())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Language {
    type Err = QuillError;

    /// Case-insensitive lookup
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.id() == lowered)
            .ok_or(QuillError::UnsupportedLanguage(lowered))
    }
}

impl RouteLabel for Language {
    fn variants() -> &'static [Self] {
        &Language::ALL
    }

    fn as_str(&self) -> &'static str {
        self.id()
    }
}

/// Router for the translation branch.
///
/// Lower-cases `current_language` and looks it up in the supported set. An
/// unmatched value comes back as `Err` carrying the lower-cased input verbatim,
/// which the executor reports as a routing failure.
pub fn route_language(state: &WorkflowState) -> Result<Language, String> {
    let requested = state.current_language().unwrap_or_default();
    requested.parse().map_err(|_| requested.to_lowercase())
}
