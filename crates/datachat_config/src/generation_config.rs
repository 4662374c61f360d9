use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// Sampling parameters sent with every oracle call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Setters)]
#[serde(rename_all = "snake_case")]
pub struct GenerationConfig {
    /// Randomness of the generated text; lower is more deterministic
    pub temperature: f32,

    /// Upper bound on the number of tokens the oracle may produce
    pub max_output_tokens: u32,

    /// Nucleus-sampling cutoff
    pub top_p: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { temperature: 0.2, max_output_tokens: 8192, top_p: 0.95 }
    }
}

impl GenerationConfig {
    /// Settings for the intent classifier. Identical to the default except for
    /// the output budget, which only has to fit a single boolean.
    pub fn classification() -> Self {
        Self::default().max_output_tokens(10u32)
    }
}
