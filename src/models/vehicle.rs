use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Make — Vehicle manufacturer (list-makes result)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Make {
    pub make_id: i64,
    pub make: String,
}

// ---------------------------------------------------------------------------
// Model — Model line of a make (list-models result)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Model {
    pub model_id: i64,
    pub model: String,
}
