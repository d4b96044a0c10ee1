//! Parameter structures for coordinator operations
//!
//! These structures are shared by every collaborator that drives a plan (the
//! job-acceptance layer, build executors, the CLI) and carry no
//! framework-specific derives. Interface layers convert their own argument
//! types into them:
//!
//! ```text
//! CLI Args (clap) → Core Params → ActivePlan
//! ```

use serde::{Deserialize, Serialize};

/// Parameters for creating a new active plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePlan {
    /// Job id of the plan (required)
    pub id: String,
    /// Branch or variant label the plan runs on
    pub branch: String,
    /// Prompt that started the plan
    #[serde(default)]
    pub prompt: String,
}

/// Parameters for registering a build with a plan's build queues.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterBuild {
    /// Target path of the build
    pub path: String,
    /// Id of the assistant message the build originates from
    #[serde(default)]
    pub assistant_message_id: String,
}
