//! Command argument wrappers.
//!
//! Each wrapper owns the clap-specific parsing for one command and converts
//! into the core parameter types, keeping clap out of `plancast-core`:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → ActivePlan
//! ```

use std::path::PathBuf;

use clap::Args;
use plancast_core::params::CreatePlan;

/// Identity of the plan a command creates
#[derive(Args, Clone)]
pub struct PlanArgs {
    /// Job id of the plan
    #[arg(long, default_value = "local")]
    pub plan_id: String,
    /// Branch label of the plan
    #[arg(long, default_value = "main")]
    pub branch: String,
    /// Prompt recorded on the plan
    #[arg(long, default_value = "")]
    pub prompt: String,
}

impl From<PlanArgs> for CreatePlan {
    fn from(val: PlanArgs) -> Self {
        CreatePlan {
            id: val.plan_id,
            branch: val.branch,
            prompt: val.prompt,
        }
    }
}

/// Replay a recorded stream
///
/// Reads one JSON stream message per line (blank lines are skipped), attaches
/// the requested number of subscribers and emits every message through a
/// fresh plan. `buildInfo` messages drive a simulated build executor.
#[derive(Args)]
pub struct ReplayArgs {
    /// Stream file to replay, or `-` for standard input
    pub file: PathBuf,
    /// Number of subscribers attached before the first message
    #[arg(short, long, default_value_t = 1)]
    pub subscribers: usize,
    #[command(flatten)]
    pub plan: PlanArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_args_into_params() {
        let params: CreatePlan = PlanArgs {
            plan_id: "job-1".to_string(),
            branch: "feature".to_string(),
            prompt: "do it".to_string(),
        }
        .into();

        assert_eq!(params.id, "job-1");
        assert_eq!(params.branch, "feature");
        assert_eq!(params.prompt, "do it");
    }
}
