//! Display implementations for domain models.
//!
//! All output is markdown so the CLI can render it through its terminal
//! renderer or print it verbatim with colors disabled.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{BuildOutcome, BuildSummary, PlanSnapshot, StreamOutcome};

impl fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildOutcome::Failed { error } => write!(f, "{}: {error}", self.with_icon()),
            _ => write!(f, "{}", self.with_icon()),
        }
    }
}

impl fmt::Display for StreamOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamOutcome::Failed(error) => write!(f, "failed ({error})"),
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- `{}`: {} ({}/{} succeeded",
            self.path, self.latest, self.succeeded, self.total
        )?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        if self.pending() > 0 {
            write!(f, ", {} pending", self.pending())?;
        }
        writeln!(f, ")")
    }
}

impl fmt::Display for PlanSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Plan {} ({})", self.id, self.branch)?;
        writeln!(f)?;

        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        match &self.outcome {
            Some(outcome) => writeln!(f, "- Stream: {outcome}")?,
            None => writeln!(f, "- Stream: running")?,
        }
        writeln!(f, "- Tokens: {}", self.num_tokens)?;
        writeln!(f, "- Subscribers: {}", self.subscribers)?;
        if self.replies_finished {
            writeln!(f, "- Replies finished")?;
        }

        if !self.prompt.is_empty() {
            writeln!(f)?;
            writeln!(f, "> {}", self.prompt)?;
        }

        if !self.reply_content.is_empty() {
            writeln!(f, "\n## Reply")?;
            writeln!(f)?;
            writeln!(f, "{}", self.reply_content)?;
        }

        if self.builds.is_empty() {
            writeln!(f, "\nNo builds registered.")?;
        } else {
            writeln!(f, "\n## Builds")?;
            writeln!(f)?;
            for build in &self.builds {
                write!(f, "{build}")?;
            }
            if !self.builds_finished {
                writeln!(f, "\nBuilds still running.")?;
            }
        }

        Ok(())
    }
}
