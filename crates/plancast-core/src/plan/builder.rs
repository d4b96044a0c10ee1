//! Builder for creating and configuring ActivePlan instances.

use super::ActivePlan;
use crate::{
    config::PlanConfig,
    error::{PlanError, Result},
    params::CreatePlan,
};

/// Builder for creating and configuring ActivePlan instances.
#[derive(Debug, Clone)]
pub struct ActivePlanBuilder {
    params: CreatePlan,
    config: PlanConfig,
}

impl ActivePlanBuilder {
    /// Creates a new builder with default channel sizing.
    pub fn new(id: impl Into<String>, branch: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::from_params(CreatePlan {
            id: id.into(),
            branch: branch.into(),
            prompt: prompt.into(),
        })
    }

    /// Creates a builder from creation parameters.
    pub fn from_params(params: CreatePlan) -> Self {
        Self {
            params,
            config: PlanConfig::default(),
        }
    }

    /// Replaces the whole channel configuration.
    pub fn with_config(mut self, config: PlanConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets how many messages each subscriber buffers before the oldest is
    /// dropped.
    pub fn with_subscriber_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.with_subscriber_capacity(capacity);
        self
    }

    /// Sets how many emitted messages may wait for the broadcast loop before
    /// `emit` applies backpressure.
    pub fn with_intake_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.with_intake_capacity(capacity);
        self
    }

    /// Builds the plan and starts its broadcast loop.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::InvalidInput` if the id is blank or a capacity is
    /// zero.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn build(self) -> Result<ActivePlan> {
        if self.params.id.trim().is_empty() {
            return Err(PlanError::invalid_input("id").with_reason("must not be empty"));
        }
        self.config.validate()?;
        Ok(ActivePlan::start(self.params, self.config))
    }
}
