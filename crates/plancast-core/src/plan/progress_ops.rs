//! Reply accumulation and build tracking for the ActivePlan.

use super::ActivePlan;
use crate::{
    builds::{BuildHandle, BuildQueues},
    models::PlanSnapshot,
    params::RegisterBuild,
};

impl ActivePlan {
    /// Appends a reply chunk received from the producer and adds its token
    /// count.
    pub fn record_reply_chunk(&self, chunk: &str, num_tokens: usize) {
        let mut progress = self.progress();
        progress.reply_content.push_str(chunk);
        progress.num_tokens += num_tokens;
    }

    /// Reply text accumulated so far.
    pub fn reply_content(&self) -> String {
        self.progress().reply_content.clone()
    }

    /// Tokens received so far.
    pub fn num_tokens(&self) -> usize {
        self.progress().num_tokens
    }

    /// Marks that the producer will send no more reply chunks.
    pub fn mark_replies_finished(&self) {
        self.progress().replies_finished = true;
    }

    /// Whether the producer finished sending reply chunks.
    pub fn replies_finished(&self) -> bool {
        self.progress().replies_finished
    }

    /// Records the conversation position of the prompt message.
    pub fn set_prompt_message_num(&self, num: usize) {
        self.progress().prompt_message_num = num;
    }

    /// Conversation position of the prompt message.
    pub fn prompt_message_num(&self) -> usize {
        self.progress().prompt_message_num
    }

    /// Records the id of the model stream feeding this plan.
    pub fn set_model_stream_id(&self, id: impl Into<String>) {
        self.progress().model_stream_id = Some(id.into());
    }

    /// Id of the model stream feeding this plan.
    pub fn model_stream_id(&self) -> Option<String> {
        self.progress().model_stream_id.clone()
    }

    /// Replaces the list of files the plan touches.
    pub fn set_files(&self, files: Vec<String>) {
        self.progress().files = files;
    }

    /// Files the plan touches.
    pub fn files(&self) -> Vec<String> {
        self.progress().files.clone()
    }

    /// Queues a new pending build for a path.
    pub fn register_build(&self, params: &RegisterBuild) -> BuildHandle {
        self.builds.register(params)
    }

    /// The plan's build queues, for executors reporting outcomes.
    pub fn builds(&self) -> &BuildQueues {
        &self.builds
    }

    /// Whether every registered build resolved. Also true when no build was
    /// registered; see [`BuildQueues::is_empty`].
    pub fn build_finished(&self) -> bool {
        self.builds.is_all_finished()
    }

    /// Whether every build for `path` resolved.
    pub fn path_finished(&self, path: &str) -> bool {
        self.builds.is_path_finished(path)
    }

    /// Whether `path` has a build in flight.
    pub fn is_building(&self, path: &str) -> bool {
        self.builds.is_building(path)
    }

    /// Paths whose latest build succeeded and nothing is pending.
    pub fn built_files(&self) -> Vec<String> {
        self.builds.built_paths()
    }

    /// Point-in-time copy of the plan's state.
    pub fn snapshot(&self) -> PlanSnapshot {
        let (reply_content, num_tokens, replies_finished, files) = {
            let progress = self.progress();
            (
                progress.reply_content.clone(),
                progress.num_tokens,
                progress.replies_finished,
                progress.files.clone(),
            )
        };

        PlanSnapshot {
            id: self.id.clone(),
            branch: self.branch.clone(),
            prompt: self.prompt.clone(),
            created_at: self.created_at,
            num_tokens,
            reply_content,
            replies_finished,
            subscribers: self.subscribers.len(),
            files,
            builds: self.builds.summaries(),
            builds_finished: self.builds.is_all_finished(),
            outcome: self.completion.outcome(),
        }
    }
}
