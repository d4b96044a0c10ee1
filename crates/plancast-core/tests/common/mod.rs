use std::time::Duration;

use plancast_core::{ActivePlan, BuildHandle, RegisterBuild, Subscription};

/// Upper bound for any wait in these tests
pub const WAIT: Duration = Duration::from_secs(2);

/// Helper function to register a build for a path
pub fn register_build(plan: &ActivePlan, path: &str) -> BuildHandle {
    plan.register_build(&RegisterBuild {
        path: path.to_string(),
        assistant_message_id: "msg-1".to_string(),
    })
}

/// Helper function to read `count` messages or fail after [`WAIT`]
pub async fn read_messages(subscription: &mut Subscription, count: usize) -> Vec<String> {
    let mut messages = Vec::with_capacity(count);
    for _ in 0..count {
        let message = tokio::time::timeout(WAIT, subscription.recv())
            .await
            .expect("Timed out waiting for message")
            .expect("Subscription ended early");
        messages.push(message);
    }
    messages
}
