use anyhow::{Context, Result, ensure};
use async_nats::jetstream;
use log::debug;

use crate::{config::nats_config::PublisherConfig, inbound::model::command::CommandMessage};

/// Sends operator commands to the controller's work queue.
pub struct NatsPublisher {
    context: jetstream::Context,
    publisher_config: PublisherConfig,
}

impl NatsPublisher {
    pub fn new(context: jetstream::Context, publisher_config: PublisherConfig) -> Self {
        NatsPublisher {
            context,
            publisher_config,
        }
    }

    pub async fn publish(&self, message: &CommandMessage) -> Result<()> {
        ensure!(
            message.target_temp.is_some() || message.brew_id.is_some(),
            "Nothing to send, a command needs a target temperature or a brew id"
        );
        let payload = message.to_payload()?;
        let subject = self.publisher_config.command_subject.clone();
        debug!("Publishing {} on {subject}", String::from_utf8_lossy(&payload));
        self.context
            .publish(subject, payload.into())
            .await
            .context("Unable to publish command")?
            .await
            .context("Command was not acknowledged by the stream")?;
        Ok(())
    }
}
