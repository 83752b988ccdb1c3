use anyhow::{Context, Result};
use async_nats::jetstream::{self, consumer::pull, stream};
use futures::TryStreamExt;
use internal::{
    domain::{command::ControllerCommand, error::ControllerError},
    port::command::CommandChannelDrivenPort,
};
use log::{debug, warn};

use crate::config::nats_config::ConsumerConfig;

use super::model::command::CommandMessage;

pub struct NatsConsumer {
    consumer_config: ConsumerConfig,
}

impl NatsConsumer {
    pub fn new(consumer_config: ConsumerConfig) -> Self {
        NatsConsumer { consumer_config }
    }

    pub async fn create_consumer(
        &self,
        context: &jetstream::Context,
    ) -> Result<jetstream::consumer::Consumer<pull::Config>> {
        context
            .get_or_create_stream(self.stream_config())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create stream: {}", e))?
            .get_or_create_consumer(&self.consumer_config.name, self.consumer_config())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create consumer: {}", e))
    }

    fn stream_config(&self) -> jetstream::stream::Config {
        jetstream::stream::Config {
            name: self.consumer_config.name.to_string(),
            subjects: self.consumer_config.subjects.clone(),
            retention: stream::RetentionPolicy::WorkQueue,
            ..Default::default()
        }
    }

    fn consumer_config(&self) -> pull::Config {
        pull::Config {
            durable_name: Some(self.consumer_config.name.to_string()),
            filter_subjects: self.consumer_config.subjects.to_owned(),
            ..Default::default()
        }
    }
}

/// Pull-based command channel: one JetStream message per `receive`.
pub struct NatsCommandChannel {
    messages: pull::Stream,
}

impl NatsCommandChannel {
    pub async fn open(consumer: &jetstream::consumer::Consumer<pull::Config>) -> Result<Self> {
        let messages = consumer
            .messages()
            .await
            .context("Unable to pull messages from command consumer")?;
        Ok(NatsCommandChannel { messages })
    }
}

impl CommandChannelDrivenPort for NatsCommandChannel {
    async fn receive(&mut self) -> Result<Vec<ControllerCommand>, ControllerError> {
        let message = loop {
            match self.messages.try_next().await {
                Ok(Some(message)) => break message,
                Ok(None) => return Err(ControllerError::ChannelClosed("command stream ended".into())),
                Err(e) => warn!("Unable to pull command message: {e}"),
            }
        };
        // the sender never hears back, acking only removes the message from the work queue
        if let Err(e) = message.ack().await {
            warn!("Unable to ack command message: {e}");
        }
        debug!("Received command message on {}", message.subject);
        CommandMessage::parse(&message.payload)
    }
}
