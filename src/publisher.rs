//! # Publisher
//!
//! Hand-off of formatted messages to the message broker. Sends are
//! non-blocking: the MQTT event loop runs in its own task and the pipeline
//! never waits on the network.
//!
//! The same connection carries the bridge's subscriptions: after every
//! connect the event loop subscribes to the topics an [`IncomingHandler`]
//! asks for and passes each delivered message to it.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Incoming, MqttOptions, Outgoing, QoS};
use tracing::{debug, error, info, trace, warn};

use crate::config::MqttConfig;
use crate::control::IncomingHandler;
use crate::error::{Result, SmokerBridgeError};

/// Capacity of the client's outgoing request channel
const REQUEST_CHANNEL_CAPACITY: usize = 32;

/// Delay before polling the event loop again after a connection error
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Destination for formatted messages
#[cfg_attr(test, mockall::automock)]
pub trait Publisher {
    /// Queue `payload` for delivery on `topic` without blocking
    ///
    /// # Errors
    ///
    /// Returns error if the message could not be handed off
    fn send(&self, topic: &str, payload: &str) -> Result<()>;
}

/// MQTT publisher backed by `rumqttc`
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl std::fmt::Debug for MqttPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttPublisher").finish_non_exhaustive()
    }
}

impl MqttPublisher {
    /// Create a publisher and the event loop that drives its connection
    ///
    /// The returned [`EventLoop`] must be polled (see [`run_event_loop`]) for
    /// anything to reach the broker.
    pub fn new(config: &MqttConfig) -> (Self, EventLoop) {
        let mut opts = MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
        opts.set_keep_alive(Duration::from_secs(config.keep_alive_s));

        let (client, eventloop) = AsyncClient::new(opts, REQUEST_CHANNEL_CAPACITY);
        info!("MQTT publisher -> {}:{} as {}", config.host, config.port, config.client_id);

        (Self { client }, eventloop)
    }

    /// Queue a QoS 0 subscription to `filter` without blocking
    ///
    /// # Errors
    ///
    /// Returns error if the request could not be handed off
    pub fn subscribe(&self, filter: &str) -> Result<()> {
        self.client
            .try_subscribe(filter, QoS::AtMostOnce)
            .map_err(|e| SmokerBridgeError::Publish(e.to_string()))
    }
}

impl Publisher for MqttPublisher {
    fn send(&self, topic: &str, payload: &str) -> Result<()> {
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload.as_bytes().to_vec())
            .map_err(|e| SmokerBridgeError::Publish(e.to_string()))
    }
}

/// Drive the MQTT connection forever, reconnecting after errors
///
/// # Arguments
///
/// * `eventloop` - Event loop returned by [`MqttPublisher::new`]
/// * `client` - Handle used to (re)subscribe after each connect
/// * `handler` - Receives every message delivered on a subscription
pub async fn run_event_loop<H: IncomingHandler>(mut eventloop: EventLoop, client: MqttPublisher, mut handler: H) {
    loop {
        match eventloop.poll().await {
            Ok(event) => handle_event(event, &client, &mut handler),
            Err(e) => {
                error!("MQTT event loop error: {}; retrying in {:?}", e, RECONNECT_DELAY);
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

fn handle_event<H: IncomingHandler + ?Sized>(event: Event, client: &MqttPublisher, handler: &mut H) {
    match event {
        Event::Incoming(Incoming::ConnAck(ack)) => {
            info!("MQTT connected: {:?}", ack.code);
            for filter in handler.subscriptions() {
                match client.subscribe(&filter) {
                    Ok(()) => info!("Subscribing to {}", filter),
                    Err(e) => warn!("Failed to subscribe to {}: {}", filter, e),
                }
            }
        }
        Event::Incoming(Incoming::Publish(publish)) => {
            trace!("MQTT message on {} ({} bytes)", publish.topic, publish.payload.len());
            handler.handle(&publish.topic, &publish.payload);
        }
        Event::Incoming(other) => trace!("MQTT incoming: {:?}", other),
        Event::Outgoing(Outgoing::Publish(pkid)) => debug!("MQTT publish -> pkid={}", pkid),
        Event::Outgoing(other) => trace!("MQTT outgoing: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumqttc::{ConnAck, ConnectReturnCode, Publish};

    fn test_config() -> MqttConfig {
        MqttConfig {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "smoker-bridge-test".to_string(),
            topic: "smoker/temperature".to_string(),
            keep_alive_s: 60,
        }
    }

    #[test]
    fn test_send_queues_without_connection() {
        let (publisher, _eventloop) = MqttPublisher::new(&test_config());
        assert!(publisher.send("smoker/temperature", "{}").is_ok());
    }

    #[test]
    fn test_send_fails_when_request_channel_full() {
        let (publisher, _eventloop) = MqttPublisher::new(&test_config());

        for _ in 0..REQUEST_CHANNEL_CAPACITY {
            publisher.send("smoker/temperature", "{}").unwrap();
        }

        match publisher.send("smoker/temperature", "{}") {
            Err(SmokerBridgeError::Publish(_)) => {}
            other => panic!("Expected Publish error, got: {:?}", other),
        }
    }

    /// Handler that records what it is asked to do
    #[derive(Default)]
    struct RecordingHandler {
        filters: Vec<String>,
        received: Vec<(String, Vec<u8>)>,
    }

    impl IncomingHandler for RecordingHandler {
        fn subscriptions(&self) -> Vec<String> {
            self.filters.clone()
        }

        fn handle(&mut self, topic: &str, payload: &[u8]) {
            self.received.push((topic.to_string(), payload.to_vec()));
        }
    }

    fn connack() -> Event {
        Event::Incoming(Incoming::ConnAck(ConnAck::new(ConnectReturnCode::Success, false)))
    }

    #[test]
    fn test_delivered_message_reaches_handler() {
        let (publisher, _eventloop) = MqttPublisher::new(&test_config());
        let mut handler = RecordingHandler::default();

        let publish = Publish::new("smoker/fan/cmd", QoS::AtMostOnce, "40");
        handle_event(Event::Incoming(Incoming::Publish(publish)), &publisher, &mut handler);

        assert_eq!(handler.received, vec![("smoker/fan/cmd".to_string(), b"40".to_vec())]);
    }

    #[test]
    fn test_connack_queues_one_subscription_per_filter() {
        let (publisher, _eventloop) = MqttPublisher::new(&test_config());
        let mut handler = RecordingHandler {
            filters: vec!["smoker/fan/cmd".to_string(), "smoker/#".to_string()],
            ..Default::default()
        };

        handle_event(connack(), &publisher, &mut handler);

        // Two of the request slots now hold the subscriptions
        for _ in 0..REQUEST_CHANNEL_CAPACITY - 2 {
            publisher.send("smoker/temperature", "{}").unwrap();
        }
        assert!(publisher.send("smoker/temperature", "{}").is_err());
        assert!(handler.received.is_empty());
    }

    #[test]
    fn test_connack_without_subscriptions() {
        let (publisher, _eventloop) = MqttPublisher::new(&test_config());
        let mut handler = RecordingHandler::default();

        handle_event(connack(), &publisher, &mut handler);

        for _ in 0..REQUEST_CHANNEL_CAPACITY {
            publisher.send("smoker/temperature", "{}").unwrap();
        }
    }

    #[test]
    fn test_subscribe_queues_without_connection() {
        let (publisher, _eventloop) = MqttPublisher::new(&test_config());
        assert!(publisher.subscribe("smoker/#").is_ok());
    }

    #[test]
    fn test_send_fails_after_event_loop_dropped() {
        let (publisher, eventloop) = MqttPublisher::new(&test_config());
        drop(eventloop);
        assert!(publisher.send("smoker/temperature", "{}").is_err());
    }
}
