//! # Control Module
//!
//! Messages the bridge receives from the broker.
//!
//! This module handles:
//! - Fan duty-cycle commands applied to a PWM output
//! - Echoing every message under a topic filter to the log
//! - Routing delivered messages to whichever of the two is enabled

pub mod fan;
pub mod monitor;
pub mod pwm;

use self::fan::{FanController, FanOutput, FanStats};
use self::monitor::TopicMonitor;

/// Receiver of messages delivered on subscribed topics
pub trait IncomingHandler {
    /// Topic filters to subscribe to after every (re)connect
    fn subscriptions(&self) -> Vec<String>;

    /// Handle one delivered message
    fn handle(&mut self, topic: &str, payload: &[u8]);
}

/// Dispatches broker messages to the fan controller and the topic monitor
#[derive(Default)]
pub struct MessageRouter {
    fan: Option<FanController<Box<dyn FanOutput + Send>>>,
    monitor: Option<TopicMonitor>,
}

impl std::fmt::Debug for MessageRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRouter")
            .field("fan_topic", &self.fan.as_ref().map(|fan| fan.topic()))
            .field("monitor", &self.monitor)
            .finish()
    }
}

impl MessageRouter {
    /// Create a router with nothing enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply duty-cycle commands received on `topic` to `output`
    pub fn with_fan<F>(mut self, output: F, topic: impl Into<String>) -> Self
    where
        F: FanOutput + Send + 'static,
    {
        let output: Box<dyn FanOutput + Send> = Box::new(output);
        self.fan = Some(FanController::new(output, topic));
        self
    }

    /// Log every message matching the monitor's filter
    pub fn with_monitor(mut self, monitor: TopicMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn fan_stats(&self) -> Option<FanStats> {
        self.fan.as_ref().map(FanController::stats)
    }

    /// Messages echoed by the monitor so far
    pub fn monitored(&self) -> u64 {
        self.monitor.as_ref().map_or(0, TopicMonitor::seen)
    }
}

impl IncomingHandler for MessageRouter {
    fn subscriptions(&self) -> Vec<String> {
        let mut filters = Vec::new();
        if let Some(fan) = &self.fan {
            filters.push(fan.topic().to_string());
        }
        if let Some(monitor) = &self.monitor {
            filters.push(monitor.filter().to_string());
        }
        filters
    }

    fn handle(&mut self, topic: &str, payload: &[u8]) {
        if let Some(fan) = self.fan.as_mut().filter(|fan| fan.topic() == topic) {
            fan.handle(payload);
        }

        if let Some(monitor) = &mut self.monitor {
            monitor.handle(topic, payload);
        }
    }
}
