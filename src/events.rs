//! Session-owned publish/subscribe channel.

use std::marker::PhantomData;

/// Parties that can listen on a session channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    Formation,
}

/// Broadcast by the game every speed step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedChange {
    pub delta: f32,
}

/// A list of subscribers and the message type they receive. Publishing hands
/// back one `(subscriber, message)` pair per subscriber and the owner routes
/// them, so no callbacks are stored and nothing outlives the session.
#[derive(Debug, Clone)]
pub struct Channel<K, T> {
    subscribers: Vec<K>,
    _message: PhantomData<T>,
}

impl<K, T> Default for Channel<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> Channel<K, T> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            _message: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Drops every subscriber; called on session teardown
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}

impl<K: Copy + PartialEq, T: Clone> Channel<K, T> {
    /// Subscribing twice is a no-op. Returns whether `subscriber` was added.
    pub fn subscribe(&mut self, subscriber: K) -> bool {
        if self.is_subscribed(&subscriber) {
            return false;
        }
        self.subscribers.push(subscriber);
        true
    }

    pub fn unsubscribe(&mut self, subscriber: K) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| *s != subscriber);
        self.subscribers.len() != before
    }

    pub fn is_subscribed(&self, subscriber: &K) -> bool {
        self.subscribers.contains(subscriber)
    }

    pub fn publish(&self, message: T) -> Vec<(K, T)> {
        self.subscribers
            .iter()
            .map(|s| (*s, message.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_each_subscriber_once() {
        let mut channel: Channel<u8, &str> = Channel::new();
        assert!(channel.subscribe(1));
        assert!(channel.subscribe(2));
        assert!(!channel.subscribe(1));
        assert_eq!(channel.publish("go"), vec![(1, "go"), (2, "go")]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut channel: Channel<Listener, SpeedChange> = Channel::new();
        channel.subscribe(Listener::Formation);
        assert!(channel.unsubscribe(Listener::Formation));
        assert!(!channel.unsubscribe(Listener::Formation));
        assert!(channel.publish(SpeedChange { delta: 1.0 }).is_empty());
    }

    #[test]
    fn test_clear_drops_everyone() {
        let mut channel: Channel<Listener, SpeedChange> = Channel::new();
        channel.subscribe(Listener::Formation);
        channel.clear();
        assert!(channel.is_empty());
        assert!(!channel.is_subscribed(&Listener::Formation));
    }
}
