use super::*;

use crate::call_with_retries;

use std::sync::atomic::{AtomicU64, Ordering};

/// Number of dial attempts made by a reconnect.
pub const CONNECT_ATTEMPTS: u32 = 5;

/// Fixed delay between two dial attempts.
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Bounded, fixed-delay retry policy for reconnecting to the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        RetryPolicy {
            attempts: attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(CONNECT_ATTEMPTS, CONNECT_RETRY_DELAY)
    }
}

/// A connected client together with the network it reported.
#[derive(Clone, Debug)]
pub struct Session<C> {
    pub client: C,
    pub network_id: u64,
}

struct ConnectionState<C> {
    client: Option<C>,
    network_id: Option<u64>,
}

impl<C: Clone> ConnectionState<C> {
    fn commit(&mut self, session: Session<C>) {
        self.client = Some(session.client);
        self.network_id = Some(session.network_id);
    }

    fn session(&self) -> Option<Session<C>> {
        match (&self.client, self.network_id) {
            (Some(client), Some(network_id)) => Some(Session {
                client: client.clone(),
                network_id,
            }),
            _ => None,
        }
    }
}

/// Owns the single connection to the node.
///
/// Reconnects happen under one lock and bump a generation counter. A check that
/// waited on the lock while another check reconnected takes that outcome as its
/// own, so concurrent checks share a single retry budget. Liveness round trips
/// on an existing client run outside the lock.
pub struct ConnectionManager<K: Connector> {
    connector: K,
    url: String,
    retry: RetryPolicy,
    state: Mutex<ConnectionState<K::Client>>,
    generation: AtomicU64,
}

impl<K: Connector> ConnectionManager<K> {
    pub fn new(connector: K, url: impl Into<String>, retry: RetryPolicy) -> Self {
        ConnectionManager {
            connector,
            url: url.into(),
            retry,
            state: Mutex::new(ConnectionState {
                client: None,
                network_id: None,
            }),
            generation: AtomicU64::new(0),
        }
    }

    /// Get the node URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Get the network ID recorded by the last successful connect.
    pub fn network_id(&self) -> Option<u64> {
        self.state.lock().network_id
    }

    /// Dial the node once and record the connection on success.
    pub fn connect(&self) -> bool {
        match self.dial() {
            Ok(session) => {
                info!(node = %self.url, network_id = session.network_id, "connected to node");
                let mut state = self.state.lock();
                state.commit(session);
                self.generation.fetch_add(1, Ordering::Release);
                true
            }
            Err(e) => {
                warn!(node = %self.url, "failed to connect to node: {e:#}");
                false
            }
        }
    }

    /// Returns `true` if a connection exists and answers a network ID round trip.
    pub fn is_connected(&self) -> bool {
        let client = self.state.lock().client.clone();
        match client {
            Some(client) => match client.network_id() {
                Ok(_) => true,
                Err(e) => {
                    warn!(node = %self.url, "node connection check failed: {e:#}");
                    false
                }
            },
            None => false,
        }
    }

    /// Reconnect to the node under the retry policy.
    pub fn retry_connect(&self) -> bool {
        let mut state = self.state.lock();
        self.retry_connect_locked(&mut state)
    }

    /// Return the live connection, reconnecting under the retry policy if needed.
    ///
    /// Returns `None` when no connection has been established. After a failed
    /// reconnect the previous client is still returned, and the queries made with it
    /// report the transport error.
    pub fn ensure_connected(&self) -> Option<Session<K::Client>> {
        let generation = self.generation.load(Ordering::Acquire);

        let client = {
            let state = self.state.lock();
            if self.generation.load(Ordering::Acquire) != generation {
                return state.session();
            }
            state.client.clone()
        };

        if let Some(client) = client {
            match client.network_id() {
                Ok(network_id) => return Some(Session { client, network_id }),
                Err(e) => warn!(node = %self.url, "node connection lost: {e:#}"),
            }
        }

        let mut state = self.state.lock();
        if self.generation.load(Ordering::Acquire) == generation {
            self.retry_connect_locked(&mut state);
        }
        state.session()
    }

    fn retry_connect_locked(&self, state: &mut ConnectionState<K::Client>) -> bool {
        let mut attempt = 0u32;
        let result = call_with_retries!(
            {
                attempt += 1;
                self.dial().inspect_err(|e| {
                    debug!(node = %self.url, attempt, "connection attempt failed: {e:#}")
                })
            },
            self.retry.attempts,
            self.retry.delay
        );

        self.generation.fetch_add(1, Ordering::Release);
        match result {
            Ok(session) => {
                info!(node = %self.url, network_id = session.network_id, attempt, "reconnected to node");
                state.commit(session);
                true
            }
            Err(e) => {
                warn!(node = %self.url, attempts = self.retry.attempts, "cannot connect to node: {e:#}");
                false
            }
        }
    }

    // Dial the node and identify its network.
    fn dial(&self) -> Result<Session<K::Client>> {
        let client = self.connector.dial(&self.url)?;
        let network_id = client
            .network_id()
            .context("failed to fetch the node network id")?;
        Ok(Session { client, network_id })
    }
}
