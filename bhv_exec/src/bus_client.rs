//! # Bus client
//!
//! Connects the behaviour executable to the rover's own channels. Inbound messages (sensors, mode,
//! operator requests) arrive on a SUB socket and outbound messages are published on a PUB socket,
//! both under the rover's published name as the topic.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use comms_if::{
    bhv::{BhvInput, BhvOutput},
    net::{self, zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Client for the rover's own channels.
pub struct BusClient {
    topic: String,
    sub: MonitoredSocket,
    publ: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum BusClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send a message: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the message: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not parse the recieved message: {0}")]
    ParseError(serde_json::Error),

    #[error("The recieved message has no payload")]
    MissingPayload,

    #[error("The recieved message was not valid UTF-8")]
    NonUtf8Message,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BusClient {
    /// Create a new bus client for the rover with the given published name.
    ///
    /// This function will not block until the sockets connect.
    pub fn new(ctx: &zmq::Context, params: &NetParams, name: &str) -> Result<Self, BusClientError> {
        let sub_options = SocketOptions {
            block_on_first_connect: false,
            subscribe: vec![net::subscription(name)],
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 0,
            ..Default::default()
        };

        let sub = MonitoredSocket::new(ctx, zmq::SUB, sub_options, &params.bhv_in_endpoint)
            .map_err(BusClientError::SocketError)?;

        let pub_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        let publ = MonitoredSocket::new(ctx, zmq::PUB, pub_options, &params.bhv_out_endpoint)
            .map_err(BusClientError::SocketError)?;

        Ok(Self {
            topic: name.to_string(),
            sub,
            publ,
        })
    }

    /// Recieve a single inbound message.
    ///
    /// Call in a loop until `Ok(None)` is returned, at which point no more messages are pending.
    pub fn recieve(&self) -> Result<Option<BhvInput>, BusClientError> {
        loop {
            let msg = match self.sub.recv_string(zmq::DONTWAIT) {
                Ok(Ok(s)) => s,
                Ok(Err(_)) => return Err(BusClientError::NonUtf8Message),
                Err(zmq::Error::EAGAIN) => return Ok(None),
                Err(e) => return Err(BusClientError::RecvError(e)),
            };

            if let Some(msg) = parse(&msg, &self.topic)? {
                return Ok(Some(msg));
            }
        }
    }

    /// Publish a single outbound message.
    pub fn send(&self, msg: &BhvOutput) -> Result<(), BusClientError> {
        let payload = serde_json::to_string(msg).map_err(BusClientError::SerializationError)?;

        self.publ
            .send(&net::frame(&self.topic, &payload), 0)
            .map_err(BusClientError::SendError)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Parse a recieved network message, `Ok(None)` if it was published under another topic.
fn parse(msg: &str, topic: &str) -> Result<Option<BhvInput>, BusClientError> {
    let (msg_topic, payload) = net::unframe(msg).ok_or(BusClientError::MissingPayload)?;

    if msg_topic != topic {
        trace!("Dropped message published under {:?}", msg_topic);
        return Ok(None);
    }

    serde_json::from_str(payload)
        .map(Some)
        .map_err(BusClientError::ParseError)
}
