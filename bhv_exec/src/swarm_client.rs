//! # Swarm client
//!
//! Connects to the swarm forwarder, through which every rover's bootstrap broadcasts are shared.
//! The rover's own broadcasts are recieved back through the forwarder like everyone else's.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use comms_if::{
    net::{self, zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
    swarm::SwarmMsg,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Topic used for all swarm broadcasts.
pub const SWARM_TOPIC: &str = "swarm";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct SwarmClient {
    sub: MonitoredSocket,
    publ: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SwarmClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not broadcast to the swarm: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve from the swarm: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the broadcast: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not parse the recieved broadcast: {0}")]
    ParseError(serde_json::Error),

    #[error("The recieved broadcast has no payload")]
    MissingPayload,

    #[error("The recieved broadcast was not valid UTF-8")]
    NonUtf8Message,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SwarmClient {
    /// Create a new swarm client, connecting to both sides of the forwarder.
    ///
    /// This function will not block until the sockets connect.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, SwarmClientError> {
        let sub_options = SocketOptions {
            block_on_first_connect: false,
            subscribe: vec![net::subscription(SWARM_TOPIC)],
            connect_timeout: 1000,
            linger: 1,
            recv_timeout: 0,
            ..Default::default()
        };

        let sub = MonitoredSocket::new(ctx, zmq::SUB, sub_options, &params.swarm_sub_endpoint)
            .map_err(SwarmClientError::SocketError)?;

        let pub_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        let publ = MonitoredSocket::new(ctx, zmq::PUB, pub_options, &params.swarm_pub_endpoint)
            .map_err(SwarmClientError::SocketError)?;

        Ok(Self { sub, publ })
    }

    /// Recieve a single broadcast, `Ok(None)` if none are pending.
    pub fn recieve(&self) -> Result<Option<SwarmMsg>, SwarmClientError> {
        loop {
            let msg = match self.sub.recv_string(zmq::DONTWAIT) {
                Ok(Ok(s)) => s,
                Ok(Err(_)) => return Err(SwarmClientError::NonUtf8Message),
                Err(zmq::Error::EAGAIN) => return Ok(None),
                Err(e) => return Err(SwarmClientError::RecvError(e)),
            };

            if let Some(msg) = parse(&msg, SWARM_TOPIC)? {
                return Ok(Some(msg));
            }
        }
    }

    /// Broadcast a message to the swarm.
    pub fn send(&self, msg: &SwarmMsg) -> Result<(), SwarmClientError> {
        let payload = serde_json::to_string(msg).map_err(SwarmClientError::SerializationError)?;

        self.publ
            .send(&net::frame(SWARM_TOPIC, &payload), 0)
            .map_err(SwarmClientError::SendError)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Parse a recieved network message, `Ok(None)` if it was published under another topic.
fn parse(msg: &str, topic: &str) -> Result<Option<SwarmMsg>, SwarmClientError> {
    let (msg_topic, payload) = net::unframe(msg).ok_or(SwarmClientError::MissingPayload)?;

    if msg_topic != topic {
        trace!("Dropped message published under {:?}", msg_topic);
        return Ok(None);
    }

    serde_json::from_str(payload)
        .map(Some)
        .map_err(SwarmClientError::ParseError)
}
