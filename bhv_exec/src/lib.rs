//! # Behaviour library.
//!
//! This library contains the behaviour core of a single swarm rover: mode arbitration, the center
//! location estimate, and the startup handshake with the rest of the swarm. The `bhv_exec`
//! executable connects it to the rover's network.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Mode arbiter - turns controller decisions into actuator demands
pub mod arbiter;

/// Behaviour loop - the per-cycle driver owning all behaviour state
pub mod bhv_loop;

/// Swarm bootstrap - one shot boot and identity broadcasts
pub mod boot;

/// Bus client - the rover's own inbound and outbound channels
pub mod bus_client;

/// Center estimation - drift correction and running average of the collection zone center
pub mod center;

/// Controller interface - the behaviour engine consulted each cycle
pub mod controller;

pub mod data_store;

/// Virtual fence descriptors
pub mod fence;

/// Frame transforms between the odometry and map frames
pub mod frame_tf;

/// Joystick mixing for manual driving
pub mod joy;

pub mod outbox;

pub mod params;

/// Sonar synchroniser - matches readings from the three sonars
pub mod sonar_sync;

/// Swarm client - broadcasts shared with the whole swarm
pub mod swarm_client;

#[cfg(test)]
mod testing;
