//! Main behaviour executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Connect to the rover's bus and the swarm forwarder
//!     - Main loop:
//!         - Drain all inbound messages from the bus into the behaviour loop
//!         - Drain all broadcasts from the swarm into the behaviour loop
//!         - Tick the behaviour loop
//!         - Publish everything the loop produced
//!         - Sleep for the rest of the cycle

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use bhv_lib::{
    bhv_loop::{BhvLoop, Clock},
    bus_client::{BusClient, BusClientError},
    controller::IdleController,
    frame_tf::PoseFrameTf,
    params::BhvParams,
    swarm_client::SwarmClient,
};
use comms_if::net::NetParams;
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::{self, Session},
    time,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Behaviour executable for a swarm rover.
#[derive(Debug, StructOpt)]
#[structopt(name = "bhv_exec")]
struct Opt {
    /// Published name of this rover, used as it's bus topic and swarm identity. Defaults to the
    /// host name.
    #[structopt(short, long)]
    name: Option<String>,

    /// Log debug and trace messages
    #[structopt(short, long)]
    verbose: bool,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("bhv_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    let level = if opt.verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    };
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Swarm Behaviour Executable\n");
    let uname = host::get_uname().wrap_err("Failed to get host information")?;
    info!("Running on: {:#?}", uname);
    info!("Session directory: {:?}\n", session.session_root);

    let name = opt.name.unwrap_or(uname.nodename);
    info!("Published name: {}", name);

    // ---- LOAD PARAMETERS ----

    let params: BhvParams =
        util::params::load("bhv_exec.toml").wrap_err("Could not load bhv_exec params")?;

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    info!("Exec parameters loaded");
    debug!("{:#?}", params);

    let cycle_period = Duration::from_secs_f64(params.cycle_period_s);

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let bus_client = BusClient::new(&zmq_ctx, &net_params, &name)
        .wrap_err("Failed to initialise the BusClient")?;
    info!("BusClient initialised");

    let swarm_client =
        SwarmClient::new(&zmq_ctx, &net_params).wrap_err("Failed to initialise the SwarmClient")?;
    info!("SwarmClient initialised");

    info!("Network initialisation complete");

    // ---- INITIALISE BEHAVIOUR ----

    let mut tf = PoseFrameTf::new();
    let mut bhv = BhvLoop::new(&name, params, IdleController::default());

    let mut num_consec_cycle_overruns: u64 = 0;

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- DATA INPUT ----

        loop {
            match bus_client.recieve() {
                Ok(Some(input)) => {
                    tf.observe(&input);
                    if let Err(e) = bhv.handle_input(input) {
                        warn!("Rejected inbound message: {}", e);
                    }
                }
                Ok(None) => break,
                Err(e @ BusClientError::ParseError(_)) | Err(e @ BusClientError::MissingPayload) => {
                    warn!("{}", e)
                }
                Err(e) => {
                    warn!("BusClient error: {}", e);
                    break;
                }
            }
        }

        loop {
            match swarm_client.recieve() {
                Ok(Some(msg)) => bhv.handle_swarm(&msg),
                Ok(None) => break,
                Err(e) => {
                    warn!("SwarmClient error: {}", e);
                    break;
                }
            }
        }

        // ---- BEHAVIOUR PROCESSING ----

        bhv.tick(
            Clock {
                elapsed_s: session::get_elapsed_seconds(),
                now_ms: time::now_millis(),
            },
            &tf,
        );

        // ---- OUTPUT ----

        let outbox = bhv.take_outbox();

        for msg in outbox.bhv.iter() {
            if let Err(e) = bus_client.send(msg) {
                warn!("Could not publish {:?}: {}", msg, e);
            }
        }

        for msg in outbox.swarm.iter() {
            match swarm_client.send(msg) {
                Ok(()) => info!("Broadcast {:?} to the swarm", msg),
                Err(e) => warn!("Could not broadcast {:?}: {}", msg, e),
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                num_consec_cycle_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s ({} consecutive)",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64(),
                    num_consec_cycle_overruns
                );
            }
        }
    }
}
