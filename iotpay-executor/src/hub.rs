//! Single-owner device hub.
//!
//! One tokio task owns the [`DeviceRegistry`] and the simulation RNG. Every
//! read and every mutation arrives as a [`Command`] over an mpsc channel and
//! is answered on a oneshot, so handlers never share mutable device state.
//! The simulation clock is polled in the same `select!` loop, which keeps
//! ticks strictly sequential and never interleaved with an action.

use iotpay_core::{
    alias_from_id, device_capabilities, Capability, CoreError, Device, DeviceDetail, DeviceKey,
    DeviceRegistry, DeviceSummary, DeviceType,
};
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Interval;
use tracing::{debug, info};

use crate::actions::{execute, ActionRequest, ActionResult};
use crate::clock::{advance_all, SimulationClock};
use crate::error::ExecutorError;

const COMMAND_BUFFER: usize = 64;

/// Identity, status and current capabilities of one device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceProfile {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub ens_domain: String,
    pub alias: String,
    pub status: &'static str,
    pub capabilities: Vec<Capability>,
}

impl DeviceProfile {
    fn of(device: &Device) -> Self {
        Self {
            id: device.id().to_owned(),
            name: device.info().name.clone(),
            device_type: device.device_type(),
            ens_domain: device.info().ens_domain.clone(),
            alias: alias_from_id(device.id()),
            status: device.status_label(),
            capabilities: device_capabilities(device),
        }
    }
}

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Summaries(Reply<Vec<DeviceSummary>>),
    Profiles(Reply<Vec<DeviceProfile>>),
    Detail(DeviceKey, Reply<Result<DeviceDetail, CoreError>>),
    Profile(DeviceKey, Reply<Result<DeviceProfile, CoreError>>),
    Execute(DeviceKey, Box<ActionRequest>, Reply<Result<ActionResult, CoreError>>),
    Tick(Reply<()>),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::Summaries(_) => "Summaries",
            Command::Profiles(_) => "Profiles",
            Command::Detail(..) => "Detail",
            Command::Profile(..) => "Profile",
            Command::Execute(..) => "Execute",
            Command::Tick(_) => "Tick",
        };
        f.write_str(name)
    }
}

/// Owner of all device state. Construct with [`DeviceHub::spawn`].
pub struct DeviceHub {
    registry: DeviceRegistry,
    rng: StdRng,
    commands: mpsc::Receiver<Command>,
}

impl DeviceHub {
    /// Move `registry` into a new hub task and return a handle to it.
    ///
    /// With `clock` set, every device advances once per period; without it
    /// the fleet only moves on [`HubHandle::tick`]. The task stops once every
    /// handle has been dropped.
    #[must_use]
    pub fn spawn(
        registry: DeviceRegistry,
        clock: Option<SimulationClock>,
        rng: StdRng,
    ) -> HubHandle {
        let (tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let hub = Self { registry, rng, commands };
        tokio::spawn(hub.run(clock));
        HubHandle { tx }
    }

    async fn run(mut self, clock: Option<SimulationClock>) {
        info!(
            devices = self.registry.len(),
            tick_period = ?clock.map(|c| c.period()),
            "device hub started"
        );
        let mut ticker = clock.map(|c| c.interval());
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                () = next_tick(ticker.as_mut()) => self.tick(),
            }
        }
        info!("device hub stopped");
    }

    fn tick(&mut self) {
        advance_all(&mut self.registry, &mut self.rng);
        debug!(devices = self.registry.len(), "simulation tick");
    }

    fn handle(&mut self, command: Command) {
        // A dropped receiver means the caller gave up; nothing to do.
        match command {
            Command::Summaries(reply) => {
                let _ = reply.send(self.registry.devices().iter().map(Device::summary).collect());
            }
            Command::Profiles(reply) => {
                let _ = reply.send(self.registry.devices().iter().map(DeviceProfile::of).collect());
            }
            Command::Detail(key, reply) => {
                let _ = reply.send(self.registry.find(&key).map(Device::detail));
            }
            Command::Profile(key, reply) => {
                let _ = reply.send(self.registry.find(&key).map(DeviceProfile::of));
            }
            Command::Execute(key, request, reply) => {
                let result = self.registry.find_mut(&key).map(|device| {
                    let result = execute(device, &request);
                    info!(
                        device_id = %device.id(),
                        action = %request.action,
                        applied = result.applied,
                        "action executed"
                    );
                    result
                });
                let _ = reply.send(result);
            }
            Command::Tick(reply) => {
                self.tick();
                let _ = reply.send(());
            }
        }
    }
}

async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Cloneable client for a running [`DeviceHub`].
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<Command>,
}

impl HubHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, ExecutorError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| ExecutorError::HubUnavailable)?;
        response.await.map_err(|_| ExecutorError::HubUnavailable)
    }

    /// One summary row per device, in registration order.
    ///
    /// # Errors
    /// Returns [`ExecutorError::HubUnavailable`] if the hub has stopped.
    pub async fn summaries(&self) -> Result<Vec<DeviceSummary>, ExecutorError> {
        self.request(Command::Summaries).await
    }

    /// # Errors
    /// Returns [`ExecutorError::HubUnavailable`] if the hub has stopped.
    pub async fn profiles(&self) -> Result<Vec<DeviceProfile>, ExecutorError> {
        self.request(Command::Profiles).await
    }

    /// # Errors
    /// Returns [`ExecutorError::Core`] for an unknown device and
    /// [`ExecutorError::HubUnavailable`] if the hub has stopped.
    pub async fn detail(&self, key: DeviceKey) -> Result<DeviceDetail, ExecutorError> {
        Ok(self.request(|reply| Command::Detail(key, reply)).await??)
    }

    /// # Errors
    /// Returns [`ExecutorError::Core`] for an unknown device and
    /// [`ExecutorError::HubUnavailable`] if the hub has stopped.
    pub async fn profile(&self, key: DeviceKey) -> Result<DeviceProfile, ExecutorError> {
        Ok(self.request(|reply| Command::Profile(key, reply)).await??)
    }

    /// Apply an action the payment gate has admitted.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Core`] for an unknown device and
    /// [`ExecutorError::HubUnavailable`] if the hub has stopped.
    pub async fn execute(
        &self,
        key: DeviceKey,
        request: ActionRequest,
    ) -> Result<ActionResult, ExecutorError> {
        Ok(self
            .request(|reply| Command::Execute(key, Box::new(request), reply))
            .await??)
    }

    /// Advance every device once, outside the clock's schedule.
    ///
    /// # Errors
    /// Returns [`ExecutorError::HubUnavailable`] if the hub has stopped.
    pub async fn tick(&self) -> Result<(), ExecutorError> {
        self.request(Command::Tick).await
    }
}
