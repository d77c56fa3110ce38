//! Synchronization controller
//!
//! Owns the session state and is the only place it changes. Each dispatched
//! action is reduced, then its effect runs against the new state. Effects
//! that produce follow-up actions push them onto a queue that the same
//! `dispatch` call drains, so nothing recurses.
//!
//! `dispatch` must be called from one thread at a time; producers on other
//! threads send through a channel consumed by [`Controller::run`].

use crate::domain::action::Action;
use crate::domain::audio::AudioAdapter;
use crate::domain::device::{Device, DeviceId};
use crate::domain::display::{StateObserver, VolumeDisplay};
use crate::domain::effect::Effect;
use crate::domain::reducer::reduce;
use crate::domain::state::SessionState;
use crate::domain::volume::Volume;
use crossbeam_channel::Receiver;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

pub const NO_DEVICES_FOUND: &str = "No output devices found";

pub struct Controller<A, D> {
    state: SessionState,
    adapter: A,
    display: D,
    observers: Vec<Box<dyn StateObserver>>,
    queue: VecDeque<Action>,
}

impl<A: AudioAdapter, D: VolumeDisplay> Controller<A, D> {
    pub fn new(adapter: A, display: D) -> Self {
        Self::with_state(SessionState::default(), adapter, display)
    }

    pub fn with_state(state: SessionState, adapter: A, display: D) -> Self {
        Self {
            state,
            adapter,
            display,
            observers: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn add_observer(&mut self, observer: Box<dyn StateObserver>) {
        self.observers.push(observer);
    }

    /// Reduce `action`, run its effect, then drain any follow-up actions
    pub fn dispatch(&mut self, action: Action) {
        self.queue.push_back(action);

        while let Some(next) = self.queue.pop_front() {
            self.step(next);
        }
    }

    /// Consume actions until every sender is dropped
    pub fn run(&mut self, actions: Receiver<Action>) {
        info!("Controller loop started");
        for action in actions.iter() {
            self.dispatch(action);
        }
        info!("Controller loop finished");
    }

    fn step(&mut self, action: Action) {
        debug!(action = action.name(), "Dispatching");

        self.state = reduce(&self.state, &action);

        match Effect::for_action(&action) {
            Effect::None => {}
            Effect::Discover => self.discover(),
            Effect::SyncMaster { notify } => {
                self.sync_master();
                if notify {
                    self.display
                        .notify(self.state.virtual_volume.value(), self.state.is_muted);
                }
            }
            Effect::WriteSubDevice { id, volume } => self.write(volume, id),
        }

        for observer in &mut self.observers {
            observer.state_changed(&self.state);
        }
    }

    fn discover(&mut self) {
        match self.adapter.discover() {
            Ok(devices) if devices.is_empty() => {
                warn!("Discovery returned no output devices");
                self.queue.push_back(Action::DevicesUpdated(devices));
                self.queue
                    .push_back(Action::SetError(Some(NO_DEVICES_FOUND.to_string())));
            }
            Ok(devices) => {
                info!(
                    count = devices.len(),
                    nodes = devices.iter().map(Device::node_count).sum::<usize>(),
                    "Discovered output devices"
                );
                self.queue.push_back(Action::DevicesUpdated(devices));
            }
            Err(e) => {
                warn!(error = %e, "Device discovery failed");
                self.queue.push_back(Action::SetError(Some(format!(
                    "Device discovery failed: {}",
                    e
                ))));
            }
        }
    }

    /// Write the new master state to the selected device or its children
    fn sync_master(&self) {
        let Some(device) = &self.state.selected_device else {
            debug!("No device selected, skipping hardware sync");
            return;
        };

        if device.is_composite() {
            for child in device.children() {
                let volume = if self.state.is_muted {
                    Volume::SILENT
                } else {
                    child.volume()
                };
                self.write(volume, child.id());
            }
        } else {
            self.write(self.state.effective_volume(), device.id());
        }
    }

    fn write(&self, volume: Volume, device: DeviceId) {
        if let Err(e) = self.adapter.set_volume(volume, device) {
            warn!(device = %device, volume = volume.value(), error = %e, "Volume write failed");
        }
    }
}
