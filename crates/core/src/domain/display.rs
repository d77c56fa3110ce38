//! Outbound collaborators: on-screen display and state observers

use crate::domain::state::SessionState;

/// Transient volume indicator
///
/// Fire-and-forget; implementations hide themselves after a fixed duration.
pub trait VolumeDisplay: Send {
    fn notify(&self, volume: f32, muted: bool);
}

/// Display that shows nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl VolumeDisplay for NullDisplay {
    fn notify(&self, _volume: f32, _muted: bool) {}
}

impl<D: VolumeDisplay + ?Sized> VolumeDisplay for Box<D> {
    fn notify(&self, volume: f32, muted: bool) {
        (**self).notify(volume, muted)
    }
}

/// Read-only view of the session, called after every dispatched action
pub trait StateObserver: Send {
    fn state_changed(&mut self, state: &SessionState);
}
