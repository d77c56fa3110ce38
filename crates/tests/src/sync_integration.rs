//! Integration tests for the synchronization pipeline
//!
//! These tests drive the controller against the simulated hardware and check
//! what actually lands on each device element.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use volsync_core::domain::{
    Action, Controller, DeviceId, Element, SessionState, StateObserver, Volume, VolumeDisplay,
};
use volsync_core::domain::source::{ActionSource, SourceError};
use volsync_infra::audio::{HalAdapter, MemoryBackend};
use volsync_tests::*;

#[derive(Clone, Default)]
struct RecordingDisplay(Arc<Mutex<Vec<(f32, bool)>>>);

impl VolumeDisplay for RecordingDisplay {
    fn notify(&self, volume: f32, muted: bool) {
        self.0.lock().unwrap().push((volume, muted));
    }
}

type RigController = Controller<HalAdapter<MemoryBackend>, RecordingDisplay>;

fn controller() -> (RigController, RecordingDisplay) {
    let display = RecordingDisplay::default();
    let mut controller = Controller::new(rig_adapter(), display.clone());
    controller.dispatch(Action::RefreshDevices);
    (controller, display)
}

fn backend(controller: &RigController) -> &MemoryBackend {
    controller.adapter().backend()
}

fn stored(controller: &RigController, id: DeviceId, element: Element) -> f32 {
    backend(controller).volume(id, element).unwrap()
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-5,
        "expected {}, got {}",
        expected,
        actual
    );
}

// ============================================================================
// DISCOVERY
// ============================================================================

#[test]
fn test_discovery_builds_catalog() {
    let (controller, _) = controller();
    let state = controller.state();

    let ids: Vec<DeviceId> = state.available_devices.iter().map(|d| d.id()).collect();
    assert_eq!(ids, vec![SPEAKERS, HEADPHONES, HDMI, AGGREGATE]);

    let aggregate = &state.available_devices[3];
    assert!(aggregate.is_composite());
    assert_eq!(aggregate.children().len(), 3);
    assert_close(aggregate.children()[1].volume().value(), 0.2);
    assert!(state.error_message.is_none());
}

#[test]
fn test_hotplug_refresh_keeps_stale_selection() {
    let (mut controller, _) = controller();
    controller.dispatch(Action::SelectDevice(AGGREGATE));

    backend(&controller).remove_device(AGGREGATE);
    controller.dispatch(Action::RefreshDevices);

    let state = controller.state();
    assert_eq!(state.available_devices.len(), 3);
    assert_eq!(state.selected_device.as_ref().map(|d| d.id()), Some(AGGREGATE));
}

#[test]
fn test_enumeration_failure_surfaces_error() {
    let (mut controller, _) = controller();
    backend(&controller).fail_enumeration(Some(-50));
    controller.dispatch(Action::RefreshDevices);

    let state = controller.state();
    assert_eq!(state.available_devices.len(), 4);
    assert!(state
        .error_message
        .as_deref()
        .unwrap()
        .contains("status -50"));
}

// ============================================================================
// MASTER PROPAGATION
// ============================================================================

#[test]
fn test_set_volume_shifts_every_child() {
    let (mut controller, display) = controller();
    controller.dispatch(Action::SelectDevice(AGGREGATE));
    controller.dispatch(Action::SetVolume(0.6));

    // Speakers clamp at the top, headphones keep their headroom
    assert_close(stored(&controller, SPEAKERS, Element::MAIN), 1.0);
    assert_close(stored(&controller, HEADPHONES, Element::LEFT), 0.3);
    assert_close(stored(&controller, HEADPHONES, Element::RIGHT), 0.3);
    // Read-only device is skipped without disturbing the others
    assert_close(stored(&controller, HDMI, Element::MAIN), 0.6);

    assert!(display.0.lock().unwrap().is_empty());
}

#[test]
fn test_mute_writes_silence_and_restores() {
    let (mut controller, display) = controller();
    controller.dispatch(Action::SelectDevice(AGGREGATE));
    controller.dispatch(Action::ToggleMute);

    assert_close(stored(&controller, SPEAKERS, Element::MAIN), 0.0);
    assert_close(stored(&controller, HEADPHONES, Element::LEFT), 0.0);

    controller.dispatch(Action::ToggleMute);
    assert_close(stored(&controller, SPEAKERS, Element::MAIN), 0.95);
    assert_close(stored(&controller, HEADPHONES, Element::RIGHT), 0.2);

    assert_eq!(*display.0.lock().unwrap(), vec![(0.5, true), (0.5, false)]);
}

#[test]
fn test_simple_device_gets_master_directly() {
    let (mut controller, display) = controller();
    controller.dispatch(Action::SelectDevice(HEADPHONES));
    assert_close(controller.state().virtual_volume.value(), 0.2);

    for _ in 0..3 {
        controller.dispatch(Action::IncreaseVolume);
    }

    assert_close(stored(&controller, HEADPHONES, Element::LEFT), 0.3875);
    assert_close(stored(&controller, HEADPHONES, Element::RIGHT), 0.3875);
    assert_eq!(display.0.lock().unwrap().len(), 3);
}

#[test]
fn test_failing_child_does_not_block_siblings() {
    let (mut controller, _) = controller();
    controller.dispatch(Action::SelectDevice(AGGREGATE));
    backend(&controller).fail_writes(SPEAKERS, Some(-10851));
    backend(&controller).take_writes();

    controller.dispatch(Action::DecreaseVolume);

    let writes = backend(&controller).take_writes();
    let targets: Vec<DeviceId> = writes.iter().map(|w| w.object).collect();
    assert_eq!(targets, vec![HEADPHONES, HEADPHONES]);
    assert_close(stored(&controller, SPEAKERS, Element::MAIN), 0.95);
    assert!(controller.state().error_message.is_none());
}

// ============================================================================
// SUB-DEVICES
// ============================================================================

#[test]
fn test_sub_device_write_is_isolated() {
    let (mut controller, _) = controller();
    controller.dispatch(Action::SelectDevice(AGGREGATE));
    backend(&controller).take_writes();

    controller.dispatch(Action::SetSubDeviceVolume(HEADPHONES, 0.7));

    let writes = backend(&controller).take_writes();
    assert!(writes.iter().all(|w| w.object == HEADPHONES));
    assert_close(stored(&controller, HEADPHONES, Element::LEFT), 0.7);
    assert_close(stored(&controller, SPEAKERS, Element::MAIN), 0.95);
    assert_close(controller.state().virtual_volume.value(), 0.5);
}

#[test]
fn test_sub_device_edit_carries_into_next_master_change() {
    let (mut controller, _) = controller();
    controller.dispatch(Action::SelectDevice(AGGREGATE));
    controller.dispatch(Action::SetSubDeviceVolume(HEADPHONES, 0.4));
    controller.dispatch(Action::IncreaseVolume);

    assert_close(stored(&controller, HEADPHONES, Element::LEFT), 0.4625);
    assert_close(stored(&controller, SPEAKERS, Element::MAIN), 1.0);
}

// ============================================================================
// ACTION INGRESS
// ============================================================================

struct DeniedSource;

impl ActionSource for DeniedSource {
    fn start(&mut self, _sink: crossbeam_channel::Sender<Action>) -> Result<(), SourceError> {
        Err(SourceError::PermissionDenied("event tap refused".to_string()))
    }
}

struct ScriptedSource(Vec<Action>);

impl ActionSource for ScriptedSource {
    fn start(&mut self, sink: crossbeam_channel::Sender<Action>) -> Result<(), SourceError> {
        let actions = std::mem::take(&mut self.0);
        std::thread::spawn(move || {
            for action in actions {
                if sink.send(action).is_err() {
                    break;
                }
            }
        });
        Ok(())
    }
}

struct History(Arc<Mutex<Vec<SessionState>>>);

impl StateObserver for History {
    fn state_changed(&mut self, state: &SessionState) {
        self.0.lock().unwrap().push(state.clone());
    }
}

#[test]
fn test_permission_failure_reaches_state() {
    let (mut controller, _) = controller();
    let (tx, _rx) = crossbeam_channel::unbounded();

    if let Err(e) = DeniedSource.start(tx) {
        controller.dispatch(e.to_action());
    }

    assert_eq!(
        controller.state().error_message.as_deref(),
        Some("Missing permission")
    );
}

#[test]
fn test_source_actions_are_serialized_through_run() {
    let (mut controller, _) = controller();
    let history = Arc::new(Mutex::new(Vec::new()));
    controller.add_observer(Box::new(History(history.clone())));

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut source = ScriptedSource(vec![
        Action::SelectDevice(SPEAKERS),
        Action::SetVolume(0.25),
        Action::ToggleMute,
    ]);
    source.start(tx).unwrap();
    controller.run(rx);

    let history = history.lock().unwrap();
    assert_eq!(history.len(), 3);
    assert!(history[2].is_muted);
    assert_close(stored(&controller, SPEAKERS, Element::MAIN), 0.0);
    assert_eq!(Volume::new(0.25), controller.state().virtual_volume);
}

#[test]
fn test_unsettable_simple_device_is_non_fatal() {
    let (mut controller, _) = controller();
    controller.dispatch(Action::SelectDevice(HDMI));
    controller.dispatch(Action::SetVolume(0.1));

    assert_close(stored(&controller, HDMI, Element::MAIN), 0.6);
    assert_close(controller.state().virtual_volume.value(), 0.1);
    assert!(backend(&controller).writes().iter().all(|w| w.object != HDMI));
    assert!(controller.state().error_message.is_none());
}

// ============================================================================
// PROPERTIES
// ============================================================================

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::IncreaseVolume),
        Just(Action::DecreaseVolume),
        Just(Action::ToggleMute),
        (0.0f32..=1.0).prop_map(Action::SetVolume),
        (0.0f32..=1.0).prop_map(|v| Action::SetSubDeviceVolume(HEADPHONES, v)),
    ]
}

proptest! {
    #[test]
    fn prop_hardware_levels_stay_in_range(actions in prop::collection::vec(arb_action(), 1..40)) {
        let (mut controller, _) = controller();
        controller.dispatch(Action::SelectDevice(AGGREGATE));
        for action in actions {
            controller.dispatch(action);
        }

        for record in backend(&controller).writes() {
            let level = record.volume().unwrap();
            prop_assert!((0.0..=1.0).contains(&level));
        }

        let muted = controller.state().is_muted;
        let speakers = stored(&controller, SPEAKERS, Element::MAIN);
        if muted {
            prop_assert_eq!(speakers, 0.0);
        }
    }
}
