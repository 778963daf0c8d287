//! End-to-end pipeline tests: enumeration → slot binding → polling →
//! queue hand-off → register window, all against the shared mock wire.

use std::cell::RefCell;
use std::rc::Rc;

use fieldnode::app::events::AppEvent;
use fieldnode::app::service::AcquisitionService;
use fieldnode::config::{SystemConfig, PROBE_SLOTS, RESULT_QUEUE_DEPTH};
use fieldnode::error::{BusError, RegisterError};
use fieldnode::probe::mirror::RegisterMirror;
use fieldnode::probe::queue::ReadingQueue;

use crate::mock_bus::{
    foreign_id, plug, probe_id, set_temp, unplug, BusState, MockBus, MockChannel, RecordingSink,
};

const BASE: u16 = 1000;

type Service<'q> = AcquisitionService<'q, MockBus, MockChannel, PROBE_SLOTS, RESULT_QUEUE_DEPTH>;
type Mirror<'q> = RegisterMirror<'q, PROBE_SLOTS, RESULT_QUEUE_DEPTH>;

fn build<'q>(
    state: &Rc<RefCell<BusState>>,
    queue: &'q ReadingQueue<RESULT_QUEUE_DEPTH>,
) -> (Service<'q>, Mirror<'q>) {
    let config = SystemConfig::default();
    let bus = MockBus::new(state.clone());
    let channels = [MockChannel::new(state.clone()), MockChannel::new(state.clone())];
    let service = AcquisitionService::new(bus, channels, queue, &config);
    let mirror = RegisterMirror::new(queue, config.probe_window_base, config.temp_max_age_secs);
    (service, mirror)
}

/// Reassemble a slot's identity from its four registers, word 0 first.
fn read_identity(mirror: &mut Mirror<'_>, slot: u16, now: u64) -> Result<u64, RegisterError> {
    let start = BASE + slot * 5;
    let mut id = 0u64;
    for offset in 0..4 {
        id = (id << 16) | u64::from(mirror.read(start + offset, now)?);
    }
    Ok(id)
}

fn read_temp(mirror: &mut Mirror<'_>, slot: u16, now: u64) -> Result<i16, RegisterError> {
    mirror.read(BASE + slot * 5 + 4, now).map(|raw| raw as i16)
}

#[test]
fn discovery_flows_through_to_the_register_window() {
    let state = BusState::shared();
    plug(&state, probe_id(0xA1), 2105);
    plug(&state, foreign_id(0x10, 0x99), 0); // not a probe, must bind nothing
    plug(&state, probe_id(0xB2), -350);

    let queue = ReadingQueue::new();
    let (mut service, mut mirror) = build(&state, &queue);
    let mut sink = RecordingSink::default();

    service.tick(0, &mut sink);
    assert!(sink.events.contains(&AppEvent::ScanCompleted {
        bound: 2,
        foreign: 1,
        overflow: 0
    }));

    // Slots bound in discovery order, identities readable end-to-end.
    assert_eq!(read_identity(&mut mirror, 0, 0), Ok(probe_id(0xA1).raw()));
    assert_eq!(read_identity(&mut mirror, 1, 0), Ok(probe_id(0xB2).raw()));
    assert_eq!(read_temp(&mut mirror, 0, 0), Ok(2105));
    assert_eq!(read_temp(&mut mirror, 1, 0), Ok(-350));
}

#[test]
fn unbound_slot_answers_unavailable_at_every_offset() {
    let state = BusState::shared();
    plug(&state, probe_id(1), 1000);

    let queue = ReadingQueue::new();
    let (mut service, mut mirror) = build(&state, &queue);
    service.tick(0, &mut RecordingSink::default());

    assert!(read_temp(&mut mirror, 0, 0).is_ok());
    for offset in 0..5 {
        assert_eq!(
            mirror.read(BASE + 5 + offset, 0),
            Err(RegisterError::Unavailable),
            "offset {offset} of the empty slot must be unavailable"
        );
    }
}

#[test]
fn readings_age_out_of_the_window() {
    // Max age 30 s: a value acquired at t=0 answers at t=25, not at t=35.
    let state = BusState::shared();
    plug(&state, probe_id(1), 0);
    plug(&state, probe_id(2), 2050);

    let queue = ReadingQueue::new();
    let (mut service, mut mirror) = build(&state, &queue);
    service.tick(0, &mut RecordingSink::default());

    assert_eq!(mirror.read(BASE + 5 + 4, 25), Ok(2050));
    assert_eq!(mirror.read(BASE + 5 + 4, 35), Err(RegisterError::Unavailable));
}

#[test]
fn swapped_probe_is_rebound_on_the_next_interval_scan() {
    let state = BusState::shared();
    plug(&state, probe_id(0xA), 100);

    let queue = ReadingQueue::new();
    let (mut service, mut mirror) = build(&state, &queue);
    let mut sink = RecordingSink::default();

    service.tick(0, &mut sink);
    assert_eq!(read_identity(&mut mirror, 0, 0), Ok(probe_id(0xA).raw()));

    // Swap the probe while the node keeps running.
    unplug(&state, probe_id(0xA));
    plug(&state, probe_id(0xB), 200);

    service.tick(60, &mut sink); // interval expired → rescan + poll
    assert_eq!(read_identity(&mut mirror, 0, 60), Ok(probe_id(0xB).raw()));
    assert_eq!(read_temp(&mut mirror, 0, 60), Ok(200));
}

#[test]
fn fetch_failure_arms_a_rescan_and_cache_outlives_the_probe() {
    let state = BusState::shared();
    plug(&state, probe_id(0xA), 420);

    let queue = ReadingQueue::new();
    let (mut service, mut mirror) = build(&state, &queue);
    let mut sink = RecordingSink::default();

    service.tick(0, &mut sink);
    unplug(&state, probe_id(0xA));

    // Failed poll, then the armed rescan finds an empty wire.
    service.tick(1, &mut sink);
    assert!(sink.events.contains(&AppEvent::PollCompleted {
        polled: 0,
        failed: 1,
        dropped: 0
    }));
    service.tick(2, &mut sink);
    assert!(sink.events.contains(&AppEvent::ScanCompleted {
        bound: 0,
        foreign: 0,
        overflow: 0
    }));
    assert_eq!(service.slots().bound_count(), 0);

    // The last good value keeps answering until it ages out.
    assert_eq!(read_temp(&mut mirror, 0, 20), Ok(420));
    assert_eq!(read_temp(&mut mirror, 0, 31), Err(RegisterError::Unavailable));
}

#[test]
fn search_failure_keeps_the_bindings_made_before_it() {
    let state = BusState::shared();
    plug(&state, probe_id(0xA), 111);
    plug(&state, probe_id(0xB), 222);
    state.borrow_mut().fail_search_after = Some(1);

    let queue = ReadingQueue::new();
    let (mut service, mut mirror) = build(&state, &queue);
    let mut sink = RecordingSink::default();

    service.tick(0, &mut sink);
    assert!(sink
        .events
        .contains(&AppEvent::ScanFailed(BusError::SearchFailed)));

    // The device visited before the failure stays bound and polls fine.
    assert_eq!(read_identity(&mut mirror, 0, 0), Ok(probe_id(0xA).raw()));
    assert_eq!(read_temp(&mut mirror, 0, 0), Ok(111));
    assert_eq!(read_temp(&mut mirror, 1, 0), Err(RegisterError::Unavailable));
}

#[test]
fn lock_failure_is_harmless_and_retried() {
    let state = BusState::shared();
    plug(&state, probe_id(0xA), 100);
    state.borrow_mut().fail_lock = true;

    let queue = ReadingQueue::new();
    let (mut service, mut mirror) = build(&state, &queue);
    let mut sink = RecordingSink::default();

    service.tick(0, &mut sink);
    assert!(sink
        .events
        .contains(&AppEvent::ScanFailed(BusError::LockFailed)));
    assert_eq!(service.slots().bound_count(), 0);
    assert_eq!(read_temp(&mut mirror, 0, 0), Err(RegisterError::Unavailable));

    state.borrow_mut().fail_lock = false;
    service.tick(1, &mut sink);
    assert_eq!(read_temp(&mut mirror, 0, 1), Ok(100));
}

#[test]
fn excess_probes_are_reported_and_ignored() {
    let state = BusState::shared();
    plug(&state, probe_id(1), 100);
    plug(&state, probe_id(2), 200);
    plug(&state, probe_id(3), 300);

    let queue = ReadingQueue::new();
    let (mut service, mut mirror) = build(&state, &queue);
    let mut sink = RecordingSink::default();

    service.tick(0, &mut sink);
    assert!(sink.events.contains(&AppEvent::ScanCompleted {
        bound: 2,
        foreign: 0,
        overflow: 1
    }));
    assert_eq!(read_identity(&mut mirror, 0, 0), Ok(probe_id(1).raw()));
    assert_eq!(read_identity(&mut mirror, 1, 0), Ok(probe_id(2).raw()));
}

#[test]
fn overflowing_queue_keeps_the_oldest_readings() {
    let state = BusState::shared();
    plug(&state, probe_id(1), 0);
    plug(&state, probe_id(2), 0);

    let queue = ReadingQueue::new();
    let (mut service, mut mirror) = build(&state, &queue);
    let mut sink = RecordingSink::default();

    // Five unserved cycles fill the 10-deep queue.
    for t in 0..5i16 {
        set_temp(&state, probe_id(1), t * 100);
        set_temp(&state, probe_id(2), t * 100 + 1);
        service.tick(t as u64, &mut sink);
    }
    assert_eq!(queue.len(), RESULT_QUEUE_DEPTH);

    // The sixth cycle's readings are the ones dropped.
    set_temp(&state, probe_id(1), 999);
    set_temp(&state, probe_id(2), 999);
    let report = service.tick(5, &mut sink);
    assert_eq!(report.dropped, 2);

    assert_eq!(read_temp(&mut mirror, 0, 5), Ok(400));
    assert_eq!(read_temp(&mut mirror, 1, 5), Ok(401));
}
