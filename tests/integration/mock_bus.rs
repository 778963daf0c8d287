//! Mock probe bus and friends for integration tests.
//!
//! The bus and every channel share one [`BusState`]: tests plug and unplug
//! devices, set temperatures, and inject lock/search failures there, and
//! both the enumeration path and the fetch path see the change — just like
//! a real shared wire.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use fieldnode::app::ports::{EventSink, Monotonic, ProbeChannel, WireBus};
use fieldnode::app::events::AppEvent;
use fieldnode::error::{BusError, SensorError};
use fieldnode::probe::{DeviceId, FAMILY_DS18B20};

/// A family-matching device address from a short serial.
pub fn probe_id(serial: u64) -> DeviceId {
    DeviceId::new((u64::from(FAMILY_DS18B20) << 56) | serial)
}

/// A device address with an arbitrary (non-probe) family code.
pub fn foreign_id(family: u8, serial: u64) -> DeviceId {
    DeviceId::new((u64::from(family) << 56) | serial)
}

// ── Shared wire state ─────────────────────────────────────────

#[derive(Default)]
pub struct BusState {
    /// Devices present on the wire, in enumeration order.
    pub devices: Vec<DeviceId>,
    /// Temperature each device answers with, keyed by raw address.
    pub temps: HashMap<u64, i16>,
    pub fail_lock: bool,
    /// Fail the traversal after visiting this many devices.
    pub fail_search_after: Option<usize>,
}

impl BusState {
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }
}

/// Attach a device with a temperature.
pub fn plug(state: &Rc<RefCell<BusState>>, id: DeviceId, temp_centi: i16) {
    let mut s = state.borrow_mut();
    s.devices.push(id);
    s.temps.insert(id.raw(), temp_centi);
}

/// Detach a device; filtered channels start failing their fetches.
pub fn unplug(state: &Rc<RefCell<BusState>>, id: DeviceId) {
    let mut s = state.borrow_mut();
    s.devices.retain(|d| *d != id);
    s.temps.remove(&id.raw());
}

/// Change the temperature an attached device answers with.
pub fn set_temp(state: &Rc<RefCell<BusState>>, id: DeviceId, temp_centi: i16) {
    state.borrow_mut().temps.insert(id.raw(), temp_centi);
}

// ── MockBus ───────────────────────────────────────────────────

pub struct MockBus {
    state: Rc<RefCell<BusState>>,
    locked: bool,
}

impl MockBus {
    pub fn new(state: Rc<RefCell<BusState>>) -> Self {
        Self {
            state,
            locked: false,
        }
    }
}

impl WireBus for MockBus {
    fn lock(&mut self) -> Result<(), BusError> {
        if self.state.borrow().fail_lock {
            return Err(BusError::LockFailed);
        }
        assert!(!self.locked, "double lock");
        self.locked = true;
        Ok(())
    }

    fn unlock(&mut self) {
        assert!(self.locked, "unlock without lock");
        self.locked = false;
    }

    fn enumerate(&mut self, visit: &mut dyn FnMut(DeviceId)) -> Result<(), BusError> {
        assert!(self.locked, "enumeration without the bus lock");
        let (devices, fail_after) = {
            let s = self.state.borrow();
            (s.devices.clone(), s.fail_search_after)
        };
        for (i, id) in devices.into_iter().enumerate() {
            if fail_after == Some(i) {
                return Err(BusError::SearchFailed);
            }
            visit(id);
        }
        Ok(())
    }
}

// ── MockChannel ───────────────────────────────────────────────

pub struct MockChannel {
    state: Rc<RefCell<BusState>>,
    filter: Option<DeviceId>,
    fetched: Option<i16>,
}

impl MockChannel {
    pub fn new(state: Rc<RefCell<BusState>>) -> Self {
        Self {
            state,
            filter: None,
            fetched: None,
        }
    }
}

impl ProbeChannel for MockChannel {
    fn program_filter(&mut self, id: DeviceId) -> Result<(), SensorError> {
        self.filter = if id == DeviceId::BLANK { None } else { Some(id) };
        self.fetched = None;
        Ok(())
    }

    fn fetch_sample(&mut self) -> Result<(), SensorError> {
        let Some(id) = self.filter else {
            return Err(SensorError::FetchFailed);
        };
        // A fetch only answers while the device is physically on the wire.
        match self.state.borrow().temps.get(&id.raw()) {
            Some(temp) => {
                self.fetched = Some(*temp);
                Ok(())
            }
            None => {
                self.fetched = None;
                Err(SensorError::FetchFailed)
            }
        }
    }

    fn read_centi(&mut self) -> Result<i16, SensorError> {
        self.fetched.ok_or(SensorError::ReadFailed)
    }
}

// ── MockClock ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockClock(pub Rc<Cell<u64>>);

impl MockClock {
    pub fn at(secs: u64) -> Self {
        Self(Rc::new(Cell::new(secs)))
    }

    pub fn set(&self, secs: u64) {
        self.0.set(secs);
    }
}

impl Monotonic for MockClock {
    fn uptime_secs(&self) -> u64 {
        self.0.get()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
