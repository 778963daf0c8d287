//! Register bank dispatch over the real host-side drivers: simulated ADC,
//! simulated PWM stage, GPIO coils on mock pins, and the probe mirror.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;

use fieldnode::config::{PROBE_SLOTS, RESULT_QUEUE_DEPTH};
use fieldnode::drivers::board_adc::{sim_set_raw, BoardAdc};
use fieldnode::drivers::coil_gpio::GpioCoils;
use fieldnode::drivers::pwm_out::{sim_duty, PwmOut};
use fieldnode::error::RegisterError;
use fieldnode::probe::mirror::RegisterMirror;
use fieldnode::probe::queue::ReadingQueue;
use fieldnode::probe::{DeviceId, Reading};
use fieldnode::registers::{
    RegisterBank, HOLDING_PWM_FIRST, HOLDING_STATUS, HOLDING_UPTIME, INPUT_BOARD_TEMP,
    INPUT_RAIL_3V3_MV, INPUT_VIN_MV,
};

use crate::mock_bus::MockClock;

#[derive(Default)]
struct MockPin {
    high: bool,
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high = true;
        Ok(())
    }
}

type Bank<'q> = RegisterBank<
    'q,
    BoardAdc,
    PwmOut,
    GpioCoils<MockPin, 2>,
    MockClock,
    PROBE_SLOTS,
    RESULT_QUEUE_DEPTH,
>;

fn bank<'q>(queue: &'q ReadingQueue<RESULT_QUEUE_DEPTH>, clock: MockClock) -> Bank<'q> {
    let mirror = RegisterMirror::new(queue, 1000, 30);
    let coils = GpioCoils::new([MockPin::default(), MockPin::default()]).unwrap();
    RegisterBank::new(mirror, BoardAdc::new(), PwmOut::new(), coils, clock)
}

#[test]
fn board_rails_and_probe_window_share_the_input_space() {
    let queue = ReadingQueue::new();
    assert!(queue.push(Reading {
        slot: 0,
        timestamp: 90,
        id: DeviceId::new(0x28_00_00_00_00_00_00_01),
        temp_centi: 1875,
    }));
    let clock = MockClock::at(100);
    let mut bank = bank(&queue, clock);

    sim_set_raw(2048, 512, 2047);
    let vin = bank.read_input(INPUT_VIN_MV).unwrap();
    assert!(vin > 10_000, "24 V supply reads in the thousands of mV");
    assert!(bank.read_input(INPUT_RAIL_3V3_MV).unwrap() > 3_000);
    assert_eq!(bank.read_input(INPUT_BOARD_TEMP), Ok(2500));

    assert_eq!(bank.read_input(1004), Ok(1875));
    assert_eq!(bank.read_input(500), Err(RegisterError::Unsupported));
}

#[test]
fn stale_probe_data_is_unavailable_while_rails_still_answer() {
    let queue = ReadingQueue::new();
    assert!(queue.push(Reading {
        slot: 0,
        timestamp: 0,
        id: DeviceId::new(0x28_00_00_00_00_00_00_01),
        temp_centi: 1875,
    }));
    let clock = MockClock::at(0);
    let mut bank = bank(&queue, clock.clone());

    assert_eq!(bank.read_input(1004), Ok(1875));
    clock.set(31);
    assert_eq!(bank.read_input(1004), Err(RegisterError::Unavailable));
    assert!(bank.read_input(INPUT_VIN_MV).is_ok(), "rails have no age gate");
}

#[test]
fn pwm_writes_reach_the_output_stage_and_read_back() {
    let queue = ReadingQueue::new();
    let mut bank = bank(&queue, MockClock::at(0));

    bank.write_holding(HOLDING_PWM_FIRST, 777).unwrap();
    assert_eq!(bank.read_holding(HOLDING_PWM_FIRST), Ok(777));
    assert_eq!(sim_duty(0), 777);

    // Register keeps the raw value even where the stage clamps.
    bank.write_holding(HOLDING_PWM_FIRST + 2, 4096).unwrap();
    assert_eq!(bank.read_holding(HOLDING_PWM_FIRST + 2), Ok(4096));
    assert_eq!(sim_duty(2), 1023);
}

#[test]
fn uptime_and_status_report_and_reject_writes() {
    let queue = ReadingQueue::new();
    let clock = MockClock::at(4321);
    let mut bank = bank(&queue, clock);

    assert_eq!(bank.read_holding(HOLDING_STATUS), Ok(0));
    assert_eq!(bank.read_holding(HOLDING_UPTIME), Ok(4321));
    assert_eq!(
        bank.write_holding(HOLDING_STATUS, 1),
        Err(RegisterError::ReadOnly)
    );
}

#[test]
fn coil_commands_drive_the_pins() {
    let queue = ReadingQueue::new();
    let mut bank = bank(&queue, MockClock::at(0));

    assert_eq!(bank.read_coil(0), Ok(false));
    bank.write_coil(1, true).unwrap();
    assert_eq!(bank.read_coil(1), Ok(true));
    assert_eq!(bank.write_coil(5, true), Err(RegisterError::Unsupported));
    assert_eq!(bank.read_coil(5), Err(RegisterError::Unsupported));
}
