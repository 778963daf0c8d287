//! Fieldnode firmware — main entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                     │
//! │                                                               │
//! │  OneWireBus / Ds18b20Channel   BoardAdc   PwmOut   GpioCoils  │
//! │  (WireBus + ProbeChannel)      (monitor)  (pwm)    (coils)    │
//! │                                                               │
//! │  ──────────────── Port Trait Boundary ────────────────        │
//! │                                                               │
//! │   periodic task                register-serving task          │
//! │  ┌───────────────────┐        ┌───────────────────────┐       │
//! │  │ AcquisitionService│──────▶ │ RegisterBank          │       │
//! │  │ (scan · poll)     │ queue  │ (mirror · rails · pwm)│       │
//! │  └───────────────────┘        └───────────────────────┘       │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! The register-serving task owns the [`RegisterBank`]; the fieldbus RTU
//! transport invokes its read/write callbacks by address. The periodic
//! task never blocks on it — the reading queue is the only hand-off.

use anyhow::Result;
use log::{error, info};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_sys as sys;

use fieldnode::adapters::onewire::{Ds18b20Channel, OneWireBus};
use fieldnode::adapters::time::BoardClock;
use fieldnode::adapters::log_sink::LogEventSink;
use fieldnode::app::ports::Monotonic;
use fieldnode::app::service::AcquisitionService;
use fieldnode::config::{SystemConfig, PROBE_SLOTS, RESULT_QUEUE_DEPTH};
use fieldnode::drivers::board_adc::BoardAdc;
use fieldnode::drivers::coil_gpio::GpioCoils;
use fieldnode::drivers::pwm_out::PwmOut;
use fieldnode::pins;
use fieldnode::probe::mirror::{RegisterMirror, REGS_PER_SLOT};
use fieldnode::probe::queue::ReadingQueue;
use fieldnode::registers::RegisterBank;

/// The cross-context hand-off. Static so both tasks borrow it at 'static.
static QUEUE: ReadingQueue<RESULT_QUEUE_DEPTH> = ReadingQueue::new();

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("fieldnode v{}", env!("CARGO_PKG_VERSION"));

    let config = SystemConfig::default();
    let peripherals = Peripherals::take()?;

    init_analog()?;
    init_pwm_channels()?;

    // ── Probe bus and channels ────────────────────────────────
    let bus = OneWireBus::new(pins::ONEWIRE_GPIO)?;
    let channels: [Ds18b20Channel; PROBE_SLOTS] =
        core::array::from_fn(|_| Ds18b20Channel::new(&bus));

    // ── Register surface ──────────────────────────────────────
    // pins::COIL0_GPIO / pins::COIL1_GPIO
    let coil_pins = [
        PinDriver::output(peripherals.pins.gpio11.downgrade_output())?,
        PinDriver::output(peripherals.pins.gpio12.downgrade_output())?,
    ];
    let coils = GpioCoils::new(coil_pins).map_err(fieldnode::error::Error::from)?;
    let mirror: RegisterMirror<'static, PROBE_SLOTS, RESULT_QUEUE_DEPTH> =
        RegisterMirror::new(&QUEUE, config.probe_window_base, config.temp_max_age_secs);
    let bank = RegisterBank::new(mirror, BoardAdc::new(), PwmOut::new(), coils, BoardClock::new());

    let window_base = config.probe_window_base;
    std::thread::Builder::new()
        .name("registers".into())
        .stack_size(8 * 1024)
        .spawn(move || serve_registers(bank, window_base))?;

    // ── Periodic acquisition loop ─────────────────────────────
    let clock = BoardClock::new();
    let mut sink = LogEventSink::new();
    let mut service = AcquisitionService::new(bus, channels, &QUEUE, &config);

    loop {
        service.tick(clock.uptime_secs(), &mut sink);
        FreeRtos::delay_ms(config.poll_interval_ms);
    }
}

/// Register-serving context.
///
/// In the field the RTU transport dispatches incoming requests to the
/// bank's read/write callbacks. Until a request arrives there is nothing
/// to do, so this task doubles as a local diagnostic readout, walking the
/// probe window through the same callback surface the transport uses.
fn serve_registers<M, P, Co, T>(
    mut bank: RegisterBank<'static, M, P, Co, T, PROBE_SLOTS, RESULT_QUEUE_DEPTH>,
    window_base: u16,
) -> !
where
    M: fieldnode::app::ports::BoardMonitor,
    P: fieldnode::app::ports::PwmOutputs,
    Co: fieldnode::app::ports::CoilBank,
    T: Monotonic,
{
    loop {
        for slot in 0..PROBE_SLOTS as u16 {
            let temp_addr = window_base + slot * REGS_PER_SLOT + 4;
            match bank.read_input(temp_addr) {
                Ok(raw) => info!("slot {slot}: {} cC", raw as i16),
                Err(e) => info!("slot {slot}: {e}"),
            }
        }
        FreeRtos::delay_ms(5_000);
    }
}

/// One-shot ADC and die-temperature sensor bring-up.
fn init_analog() -> Result<()> {
    // SAFETY: one-time bring-up before any reader runs.
    unsafe {
        sys::esp!(sys::adc1_config_width(sys::adc_bits_width_t_ADC_WIDTH_BIT_DEFAULT))?;
        for ch in [
            sys::adc1_channel_t_ADC1_CHANNEL_4,
            sys::adc1_channel_t_ADC1_CHANNEL_5,
            sys::adc1_channel_t_ADC1_CHANNEL_6,
        ] {
            sys::esp!(sys::adc1_config_channel_atten(
                ch,
                sys::adc_atten_t_ADC_ATTEN_DB_11
            ))?;
        }

        let temp_cfg = sys::temp_sensor_config_t {
            dac_offset: sys::temp_sensor_dac_offset_t_TSENS_DAC_L2,
            clk_div: 6,
        };
        sys::esp!(sys::temp_sensor_set_config(temp_cfg))?;
        sys::esp!(sys::temp_sensor_start())?;
    }
    Ok(())
}

/// LEDC timer + the three output channels, all parked at duty 0.
fn init_pwm_channels() -> Result<()> {
    // SAFETY: one-time bring-up; configs are stack-owned for the call.
    unsafe {
        let timer_cfg = sys::ledc_timer_config_t {
            speed_mode: sys::ledc_mode_t_LEDC_LOW_SPEED_MODE,
            duty_resolution: pins::PWM_RESOLUTION_BITS as sys::ledc_timer_bit_t,
            timer_num: sys::ledc_timer_t_LEDC_TIMER_0,
            freq_hz: pins::PWM_FREQ_HZ,
            clk_cfg: sys::ledc_clk_cfg_t_LEDC_AUTO_CLK,
            ..Default::default()
        };
        sys::esp!(sys::ledc_timer_config(&timer_cfg))?;

        for (i, gpio) in [pins::PWM0_GPIO, pins::PWM1_GPIO, pins::PWM2_GPIO]
            .into_iter()
            .enumerate()
        {
            let channel_cfg = sys::ledc_channel_config_t {
                gpio_num: gpio,
                speed_mode: sys::ledc_mode_t_LEDC_LOW_SPEED_MODE,
                channel: i as sys::ledc_channel_t,
                timer_sel: sys::ledc_timer_t_LEDC_TIMER_0,
                duty: 0,
                hpoint: 0,
                ..Default::default()
            };
            if let Err(e) = sys::esp!(sys::ledc_channel_config(&channel_cfg)) {
                error!("pwm channel {i} config failed: {e}");
                return Err(e.into());
            }
        }
    }
    Ok(())
}
