#![no_std]
#![no_main]

mod blink;
mod cycles;
mod output;
mod panic;
mod refill;

use core::num::NonZeroU32;
use core::ptr::addr_of_mut;

use defmt_rtt as _;
use embedded_hal::digital::v2::ToggleableOutputPin;
use fugit::TimerDurationU64;
// The macro for our start-up function
use rp_pico::entry;

use rp_pico::hal;
use rp_pico::hal::pac;
use rp_pico::hal::Clock;

use config::Source;
use pwm_render::{Engine, Generator, Level, Lfsr, Oscillator, Renderer, Report, RingBuffer};

use crate::cycles::SysTickCounter;
use crate::output::AlignedRing;

// The DMA channels read straight from here, so it must never move.
static mut RING: AlignedRing = AlignedRing(RingBuffer::new(config::PWM_CENTER));

/// Entry point to our bare-metal application.
///
/// The `#[entry]` macro ensures the Cortex-M start-up code calls this function
/// as soon as all global variables are initialised.
#[entry]
fn main() -> ! {
    run()
}

fn generator() -> Generator {
    let level = Level::new(config::PWM_AMPLITUDE, config::PWM_CENTER);
    match config::SOURCE {
        Source::Sine => Generator::Sine(
            Oscillator::new(config::TONE_HZ, config::SAMPLE_RATE),
            level,
        ),
        Source::Noise => {
            let seed = NonZeroU32::new(config::DITHER_SEED)
                .unwrap_or(pwm_render::dither::DEFAULT_SEED);
            Generator::Noise(Lfsr::new(seed), level)
        }
    }
}

fn run() -> ! {
    let core = pac::CorePeripherals::take().unwrap();
    let mut pac = pac::Peripherals::take().unwrap();

    defmt::info!("PWM/DMA audio, {} source", defmt::Debug2Format(&config::SOURCE));

    // Set up the watchdog driver - needed by the clock setup code
    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);

    // Configure the clocks
    //
    // The default is to generate a 125 MHz system clock
    let clocks = hal::clocks::init_clocks_and_plls(
        rp_pico::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();
    assert_eq!(clocks.system_clock.freq().to_Hz(), config::CLOCK_RATE);

    // The single-cycle I/O block controls our GPIO pins
    let sio = hal::Sio::new(pac.SIO);

    // Set the pins up according to their function on this particular board
    let pins = rp_pico::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let mut led_pin = pins.led.into_push_pull_output();
    let mut delay = cortex_m::delay::Delay::new(core.SYST, config::CLOCK_RATE);
    blink::blink_signals(&mut led_pin, &mut delay, &blink::BLINK_OK);
    let clock = SysTickCounter::start(delay.free());

    // Safety: RING is only ever accessed through this reference (and by the DMA engine).
    let ring = unsafe { &mut *addr_of_mut!(RING) };

    let (mut pwm, mut events) = output::setup_output(
        pac.PWM,
        pac.DMA,
        &mut pac.RESETS,
        pins.gpio16,
        pins.gpio17,
        &*ring,
    );

    let renderer = Renderer::new(generator(), config::NOISE_SHAPING);
    let mut engine = Engine::new(&mut ring.0, renderer);
    // Both halves hold valid data before the first notification.
    engine.prime();

    events.start();
    refill::setup_refill_interrupt(engine, events, clock);
    pwm.enable();

    defmt::info!(
        "Sample rate: {=u32} Hz, {=usize}x oversampled, {=usize} slot ring, {=u32} IRQ/s",
        config::SAMPLE_RATE,
        config::OVERSAMPLING,
        config::BUF_SAMPLES,
        config::NOTIFICATION_RATE_HZ
    );

    let timer = hal::Timer::new(pac.TIMER, &mut pac.RESETS);
    let report_period = TimerDurationU64::<1_000_000>::millis(config::REPORT_PERIOD_MS as u64);
    let mut next_report = timer.get_counter() + report_period;
    let mut lapped = 0;

    loop {
        // The DMA interrupt wakes us well within every millisecond.
        while timer.get_counter() < next_report {
            cortex_m::asm::wfi();
        }
        next_report = next_report + report_period;

        let stats = refill::take_profile();
        if let Some(report) =
            Report::new(&stats, config::CLOCK_RATE, config::NOTIFICATION_RATE_HZ)
        {
            defmt::info!(
                "IRQ: avg={=u32} us, min={=u32} us, max={=u32} us, rate={=u32} Hz, CPU={=u32}%",
                report.avg_us,
                report.min_us,
                report.max_us,
                report.rate_hz,
                report.cpu_percent
            );
        }

        let now_lapped = refill::lapped();
        if now_lapped != lapped {
            defmt::warn!("{=u32} out of order notifications", now_lapped - lapped);
            lapped = now_lapped;
        }

        led_pin.toggle().unwrap();
    }
}
