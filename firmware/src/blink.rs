use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

const UNIT_MS: u32 = 200;

// Durations in units, alternating lit and dark, starting lit.
pub const BLINK_OK: [u8; 2] = [6, 2];
pub const BLINK_PANIC: [u8; 18] = [1, 1, 1, 1, 1, 3, 3, 1, 3, 1, 3, 3, 1, 1, 1, 1, 1, 3];

pub fn blink_signals(
    pin: &mut dyn OutputPin<Error = core::convert::Infallible>,
    delay: &mut dyn DelayMs<u32>,
    sig: &[u8],
) {
    for (i, units) in sig.iter().enumerate() {
        if i % 2 == 0 {
            pin.set_high().unwrap();
        } else {
            pin.set_low().unwrap();
        }
        delay.delay_ms(*units as u32 * UNIT_MS);
    }

    pin.set_low().unwrap();
}

pub fn blink_signals_loop(
    pin: &mut dyn OutputPin<Error = core::convert::Infallible>,
    delay: &mut dyn DelayMs<u32>,
    sig: &[u8],
) -> ! {
    loop {
        blink_signals(pin, delay, sig);
        delay.delay_ms(1000);
    }
}
