#![no_std]

// ----------------------------------------------------------------------------
// Configurable
// ----------------------------------------------------------------------------
pub const TARGET_SAMPLE_RATE: u32 = 22050;
pub const OVERSAMPLING: usize = 8;
pub const BUF_SAMPLES: usize = 256; // Whole ring, both halves
pub const PWM_BITS: u16 = 8;
pub const PWM_CENTER: u16 = 128;
pub const PWM_AMPLITUDE: u16 = 64; // Peak deviation from PWM_CENTER
pub const TONE_HZ: u32 = 500;
pub const NOISE_SHAPING: bool = true;
pub const DITHER_SEED: u32 = 0xA5A5_A5A5;
pub const SOURCE: Source = Source::Sine;
pub const REPORT_PERIOD_MS: u32 = 2000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Sine,
    Noise,
}

// ----------------------------------------------------------------------------
// Should probably not be changed:
// ----------------------------------------------------------------------------
pub const CLOCK_RATE: u32 = 125_000_000;
pub const SYSTICK_PERIOD: u32 = 1 << 24;

// ----------------------------------------------------------------------------
// Derived from other values:
// ----------------------------------------------------------------------------
pub const PWM_TOP: u16 = (1 << PWM_BITS) - 1;
pub const HALF_SAMPLES: usize = BUF_SAMPLES / 2;
pub const HALF_BYTES: usize = HALF_SAMPLES * 2;
/// DMA read address wrap (log2 of the wrap size in bytes) that keeps each channel in its half.
pub const HALF_RING_WRAP_BITS: u8 = HALF_BYTES.trailing_zeros() as u8;

/// PWM clock divider in 1/16 steps, so that the slice wraps (and requests the next duty value) at
/// TARGET_SAMPLE_RATE * OVERSAMPLING.
pub const PWM_DIV_16THS: u32 =
    CLOCK_RATE * 16 / ((PWM_TOP as u32 + 1) * TARGET_SAMPLE_RATE * OVERSAMPLING as u32);
pub const PWM_DIV_INT: u8 = (PWM_DIV_16THS / 16) as u8;
pub const PWM_DIV_FRAC: u8 = (PWM_DIV_16THS % 16) as u8;

/// Duty values per second actually produced with the rounded divider.
pub const OUTPUT_RATE: u32 = CLOCK_RATE * 16 / ((PWM_TOP as u32 + 1) * PWM_DIV_16THS);
pub const SAMPLE_RATE: u32 = OUTPUT_RATE / OVERSAMPLING as u32;

/// Half- plus full-transfer notifications per second.
pub const NOTIFICATION_RATE_HZ: u32 = 2 * OUTPUT_RATE / BUF_SAMPLES as u32;

// ----------------------------------------------------------------------------
// Checks
// ----------------------------------------------------------------------------
const _: () = assert!(BUF_SAMPLES % 2 == 0, "ring must split into two halves");
const _: () = assert!(
    HALF_SAMPLES % OVERSAMPLING == 0,
    "a half must hold a whole number of oversampled values"
);
// The renderer does not clamp. One step above the peak is taken by the noise shaper's carry, and
// one step on either side absorbs the oscillator orbit peaking slightly above 1.0.
const _: () = assert!(PWM_CENTER >= PWM_AMPLITUDE + 1);
const _: () = assert!(PWM_CENTER as u32 + PWM_AMPLITUDE as u32 + 1 <= PWM_TOP as u32);
const _: () = assert!(
    HALF_BYTES.is_power_of_two() && HALF_RING_WRAP_BITS <= 15,
    "the DMA read wrap needs a power of two half of at most 32 KiB"
);
const _: () = assert!(DITHER_SEED != 0, "the LFSR is stuck at zero");
const _: () = assert!(PWM_DIV_16THS >= 16 && PWM_DIV_16THS < 256 * 16);
const _: () = assert!((TONE_HZ as u64) * 2 < SAMPLE_RATE as u64);
// The orbit overshoot is about (pi * f / fs)^2 / 8 of the peak; keep it under one duty step.
const _: () = assert!(
    PWM_AMPLITUDE as u64 * 11 * (TONE_HZ as u64 * TONE_HZ as u64)
        < 8 * (SAMPLE_RATE as u64 * SAMPLE_RATE as u64),
    "tone too high for the configured amplitude"
);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_wrap_covers_one_half() {
        assert_eq!(1usize << HALF_RING_WRAP_BITS, HALF_BYTES);
        assert_eq!(HALF_BYTES, BUF_SAMPLES);
    }
}
