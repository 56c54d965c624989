use rp_pico::hal;
use rp_pico::hal::pac;

use embedded_hal::PwmPin;
use hal::dma::DREQ_PWM_WRAP0;
use hal::gpio::bank0::{Gpio16, Gpio17};
use hal::gpio::{Pin, PinMode, ValidPinMode};
use hal::pwm::{FreeRunning, Pwm0, Slice};

use pwm_render::{Pending, RingBuffer, TransferEvents};

/// DMA_SIZE_16
const DATA_SIZE_HALFWORD: u8 = 1;

const FIRST: usize = 0;
const SECOND: usize = 1;

pub type AudioPwm = Slice<Pwm0, FreeRunning>;

/// The ring at an address the DMA read wrap can work with.
///
/// Each channel wraps its read address on a boundary of one half, so every half has to start on
/// such a boundary.
#[repr(C, align(512))]
pub struct AlignedRing(pub RingBuffer<{ config::BUF_SAMPLES }>);

const _: () = assert!(core::mem::align_of::<AlignedRing>() % config::HALF_BYTES == 0);

/// The two chained DMA channels streaming the ring into the PWM compare register.
///
/// Channel 0 covers the first half and channel 1 the second half. Each triggers the other when it
/// finishes, so the ring plays in a loop. Channel 0 completing is the half-transfer notification,
/// channel 1 completing the full-transfer one. The read address of each channel wraps within its
/// own half, so it is back at the start of that half whenever it is triggered again, however late
/// the handler is.
pub struct DmaEvents {
    dma: pac::DMA,
}

impl DmaEvents {
    /// Kicks off channel 0. Transfers start with the next PWM wrap.
    pub fn start(&mut self) {
        self.dma
            .multi_chan_trigger
            .write(|w| unsafe { w.bits(1 << FIRST) });
    }
}

impl TransferEvents for DmaEvents {
    fn pending(&mut self) -> Pending {
        let ints = self.dma.ints0.read().bits();
        Pending {
            half: ints & (1 << FIRST) != 0,
            full: ints & (1 << SECOND) != 0,
        }
    }

    fn acknowledge(&mut self, events: Pending) {
        let mut mask = 0;
        if events.half {
            mask |= 1 << FIRST;
        }
        if events.full {
            mask |= 1 << SECOND;
        }
        self.dma.ints0.write(|w| unsafe { w.bits(mask) });
    }
}

fn configure_half(dma: &pac::DMA, channel: usize, read_addr: u32, write_addr: u32, chain_to: usize) {
    let ch = &dma.ch[channel];
    ch.ch_read_addr.write(|w| unsafe { w.bits(read_addr) });
    ch.ch_write_addr.write(|w| unsafe { w.bits(write_addr) });
    ch.ch_trans_count
        .write(|w| unsafe { w.bits(config::HALF_SAMPLES as u32) });
    ch.ch_al1_ctrl.write(|w| unsafe {
        w.data_size().bits(DATA_SIZE_HALFWORD);
        w.incr_read().bit(true);
        w.incr_write().bit(false);
        // Wrap the read address (not the write address) on a half boundary.
        w.ring_sel().bit(false);
        w.ring_size().bits(config::HALF_RING_WRAP_BITS);
        w.treq_sel().bits(DREQ_PWM_WRAP0);
        w.chain_to().bits(chain_to as u8);
        w.en().bit(true);
        w
    });
}

/// Sets up PWM slice 0 on GPIO16 (A) and GPIO17 (B, inverted) and the DMA channels that feed it
/// from `ring`. Nothing moves until `DmaEvents::start` and `AudioPwm::enable` are called.
pub fn setup_output<MA, MB>(
    pwm: pac::PWM,
    dma: pac::DMA,
    resets: &mut pac::RESETS,
    pin_a: Pin<Gpio16, MA>,
    pin_b: Pin<Gpio17, MB>,
    ring: &AlignedRing,
) -> (AudioPwm, DmaEvents)
where
    MA: PinMode + ValidPinMode<Gpio16>,
    MB: PinMode + ValidPinMode<Gpio17>,
{
    let slices = hal::pwm::Slices::new(pwm, resets);
    let mut pwm = slices.pwm0;
    pwm.default_config();

    // fPWM = fSYS / ((TOP + 1) * (DIV_INT + DIV_FRAC / 16))
    pwm.set_top(config::PWM_TOP);
    pwm.set_div_int(config::PWM_DIV_INT);
    pwm.set_div_frac(config::PWM_DIV_FRAC);

    // Complementary outputs: a narrow write to CC lands in both the A and B fields, B is
    // inverted.
    pwm.channel_a.output_to(pin_a);
    pwm.channel_b.output_to(pin_b);
    pwm.channel_b.set_inverted();
    pwm.channel_a.set_duty(config::PWM_CENTER);
    pwm.channel_b.set_duty(config::PWM_CENTER);

    let cc_addr = unsafe { (*pac::PWM::ptr()).ch[0].cc.as_ptr() as u32 };
    let ring_base = ring.0.as_ptr() as u32;

    resets.reset.modify(|_, w| w.dma().clear_bit());
    while resets.reset_done.read().dma().bit_is_clear() {}

    configure_half(&dma, FIRST, ring_base, cc_addr, SECOND);
    configure_half(
        &dma,
        SECOND,
        ring_base + config::HALF_BYTES as u32,
        cc_addr,
        FIRST,
    );
    dma.inte0
        .modify(|r, w| unsafe { w.bits(r.bits() | (1 << FIRST) | (1 << SECOND)) });

    (pwm, DmaEvents { dma })
}
