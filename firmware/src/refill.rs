use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::interrupt::Mutex;

use rp_pico::hal::pac;

use pac::interrupt;
use pwm_render::{Engine, NoTrack, ProfileStats};

use crate::cycles::SysTickCounter;
use crate::output::DmaEvents;

pub type AudioEngine = Engine<'static, NoTrack, { config::BUF_SAMPLES }, { config::OVERSAMPLING }>;

struct RefillIrqData {
    engine: AudioEngine,
    events: DmaEvents,
    clock: SysTickCounter,
}

static REFILL_IRQ_DATA: Mutex<RefCell<Option<RefillIrqData>>> = Mutex::new(RefCell::new(None));

// Written by the handler, read and reset by the idle loop. The idle loop can be preempted, so
// both sides go through a critical section.
static PROFILE: Mutex<RefCell<ProfileStats>> = Mutex::new(RefCell::new(ProfileStats::new()));
static LAPPED: AtomicU32 = AtomicU32::new(0);

/// Hands the engine over to the DMA interrupt and unmasks it.
pub fn setup_refill_interrupt(engine: AudioEngine, events: DmaEvents, clock: SysTickCounter) {
    cortex_m::interrupt::free(|cs| {
        REFILL_IRQ_DATA.borrow(cs).replace(Some(RefillIrqData {
            engine,
            events,
            clock,
        }));
    });

    unsafe {
        pac::NVIC::unmask(pac::Interrupt::DMA_IRQ_0);
    }
}

/// Statistics since the last call.
pub fn take_profile() -> ProfileStats {
    cortex_m::interrupt::free(|cs| PROFILE.borrow(cs).borrow_mut().take())
}

/// Notifications seen out of order since startup.
pub fn lapped() -> u32 {
    LAPPED.load(Ordering::Relaxed)
}

#[interrupt]
fn DMA_IRQ_0() {
    // The `#[interrupt]` attribute turns this into a `&'static mut Option<RefillIrqData>` that
    // only this handler can see.
    static mut DATA: Option<RefillIrqData> = None;

    if DATA.is_none() {
        cortex_m::interrupt::free(|cs| {
            *DATA = REFILL_IRQ_DATA.borrow(cs).take();
        });
    }
    let Some(data) = DATA.as_mut() else {
        return;
    };

    let cycles = data.engine.on_notification(&mut data.events, &data.clock);

    cortex_m::interrupt::free(|cs| PROFILE.borrow(cs).borrow_mut().record(cycles));
    LAPPED.store(data.engine.coordinator().lapped(), Ordering::Relaxed);
}
