use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;

use pwm_render::CycleCounter;

/// SysTick as a free-running core clock counter.
///
/// SysTick counts down from its reload value, so readings are flipped to count up.
pub struct SysTickCounter {
    _syst: SYST,
}

impl SysTickCounter {
    pub fn start(mut syst: SYST) -> Self {
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(config::SYSTICK_PERIOD - 1);
        syst.clear_current();
        syst.enable_counter();
        Self { _syst: syst }
    }
}

impl CycleCounter for SysTickCounter {
    fn now(&self) -> u32 {
        config::SYSTICK_PERIOD - 1 - SYST::get_current()
    }

    fn period(&self) -> u32 {
        config::SYSTICK_PERIOD
    }
}
