use rp_pico::hal;
use rp_pico::hal::pac;

use crate::blink;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    cortex_m::interrupt::disable();

    let core = unsafe { pac::CorePeripherals::steal() };
    let mut pac = unsafe { pac::Peripherals::steal() };

    // Stop feeding the PWM so the speaker does not sit on a half-written buffer.
    pac::NVIC::mask(pac::Interrupt::DMA_IRQ_0);
    pac.DMA.chan_abort.write(|w| unsafe { w.bits(0b11) });

    defmt::error!("{}", defmt::Display2Format(info));

    let sio = hal::Sio::new(pac.SIO);
    let pins = rp_pico::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    // Clocks were set up before anything could panic, SysTick is free to take over.
    let mut delay = cortex_m::delay::Delay::new(core.SYST, config::CLOCK_RATE);
    let mut led_pin = pins.led.into_push_pull_output();

    blink::blink_signals_loop(&mut led_pin, &mut delay, &blink::BLINK_PANIC);
}
