#![no_std]
#![no_main]

#[allow(unused_imports)]
use sgboard;
#[allow(unused_imports)]
use sgboard_core;
#[allow(unused_imports)]
use sgboard_driver;

#[panic_handler]
fn panic(_panic: &core::panic::PanicInfo<'_>) -> ! {
    loop {}
}

#[unsafe(no_mangle)]
fn main() {}
