//! HIL boot sequence tests.
//!
//! Validates that the RP2040 boot sequence completes without fault:
//! clocks → shared Harp UART → alarm/DMA claims → default behaviors →
//! executor start.
//!
//! # Running
//! ```
//! cargo test --features hardware --target thumbv6m-none-eabi
//! ```
//!
//! # Requirements
//! - probe-rs installed and board connected via SWD
//! - RP2040 target powered, master clock signal optional

// These are placeholder tests — actual HIL execution requires a probe-rs runner.
// The test bodies document WHAT to check; on hardware the assertions use defmt.

/// Verifies the boot-time memory and peripheral map.
/// Hardware check: no HardFault within 1 second of reset.
#[cfg(test)]
mod hil_boot_tests {
    #[test]
    fn memory_map_constants_are_correct() {
        // Validate addresses used during HIL boot
        assert_eq!(0x1000_0000u32, 0x1000_0000); // Flash (XIP) base
        assert_eq!(0x2000_0000u32, 0x2000_0000); // SRAM base
        assert_eq!(0x4005_4000u32, 0x4005_4000); // TIMER block
        assert_eq!(0x5000_0000u32, 0x5000_0000); // DMA block
    }

    #[test]
    fn hil_test_framework_placeholder() {
        // This test passes on host. On hardware, replace with:
        //   defmt::assert!(hw::with_hub(|hub| hub.primary.is_armed()).unwrap());
        // after firmware::hw::init() has run.
        let _ = "HIL boot test placeholder";
    }
}
