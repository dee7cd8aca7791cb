//! UART configuration and the DMA transmit stream, over the RP2040 PAC.
//!
//! The high-level embassy-rp UART driver owns its DMA transfers and waits
//! on them; the dispatch engine instead needs a fire-and-forget transfer
//! it can issue from interrupt context. Both channels therefore program
//! the PL011 and the DMA block directly.

use embassy_rp::pac;
use embassy_rp::pac::dma::vals::{DataSize, TreqSel};
use platform::uart::{DataBits, Parity, StopBits, UartConfig};
use platform::TxStream;

/// Peripheral clock feeding the UART baud divisors (embassy-rp default
/// clock tree: clk_peri = clk_sys = 125 MHz).
pub const CLK_PERI_HZ: u32 = 125_000_000;

/// The two PL011 instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartId {
    /// UART0 — auxiliary port.
    Uart0,
    /// UART1 — shared Harp sync in / clock out.
    Uart1,
}

impl UartId {
    fn regs(self) -> pac::uart::Uart {
        match self {
            Self::Uart0 => pac::UART0,
            Self::Uart1 => pac::UART1,
        }
    }

    /// TX pacing request line for the DMA block.
    fn tx_dreq(self) -> TreqSel {
        match self {
            Self::Uart0 => TreqSel::from_bits(20),
            Self::Uart1 => TreqSel::from_bits(22),
        }
    }

    /// Whether the instance is already up (shared-UART guard).
    pub fn is_enabled(self) -> bool {
        self.regs().uartcr().read().uarten()
    }
}

/// Program baud divisors, framing, FIFO off, DMA-paced TX, and enable.
///
/// The primary channel's UART is shared with the inbound synchronizer and
/// must be configured exactly once at boot; callers use
/// [`UartId::is_enabled`] to skip reinitialization.
pub fn configure(id: UartId, config: &UartConfig) {
    let regs = id.regs();
    // pico-sdk divisor arithmetic: 8*clk/baud in 16.7 fixed point.
    let div = (8 * CLK_PERI_HZ) / config.baud_rate.max(1);
    let (ibrd, fbrd) = match div >> 7 {
        0 => (1, 0),
        i if i >= 0xFFFF => (0xFFFF, 0),
        i => (i, ((div & 0x7F) + 1) / 2),
    };
    regs.uartibrd().write(|w| w.set_baud_divint(ibrd as u16));
    regs.uartfbrd().write(|w| w.set_baud_divfrac(fbrd as u8));
    // LCR_H write latches the divisors. FIFO stays off: one DREQ per
    // byte keeps DMA pacing exact for the 4-6 byte frames we send.
    regs.uartlcr_h().write(|w| {
        w.set_wlen(match config.data_bits {
            DataBits::Five => 0,
            DataBits::Six => 1,
            DataBits::Seven => 2,
            DataBits::Eight => 3,
        });
        w.set_stp2(matches!(config.stop_bits, StopBits::Two));
        w.set_pen(!matches!(config.parity, Parity::None));
        w.set_eps(matches!(config.parity, Parity::Even));
        w.set_fen(false);
    });
    regs.uartdmacr().write(|w| w.set_txdmae(true));
    regs.uartcr().write(|w| {
        w.set_uarten(true);
        w.set_txe(true);
        w.set_rxe(true);
    });
}

/// Disable a UART instance (aux teardown; never the shared UART1).
pub fn deinit(id: UartId) {
    id.regs().uartcr().write(|w| w.set_uarten(false));
}

/// Fire-and-forget DMA transmitter: one claimed DMA channel copying
/// byte-by-byte into a UART data register, paced by the TX DREQ.
pub struct RpTxStream {
    dma_channel: u8,
    uart: UartId,
}

impl RpTxStream {
    /// Bind DMA channel `dma_channel` to `uart`'s TX register. The
    /// channel index is reserved by boot convention (`firmware::boot`);
    /// exclusivity is the banks' responsibility.
    pub fn new(dma_channel: u8, uart: UartId) -> Self {
        Self { dma_channel, uart }
    }
}

impl TxStream for RpTxStream {
    fn dispatch(&mut self, frame: &[u8]) {
        let ch = pac::DMA.ch(usize::from(self.dma_channel));
        ch.read_addr().write_value(frame.as_ptr() as u32);
        ch.write_addr()
            .write_value(self.uart.regs().uartdr().as_ptr() as u32);
        ch.trans_count().write_value(frame.len() as u32);
        // CTRL_TRIG write starts the transfer immediately.
        ch.ctrl_trig().write(|w| {
            w.set_data_size(DataSize::SIZE_BYTE);
            w.set_incr_read(true); // walk the frame
            w.set_incr_write(false); // fixed UART data register
            w.set_treq_sel(self.uart.tx_dreq());
            w.set_chain_to(self.dma_channel);
            w.set_irq_quiet(true);
            w.set_en(true);
        });
    }
}
