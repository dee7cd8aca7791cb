//! Non-blocking stream transmission seam.
//!
//! A [`TxStream`] moves a small frame from memory to a UART data register
//! using a data mover paced by the peripheral's own transmit-ready signal,
//! returning before the transfer completes. There is no completion
//! callback: the frame size and baud rate bound the drain time, and the
//! dispatch engine schedules its next interrupt at least one frame-time
//! away, so overlap cannot occur.

/// Fire-and-forget transmitter bound to one UART TX channel.
pub trait TxStream {
    /// Start transmitting `frame` and return immediately.
    ///
    /// The transfer is paced by the UART's TX-ready signal, so it outlives
    /// this call by up to `frame.len()` byte-times. Until that time has
    /// elapsed the caller must not mutate the memory behind `frame`;
    /// hardware implementations keep reading it. The dispatcher's
    /// ping-pong buffer discipline guarantees this: the slot being
    /// transmitted is never the slot being loaded, and slots swap only
    /// after the next dispatch is issued.
    fn dispatch(&mut self, frame: &[u8]);
}
