//! Interrupt-driven two-wire bus master engine.
//!
//! Exactly one transfer is in flight at any time. `submit_write` or
//! `submit_read` latches the request and triggers the start condition;
//! everything after that runs inside the bus interrupt through
//! [`BusEngine::on_interrupt`]. There is no queueing and no retry: a
//! rejected submit returns `WouldBlock` and the caller tries again at its
//! next natural update point.
//!
//! After the stop condition is issued the engine parks in a `Stopping`
//! state instead of spinning on the bus-state register; the state resolves
//! once the bus is observed idle again, either on a later interrupt or on
//! the next submit.

use ufmt::derive::uDebug;

/// Longest transfer the engine can own. A display frame is one command
/// byte plus four digit bitmaps, so this leaves headroom.
pub const MAX_TRANSFER: usize = 8;

/// Transfer direction, encoded into the bus header's R/W bit.
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Write,
    Read,
}

/// Result of a transfer, set exactly once per transfer and read by the
/// issuer after the interrupt sequence finishes.
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOutcome {
    Success,
    InProgress,
    /// Multi-master contention was lost or an electrical bus fault occurred.
    ArbitrationLost,
    /// The addressed device is absent or refused a byte.
    AddressNack,
}

/// Submit-time rejection that is not "try again later".
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    TooLong,
}

/// Byte-level event flags sampled from the bus peripheral at the start of
/// each interrupt.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusFlags {
    pub arbitration_lost: bool,
    pub bus_error: bool,
    /// The last address or data byte was negatively acknowledged.
    pub nack: bool,
    /// A write (address or data byte) completed.
    pub write_done: bool,
    /// A received byte is waiting in the data register.
    pub read_done: bool,
}

/// Capability object over the bus peripheral registers, so the engine
/// never touches raw addresses. Implemented by `hal::twi::Twi` on hardware
/// and by scripted fakes in tests.
pub trait BusPort {
    fn flags(&self) -> BusFlags;
    fn bus_idle(&self) -> bool;
    /// Latch the header byte (7-bit address plus R/W bit) and trigger the
    /// start condition.
    fn start(&mut self, header: u8);
    /// Transmit the next data byte, acknowledging the previous one.
    fn write_data(&mut self, byte: u8);
    /// Fetch the received byte from the data register.
    fn read_data(&mut self) -> u8;
    /// Acknowledge the received byte and continue receiving.
    fn ack_continue(&mut self);
    /// Arm a negative acknowledge for the byte just received.
    fn nack(&mut self);
    /// Issue the stop condition (executes the armed acknowledge action
    /// first).
    fn stop(&mut self);
    /// Clear latched arbitration-loss/bus-error flags so the vector stops
    /// firing.
    fn clear_faults(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Idle,
    Addressing,
    Writing,
    Reading,
    /// Stop condition issued, waiting for the bus to report idle.
    Stopping,
}

/// The transfer engine. Owns the request buffer from acceptance until the
/// terminal outcome; the cursor is only mutated inside [`Self::on_interrupt`].
pub struct BusEngine {
    state: EngineState,
    outcome: BusOutcome,
    dir: Direction,
    buf: [u8; MAX_TRANSFER],
    len: u8,
    cursor: u8,
}

impl BusEngine {
    pub const fn new() -> Self {
        Self {
            state: EngineState::Idle,
            outcome: BusOutcome::Success,
            dir: Direction::Write,
            buf: [0; MAX_TRANSFER],
            len: 0,
            cursor: 0,
        }
    }

    /// Submit a write transfer of `data` to `address`.
    pub fn submit_write<P: BusPort>(
        &mut self,
        port: &mut P,
        address: u8,
        data: &[u8],
    ) -> nb::Result<(), SubmitError> {
        self.accept(port, address, Direction::Write, data, data.len())
    }

    /// Submit a read transfer of `len` bytes from `address`. The bytes are
    /// available through [`Self::data`] once the outcome is `Success`.
    pub fn submit_read<P: BusPort>(
        &mut self,
        port: &mut P,
        address: u8,
        len: usize,
    ) -> nb::Result<(), SubmitError> {
        self.accept(port, address, Direction::Read, &[], len)
    }

    fn accept<P: BusPort>(
        &mut self,
        port: &mut P,
        address: u8,
        dir: Direction,
        data: &[u8],
        len: usize,
    ) -> nb::Result<(), SubmitError> {
        if len > MAX_TRANSFER {
            return Err(nb::Error::Other(SubmitError::TooLong));
        }

        // A previously issued stop has completed once the bus reports idle
        if self.state == EngineState::Stopping && port.bus_idle() {
            self.state = EngineState::Idle;
        }

        // Reject while another transfer is pending or the bus is not idle
        if self.state != EngineState::Idle || !port.bus_idle() {
            return Err(nb::Error::WouldBlock);
        }

        self.buf[..data.len()].copy_from_slice(data);
        self.len = len as u8;
        self.cursor = 0;
        self.dir = dir;
        self.outcome = BusOutcome::InProgress;
        self.state = EngineState::Addressing;

        let rw = match dir {
            Direction::Write => 0,
            Direction::Read => 1,
        };
        port.start(address << 1 | rw);
        Ok(())
    }

    /// Whether a transfer is between acceptance and its terminal outcome.
    /// While this holds, the completion interrupt must be able to fire.
    pub fn pending(&self) -> bool {
        matches!(
            self.state,
            EngineState::Addressing | EngineState::Writing | EngineState::Reading
        )
    }

    /// Result of the most recent transfer.
    pub fn outcome(&self) -> BusOutcome {
        self.outcome
    }

    /// Bytes received by the last read transfer.
    pub fn data(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }

    /// Byte-level protocol state machine; interrupt context only.
    pub fn on_interrupt<P: BusPort>(&mut self, port: &mut P) {
        match self.state {
            // No transfer registered: a latent driver inconsistency, not a
            // reportable error. Deliberately a no-op.
            EngineState::Idle => return,
            EngineState::Stopping => {
                if port.bus_idle() {
                    self.state = EngineState::Idle;
                }
                return;
            }
            _ => {}
        }

        let flags = port.flags();

        // Fault conditions first: the bus is no longer ours, so there is
        // no stop condition to issue.
        if flags.arbitration_lost || flags.bus_error {
            port.clear_faults();
            self.finish(BusOutcome::ArbitrationLost);
            return;
        }

        // A negative acknowledge on the address or a data byte
        if flags.nack {
            port.stop();
            self.finish(BusOutcome::AddressNack);
            return;
        }

        if flags.write_done {
            if self.state == EngineState::Addressing {
                self.state = EngineState::Writing;
            }
            if self.cursor < self.len {
                port.write_data(self.buf[self.cursor as usize]);
                self.cursor += 1;
            } else {
                port.stop();
                self.finish(BusOutcome::Success);
            }
        } else if flags.read_done {
            if self.state == EngineState::Addressing {
                self.state = EngineState::Reading;
            }
            if self.cursor < self.len {
                self.buf[self.cursor as usize] = port.read_data();
                self.cursor += 1;
            }
            // Decided after storing: the byte just stored may have been
            // the last one wanted.
            if self.cursor < self.len {
                port.ack_continue();
            } else {
                port.nack();
                port.stop();
                self.finish(BusOutcome::Success);
            }
        }
    }

    fn finish(&mut self, outcome: BusOutcome) {
        self.outcome = outcome;
        self.state = EngineState::Stopping;
    }
}

impl Default for BusEngine {
    fn default() -> Self {
        Self::new()
    }
}
