//! FIFO of DTC commands from the input dispatcher to the worker.
//!
//! Two slots, serviced strictly in arrival order: a refresh followed by a
//! clear runs the refresh first. Nothing is merged or dropped silently; a
//! third request while both slots are waiting is refused with
//! [`CommandError::QueueFull`]. Each serviced command produces a
//! [`CommandAck`].

use heapless::Deque;

use crate::error::CommandError;

/// Queue capacity.
pub const COMMAND_QUEUE_CAPACITY: usize = 2;

/// Work the dispatcher can hand to the worker.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DtcCommand {
    /// Re-read stored codes (mode 03).
    Refresh,
    /// Clear codes (mode 04), then re-read to confirm.
    Clear,
}

impl DtcCommand {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::Clear => "clear",
        }
    }
}

/// Outcome of one serviced command.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CommandAck {
    pub command: DtcCommand,
    pub succeeded: bool,
    /// Increments with every acknowledgement.
    pub sequence: u32,
}

#[derive(Clone, Debug)]
pub struct CommandQueue {
    pending: Deque<DtcCommand, COMMAND_QUEUE_CAPACITY>,
    in_flight: Option<DtcCommand>,
    last_ack: Option<CommandAck>,
    acks: u32,
}

impl CommandQueue {
    pub const fn new() -> Self {
        Self {
            pending: Deque::new(),
            in_flight: None,
            last_ack: None,
            acks: 0,
        }
    }

    /// Enqueue `command` behind whatever is already waiting.
    pub fn request(
        &mut self,
        command: DtcCommand,
    ) -> Result<(), CommandError> {
        self.pending.push_back(command).map_err(|_| CommandError::QueueFull)
    }

    /// Take the oldest waiting command and mark it in flight.
    pub fn begin_next(&mut self) -> Option<DtcCommand> {
        let command = self.pending.pop_front()?;
        self.in_flight = Some(command);
        Some(command)
    }

    /// Acknowledge the in-flight command.
    pub fn complete(
        &mut self,
        command: DtcCommand,
        succeeded: bool,
    ) -> CommandAck {
        self.in_flight = None;
        self.acks = self.acks.wrapping_add(1);
        let ack = CommandAck {
            command,
            succeeded,
            sequence: self.acks,
        };
        self.last_ack = Some(ack);
        ack
    }

    /// Whether `command` is waiting or being serviced.
    pub fn is_pending(
        &self,
        command: DtcCommand,
    ) -> bool {
        self.in_flight == Some(command) || self.pending.iter().any(|c| *c == command)
    }

    /// Whether any command is waiting or being serviced.
    pub fn is_busy(&self) -> bool { self.in_flight.is_some() || !self.pending.is_empty() }

    #[inline]
    pub fn waiting(&self) -> usize { self.pending.len() }

    #[inline]
    pub const fn in_flight(&self) -> Option<DtcCommand> { self.in_flight }

    #[inline]
    pub const fn last_ack(&self) -> Option<CommandAck> { self.last_ack }
}

impl Default for CommandQueue {
    fn default() -> Self { Self::new() }
}
