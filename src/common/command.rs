//! SDI-12 commands issued by the recorder.
//!
//! See SDI-12 Specification v1.4, Section 4.4 "SDI-12 Commands and Responses".

use core::fmt::{self, Write};

use arrayvec::ArrayString;

use super::{address::Sdi12Addr, error::Error};

/// Longest command this crate formats (`aD9!`), with room to spare.
pub const MAX_COMMAND_LEN: usize = 8;

/// A formatted command ready to be written to the line.
pub type CommandBuffer = ArrayString<MAX_COMMAND_LEN>;

/// Represents an SDI-12 command.
///
/// The `Display` implementation generates the wire form (e.g. `0!`, `0C!`, `0D0!`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Acknowledge Active (`a!`).
    AcknowledgeActive { address: Sdi12Addr },

    /// Send Identification (`aI!`).
    SendIdentification { address: Sdi12Addr },

    /// Start Concurrent Measurement (`aC!`). The sensor converts in the
    /// background and the recorder collects the values later.
    StartConcurrentMeasurement { address: Sdi12Addr },

    /// Send Data (`aD0!`..`aD9!`).
    SendData { address: Sdi12Addr, data_index: u8 },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::AcknowledgeActive { address } => write!(f, "{}!", address),
            Command::SendIdentification { address } => write!(f, "{}I!", address),
            Command::StartConcurrentMeasurement { address } => write!(f, "{}C!", address),
            Command::SendData { address, data_index } => {
                if *data_index <= 9 {
                    write!(f, "{}D{}!", address, data_index)
                } else {
                    Err(fmt::Error)
                }
            }
        }
    }
}

impl Command {
    /// Returns the address the command is directed to.
    pub fn address(&self) -> Sdi12Addr {
        match self {
            Command::AcknowledgeActive { address }
            | Command::SendIdentification { address }
            | Command::StartConcurrentMeasurement { address }
            | Command::SendData { address, .. } => *address,
        }
    }

    /// Formats the command into a fixed-capacity buffer.
    pub fn format_into<E: fmt::Debug>(&self) -> Result<CommandBuffer, Error<E>> {
        let mut buffer = CommandBuffer::new();
        write!(buffer, "{}", self).map_err(|_| Error::<E>::CommandFormat)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(c: char) -> Sdi12Addr {
        Sdi12Addr::new(c).unwrap()
    }

    fn formatted(cmd: Command) -> CommandBuffer {
        cmd.format_into::<()>().unwrap()
    }

    #[test]
    fn test_command_formatting() {
        assert_eq!(formatted(Command::AcknowledgeActive { address: addr('0') }).as_str(), "0!");
        assert_eq!(formatted(Command::SendIdentification { address: addr('a') }).as_str(), "aI!");
        assert_eq!(
            formatted(Command::StartConcurrentMeasurement { address: addr('3') }).as_str(),
            "3C!"
        );
        assert_eq!(
            formatted(Command::SendData { address: addr('Z'), data_index: 0 }).as_str(),
            "ZD0!"
        );
        assert_eq!(
            formatted(Command::SendData { address: addr('1'), data_index: 9 }).as_str(),
            "1D9!"
        );
    }

    #[test]
    fn test_invalid_data_index_format() {
        let cmd = Command::SendData { address: addr('1'), data_index: 10 };
        assert!(matches!(cmd.format_into::<()>(), Err(Error::CommandFormat)));
    }

    #[test]
    fn test_address_retrieval() {
        assert_eq!(Command::AcknowledgeActive { address: addr('0') }.address(), addr('0'));
        assert_eq!(Command::SendIdentification { address: addr('8') }.address(), addr('8'));
        assert_eq!(Command::StartConcurrentMeasurement { address: addr('4') }.address(), addr('4'));
        assert_eq!(Command::SendData { address: addr('6'), data_index: 0 }.address(), addr('6'));
    }
}
