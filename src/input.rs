// keyboard controls: arrow keys steer, r restarts, q quits
// stdin is switched to non-canonical, no-echo mode while the game runs
use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use circular_buffer::CircularBuffer;
use termios::{tcsetattr, Termios, ECHO, ICANON, TCSANOW};
use tracing::{debug, warn};

use crate::error::{GameError, Result};
use crate::snake::SnakeDirection;

pub type InputBuffer = CircularBuffer<1024, u8>; // 1024 bytes in input buffer

const STDIN_FD: i32 = 0;
const ESC: u8 = 27;
const BRACKET: u8 = 91;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Turn(SnakeDirection),
    Restart,
    Quit,
}

/// Puts stdin into raw mode and restores the previous mode when dropped.
pub struct RawModeGuard {
    original: Termios,
}

impl RawModeGuard {
    pub fn enable() -> Result<Self> {
        let original = Termios::from_fd(STDIN_FD).map_err(|e| GameError::Terminal {
            message: format!("stdin is not a terminal: {e}"),
        })?;
        let mut raw = original;
        raw.c_lflag &= !(ICANON | ECHO);
        tcsetattr(STDIN_FD, TCSANOW, &raw)?;
        debug!("terminal switched to raw mode");
        Ok(RawModeGuard { original })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = tcsetattr(STDIN_FD, TCSANOW, &self.original) {
            warn!(error = %e, "failed to restore terminal mode");
        }
    }
}

fn arrow_direction(key: u8) -> Option<SnakeDirection> {
    match key {
        65 => Some(SnakeDirection::Up),
        66 => Some(SnakeDirection::Down),
        67 => Some(SnakeDirection::Right),
        68 => Some(SnakeDirection::Left),
        _ => None,
    }
}

fn is_control_byte(key: u8) -> bool {
    matches!(key, ESC | BRACKET | 65..=68 | b'r' | b'R' | b'q' | b'Q')
}

/// Pops the next complete control off the front of the buffer.
///
/// An escape sequence that has not fully arrived yet is left in place.
pub fn parse_control(buffer: &mut InputBuffer) -> Option<Control> {
    while let Some(&first) = buffer.front() {
        match first {
            b'r' | b'R' => {
                buffer.pop_front();
                return Some(Control::Restart);
            }
            b'q' | b'Q' => {
                buffer.pop_front();
                return Some(Control::Quit);
            }
            ESC => {
                // arrows keys are long 3 bytes, first 2 need to be 27 and 91
                if buffer.len() < 3 {
                    return None;
                }
                let direction = match buffer.nth_front(1) {
                    Some(&BRACKET) => buffer.nth_front(2).copied().and_then(arrow_direction),
                    _ => None,
                };
                match direction {
                    Some(direction) => {
                        for _ in 0..3 {
                            buffer.pop_front();
                        }
                        return Some(Control::Turn(direction));
                    }
                    None => {
                        buffer.pop_front();
                    }
                }
            }
            _ => {
                buffer.pop_front();
            }
        }
    }
    None
}

pub struct KeyboardInput {
    receiver: Receiver<u8>,
    input_buffer: InputBuffer,
    closed: bool,
}

impl KeyboardInput {
    /// Spawns a thread reading stdin one byte at a time.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<u8>();
        thread::spawn(move || {
            let mut reader = io::stdin();
            let mut buffer = [0u8; 1];
            loop {
                if let Err(e) = reader.read_exact(&mut buffer) {
                    debug!(error = %e, "stdin closed");
                    break;
                }
                if tx.send(buffer[0]).is_err() {
                    break;
                }
            }
        });
        KeyboardInput {
            receiver: rx,
            input_buffer: InputBuffer::new(),
            closed: false,
        }
    }

    pub fn next_control(&mut self) -> Option<Control> {
        self.pump();
        parse_control(&mut self.input_buffer)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn pump(&mut self) {
        loop {
            match self.receiver.try_recv() {
                Ok(key) => self.add_to_input_buffer(key),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
            }
        }
    }

    fn add_to_input_buffer(&mut self, key: u8) {
        // if the buffer is full or the key is irrelevant, ignore the input
        if is_control_byte(key) && !self.input_buffer.is_full() {
            self.input_buffer.push_back(key);
        }
    }
}
