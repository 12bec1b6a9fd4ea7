use std::time::{Duration, Instant};

use log::info;

use crate::chip8_interpreter::error::Chip8Error;
use crate::chip8_interpreter::machine::Interpreter;
use crate::chip8_interpreter::state::RunState;

/// Longest slice of wall time fed to the interpreter per host iteration.
pub const MAX_FRAME_STEP: Duration = Duration::from_millis(100);

/// A pressed/released edge on one of the sixteen logical keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: u8,
    pub pressed: bool,
}

impl KeyEvent {
    pub fn down(key: u8) -> Self {
        Self { key, pressed: true }
    }

    pub fn up(key: u8) -> Self {
        Self {
            key,
            pressed: false,
        }
    }
}

pub trait InputSource {
    /// Appends every key edge seen since the last call.
    fn poll_keys(&mut self, events: &mut Vec<KeyEvent>);

    /// True once the host wants the machine stopped (window closed, etc).
    fn stop_requested(&mut self) -> bool;
}

pub trait DisplaySink {
    /// Called with the framebuffer whenever the draw flag was raised.
    fn present(&mut self, framebuffer: &[u8]);

    /// Called once per host iteration, changed or not.
    fn refresh(&mut self) {}
}

pub trait AudioSink {
    fn beep(&mut self);
}

/// Reports beeps through the log instead of an audio device.
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn beep(&mut self) {
        info!("BEEP");
    }
}

#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn beep(&mut self) {}
}

/// Drives `interpreter` in real time against `host` until the machine
/// halts. A stop request is honoured between iterations, never in the
/// middle of an instruction.
pub fn run_loop<H>(interpreter: &mut Interpreter, host: &mut H) -> Result<RunState, Chip8Error>
where
    H: InputSource + DisplaySink + AudioSink,
{
    let mut events = Vec::new();
    let mut previous_tick = Instant::now();

    loop {
        if host.stop_requested() {
            interpreter.stop();
        }
        if interpreter.run_state().is_halted() {
            return Ok(interpreter.run_state());
        }

        events.clear();
        host.poll_keys(&mut events);
        for event in &events {
            interpreter.handle_key_event(*event)?;
        }

        let now = Instant::now();
        let elapsed = (now - previous_tick).min(MAX_FRAME_STEP);
        previous_tick = now;

        let ticks = interpreter.advance(elapsed, host)?;

        if interpreter.take_draw_flag() {
            host.present(interpreter.framebuffer());
        }
        host.refresh();

        if ticks.cpu == 0 {
            std::thread::sleep(Duration::from_micros(500));
        }
    }
}
