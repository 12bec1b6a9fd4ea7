use std::path::Path;
use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::chip8_interpreter::config::{InterpreterConfig, TIMER_HZ};
use crate::chip8_interpreter::cpu::{execute_cycle, tick_timers};
use crate::chip8_interpreter::error::Chip8Error;
use crate::chip8_interpreter::io::{AudioSink, KeyEvent};
use crate::chip8_interpreter::quirks::Chip8Quirks;
use crate::chip8_interpreter::state::{
    create_state, load_rom, load_rom_bytes, reset_state, EmulatorState, HaltReason, RunState,
};

/// Turns elapsed wall time into CPU ticks and 60 Hz timer ticks, each with
/// its own accumulator so neither rate depends on the other.
#[derive(Debug, Clone)]
pub struct Cadence {
    cpu_interval: Duration,
    timer_interval: Duration,
    cpu_debt: Duration,
    timer_debt: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ticks {
    pub cpu: u32,
    pub timers: u32,
}

impl Cadence {
    pub fn new(cpu_hz: u32) -> Result<Self, Chip8Error> {
        if cpu_hz == 0 {
            return Err(Chip8Error::InvalidArgument("cpu_hz must be > 0"));
        }
        Ok(Self {
            cpu_interval: Duration::from_secs(1) / cpu_hz,
            timer_interval: Duration::from_secs(1) / TIMER_HZ,
            cpu_debt: Duration::ZERO,
            timer_debt: Duration::ZERO,
        })
    }

    pub fn advance(&mut self, elapsed: Duration) -> Ticks {
        self.cpu_debt += elapsed;
        self.timer_debt += elapsed;

        let mut ticks = Ticks::default();
        while self.cpu_debt >= self.cpu_interval {
            self.cpu_debt -= self.cpu_interval;
            ticks.cpu += 1;
        }
        while self.timer_debt >= self.timer_interval {
            self.timer_debt -= self.timer_interval;
            ticks.timers += 1;
        }
        ticks
    }
}

/// The execution loop: sole owner of the machine state, the random source
/// and the tick cadence.
pub struct Interpreter {
    state: EmulatorState,
    quirks: Chip8Quirks,
    rng: Box<dyn RngCore>,
    cadence: Cadence,
}

impl Interpreter {
    pub fn new(
        quirks: Chip8Quirks,
        cpu_hz: u32,
        rng: Box<dyn RngCore>,
    ) -> Result<Self, Chip8Error> {
        Ok(Self {
            state: create_state(None)?,
            quirks,
            rng,
            cadence: Cadence::new(cpu_hz)?,
        })
    }

    /// Builds an interpreter and loads the configured ROM.
    pub fn from_config(config: &InterpreterConfig) -> Result<Self, Chip8Error> {
        config.validate()?;
        let rng: Box<dyn RngCore> = match config.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_entropy()),
        };
        let mut interpreter = Self::new(config.quirks, config.cpu_hz, rng)?;
        interpreter.load_rom(&config.rom_path)?;
        Ok(interpreter)
    }

    pub fn load_rom(&mut self, path: &Path) -> Result<(), Chip8Error> {
        load_rom(&mut self.state, path)
    }

    pub fn load_rom_bytes(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        load_rom_bytes(&mut self.state, rom)
    }

    /// Explicit power cycle; reloads the last ROM. Never called on an error path.
    pub fn reset(&mut self) -> Result<(), Chip8Error> {
        info!("resetting machine");
        reset_state(&mut self.state)
    }

    pub fn state(&self) -> &EmulatorState {
        &self.state
    }

    /// Direct access for hosts that need to poke at the machine.
    pub fn state_mut(&mut self) -> &mut EmulatorState {
        &mut self.state
    }

    pub fn quirks(&self) -> Chip8Quirks {
        self.quirks
    }

    pub fn run_state(&self) -> RunState {
        self.state.run_state
    }

    pub fn framebuffer(&self) -> &[u8] {
        &self.state.screen_buffer
    }

    /// Reads and clears the draw flag.
    pub fn take_draw_flag(&mut self) -> bool {
        std::mem::take(&mut self.state.should_draw)
    }

    pub fn step(&mut self) -> Result<RunState, Chip8Error> {
        execute_cycle(&mut self.state, self.quirks, self.rng.as_mut())?;
        Ok(self.state.run_state)
    }

    pub fn tick_timers(&mut self, audio: &mut dyn AudioSink) {
        tick_timers(&mut self.state, self.quirks, audio);
    }

    /// Runs every CPU and timer tick that `elapsed` makes due.
    pub fn advance(
        &mut self,
        elapsed: Duration,
        audio: &mut dyn AudioSink,
    ) -> Result<Ticks, Chip8Error> {
        let ticks = self.cadence.advance(elapsed);

        for _ in 0..ticks.cpu {
            if self.state.run_state != RunState::Running {
                break;
            }
            self.step()?;
        }
        for _ in 0..ticks.timers {
            self.tick_timers(audio);
        }

        Ok(ticks)
    }

    /// Records a key edge; a key-down resumes a pending `Fx0A`.
    pub fn handle_key_event(&mut self, event: KeyEvent) -> Result<(), Chip8Error> {
        let key = event.key as usize;
        self.state.set_key_state(key, event.pressed)?;

        if let (RunState::WaitingForKey { register }, true) = (self.state.run_state, event.pressed)
        {
            self.state.set_register(register, event.key)?;
            self.state.run_state = RunState::Running;
            debug!("key 0x{key:x} resumed execution into V{register:x}");
        }
        Ok(())
    }

    pub fn stop(&mut self) {
        if !self.state.run_state.is_halted() {
            info!("stop requested at pc=0x{:03x}", self.state.pc);
            self.state.run_state = RunState::Halted(HaltReason::StopRequested);
        }
    }
}
