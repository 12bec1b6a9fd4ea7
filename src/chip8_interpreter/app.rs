use log::info;
use raylib::prelude::{Color, KeyboardKey, RaylibDraw, RaylibHandle, RaylibThread};

use crate::chip8_interpreter::config::{
    InterpreterConfig, KEY_COUNT, SCREEN_CELLS, SCREEN_HEIGHT, SCREEN_WIDTH, TIMER_HZ,
};
use crate::chip8_interpreter::error::Chip8Error;
use crate::chip8_interpreter::io::{
    run_loop, AudioSink, DisplaySink, InputSource, KeyEvent, LogAudio,
};
use crate::chip8_interpreter::machine::Interpreter;
use crate::chip8_interpreter::state::{EmulatorState, RunState};

/// Runs a bounded number of CPU cycles with no window and no keyboard,
/// ticking the timers once every `cpu_hz / 60` cycles.
///
/// Stops early when the machine halts or blocks on `Fx0A`, since nothing
/// could ever press a key.
pub fn run_emulator_headless(
    config: &InterpreterConfig,
    max_cycles: usize,
) -> Result<EmulatorState, Chip8Error> {
    if max_cycles == 0 {
        return Err(Chip8Error::InvalidArgument("max_cycles must be > 0"));
    }

    let mut interpreter = Interpreter::from_config(config)?;
    let cycles_per_timer_tick = usize::max(1, (config.cpu_hz / TIMER_HZ) as usize);
    let mut audio = LogAudio;

    for i in 0..max_cycles {
        if interpreter.run_state() != RunState::Running {
            break;
        }

        interpreter.step()?;

        if ((i + 1) % cycles_per_timer_tick) == 0 {
            interpreter.tick_timers(&mut audio);
        }
    }

    info!(
        "headless run ended in {:?} at pc=0x{:03x}",
        interpreter.run_state(),
        interpreter.state().pc
    );
    Ok(interpreter.state().clone())
}

const KEY_MAP: [(KeyboardKey, u8); KEY_COUNT] = [
    (KeyboardKey::KEY_ONE, 0x1),
    (KeyboardKey::KEY_TWO, 0x2),
    (KeyboardKey::KEY_THREE, 0x3),
    (KeyboardKey::KEY_FOUR, 0xC),
    (KeyboardKey::KEY_Q, 0x4),
    (KeyboardKey::KEY_W, 0x5),
    (KeyboardKey::KEY_E, 0x6),
    (KeyboardKey::KEY_R, 0xD),
    (KeyboardKey::KEY_A, 0x7),
    (KeyboardKey::KEY_S, 0x8),
    (KeyboardKey::KEY_D, 0x9),
    (KeyboardKey::KEY_F, 0xE),
    (KeyboardKey::KEY_Z, 0xA),
    (KeyboardKey::KEY_X, 0x0),
    (KeyboardKey::KEY_C, 0xB),
    (KeyboardKey::KEY_V, 0xF),
];

/// Window, keyboard and beeper backed by raylib.
struct RaylibHost {
    rl: RaylibHandle,
    thread: RaylibThread,
    scale: i32,
    front_buffer: [u8; SCREEN_CELLS],
    keys_down: [bool; KEY_COUNT],
    audio: LogAudio,
}

impl InputSource for RaylibHost {
    fn poll_keys(&mut self, events: &mut Vec<KeyEvent>) {
        for (key, mapped) in KEY_MAP {
            let down = self.rl.is_key_down(key);
            let slot = &mut self.keys_down[mapped as usize];
            if down != *slot {
                *slot = down;
                events.push(KeyEvent {
                    key: mapped,
                    pressed: down,
                });
            }
        }
    }

    fn stop_requested(&mut self) -> bool {
        self.rl.window_should_close() || self.rl.is_key_pressed(KeyboardKey::KEY_ESCAPE)
    }
}

impl DisplaySink for RaylibHost {
    fn present(&mut self, framebuffer: &[u8]) {
        self.front_buffer.copy_from_slice(framebuffer);
    }

    fn refresh(&mut self) {
        let scale = self.scale;
        let mut d = self.rl.begin_drawing(&self.thread);
        d.clear_background(Color::BLACK);
        for (index, value) in self.front_buffer.iter().enumerate() {
            if *value == 0 {
                continue;
            }
            let x = (index % SCREEN_WIDTH) as i32;
            let y = (index / SCREEN_WIDTH) as i32;
            d.draw_rectangle(x * scale, y * scale, scale, scale, Color::WHITE);
        }
    }
}

impl AudioSink for RaylibHost {
    fn beep(&mut self) {
        self.audio.beep();
    }
}

pub fn run_emulator_app(
    config: &InterpreterConfig,
    scale: usize,
    target_fps: usize,
) -> Result<RunState, Chip8Error> {
    if scale == 0 {
        return Err(Chip8Error::InvalidArgument("scale must be > 0"));
    }
    if target_fps == 0 {
        return Err(Chip8Error::InvalidArgument("target_fps must be > 0"));
    }

    let mut interpreter = Interpreter::from_config(config)?;

    let width = (SCREEN_WIDTH * scale) as i32;
    let height = (SCREEN_HEIGHT * scale) as i32;
    let (mut rl, thread) = raylib::init()
        .size(width, height)
        .title("chip8-interpreter-rs")
        .build();
    rl.set_target_fps(target_fps as u32);

    let mut host = RaylibHost {
        rl,
        thread,
        scale: scale as i32,
        front_buffer: [0; SCREEN_CELLS],
        keys_down: [false; KEY_COUNT],
        audio: LogAudio,
    };

    let final_state = run_loop(&mut interpreter, &mut host)?;
    info!("machine halted: {final_state:?}");
    Ok(final_state)
}
