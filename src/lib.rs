pub mod chip8_interpreter;

pub use chip8_interpreter::app::{run_emulator_app, run_emulator_headless};
pub use chip8_interpreter::config::InterpreterConfig;
pub use chip8_interpreter::cpu::{execute_cycle, execute_instruction, execute_opcode, tick_timers};
pub use chip8_interpreter::decode::{decode, DecodedOpcode, Instruction};
pub use chip8_interpreter::error::Chip8Error;
pub use chip8_interpreter::io::{
    run_loop, AudioSink, DisplaySink, InputSource, KeyEvent, LogAudio, NullAudio,
};
pub use chip8_interpreter::machine::{Cadence, Interpreter, Ticks};
pub use chip8_interpreter::quirks::{
    load_quirks_profile, load_quirks_profile_from_env, Chip8Quirks, CONFORMANT_QUIRKS,
    SOURCE_QUIRKS,
};
pub use chip8_interpreter::state::{
    clear_display, create_state, load_rom, load_rom_bytes, reset_state, EmulatorState,
    HaltReason, RunState,
};
