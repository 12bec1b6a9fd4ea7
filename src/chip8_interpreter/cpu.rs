use log::{debug, error, trace};
use rand::{Rng, RngCore};

use crate::chip8_interpreter::config::{
    FLAG_REGISTER, FONT_GLYPH_HEIGHT, FONT_START, MEMORY_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use crate::chip8_interpreter::decode::{decode, DecodedOpcode, Instruction};
use crate::chip8_interpreter::error::Chip8Error;
use crate::chip8_interpreter::io::AudioSink;
use crate::chip8_interpreter::quirks::Chip8Quirks;
use crate::chip8_interpreter::state::{clear_display, EmulatorState, HaltReason, RunState};

/// Runs one CPU tick: fetch, advance PC, execute.
///
/// A waiting machine is left untouched. Any failure moves the machine to
/// `Halted` before the error is returned, so the caller never observes a
/// half-valid running state.
pub fn execute_cycle(
    state: &mut EmulatorState,
    quirks: Chip8Quirks,
    rng: &mut dyn RngCore,
) -> Result<(), Chip8Error> {
    match state.run_state {
        RunState::Halted(_) => return Err(Chip8Error::MachineHalted),
        RunState::WaitingForKey { .. } => return Ok(()),
        RunState::Running => {}
    }

    if state.pc > (MEMORY_SIZE - 2) {
        return Err(halt_out_of_bounds(state));
    }

    let address = state.pc;
    let opcode = state.opcode_at(address)?;
    state.pc += 2;

    if let Err(err) = execute_opcode(state, opcode, quirks, rng) {
        error!("0x{opcode:04x} at 0x{address:03x} failed: {err}");
        state.run_state = RunState::Halted(HaltReason::Fault { opcode, address });
        return Err(err);
    }

    if state.pc >= MEMORY_SIZE {
        return Err(halt_out_of_bounds(state));
    }

    Ok(())
}

fn halt_out_of_bounds(state: &mut EmulatorState) -> Chip8Error {
    error!("program counter exceeded program memory: 0x{:03x}", state.pc);
    state.run_state = RunState::Halted(HaltReason::ProgramCounterOutOfBounds(state.pc));
    Chip8Error::ProgramCounterOutOfBounds(state.pc)
}

/// Runs one 60 Hz timer tick. The sound sink hears exactly one beep when
/// the sound timer runs out.
pub fn tick_timers(state: &mut EmulatorState, quirks: Chip8Quirks, audio: &mut dyn AudioSink) {
    match state.run_state {
        RunState::Halted(_) => return,
        RunState::WaitingForKey { .. } if quirks.key_wait_freezes_timers => return,
        _ => {}
    }

    state.delay_timer = state.delay_timer.saturating_sub(1);

    if state.sound_timer > 0 {
        state.sound_timer -= 1;
        if state.sound_timer == 0 {
            audio.beep();
        }
    }
}

/// Executes an opcode as if it had just been fetched (PC already past it).
pub fn execute_opcode(
    state: &mut EmulatorState,
    opcode: u16,
    quirks: Chip8Quirks,
    rng: &mut dyn RngCore,
) -> Result<(), Chip8Error> {
    state.op = opcode;
    let decoded = decode(opcode);
    trace!("0x{:03x}: {decoded}", state.pc.saturating_sub(2));
    execute_instruction(state, &decoded, quirks, rng)
}

pub fn execute_instruction(
    state: &mut EmulatorState,
    op: &DecodedOpcode,
    quirks: Chip8Quirks,
    rng: &mut dyn RngCore,
) -> Result<(), Chip8Error> {
    match op.instruction {
        Instruction::Null => handle_null(state, op, quirks),
        Instruction::Clear => {
            clear_display(state);
            if quirks.clear_sets_draw_flag {
                state.should_draw = true;
            }
            Ok(())
        }
        Instruction::Return => {
            state.pc = state.pop_stack()? as usize;
            Ok(())
        }
        Instruction::Jump => {
            state.pc = op.nnn as usize;
            Ok(())
        }
        Instruction::Call => {
            state.push_stack(state.pc as u16)?;
            state.pc = op.nnn as usize;
            Ok(())
        }
        Instruction::SkipIfEqualConst => {
            let matched = state.register(op.x)? == op.nn;
            skip_if(state, matched);
            Ok(())
        }
        Instruction::SkipIfNotEqualConst => {
            let matched = state.register(op.x)? != op.nn;
            skip_if(state, matched);
            Ok(())
        }
        Instruction::SkipIfEqualVal => {
            let matched = state.register(op.x)? == state.register(op.y)?;
            skip_if(state, matched);
            Ok(())
        }
        Instruction::SkipIfNotEqualVal => {
            let matched = state.register(op.x)? != state.register(op.y)?;
            skip_if(state, matched);
            Ok(())
        }
        Instruction::LoadConst => state.set_register(op.x, op.nn),
        Instruction::AddConst => {
            let value = state.register(op.x)?.wrapping_add(op.nn);
            state.set_register(op.x, value)
        }
        Instruction::LoadVal
        | Instruction::LoadOr
        | Instruction::LoadAnd
        | Instruction::LoadXor
        | Instruction::AddVal
        | Instruction::SubVal
        | Instruction::ShiftRight
        | Instruction::SubValInverse
        | Instruction::ShiftLeft => handle_alu(state, op, quirks),
        Instruction::SetIndex => {
            state.index = op.nnn;
            Ok(())
        }
        Instruction::JumpOffset => {
            state.pc = op.nnn as usize + state.register(0)? as usize;
            Ok(())
        }
        Instruction::Random => state.set_register(op.x, rng.gen::<u8>() & op.nn),
        Instruction::DrawSprite => handle_draw(state, op, quirks),
        Instruction::SkipIfKeyPressed => {
            let key = state.register(op.x)? as usize;
            let pressed = state.key_pressed(key)?;
            skip_if(state, pressed);
            Ok(())
        }
        Instruction::SkipIfKeyNotPressed => {
            let key = state.register(op.x)? as usize;
            let pressed = state.key_pressed(key)?;
            skip_if(state, !pressed);
            Ok(())
        }
        Instruction::GetDelayTimer => state.set_register(op.x, state.delay_timer),
        Instruction::WaitForKey => {
            state.register(op.x)?;
            debug!("waiting for key into V{:x}", op.x);
            state.run_state = RunState::WaitingForKey { register: op.x };
            Ok(())
        }
        Instruction::SetDelayTimer => {
            state.delay_timer = state.register(op.x)?;
            Ok(())
        }
        Instruction::SetSoundTimer => {
            state.sound_timer = state.register(op.x)?;
            Ok(())
        }
        Instruction::AddToIndex => {
            state.index = state.index.wrapping_add(state.register(op.x)? as u16);
            Ok(())
        }
        Instruction::SetIndexToFont => {
            let glyph = state.register(op.x)? as usize;
            state.index = (FONT_START + glyph * FONT_GLYPH_HEIGHT) as u16;
            Ok(())
        }
        Instruction::StoreBcd => {
            let value = state.register(op.x)?;
            let base = state.index as usize;
            state.write_memory(base, value / 100)?;
            state.write_memory(base + 1, (value / 10) % 10)?;
            state.write_memory(base + 2, value % 10)
        }
        Instruction::DumpRegisters => {
            let base = state.index as usize;
            for register in 0..=op.x {
                let value = state.register(register)?;
                state.write_memory(base + register, value)?;
            }
            Ok(())
        }
        Instruction::LoadRegisters => {
            let base = state.index as usize;
            for register in 0..=op.x {
                let value = state.read_memory(base + register)?;
                state.set_register(register, value)?;
            }
            Ok(())
        }
    }
}

fn skip_if(state: &mut EmulatorState, condition: bool) {
    if condition {
        state.pc += 2;
    }
}

fn handle_null(
    state: &mut EmulatorState,
    op: &DecodedOpcode,
    quirks: Chip8Quirks,
) -> Result<(), Chip8Error> {
    // 0nnn jumped into native code on the COSMAC VIP; there is nothing to run.
    if quirks.trap_illegal_opcodes && op.family() != 0 {
        return Err(Chip8Error::IllegalInstruction {
            opcode: op.raw,
            address: state.pc.saturating_sub(2),
        });
    }
    debug!("ignoring opcode 0x{:04x}", op.raw);
    Ok(())
}

fn handle_alu(
    state: &mut EmulatorState,
    op: &DecodedOpcode,
    quirks: Chip8Quirks,
) -> Result<(), Chip8Error> {
    let vx = state.register(op.x)?;
    let vy = state.register(op.y)?;

    match op.instruction {
        Instruction::LoadVal => state.set_register(op.x, vy),
        Instruction::LoadOr => state.set_register(op.x, vx | vy),
        Instruction::LoadAnd => state.set_register(op.x, vx & vy),
        Instruction::LoadXor => state.set_register(op.x, vx ^ vy),
        Instruction::AddVal => {
            let (result, carry) = vx.overflowing_add(vy);
            if carry {
                state.set_register(FLAG_REGISTER, 1)?;
            } else if quirks.add_clears_carry {
                state.set_register(FLAG_REGISTER, 0)?;
            }
            state.set_register(op.x, result)
        }
        Instruction::SubVal => {
            state.set_register(FLAG_REGISTER, u8::from(vx >= vy))?;
            state.set_register(op.x, vx.wrapping_sub(vy))
        }
        Instruction::SubValInverse => {
            state.set_register(FLAG_REGISTER, u8::from(vy >= vx))?;
            state.set_register(op.x, vy.wrapping_sub(vx))
        }
        Instruction::ShiftRight => {
            state.set_register(FLAG_REGISTER, vx & 0x1)?;
            state.set_register(op.x, vx >> 1)
        }
        Instruction::ShiftLeft => {
            state.set_register(FLAG_REGISTER, (vx & 0x80) >> 7)?;
            state.set_register(op.x, vx << 1)
        }
        _ => unreachable!("{op} is not an ALU instruction"),
    }
}

fn handle_draw(
    state: &mut EmulatorState,
    op: &DecodedOpcode,
    quirks: Chip8Quirks,
) -> Result<(), Chip8Error> {
    let x_start = state.register(op.x)? as usize;
    let y_start = state.register(op.y)? as usize;
    let height = op.n as usize;
    let sprite_base = state.index as usize;

    state.set_register(FLAG_REGISTER, 0)?;
    let mut collision = false;

    for row in 0..height {
        let sprite_row = state.read_memory(sprite_base + row)?;

        for bit in 0..8 {
            if sprite_row & (0x80 >> bit) == 0 {
                continue;
            }

            let location = if quirks.draw_wrap {
                ((x_start + bit) % SCREEN_WIDTH) + ((y_start + row) % SCREEN_HEIGHT) * SCREEN_WIDTH
            } else {
                x_start + bit + (y_start + row) * SCREEN_WIDTH
            };

            if state.xor_pixel(location)? {
                collision = true;
            }
        }
    }

    if collision {
        state.set_register(FLAG_REGISTER, 1)?;
    }
    state.should_draw = true;

    Ok(())
}
