use chip8_interpreter_rs::{
    create_state, execute_cycle, execute_opcode, Chip8Error, EmulatorState, HaltReason, RunState,
    CONFORMANT_QUIRKS, SOURCE_QUIRKS,
};
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn zero_rng() -> StepRng {
    StepRng::new(0, 0)
}

fn fresh_state() -> EmulatorState {
    create_state(None).unwrap()
}

#[test]
fn six_xnn_loads_constant_into_every_register() {
    let mut state = fresh_state();

    for x in 0..16u16 {
        for k in [0x00u16, 0x01, 0x7F, 0xFF] {
            execute_opcode(&mut state, 0x6000 | (x << 8) | k, SOURCE_QUIRKS, &mut zero_rng())
                .unwrap();
            assert_eq!(state.registers[x as usize], k as u8);
        }
    }
}

#[test]
fn seven_xnn_wraps_at_8_bits_and_leaves_vf_alone() {
    let mut state = fresh_state();
    state.registers[0] = 0xFF;
    state.registers[0xF] = 0xAA;

    execute_opcode(&mut state, 0x7002, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.registers[0], 0x01);
    assert_eq!(state.registers[0xF], 0xAA);
}

#[test]
fn eight_xy4_sets_carry_only_past_255() {
    for (a, b) in [(0u8, 0u8), (200, 55), (200, 56), (255, 255), (1, 2)] {
        let mut state = fresh_state();
        state.registers[1] = a;
        state.registers[2] = b;

        execute_opcode(&mut state, 0x8124, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

        assert_eq!(state.registers[1], a.wrapping_add(b));
        assert_eq!(
            state.registers[0xF],
            u8::from(a as u16 + b as u16 > 255),
            "{a} + {b}"
        );
    }
}

#[test]
fn eight_xy4_keeps_stale_vf_without_carry_in_source_profile() {
    let mut state = fresh_state();
    state.registers[0xF] = 1;
    state.registers[1] = 1;
    state.registers[2] = 1;

    execute_opcode(&mut state, 0x8124, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.registers[1], 2);
    assert_eq!(state.registers[0xF], 1);
}

#[test]
fn eight_xy4_clears_vf_without_carry_in_conformant_profile() {
    let mut state = fresh_state();
    state.registers[0xF] = 1;
    state.registers[1] = 1;
    state.registers[2] = 1;

    execute_opcode(&mut state, 0x8124, CONFORMANT_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.registers[1], 2);
    assert_eq!(state.registers[0xF], 0);
}

#[test]
fn eight_xy5_flags_no_borrow() {
    for (a, b, expected, flag) in [(5u8, 3u8, 2u8, 1u8), (3, 5, 254, 0), (4, 4, 0, 1)] {
        let mut state = fresh_state();
        state.registers[1] = a;
        state.registers[2] = b;

        execute_opcode(&mut state, 0x8125, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

        assert_eq!(state.registers[1], expected);
        assert_eq!(state.registers[0xF], flag, "{a} - {b}");
    }
}

#[test]
fn eight_xy7_subtracts_vx_from_vy() {
    let mut state = fresh_state();
    state.registers[1] = 3;
    state.registers[2] = 5;

    execute_opcode(&mut state, 0x8127, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.registers[1], 2);
    assert_eq!(state.registers[0xF], 1);

    state.registers[1] = 5;
    state.registers[2] = 3;
    execute_opcode(&mut state, 0x8127, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.registers[1], 254);
    assert_eq!(state.registers[0xF], 0);
}

#[test]
fn eight_xy6_shifts_vx_and_ignores_vy() {
    let mut state = fresh_state();
    state.registers[1] = 0b0000_0011;
    state.registers[2] = 0xF0;

    execute_opcode(&mut state, 0x8126, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.registers[1], 0b0000_0001);
    assert_eq!(state.registers[2], 0xF0);
    assert_eq!(state.registers[0xF], 1);
}

#[test]
fn eight_xye_shifts_left_modulo_256() {
    let mut state = fresh_state();
    state.registers[1] = 0b1100_0000;

    execute_opcode(&mut state, 0x812E, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.registers[1], 0b1000_0000);
    assert_eq!(state.registers[0xF], 1);

    state.registers[1] = 0b0100_0000;
    execute_opcode(&mut state, 0x812E, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.registers[1], 0b1000_0000);
    assert_eq!(state.registers[0xF], 0);
}

#[test]
fn eight_xy_bitwise_ops() {
    let mut state = fresh_state();
    state.registers[1] = 0b1100;
    state.registers[2] = 0b1010;

    execute_opcode(&mut state, 0x8121, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.registers[1], 0b1110);

    state.registers[1] = 0b1100;
    execute_opcode(&mut state, 0x8122, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.registers[1], 0b1000);

    state.registers[1] = 0b1100;
    execute_opcode(&mut state, 0x8123, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.registers[1], 0b0110);

    execute_opcode(&mut state, 0x8120, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.registers[1], 0b1010);
}

#[test]
fn conditional_skips_add_two_more_to_pc() {
    let mut state = fresh_state();
    state.registers[1] = 0x42;
    state.registers[2] = 0x42;
    let start_pc = state.pc;

    execute_opcode(&mut state, 0x3142, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.pc, start_pc + 2);

    execute_opcode(&mut state, 0x4142, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.pc, start_pc + 2);

    execute_opcode(&mut state, 0x5120, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.pc, start_pc + 4);

    execute_opcode(&mut state, 0x9120, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.pc, start_pc + 4);

    state.registers[2] = 0x00;
    execute_opcode(&mut state, 0x9120, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.pc, start_pc + 6);

    execute_opcode(&mut state, 0x4100, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.pc, start_pc + 8);
}

#[test]
fn ex9e_skips_when_key_pressed() {
    let mut state = fresh_state();
    state.registers[1] = 0xA;
    state.key_inputs[0xA] = true;
    let start_pc = state.pc;

    execute_opcode(&mut state, 0xE19E, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.pc, start_pc + 2);
}

#[test]
fn exa1_skips_when_key_not_pressed() {
    let mut state = fresh_state();
    state.registers[1] = 0xA;
    let start_pc = state.pc;

    execute_opcode(&mut state, 0xE1A1, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.pc, start_pc + 2);

    state.key_inputs[0xA] = true;
    execute_opcode(&mut state, 0xE1A1, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.pc, start_pc + 2);
}

#[test]
fn key_skip_rejects_keys_off_the_keypad() {
    let mut state = fresh_state();
    state.registers[1] = 0x10;

    let result = execute_opcode(&mut state, 0xE19E, SOURCE_QUIRKS, &mut zero_rng());

    assert!(matches!(result, Err(Chip8Error::KeyOutOfRange(0x10))));
}

#[test]
fn call_then_return_lands_after_the_call() {
    let mut state = fresh_state();
    state.memory[0x200..0x202].copy_from_slice(&[0x23, 0x00]);
    state.memory[0x300..0x302].copy_from_slice(&[0x00, 0xEE]);

    execute_cycle(&mut state, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.pc, 0x300);
    assert_eq!(state.stack_top(), Some(0x202));

    execute_cycle(&mut state, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.pc, 0x202);
    assert_eq!(state.stack_pointer, 0);
}

#[test]
fn return_with_empty_stack_halts_with_underflow() {
    let mut state = fresh_state();
    state.memory[0x200..0x202].copy_from_slice(&[0x00, 0xEE]);

    let result = execute_cycle(&mut state, SOURCE_QUIRKS, &mut zero_rng());

    assert!(matches!(result, Err(Chip8Error::StackUnderflow)));
    assert_eq!(
        state.run_state,
        RunState::Halted(HaltReason::Fault {
            opcode: 0x00EE,
            address: 0x200
        })
    );
}

#[test]
fn seventeenth_nested_call_overflows_the_stack() {
    let mut state = fresh_state();
    // 0x200: CALL 0x200, calling itself forever.
    state.memory[0x200..0x202].copy_from_slice(&[0x22, 0x00]);

    for _ in 0..16 {
        execute_cycle(&mut state, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    }
    let result = execute_cycle(&mut state, SOURCE_QUIRKS, &mut zero_rng());

    assert!(matches!(result, Err(Chip8Error::StackOverflow)));
    assert_eq!(state.stack_pointer, 16);
}

#[test]
fn jumps_and_index_loads() {
    let mut state = fresh_state();

    execute_opcode(&mut state, 0x1ABC, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.pc, 0xABC);

    execute_opcode(&mut state, 0xA123, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.index, 0x123);

    state.registers[0] = 0x05;
    state.registers[1] = 0x10;
    execute_opcode(&mut state, 0xB123, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.pc, 0x128);
}

#[test]
fn fx1e_and_fx29_move_the_index() {
    let mut state = fresh_state();
    state.index = 0x300;
    state.registers[4] = 0x0A;

    execute_opcode(&mut state, 0xF41E, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.index, 0x30A);

    execute_opcode(&mut state, 0xF429, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.index, 0x050 + 0x0A * 5);
    assert_eq!(state.memory[state.index as usize], 0xF0);
}

#[test]
fn font_is_loaded_at_0x050() {
    let state = fresh_state();

    assert_eq!(state.memory[0x050..0x055], [0xF0, 0x90, 0x90, 0x90, 0xF0]);
    assert_eq!(state.memory[0x09B..0x0A0], [0xF0, 0x80, 0xF0, 0x80, 0x80]);
    assert_eq!(state.memory[0x0A0], 0);
}

#[test]
fn fx33_stores_bcd_digits() {
    for (value, digits) in [(123u8, [1u8, 2, 3]), (0, [0, 0, 0]), (255, [2, 5, 5])] {
        let mut state = fresh_state();
        state.registers[2] = value;
        state.index = 0x300;

        execute_opcode(&mut state, 0xF233, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

        assert_eq!(state.memory[0x300..0x303], digits);
    }
}

#[test]
fn fx55_dumps_inclusive_range_and_keeps_i() {
    let mut state = fresh_state();
    state.index = 0x300;
    state.registers[0..4].copy_from_slice(&[0x11, 0x22, 0x33, 0x44]);

    execute_opcode(&mut state, 0xF255, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.memory[0x300..0x304], [0x11, 0x22, 0x33, 0x00]);
    assert_eq!(state.index, 0x300);
}

#[test]
fn fx65_loads_inclusive_range_and_keeps_i() {
    let mut state = fresh_state();
    state.index = 0x300;
    state.memory[0x300..0x304].copy_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD]);

    execute_opcode(&mut state, 0xF265, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.registers[0..4], [0xAA, 0xBB, 0xCC, 0x00]);
    assert_eq!(state.index, 0x300);
}

#[test]
fn fx65_past_end_of_memory_is_an_error() {
    let mut state = fresh_state();
    state.index = 0xFFE;

    let result = execute_opcode(&mut state, 0xF265, SOURCE_QUIRKS, &mut zero_rng());

    assert!(matches!(result, Err(Chip8Error::MemoryOutOfRange(0x1000))));
}

#[test]
fn timer_registers_round_trip_through_vx() {
    let mut state = fresh_state();
    state.registers[3] = 42;

    execute_opcode(&mut state, 0xF315, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    execute_opcode(&mut state, 0xF318, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    execute_opcode(&mut state, 0xF407, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.delay_timer, 42);
    assert_eq!(state.sound_timer, 42);
    assert_eq!(state.registers[4], 42);
}

#[test]
fn cxnn_masks_the_injected_random_byte() {
    let mut state = fresh_state();

    execute_opcode(&mut state, 0xC00F, SOURCE_QUIRKS, &mut StepRng::new(0xAB, 0)).unwrap();
    assert_eq!(state.registers[0], 0x0B);

    execute_opcode(&mut state, 0xC0FF, SOURCE_QUIRKS, &mut StepRng::new(0xAB, 0)).unwrap();
    assert_eq!(state.registers[0], 0xAB);
}

#[test]
fn cxnn_is_not_constant() {
    let mut state = fresh_state();
    let mut rng = StdRng::seed_from_u64(7);
    let mut seen = Vec::new();

    for _ in 0..32 {
        execute_opcode(&mut state, 0xC0FF, SOURCE_QUIRKS, &mut rng).unwrap();
        seen.push(state.registers[0]);
    }

    seen.sort_unstable();
    seen.dedup();
    assert!(seen.len() > 1, "random instruction produced {seen:?}");
}

#[test]
fn dxyn_sets_collision_flag_on_lit_pixel() {
    let mut state = fresh_state();
    state.registers[0] = 2;
    state.registers[1] = 3;
    state.index = 0x300;
    state.memory[0x300] = 0x80;
    let loc = 2 + (3 * 64);
    state.screen_buffer[loc] = 1;

    execute_opcode(&mut state, 0xD011, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.registers[0xF], 1);
    assert_eq!(state.screen_buffer[loc], 0);
    assert!(state.should_draw);
}

#[test]
fn dxyn_twice_restores_the_framebuffer() {
    let mut state = fresh_state();
    state.registers[0] = 10;
    state.registers[1] = 5;
    state.registers[0xF] = 1;
    state.index = 0x300;
    state.memory[0x300..0x303].copy_from_slice(&[0xA5, 0xFF, 0x18]);
    state.screen_buffer[0] = 1;
    let before = state.screen_buffer;

    execute_opcode(&mut state, 0xD013, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.registers[0xF], 0);
    assert_ne!(state.screen_buffer, before);

    execute_opcode(&mut state, 0xD013, SOURCE_QUIRKS, &mut zero_rng()).unwrap();
    assert_eq!(state.registers[0xF], 1);
    assert_eq!(state.screen_buffer, before);
}

#[test]
fn dxyn_with_zero_height_draws_nothing() {
    let mut state = fresh_state();
    state.registers[0xF] = 1;

    execute_opcode(&mut state, 0xD010, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.registers[0xF], 0);
    assert!(state.screen_buffer.iter().all(|pixel| *pixel == 0));
}

#[test]
fn dxyn_wraps_pixels_in_conformant_profile() {
    let mut state = fresh_state();
    state.registers[0] = 63;
    state.registers[1] = 31;
    state.index = 0x300;
    state.memory[0x300..0x302].copy_from_slice(&[0xC0, 0x80]);

    execute_opcode(&mut state, 0xD012, CONFORMANT_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.screen_buffer[63 + (31 * 64)], 1);
    assert_eq!(state.screen_buffer[31 * 64], 1);
    assert_eq!(state.screen_buffer[63], 1);
}

#[test]
fn dxyn_spills_onto_next_row_in_source_profile() {
    let mut state = fresh_state();
    state.registers[0] = 63;
    state.registers[1] = 0;
    state.index = 0x300;
    state.memory[0x300] = 0xC0;

    execute_opcode(&mut state, 0xD011, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.screen_buffer[63], 1);
    assert_eq!(state.screen_buffer[64], 1);
}

#[test]
fn dxyn_below_the_screen_is_an_error_in_source_profile() {
    let mut state = fresh_state();
    state.registers[0] = 0;
    state.registers[1] = 31;
    state.index = 0x300;
    state.memory[0x300..0x302].copy_from_slice(&[0x80, 0x80]);

    let result = execute_opcode(&mut state, 0xD012, SOURCE_QUIRKS, &mut zero_rng());

    assert!(matches!(result, Err(Chip8Error::PixelOutOfRange(2048))));
}

#[test]
fn clear_only_raises_draw_flag_in_conformant_profile() {
    let mut state = fresh_state();
    state.screen_buffer[100] = 1;

    execute_opcode(&mut state, 0x00E0, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert!(state.screen_buffer.iter().all(|pixel| *pixel == 0));
    assert!(!state.should_draw);

    execute_opcode(&mut state, 0x00E0, CONFORMANT_QUIRKS, &mut zero_rng()).unwrap();
    assert!(state.should_draw);
}

#[test]
fn unknown_opcode_is_ignored_in_source_profile() {
    let mut state = fresh_state();
    state.memory[0x200..0x202].copy_from_slice(&[0x80, 0x08]);
    let registers = state.registers;

    execute_cycle(&mut state, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.pc, 0x202);
    assert_eq!(state.registers, registers);
    assert_eq!(state.run_state, RunState::Running);
}

#[test]
fn unknown_opcode_traps_in_conformant_profile() {
    let mut state = fresh_state();
    state.memory[0x200..0x202].copy_from_slice(&[0xF0, 0xFF]);

    let result = execute_cycle(&mut state, CONFORMANT_QUIRKS, &mut zero_rng());

    assert!(matches!(
        result,
        Err(Chip8Error::IllegalInstruction {
            opcode: 0xF0FF,
            address: 0x200
        })
    ));
    assert!(state.run_state.is_halted());
}

#[test]
fn machine_routine_calls_are_ignored_in_every_profile() {
    let mut state = fresh_state();
    state.memory[0x200..0x204].copy_from_slice(&[0x01, 0x23, 0x00, 0x00]);

    execute_cycle(&mut state, CONFORMANT_QUIRKS, &mut zero_rng()).unwrap();
    execute_cycle(&mut state, CONFORMANT_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.pc, 0x204);
    assert_eq!(state.run_state, RunState::Running);
}

#[test]
fn fx0a_suspends_without_touching_the_register() {
    let mut state = fresh_state();
    state.registers[3] = 0xEE;

    execute_opcode(&mut state, 0xF30A, SOURCE_QUIRKS, &mut zero_rng()).unwrap();

    assert_eq!(state.run_state, RunState::WaitingForKey { register: 3 });
    assert_eq!(state.registers[3], 0xEE);
}
