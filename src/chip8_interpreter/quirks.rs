use std::env;

/// Behaviour switches for the points where CHIP-8 interpreters disagree.
/// `SOURCE_QUIRKS` is the literal legacy behaviour, `CONFORMANT_QUIRKS` the
/// common modern reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chip8Quirks {
    /// Sprite cells wrap modulo 64/32. Without it, cells are addressed
    /// linearly and anything past the framebuffer is `PixelOutOfRange`.
    pub draw_wrap: bool,
    /// Unmapped opcodes outside family 0 raise `IllegalInstruction`.
    pub trap_illegal_opcodes: bool,
    /// `8xy4` writes VF = 0 when there is no carry.
    pub add_clears_carry: bool,
    /// `00E0` raises the draw flag.
    pub clear_sets_draw_flag: bool,
    /// Delay and sound timers stop while `Fx0A` waits for a key.
    pub key_wait_freezes_timers: bool,
}

pub const SOURCE_QUIRKS: Chip8Quirks = Chip8Quirks {
    draw_wrap: false,
    trap_illegal_opcodes: false,
    add_clears_carry: false,
    clear_sets_draw_flag: false,
    key_wait_freezes_timers: true,
};

pub const CONFORMANT_QUIRKS: Chip8Quirks = Chip8Quirks {
    draw_wrap: true,
    trap_illegal_opcodes: true,
    add_clears_carry: true,
    clear_sets_draw_flag: true,
    key_wait_freezes_timers: false,
};

pub fn load_quirks_profile(profile: &str) -> Result<Chip8Quirks, String> {
    match profile.trim().to_ascii_lowercase().as_str() {
        "source" => Ok(SOURCE_QUIRKS),
        "conformant" => Ok(CONFORMANT_QUIRKS),
        other => Err(format!(
            "invalid CHIP8_QUIRKS '{other}', expected one of: conformant, source"
        )),
    }
}

pub fn load_quirks_profile_from_env() -> Result<(String, Chip8Quirks), String> {
    let profile = env::var("CHIP8_QUIRKS").unwrap_or_else(|_| "conformant".to_owned());
    let normalized = profile.trim().to_ascii_lowercase();
    let quirks = load_quirks_profile(&normalized)?;
    Ok((normalized, quirks))
}
