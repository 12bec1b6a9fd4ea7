use std::path::PathBuf;

use clap::Parser;
use log::info;

use chip8_interpreter_rs::{
    load_quirks_profile, load_quirks_profile_from_env, run_emulator_app, run_emulator_headless,
    Chip8Error, InterpreterConfig,
};

#[derive(Debug, Parser)]
#[command(name = "chip8-interpreter-rs")]
#[command(about = "Run a CHIP-8 ROM")]
struct Args {
    #[arg(long)]
    rom: PathBuf,

    /// Falls back to CHIP8_QUIRKS, then "conformant".
    #[arg(long, value_parser = ["source", "conformant"])]
    quirks: Option<String>,

    #[arg(long, default_value_t = 500)]
    hz: u32,

    /// Seed for the random instruction; omit for OS entropy.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 16)]
    scale: usize,

    #[arg(long, default_value_t = 60)]
    fps: usize,

    #[arg(long, default_value_t = 2000)]
    max_cycles: usize,

    #[arg(long)]
    headless: bool,
}

fn main() -> Result<(), Chip8Error> {
    env_logger::init();
    let args = Args::parse();

    let (profile, quirks) = match args.quirks {
        Some(profile) => {
            let quirks = load_quirks_profile(&profile)
                .map_err(|_| Chip8Error::InvalidArgument("quirks must be source or conformant"))?;
            (profile, quirks)
        }
        None => load_quirks_profile_from_env().map_err(|_| {
            Chip8Error::InvalidArgument("CHIP8_QUIRKS must be source or conformant")
        })?,
    };
    info!("using {profile} quirks at {} Hz", args.hz);

    let config = InterpreterConfig::new(&args.rom)
        .with_cpu_hz(args.hz)
        .with_quirks(quirks)
        .with_seed(args.seed);
    config.validate()?;

    if args.headless {
        let state = run_emulator_headless(&config, args.max_cycles)?;
        println!(
            "headless finished: state={:?} pc=0x{:03x}",
            state.run_state, state.pc
        );
        return Ok(());
    }

    let final_state = run_emulator_app(&config, args.scale, args.fps)?;
    println!("stopped: {final_state:?}");
    Ok(())
}
