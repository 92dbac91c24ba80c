use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use emu::cpu::CpuError;
use emu::cpu::arm::mode::ArmModeOpcode;
use emu::cpu::psr::CpuState;
use emu::cpu::thumb::mode::ThumbModeOpcode;
use emu::gba::Gba;

use crate::config::Config;
use crate::logging::LogKind;

mod config;
mod logging;

#[derive(Parser, Debug)]
#[command(version, about = "ARM7TDMI interpreter for Game Boy Advance cartridges.", long_about = None)]
pub struct Args {
    #[arg(name = "ROM_PATH")]
    rom_path: PathBuf,

    /// TOML file with default settings.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    log: Option<LogKind>,

    /// Filter directive such as `info` or `emu=trace`.
    #[arg(long)]
    log_level: Option<String>,

    /// Stop after this many instructions.
    #[arg(long)]
    max_steps: Option<u64>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match args.config.as_deref().map(Config::load).transpose() {
        Ok(file) => file.unwrap_or_default().merge(&args),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let _guard = match logging::init(config.log, &config.log_level) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("invalid log level {:?}: {e}", config.log_level);
            return ExitCode::from(2);
        }
    };

    tracing::info!("satsuma v{}", env!("CARGO_PKG_VERSION"));

    let cartridge = match fs::read(&args.rom_path) {
        Ok(data) => data,
        Err(e) => {
            tracing::error!("cannot read {}: {e}", args.rom_path.display());
            return ExitCode::from(2);
        }
    };
    tracing::info!("loaded {} ({} bytes)", args.rom_path.display(), cartridge.len());

    let mut gba = Gba::new(&cartridge);
    let outcome = match config.max_steps {
        Some(steps) => gba.run_for(steps).map(|()| steps),
        None => Err(gba.run()),
    };

    match outcome {
        Ok(steps) => {
            tracing::info!("stopped after {steps} instructions");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            report(&gba, &e);
            ExitCode::from(1)
        }
    }
}

/// Layout of the faulting instruction and the register state, on stderr.
fn report(gba: &Gba, e: &CpuError) {
    let snapshot = gba.snapshot();

    let faulting = match *e {
        CpuError::UnimplementedInstruction { raw, .. } => Some((raw, snapshot.state)),
        CpuError::DecodeFailure { raw, state, .. } => Some((raw, state)),
        _ => None,
    };

    let layout = faulting.and_then(|(raw, state)| match state {
        CpuState::Arm => ArmModeOpcode::try_from(raw).ok().map(|op| op.to_string()),
        CpuState::Thumb => u16::try_from(raw)
            .ok()
            .and_then(|raw| ThumbModeOpcode::try_from(raw).ok())
            .map(|op| op.to_string()),
    });

    if let Some(layout) = layout {
        eprintln!("{layout}");
    }

    match toml::to_string(&snapshot) {
        Ok(dump) => eprintln!("{dump}"),
        Err(e) => tracing::error!("cannot serialize the CPU state: {e}"),
    }
}
