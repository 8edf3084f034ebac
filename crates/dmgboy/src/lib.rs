//! Headless runner for the dmgboy core.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use dmgboy_core::config::EmulatorConfig;
use dmgboy_core::machine::{CartridgeHeader, GameBoy, GameBoyBus};
use dmgboy_core::{SCREEN_HEIGHT, SCREEN_WIDTH};

pub const USAGE: &str = "\
usage:
  dmgboy info <rom>
  dmgboy run <rom> [--boot <file>] [--limit <n>] [--trace] [--logo]";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the cartridge header.
    Info { rom: PathBuf },
    /// Run to completion and dump the registers.
    Run(RunOptions),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub rom: PathBuf,
    pub boot: Option<PathBuf>,
    pub limit: Option<u64>,
    pub trace: bool,
    /// Print the background as text afterwards.
    pub logo: bool,
}

/// Parse the arguments following the program name.
pub fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        bail!("missing command\n{USAGE}");
    };

    match command.as_str() {
        "info" => {
            let rom = args.next().context("missing ROM path")?;
            if let Some(extra) = args.next() {
                bail!("unexpected argument '{extra}'");
            }
            Ok(Command::Info { rom: rom.into() })
        }
        "run" => {
            let mut options = RunOptions::default();
            let mut rom = None;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--boot" => {
                        let path = args.next().context("--boot needs a file")?;
                        options.boot = Some(path.into());
                    }
                    "--limit" => {
                        let value = args.next().context("--limit needs a number")?;
                        let limit = value
                            .parse()
                            .with_context(|| format!("invalid step limit '{value}'"))?;
                        options.limit = Some(limit);
                    }
                    "--trace" => options.trace = true,
                    "--logo" => options.logo = true,
                    flag if flag.starts_with("--") => bail!("unknown option '{flag}'"),
                    path if rom.is_none() => rom = Some(PathBuf::from(path)),
                    other => bail!("unexpected argument '{other}'"),
                }
            }
            options.rom = rom.context("missing ROM path")?;
            Ok(Command::Run(options))
        }
        other => bail!("unknown command '{other}'\n{USAGE}"),
    }
}

pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Info { rom } => {
            let data = read_file(&rom)?;
            let header = CartridgeHeader::parse(&data)
                .with_context(|| format!("failed to parse header of '{}'", rom.display()))?;
            print!("{}", describe_header(&header));
            Ok(())
        }
        Command::Run(options) => run_rom(&options),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))
}

pub fn describe_header(header: &CartridgeHeader) -> String {
    format!(
        "title:    {}\ntype:     0x{:02X} ({:?})\nROM:      {} KiB\nRAM:      {} KiB\nchecksum: 0x{:02X} ({})\n",
        header.title(),
        header.cartridge_type(),
        header.mbc(),
        header.rom_size() / 1024,
        header.ram_size() / 1024,
        header.header_checksum(),
        if header.checksum_ok() { "ok" } else { "mismatch" },
    )
}

fn run_rom(options: &RunOptions) -> Result<()> {
    let rom = read_file(&options.rom)?;
    let boot_rom = options.boot.as_deref().map(read_file).transpose()?;

    let config = EmulatorConfig {
        boot_rom,
        step_limit: options.limit,
        trace: options.trace,
    };
    let mut gb = GameBoy::from_rom(rom, config)?;
    log::info!("Running ROM: '{}'", options.rom.display());

    let result = if options.logo {
        gb.run_boot()
    } else {
        gb.run()
    };

    let mut stdout = std::io::stdout().lock();
    gb.cpu.dump(&mut stdout)?;
    if options.logo {
        write!(stdout, "{}", render_background(&gb.bus))?;
    }

    result.with_context(|| format!("emulation stopped at pc=0x{:04X}", gb.cpu.regs.pc))
}

/// The visible background as text, one character per pixel, with blank
/// rows above and below the picture dropped.
pub fn render_background(bus: &GameBoyBus) -> String {
    const SHADES: [char; 4] = [' ', '.', 'o', '#'];
    let tiles_per_row = (SCREEN_WIDTH / 8) as u8;

    let lines: Vec<String> = (0..SCREEN_HEIGHT as u8)
        .map(|line| {
            (0..tiles_per_row)
                .flat_map(|tile_x| bus.background_tile_row(line, tile_x).pixels())
                .map(|pixel| SHADES[pixel as usize])
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect();

    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last]
            .iter()
            .map(|l| format!("{l}\n"))
            .collect(),
        _ => String::new(),
    }
}
