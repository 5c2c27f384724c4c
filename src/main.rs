use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use log::{info, trace, LevelFilter};
use minifb::{Key, Scale, Window, WindowOptions};

use chip8vm::interpreter::Interpreter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The path of the rom to load
    #[arg(short, long, value_name = "FILE")]
    rom_path: PathBuf,

    /// How many instructions to execute per displayed frame
    #[arg(short, long, default_value_t = 10)]
    cycles_per_frame: usize,

    /// Seed for the random number instruction, taken from the clock if absent
    #[arg(long)]
    seed: Option<u64>,

    /// Run this many frames without a window and print the screen afterwards
    #[arg(long, value_name = "FRAMES")]
    headless: Option<usize>,

    /// Log every executed instruction
    #[arg(short, long)]
    verbose: bool,
}

fn keymap() -> HashMap<Key, u8> {
    HashMap::from([
        (Key::Key1, 0x1),
        (Key::Key2, 0x2),
        (Key::Key3, 0x3),
        (Key::Key4, 0xC),
        (Key::Q, 0x4),
        (Key::W, 0x5),
        (Key::E, 0x6),
        (Key::R, 0xD),
        (Key::A, 0x7),
        (Key::S, 0x8),
        (Key::D, 0x9),
        (Key::F, 0xE),
        (Key::Y, 0xA),
        (Key::X, 0x0),
        (Key::C, 0xB),
        (Key::V, 0xF),
    ])
}

fn run_frame(interpreter: &mut Interpreter, cycles: usize) -> anyhow::Result<()> {
    for _ in 0..cycles {
        interpreter.step().context("Execution stopped")?;
    }

    Ok(())
}

fn run_headless(interpreter: &mut Interpreter, frames: usize, cycles: usize) -> anyhow::Result<()> {
    for _ in 0..frames {
        run_frame(interpreter, cycles)?;
    }

    print!("{}", interpreter.display());

    Ok(())
}

fn run_window(interpreter: &mut Interpreter, cycles: usize) -> anyhow::Result<()> {
    let keymap = keymap();

    let width = interpreter.display().width();
    let height = interpreter.display().height();
    let mut buffer: Vec<u32> = vec![0; width * height];

    let mut opts = WindowOptions::default();
    opts.scale = Scale::FitScreen;

    let mut window = Window::new("Chip-8 - ESC to exit", width, height, opts).context("Unable to open window")?;

    // Limit to max ~60 fps update rate
    window.set_target_fps(60);
    window.topmost(true);

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let keyboard = interpreter.keyboard_mut();
        keyboard.clear();

        for key in window.get_keys().iter() {
            if let Some(keycode) = keymap.get(key) {
                keyboard.press_key(*keycode);
            }
        }
        trace!("Keys: [{}]", interpreter.keyboard());

        run_frame(interpreter, cycles)?;

        for (i, p) in buffer.iter_mut().zip(interpreter.display().pixels()) {
            *i = if *p { 0xFFFFFF } else { 0 };
        }

        window.update_with_buffer(&buffer, width, height)?;
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { LevelFilter::Trace } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    if cli.cycles_per_frame == 0 {
        bail!("--cycles-per-frame must be at least 1");
    }

    let mut interpreter = match cli.seed {
        Some(seed) => Interpreter::with_seed(seed),
        None => Interpreter::new(),
    };

    interpreter
        .load_file(&cli.rom_path)
        .with_context(|| format!("Unable to load {}", cli.rom_path.display()))?;
    info!("Loaded {}", cli.rom_path.display());

    match cli.headless {
        Some(frames) => run_headless(&mut interpreter, frames, cli.cycles_per_frame),
        None => run_window(&mut interpreter, cli.cycles_per_frame),
    }
}
