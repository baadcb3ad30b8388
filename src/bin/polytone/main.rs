//! polytone - play the engine through the default output device
//!
//! Run with: cargo run -- [config.json]
//!
//! Plays from the first MIDI input port, or a short demo progression when
//! no port is available. Press Enter to stop.

mod audio;
mod midi;

use std::{env, fs, io};

use color_eyre::eyre::{Result, WrapErr};
use log::info;
use polytone::{Engine, EngineConfig, Pipeline};

fn load_config(path: &str) -> Result<EngineConfig> {
    let text = fs::read_to_string(path).wrap_err_with(|| format!("failed to read {path}"))?;
    serde_json::from_str(&text).wrap_err_with(|| format!("failed to parse {path}"))
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let device = audio::OutputDevice::open_default()?;

    let mut config = match env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => EngineConfig::default(),
    };
    config.sample_rate = device.sample_rate();
    info!(
        "{} Hz, {} frames per block, {} voices, {} ports",
        config.sample_rate, config.block_len, config.voices, config.ports
    );

    let (engine, sender) = Engine::new(config).wrap_err("failed to build engine")?;
    let input = midi::connect_first(sender)?;

    let (pipeline, reader) = Pipeline::start(engine)?;
    let stream = device.play(reader)?;

    println!("Playing... press Enter to stop");
    io::stdin().read_line(&mut String::new())?;

    drop(stream);
    drop(input);
    let underruns = pipeline.underruns();
    pipeline.stop().wrap_err("failed to stop render thread")?;
    info!("stopped ({underruns} underruns)");
    Ok(())
}
