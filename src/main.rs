mod config;
mod device;
mod dump;
mod error;
mod geometry;
mod input;
mod mode;
mod report;
mod sidekey;
mod slots;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use evdevil::uinput::UinputDevice;

use config::{Cli, Command, Config};
use device::Touchscreen;
use error::Error;
use geometry::TrackpadRegion;
use input::{AbsoluteTranslator, RelativeTranslator};
use mode::Mode;
use sidekey::Sidekey;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match &cli.command {
        Some(Command::Dump { device, by_name }) => dump::run_dump(device, *by_name),
        Some(Command::List) => {
            list_devices();
            Ok(())
        }
        None => run(&cli),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn list_devices() {
    let devices = device::discover_touchscreens();
    if devices.is_empty() {
        eprintln!("No touchscreen devices found (are you in the 'input' group?)");
    }
    for d in devices {
        println!("{}\t{}", d.path.display(), d.name);
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let config = Config::load(cli)?;

    log::info!(
        "trackscreen starting (device={}, region={}, mode={}, sidekey={})",
        config.device,
        config.percentages,
        config.mode,
        config
            .sidekey
            .map(|k| k.to_string())
            .unwrap_or_else(|| "off".into())
    );

    let touchscreen = if config.by_name {
        Touchscreen::find_by_name(&config.device)?
    } else {
        Touchscreen::open(Path::new(&config.device))?
    };
    if config.grab {
        touchscreen.grab();
    }

    let screen = touchscreen.geometry()?;
    let region = TrackpadRegion::resolve(&screen, config.percentages)?;
    log::info!("Trackpad {}", region);

    let sidekey = config
        .sidekey()
        .map(|key| device::create_sidekey(key).map(|dev| Sidekey::new(dev, key)))
        .transpose()?;

    let mut reader = touchscreen.reader()?;

    match config.mode {
        Mode::Absolute => {
            let trackpad = device::create_trackpad(&screen, &region)?;
            let mut translator: AbsoluteTranslator<UinputDevice> =
                AbsoluteTranslator::new(region, config.queue_capacity, trackpad, sidekey);
            input::run_event_loop(&mut reader, &mut translator)?;
            log::info!(
                "Stopped: {} event(s) dropped on full reports, {} write(s) dropped",
                translator.dropped_events(),
                translator.stats().dropped_reports
            );
        }
        Mode::Relative => {
            let pointer = device::create_pointer()?;
            let mut translator: RelativeTranslator<UinputDevice> =
                RelativeTranslator::new(region, config.relative_settings(), pointer, sidekey);
            input::run_event_loop(&mut reader, &mut translator)?;
            log::info!(
                "Stopped: {} write(s) dropped",
                translator.stats().dropped_reports
            );
        }
    }

    Ok(())
}
