use angle_node::{logging, persist, ConfigDocument, ConfigLoader, DeviceSelector, Overrides};
use anyhow::{bail, Context, Result};
use std::env::args;
use tracing::Level;

const USAGE: &str = "usage: angle_node [show [DEVICE] | devices | check FILE [DEVICE] | export FILE]";

fn main() -> Result<()> {
    // a missing .env is fine, overrides are optional
    let env_file = dotenvy::dotenv().ok();
    let overrides = Overrides::from_env()?;

    let args: Vec<String> = args().skip(1).collect();
    let _guards = logging::init(".", log_level(&overrides, &args))?;

    if let Some(path) = env_file {
        tracing::debug!("Read overrides from {}", path.display());
    }

    let mut args = args.into_iter();
    let command = args.next().unwrap_or_else(|| String::from("show"));

    match command.as_str() {
        "show" => {
            let loader = loader(&overrides)?;
            let selector = selector(args.next(), &overrides)?;
            let config = loader.load(&selector)?;
            println!("{}", persist::node_to_json(&config)?);
        }
        "devices" => {
            let loader = loader(&overrides)?;
            for profile in loader.document().devices.iter() {
                let channels: Vec<_> = profile
                    .channels
                    .iter()
                    .map(|(role, name)| format!("{role}={name}"))
                    .collect();
                println!(
                    "{} {} {} {}",
                    profile.index,
                    profile.device_id,
                    channels.join(","),
                    profile.label.as_deref().unwrap_or("")
                );
            }
        }
        "check" => {
            let Some(path) = args.next() else {
                bail!("check needs a file - {USAGE}");
            };
            let document = persist::load_document(&path)?;
            let loader = ConfigLoader::new(document).with_overrides(overrides.clone());

            let selectors: Vec<DeviceSelector> = match args.next() {
                Some(arg) => vec![arg.parse()?],
                None => loader
                    .document()
                    .devices
                    .iter()
                    .map(|p| DeviceSelector::Index(p.index))
                    .collect(),
            };

            let mut failures = 0;
            for selector in &selectors {
                match loader.load(selector) {
                    Ok(config) => println!("device {}: ok", config.device.index),
                    Err(e) => {
                        println!("device {selector}: {e}");
                        failures += 1;
                    }
                }
            }
            if failures > 0 {
                bail!("{failures} of {} device(s) failed validation", selectors.len());
            }
        }
        "export" => {
            let Some(path) = args.next() else {
                bail!("export needs a file - {USAGE}");
            };
            let variant = overrides.variant.unwrap_or_default();
            persist::save_document(&path, &variant.document()?)?;
            tracing::info!("Exported the {variant} document to {path}");
        }
        _ => bail!("Unrecognised command {command:?} - {USAGE}"),
    }

    Ok(())
}

/// `ANGLE_NODE_DEBUG_LEVELS` wins, then the debug flags of the document the
/// command is about to read. Load errors are left for the command to report.
fn log_level(overrides: &Overrides, args: &[String]) -> Level {
    if overrides.debug.is_some() {
        return logging::level_for(overrides.debug.as_ref(), None);
    }

    let document: Option<ConfigDocument> = match (args.first().map(String::as_str), args.get(1)) {
        (Some("check"), Some(path)) => persist::load_document(path).ok(),
        (Some("export"), _) => overrides.variant.unwrap_or_default().document().ok(),
        _ => match &overrides.document_path {
            Some(path) => persist::load_document(path).ok(),
            None => overrides.variant.unwrap_or_default().document().ok(),
        },
    };

    logging::level_for(None, document.as_ref())
}

fn loader(overrides: &Overrides) -> Result<ConfigLoader> {
    let loader = match &overrides.document_path {
        Some(path) => ConfigLoader::new(persist::load_document(path)?),
        None => {
            let variant = overrides.variant.unwrap_or_default();
            ConfigLoader::for_variant(variant)
                .with_context(|| format!("Compiled-in {variant} document is invalid"))?
        }
    };
    Ok(loader.with_overrides(overrides.clone()))
}

/// The command line wins over `ANGLE_NODE_DEVICE`, which wins over device 1
fn selector(arg: Option<String>, overrides: &Overrides) -> Result<DeviceSelector> {
    if let Some(arg) = arg {
        return Ok(arg.parse()?);
    }
    if let Some(device) = &overrides.device {
        return Ok(device.clone());
    }

    tracing::info!("No device selected, using device 1");
    Ok("1".parse()?)
}
