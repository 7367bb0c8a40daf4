//! # zcat CLI
//!
//! Usage:
//!   zcat job.json -o label.pdf
//!   echo '{ ... }' | zcat --download-dir ~/Downloads
//!   zcat job.json --user-agent "$UA" --settings prefs.json
//!   zcat --example > job.json
//!
//! Without `-o` the PDF goes through the delivery strategy picked for the
//! user agent. `--language` and `--style` override the stored preferences
//! and are written back when `--settings` is given.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use zcat::delivery::{select_strategy, DeliveryOptions, DeliveryOutcome, Platform};
use zcat::settings::{JsonFileStore, Language, Settings};
use zcat::style::DescriptionStyle;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_job_json());
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("✗ {}", e);
        process::exit(1);
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn run(args: &[String]) -> Result<(), zcat::error::ZcatError> {
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1])?
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    };

    let mut store = flag_value(args, "--settings").map(JsonFileStore::open);
    let mut settings = store
        .as_ref()
        .map(|s| Settings::load(s))
        .unwrap_or_default();

    let mut changed = false;
    if let Some(code) = flag_value(args, "--language") {
        match Language::from_code(code) {
            Some(language) => {
                settings.language = language;
                changed = true;
            }
            None => log::warn!("Unknown language '{}', keeping {}", code, settings.language.code()),
        }
    }
    if let Some(id) = flag_value(args, "--style") {
        match DescriptionStyle::from_id(id) {
            Some(style) => {
                settings.description_style = style;
                changed = true;
            }
            None => log::warn!("Unknown style '{}', keeping {}", id, settings.description_style.id()),
        }
    }
    if changed {
        if let Some(store) = store.as_mut() {
            settings.save(store);
        }
    }

    let composed = zcat::render_json(&input, &settings)?;

    if let Some(output_path) = flag_value(args, "-o") {
        fs::write(output_path, &composed.bytes)?;
        eprintln!(
            "✓ Written {} bytes ({} page(s)) to {}",
            composed.bytes.len(),
            composed.page_count,
            output_path
        );
        return Ok(());
    }

    let platform = Platform::from_user_agent(flag_value(args, "--user-agent").unwrap_or(""));
    let download_dir = flag_value(args, "--download-dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut strategy = select_strategy(platform, DeliveryOptions::new(download_dir));
    log::debug!("Delivering through {}", strategy.name());

    let filename = composed.filename.clone();
    let mut outcome = strategy.deliver(composed.into_document(), &filename)?;

    // Running the command is the user's gesture
    if let DeliveryOutcome::AwaitingGesture { .. } = outcome {
        outcome = strategy.activate()?;
    }

    match outcome {
        DeliveryOutcome::Saved { path } => eprintln!("✓ Saved {}", path.display()),
        DeliveryOutcome::Shared => eprintln!("✓ Shared {}", filename),
        DeliveryOutcome::ShareCancelled => eprintln!("Share cancelled"),
        DeliveryOutcome::AwaitingGesture { .. } => {}
    }
    Ok(())
}

fn example_job_json() -> &'static str {
    r##"{
  "form": {
    "title": "«Вечер на Неве»",
    "author": "Анна Петрова",
    "width": "40",
    "height": "60.5",
    "technique": "Масло",
    "material": "холст",
    "year": "2024"
  },
  "imageFileName": "neva-evening.jpg",
  "description": "Тёплый свет заката ложится на воду, и город медленно растворяется в сумерках. Художница пишет широким мазком, оставляя фактуру холста открытой.\n\nРабота продолжает серию петербургских пейзажей 2020-х годов.",
  "descriptionStyle": "poetic",
  "language": "ru"
}
"##
}
