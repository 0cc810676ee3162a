mod args;

use args::{Args, Mode};
use guibender::desktop::ScreenshotDesktop;
use guibender::error::GuiResult;
use guibender::pattern::{Image, ImageLibrary};
use guibender::region::{Context, Region};
use guibender::settings::{Config, Timing};
use guibender::template_matching::TemplateMatcher;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn main() {
    env_logger::init();

    let Some(args) = Args::parse() else {
        return;
    };

    if let Err(e) = run(&args) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> GuiResult<()> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let timing = if args.config.is_some() {
        config.timing.clone()
    } else {
        Timing::immediate()
    };

    let mut library = ImageLibrary::new();
    for path in config.image_paths.iter().chain(&args.paths) {
        library.add_path(path);
    }

    let mut settings = config.matching.clone();
    if let Some(similarity) = args.similarity {
        settings.set_similarity(similarity)?;
    }
    if args.gray {
        settings.set_color_sensitive(false);
    }
    if let Some(backend) = args.backend {
        settings.set_backend(backend)?;
    }

    let mut image = if Path::new(&args.pattern).is_file() {
        Image::load(&args.pattern)?
    } else {
        Image::new(args.pattern.as_str())
    };
    *image.settings_mut() = settings;

    let desktop = Arc::new(ScreenshotDesktop::from_file(&args.screen)?);
    let matcher = Arc::new(TemplateMatcher::with_library(library));
    let ctx = Context::new(desktop.clone(), matcher).with_timing(timing);
    let screen = Region::full_screen(&ctx);
    println!(
        "🖥️  Screen {}x{} from {}",
        screen.width(),
        screen.height(),
        args.screen.display()
    );

    let timeout = args.timeout.unwrap_or(Duration::ZERO);
    match args.mode {
        Mode::Sample => {
            let similarity = screen.sample(&image)?;
            println!("📊 '{}' best similarity {:.4}", image, similarity);
        }
        Mode::FindAll => {
            let found = screen.find_all(&image, timeout, true)?;
            println!("🔎 {} match(es) of '{}'", found.len(), image);
            for (i, m) in found.iter().enumerate() {
                println!(
                    "   #{} at ({}, {}) {}x{} similarity {:.4} target {}",
                    i + 1,
                    m.x(),
                    m.y(),
                    m.width(),
                    m.height(),
                    m.similarity(),
                    m.target()
                );
            }
        }
        Mode::Find => {
            let found = screen.find(&image, timeout)?;
            println!(
                "✅ '{}' at ({}, {}) {}x{} similarity {:.4} target {}",
                image,
                found.x(),
                found.y(),
                found.width(),
                found.height(),
                found.similarity(),
                found.target()
            );
        }
    }

    if args.click {
        if let Some(best) = screen.last_match() {
            screen.click(&best, &[])?;
        }
        for event in desktop.take_events() {
            println!("🖱️  {:?}", event);
        }
    }

    Ok(())
}
