use guibender::settings::Backend;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Find,
    FindAll,
    Sample,
}

#[derive(Debug, PartialEq)]
pub struct Args {
    pub screen: PathBuf,
    pub pattern: String,
    pub mode: Mode,
    pub similarity: Option<f64>,
    pub gray: bool,
    pub backend: Option<Backend>,
    pub timeout: Option<Duration>,
    pub click: bool,
    pub config: Option<PathBuf>,
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, PartialEq)]
pub enum Parsed {
    Run(Args),
    Help,
    Version,
}

impl Args {
    /// Parse the process arguments, printing help or errors as needed.
    /// `None` means there is nothing left to do.
    pub fn parse() -> Option<Self> {
        match Self::parse_from(env::args().skip(1)) {
            Ok(Parsed::Run(args)) => Some(args),
            Ok(Parsed::Help) => {
                print_help();
                None
            }
            Ok(Parsed::Version) => {
                println!("guibender v{}", env!("CARGO_PKG_VERSION"));
                None
            }
            Err(message) => {
                eprintln!("❌ {}", message);
                print_help();
                None
            }
        }
    }

    pub fn parse_from<I>(args: I) -> Result<Parsed, String>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut screen: Option<PathBuf> = None;
        let mut pattern: Option<String> = None;
        let mut mode = Mode::Find;
        let mut similarity: Option<f64> = None;
        let mut gray = false;
        let mut backend: Option<Backend> = None;
        let mut timeout: Option<Duration> = None;
        let mut click = false;
        let mut config: Option<PathBuf> = None;
        let mut paths: Vec<PathBuf> = Vec::new();

        for arg in args {
            let arg = arg.as_ref();
            if arg == "--help" || arg == "-h" {
                return Ok(Parsed::Help);
            } else if arg == "--version" || arg == "-v" {
                return Ok(Parsed::Version);
            } else if arg == "--all" {
                mode = Mode::FindAll;
            } else if arg == "--sample" {
                mode = Mode::Sample;
            } else if arg == "--gray" {
                gray = true;
            } else if arg == "--click" {
                click = true;
            } else if let Some(val) = arg.strip_prefix("--screen=") {
                screen = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--find=") {
                pattern = Some(val.to_string());
            } else if let Some(val) = arg.strip_prefix("--similarity=") {
                match val.parse::<f64>() {
                    Ok(v) if (0.0..=1.0).contains(&v) => similarity = Some(v),
                    _ => return Err(format!("Invalid similarity value: {}", val)),
                }
            } else if let Some(val) = arg.strip_prefix("--backend=") {
                backend = Some(val.parse::<Backend>().map_err(|e| e.to_string())?);
            } else if let Some(val) = arg.strip_prefix("--timeout=") {
                match val.parse::<f64>() {
                    Ok(secs) if secs >= 0.0 && secs.is_finite() => {
                        timeout = Some(Duration::from_secs_f64(secs))
                    }
                    _ => return Err(format!("Invalid timeout value: {}", val)),
                }
            } else if let Some(val) = arg.strip_prefix("--config=") {
                config = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--path=") {
                paths.push(PathBuf::from(val));
            } else {
                return Err(format!("Unknown argument: {}", arg));
            }
        }

        let screen = screen.ok_or("Missing --screen=<png>")?;
        let pattern = pattern.ok_or("Missing --find=<image>")?;

        Ok(Parsed::Run(Args {
            screen,
            pattern,
            mode,
            similarity,
            gray,
            backend,
            timeout,
            click,
            config,
            paths,
        }))
    }
}

fn print_help() {
    println!("🔎 guibender - find images on a screenshot");
    println!();
    println!("USAGE:");
    println!("    guibender --screen=<png> --find=<image> [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --screen=FILE       Screenshot to search in");
    println!("    --find=IMAGE        Pattern file, or name looked up in the image paths");
    println!("    --all               Report every match instead of the best one");
    println!("    --sample            Only print the best similarity, no threshold");
    println!("    --similarity=F      Acceptance threshold in [0, 1] (default: 0.8)");
    println!("    --gray              Ignore colors while matching");
    println!("    --backend=NAME      Matching backend: template or native");
    println!("    --timeout=S         Search timeout in seconds (default: 0)");
    println!("    --click             Click the best match and print the recorded input");
    println!("    --config=FILE       JSON configuration with matching, timing and image_paths");
    println!("    --path=DIR          Additional image search path (repeatable)");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    guibender --screen=desktop.png --find=ok_button.png");
    println!("    guibender --screen=desktop.png --find=shape_red_box --path=images --all --gray");
    println!("    RUST_LOG=debug guibender --screen=desktop.png --find=icon.png --backend=native");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Args {
        match Args::parse_from(args) {
            Ok(Parsed::Run(args)) => args,
            other => panic!("unexpected parse result {other:?}"),
        }
    }

    #[test]
    fn test_minimal_arguments() {
        let args = run(&["--screen=shot.png", "--find=button.png"]);
        assert_eq!(args.screen, PathBuf::from("shot.png"));
        assert_eq!(args.pattern, "button.png");
        assert_eq!(args.mode, Mode::Find);
        assert!(args.similarity.is_none());
        assert!(!args.click);
    }

    #[test]
    fn test_all_flags() {
        let args = run(&[
            "--screen=shot.png",
            "--find=shape_red_box",
            "--all",
            "--gray",
            "--similarity=0.5",
            "--backend=native",
            "--timeout=1.5",
            "--path=images",
            "--path=more",
        ]);
        assert_eq!(args.mode, Mode::FindAll);
        assert!(args.gray);
        assert_eq!(args.similarity, Some(0.5));
        assert_eq!(args.backend, Some(Backend::Native));
        assert_eq!(args.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(args.paths.len(), 2);
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(Args::parse_from(["--screen=x", "-h"]), Ok(Parsed::Help));
        assert_eq!(Args::parse_from(["--version"]), Ok(Parsed::Version));
    }

    #[test]
    fn test_rejected_arguments() {
        assert!(Args::parse_from(["--find=a"]).is_err());
        assert!(Args::parse_from(["--screen=a", "--find=b", "--similarity=2"]).is_err());
        assert!(Args::parse_from(["--screen=a", "--find=b", "--timeout=-1"]).is_err());
        assert!(Args::parse_from(["--screen=a", "--find=b", "--bogus"]).is_err());

        let err = Args::parse_from(["--screen=a", "--find=b", "--backend=feature"]).unwrap_err();
        assert!(err.contains("feature"));
    }
}
