//! Command-line entry point.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Render a page's highlight overlay from a JSON scene to PNG.
#[derive(Debug, Parser)]
#[command(name = "pagemark", version, about)]
struct Cli {
    /// Scene description (JSON).
    scene: PathBuf,
    /// Output PNG; defaults to the scene's `output` field, then the scene
    /// path with a `.png` extension.
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match pagemark_demo::run(&cli.scene, cli.output.as_deref()) {
        Ok(path) => {
            log::info!("Wrote {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("pagemark: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from(["pagemark", "scene.json", "out.png"]).unwrap();
        assert_eq!(cli.scene, PathBuf::from("scene.json"));
        assert_eq!(cli.output, Some(PathBuf::from("out.png")));

        let cli = Cli::try_parse_from(["pagemark", "scene.json"]).unwrap();
        assert!(cli.output.is_none());

        assert!(Cli::try_parse_from(["pagemark"]).is_err());
    }
}
