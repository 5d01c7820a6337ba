use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "heartbeat.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub config_path: PathBuf,
    pub check_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Args),
    Version,
    Help,
}

pub const USAGE: &str = "Usage: heartbeat_agent [OPTIONS]

Options:
  -c, --config <PATH>  Configuration file path (default: heartbeat.yaml)
      --check          Validate the configuration and exit
  -V, --version        Print version
  -h, --help           Print help";

pub fn parse_from<I, S>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut check_only = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return Ok(Command::Version),
            "--help" | "-h" => return Ok(Command::Help),
            "--check" => check_only = true,
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| "--config requires a path argument".to_string())?;
                config_path = PathBuf::from(path);
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    Ok(Command::Run(Args {
        config_path,
        check_only,
    }))
}

pub fn parse() -> Args {
    match parse_from(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Version) => {
            println!("heartbeat_agent {}", env!("CARGO_PKG_VERSION"));
            std::process::exit(0);
        }
        Ok(Command::Help) => {
            println!("{USAGE}");
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
