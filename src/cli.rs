use std::path::PathBuf;

use thiserror::Error;

use crate::core::config::{
    simulation::{SimulationParameters, DEFAULT_LENGTH},
    Config, DEFAULT_OUTPUT,
};

pub const USAGE: &str = "\
usage: pendulum-anim -t DURATION -f FREQUENCY [-l LENGTH] [-o OUT]

Animation for SHM pendulum

options:
  -h, --help            show this help message and exit
  -t, --time DURATION   Duration of movie in seconds
  -f, --freq FREQUENCY  SHM oscillation frequency
  -l, --len LENGTH      Length of oscillator (default: 1)
  -o, --out OUT         Output file name (default: pendulum.mp4)
";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("the following arguments are required: {}", .0.join(", "))]
    MissingRequired(Vec<&'static str>),
    #[error("argument {0}: expected one argument")]
    MissingValue(&'static str),
    #[error("argument {flag}: invalid {expected} value: '{value}'")]
    InvalidValue {
        flag: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("unrecognized arguments: {0}")]
    UnknownArgument(String),
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub duration_s: i64,
    pub frequency: f64,
    pub length: f64,
    pub out: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Args),
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Time,
    Freq,
    Len,
    Out,
}

impl Flag {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "-t" | "--time" => Some(Self::Time),
            "-f" | "--freq" => Some(Self::Freq),
            "-l" | "--len" => Some(Self::Len),
            "-o" | "--out" => Some(Self::Out),
            _ => None,
        }
    }

    const fn display(self) -> &'static str {
        match self {
            Self::Time => "-t/--time",
            Self::Freq => "-f/--freq",
            Self::Len => "-l/--len",
            Self::Out => "-o/--out",
        }
    }
}

/// Splits `--name=value` and `-nvalue` into flag and inline value.
fn split_flag(argument: &str) -> (&str, Option<&str>) {
    if let Some(long) = argument.strip_prefix("--") {
        match long.split_once('=') {
            Some((name, value)) => (&argument[..2 + name.len()], Some(value)),
            None => (argument, None),
        }
    } else if argument.starts_with('-') && argument.len() > 2 && argument.is_char_boundary(2) {
        (&argument[..2], Some(&argument[2..]))
    } else {
        (argument, None)
    }
}

fn parse_value<T: std::str::FromStr>(
    flag: Flag,
    expected: &'static str,
    value: &str,
) -> Result<T, CliError> {
    value.trim().parse().map_err(|_| CliError::InvalidValue {
        flag: flag.display(),
        expected,
        value: value.to_string(),
    })
}

impl Args {
    /// Parses the arguments following the program name.
    ///
    /// Flags take their value from the next argument or inline, as in
    /// `--time=5` or `-t5`. A repeated flag keeps its last value.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown arguments, missing or unparseable values,
    /// and missing required flags.
    pub fn parse_from<I, S>(arguments: I) -> Result<Command, CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut duration_s = None;
        let mut frequency = None;
        let mut length = DEFAULT_LENGTH;
        let mut out = PathBuf::from(DEFAULT_OUTPUT);

        let mut arguments = arguments.into_iter().map(Into::into);
        while let Some(argument) = arguments.next() {
            if argument == "-h" || argument == "--help" {
                return Ok(Command::Help);
            }
            let (name, inline) = split_flag(&argument);
            let flag =
                Flag::lookup(name).ok_or_else(|| CliError::UnknownArgument(argument.clone()))?;
            let value = match inline {
                Some(value) => value.to_string(),
                None => arguments
                    .next()
                    .ok_or(CliError::MissingValue(flag.display()))?,
            };
            match flag {
                Flag::Time => duration_s = Some(parse_value(flag, "int", &value)?),
                Flag::Freq => frequency = Some(parse_value(flag, "float", &value)?),
                Flag::Len => length = parse_value(flag, "float", &value)?,
                Flag::Out => out = PathBuf::from(value),
            }
        }

        match (duration_s, frequency) {
            (Some(duration_s), Some(frequency)) => Ok(Command::Run(Self {
                duration_s,
                frequency,
                length,
                out,
            })),
            (duration_s, frequency) => {
                let mut missing = Vec::new();
                if duration_s.is_none() {
                    missing.push(Flag::Time.display());
                }
                if frequency.is_none() {
                    missing.push(Flag::Freq.display());
                }
                Err(CliError::MissingRequired(missing))
            }
        }
    }

    /// Builds the run configuration; damping and the initial state keep
    /// their fixed values.
    #[must_use]
    pub fn into_config(self) -> Config {
        Config::new(SimulationParameters::new(
            self.duration_s,
            self.frequency,
            self.length,
        ))
        .with_output(self.out)
    }
}
