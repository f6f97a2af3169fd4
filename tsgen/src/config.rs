use std::{
    ffi::OsString,
    io::ErrorKind as IoErrorKind,
    path::{Path, PathBuf},
};

use clap::{
    CommandFactory, FromArgMatches,
    error::{ErrorKind as ClapErrorKind, Result as ClapResult},
};
use serde::Deserialize;
use tsgen_core::ir::ResolverOptions;

/// The name of the optional config file in the output directory.
pub const CONFIG_FILE_NAME: &str = ".tsgen.toml";

#[derive(Debug)]
pub struct Main {
    pub verbose: bool,
    pub command: Command,
}

impl Main {
    pub fn parse() -> ClapResult<Main> {
        Self::parse_from(std::env::args_os())
    }

    pub fn parse_from<I, T>(args: I) -> ClapResult<Main>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut cmd = MainArgs::command();
        let mut matches = cmd
            .try_get_matches_from_mut(args)
            .map_err(|err| err.format(&mut cmd))?;
        let args =
            MainArgs::from_arg_matches_mut(&mut matches).map_err(|err| err.format(&mut cmd))?;

        let command = match args.command {
            CommandArgs::Codegen(codegen) => {
                let path = codegen.output.join(CONFIG_FILE_NAME);
                let file = match ConfigFile::read(&path) {
                    Ok(file) => file,
                    Err(ConfigFileError::Io(err)) => {
                        return Err(cmd.error(
                            ClapErrorKind::Io,
                            format!("Failed to read `{}`: {err}", path.display()),
                        ));
                    }
                    Err(ConfigFileError::Toml(err)) => {
                        return Err(cmd.error(
                            ClapErrorKind::ValueValidation,
                            format!("Failed to parse `{}`: {err}", path.display()),
                        ));
                    }
                };
                Command::Codegen(file.unwrap_or_default().merge(codegen))
            }
        };

        Ok(Main {
            verbose: args.verbose,
            command,
        })
    }
}

#[derive(Debug)]
pub enum Command {
    Codegen(Codegen),
}

#[derive(Debug)]
pub struct Codegen {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Whether to generate `client.ts`.
    pub client: bool,
    pub options: ResolverOptions,
}

#[derive(Debug, clap::Parser)]
#[command(version, about, long_about = None)]
struct MainArgs {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CommandArgs,
}

#[derive(Debug, clap::Subcommand)]
enum CommandArgs {
    /// Generate a TypeScript client from an OpenAPI document.
    Codegen(CodegenArgs),
}

#[derive(Debug, clap::Args)]
struct CodegenArgs {
    /// The path to the OpenAPI document (`.yaml` or `.json`).
    input: PathBuf,

    /// The output directory for the generated files.
    output: PathBuf,

    /// Only generate schema declarations, without `client.ts`.
    #[arg(long)]
    no_client: bool,

    /// How deeply schemas may nest before generation fails.
    /// Defaults to 64.
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,
}

/// The contents of `.tsgen.toml`. Command-line flags override
/// anything set here.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    client: Option<bool>,
    #[serde(default)]
    max_depth: Option<usize>,
}

impl ConfigFile {
    /// Reads the config file at `path`, if there is one.
    fn read(path: &Path) -> Result<Option<Self>, ConfigFileError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Some(toml::from_str(&contents)?)),
            Err(err) if err.kind() == IoErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn merge(self, args: CodegenArgs) -> Codegen {
        let max_depth = args
            .max_depth
            .or(self.max_depth)
            .unwrap_or(ResolverOptions::default().max_depth);
        Codegen {
            input: args.input,
            output: args.output,
            client: !args.no_client && self.client.unwrap_or(true),
            options: ResolverOptions { max_depth },
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ConfigFileError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
