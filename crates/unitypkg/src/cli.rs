use std::path::PathBuf;

use clap::Parser;

#[derive(Clone, Debug, Parser)]
#[command(
    name = "unitypkg",
    version = env!("CARGO_PKG_VERSION"),
    about = "Extracts the contents of a .unitypackage file into a new directory.",
    long_about = None
)]
pub struct Cli {
    /// The path to the .unitypackage file to extract.
    pub input: PathBuf,

    /// The directory to extract to. A new directory named after the input
    /// file (without its extension) is created inside it.
    #[arg(default_value = ".")]
    pub output_dir: PathBuf,

    /// Log every entry as it is processed.
    #[arg(short, long)]
    pub verbose: bool,

    /// Hide the progress bar.
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dir_defaults_to_current() {
        let cli = Cli::try_parse_from(["unitypkg", "pack.unitypackage"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("pack.unitypackage"));
        assert_eq!(cli.output_dir, PathBuf::from("."));
        assert!(!cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn explicit_output_dir_and_flags() {
        let cli = Cli::try_parse_from(["unitypkg", "-v", "-q", "pack.unitypackage", "out"]).unwrap();
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert!(cli.verbose);
        assert!(cli.quiet);
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["unitypkg"]).is_err());
    }
}
