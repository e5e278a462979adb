use clap::Parser;
use std::path::PathBuf;

use crate::entities::Interpretation;

const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"),
    "\n",
    "Fields: MetaImage (.mha/.mhd)\n",
    "Target: ",
    std::env::consts::ARCH,
    "-",
    std::env::consts::OS
);

/// Nearest neighbor field inspector
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Source image (PNG, JPEG, BMP, TIFF, TGA)
    #[arg(value_name = "IMAGE")]
    pub image: Option<PathBuf>,

    /// Nearest neighbor field over IMAGE (.mha/.mhd, at least 2 components)
    #[arg(value_name = "FIELD")]
    pub field: Option<PathBuf>,

    /// Patch radius in pixels (patch side is 2*r+1)
    #[arg(short = 'r', long = "radius", value_name = "R")]
    pub radius: Option<u32>,

    /// How to read field vectors: absolute|offset
    #[arg(short = 'i', long = "interpretation", value_name = "MODE")]
    pub interpretation: Option<Interpretation>,

    /// Enable logging to file (default: nnfi.log in the data directory)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

impl Args {
    /// Log level filter for the `-v` count.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_image_and_field() {
        let args = Args::try_parse_from(["nnfi", "img.png", "nnf.mha", "-r", "4", "-i", "offset"]).unwrap();
        assert_eq!(args.image, Some(PathBuf::from("img.png")));
        assert_eq!(args.field, Some(PathBuf::from("nnf.mha")));
        assert_eq!(args.radius, Some(4));
        assert_eq!(args.interpretation, Some(Interpretation::Offset));
    }

    #[test]
    fn image_alone_is_accepted() {
        let args = Args::try_parse_from(["nnfi", "photo.png"]).unwrap();
        assert_eq!(args.image, Some(PathBuf::from("photo.png")));
        assert!(args.field.is_none());
    }

    #[test]
    fn verbosity_and_bare_log_flag() {
        let args = Args::try_parse_from(["nnfi", "-vv", "--log"]).unwrap();
        assert_eq!(args.log_level(), log::LevelFilter::Debug);
        assert_eq!(args.log_file, Some(None));
        assert!(args.image.is_none());
    }

    #[test]
    fn bad_interpretation_is_rejected() {
        assert!(Args::try_parse_from(["nnfi", "-i", "diagonal"]).is_err());
    }
}
