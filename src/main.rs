//! subfont CLI entry point

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "subfont")]
#[command(author, version, about = "Just-in-time font provisioning for subtitle playback", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Scan subtitle files/directories and print every referenced family name
    ScanSubs {
        /// Subtitle files or directories to scan
        paths: Vec<PathBuf>,
    },

    /// Build a font catalog by walking a directory tree
    ScanFonts {
        /// Font root directory
        #[arg(long)]
        root: PathBuf,

        /// Write the resulting catalog under this name in `root`
        #[arg(long)]
        cache: Option<String>,
    },

    /// Run the full pipeline: scan subs, scan/load fonts, match, register
    Load {
        /// Font root directory
        #[arg(long)]
        root: PathBuf,

        /// Subtitle files or directories
        #[arg(long = "subs", required = true)]
        subs: Vec<PathBuf>,

        /// Cache file name to try loading from (and fall back from) in `root`
        #[arg(long)]
        cache: Option<String>,

        /// Family-name blacklist file
        #[arg(long)]
        blacklist: Option<PathBuf>,

        /// Optional subfont.toml config file (defaults apply if absent)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write the current catalog for a font root to a named cache file
    DumpCache {
        #[arg(long)]
        root: PathBuf,

        #[arg(long)]
        out: String,
    },

    /// Debug dump every name-table record in one font file
    Inspect {
        font_file: PathBuf,
    },
}

#[cfg(feature = "cli")]
struct DumpVisitor;

#[cfg(feature = "cli")]
impl subfont::font::NameVisitor for DumpVisitor {
    fn visit(&mut self, font_index: u32, record: &subfont::font::NameRecord<'_>) {
        let units = subfont::font::utf16be_to_le_units(record.value);
        let text = String::from_utf16_lossy(&units);
        println!(
            "sub-font {:>2}  platform={:<2} language=0x{:04x} name_id={:<3} {:?}",
            font_index, record.platform_id, record.language_id, record.name_id, text
        );
    }
}

#[cfg(feature = "cli")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    subfont::telemetry::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ScanSubs { paths } => {
            use subfont::family::FamilySet;
            use subfont::registrar::{Latin1Decoder, LegacyDecoder};

            let decoder = Latin1Decoder;
            let mut families = FamilySet::new();
            let subs_config = subfont::config::SubtitlesSection::default();
            for path in &paths {
                for file in subfont::discovery::walk_subtitles(path, &subs_config) {
                    let bytes = std::fs::read(&file)?;
                    let text = subfont::encoding::decode(&bytes, &decoder as &dyn LegacyDecoder);
                    subfont::subtitle::scan(&text, |name| {
                        let _ = families.insert(name);
                    });
                }
            }
            for name in families.iter() {
                println!("{}", name);
            }
        }

        Commands::ScanFonts { root, cache } => {
            use subfont::registrar::{Latin1Decoder, NullRegistrar};

            let mut loader = subfont::Loader::new(Box::new(NullRegistrar), Box::new(Latin1Decoder));
            loader.scan_fonts(&root, None)?;
            if let Some(name) = cache {
                loader.save_cache(&name)?;
                println!("wrote cache to {}", root.join(name).display());
            }
        }

        Commands::Load { root, subs, cache, blacklist, config } => {
            use subfont::registrar::{Latin1Decoder, NullRegistrar};

            let bl = match blacklist {
                Some(path) => subfont::blacklist::Blacklist::load(&path)?,
                None => subfont::blacklist::Blacklist::empty(),
            };
            let cfg = match config {
                Some(path) => subfont::config::LoaderConfig::from_file(&path)?,
                None => subfont::config::LoaderConfig::default(),
            };

            let mut loader = subfont::Loader::new(Box::new(NullRegistrar), Box::new(Latin1Decoder))
                .with_blacklist(bl)
                .with_config(cfg);
            for path in &subs {
                loader.add_subs(path)?;
            }
            loader.scan_fonts(&root, cache.as_deref())?;
            let report = loader.load_fonts()?;
            print!("{report}");
            loader.unload_fonts();
        }

        Commands::DumpCache { root, out } => {
            use subfont::registrar::{Latin1Decoder, NullRegistrar};

            let mut loader = subfont::Loader::new(Box::new(NullRegistrar), Box::new(Latin1Decoder));
            loader.scan_fonts(&root, None)?;
            loader.save_cache(&out)?;
            println!("wrote cache to {}", root.join(out).display());
        }

        Commands::Inspect { font_file } => {
            let bytes = std::fs::read(&font_file)?;
            let mut visitor = DumpVisitor;
            subfont::font::parse(&bytes, &mut visitor)?;
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    compile_error!("CLI feature is required for the binary");
}
