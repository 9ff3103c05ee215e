use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::Parser as ClapParser;
use log::LevelFilter;

use subdex::serialiser::serialise;
use subdex::{load_file, AssDialect, CancelHandle, Config, Format, SubtitleError, SubtitleSession};

fn main() {
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Convert and inspect SRT, WebVTT and ASS/SSA subtitles")]
struct Cli {
    #[arg(short, long, value_name = "FILE", help = "The subtitle file to read from.")]
    input: PathBuf,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to write to. If not supplied, the subtitles will be written to standard output.",
        default_value = "-"
    )]
    output: String,
    #[arg(
        short,
        long,
        value_name = "FORMAT",
        help = "Output format: srt, vtt, ass or ssa. Taken from the output extension if not supplied."
    )]
    format: Option<String>,
    #[arg(
        long,
        value_name = "MS",
        allow_hyphen_values = true,
        help = "Shift every timestamp by this many milliseconds."
    )]
    offset: Option<i64>,
    #[arg(long, value_name = "NAME", help = "Character encoding of the input.")]
    encoding: Option<String>,
    #[arg(long, value_name = "CODE", help = "Language of the input.")]
    language: Option<String>,
    #[arg(short, long, value_name = "FILE", help = "Read settings from a JSON file.")]
    config: Option<PathBuf>,
    #[arg(
        long,
        value_name = "MS",
        help = "Print the captions on screen at this time instead of converting."
    )]
    at: Option<i64>,
    #[arg(long, help = "With --at, query the delayed echo captions.")]
    smart: bool,
    #[arg(short, long, action = clap::ArgAction::Count, help = "Log more; repeat for more detail.")]
    verbose: u8,
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .context(format!("Failed to load config file: '{}'", path.display()))?,
        None => Config::default(),
    };
    init_logging(&config, cli.verbose);

    let language = cli.language.clone().or_else(|| config.language.clone());
    let encoding = cli.encoding.clone().or_else(|| config.encoding.clone());

    if Format::from_path(&cli.input).is_none() {
        return Err(SubtitleError::UnsupportedFormat(cli.input.display().to_string()).into());
    }
    let mut tto = load_file(
        &cli.input,
        language.as_deref(),
        encoding.as_deref(),
        &CancelHandle::new(),
    )
    .context(format!(
        "Failed to parse subtitle file: '{}'",
        cli.input.display()
    ))?;

    if !tto.warnings().is_empty() {
        eprint!("{}", tto.warnings_report());
    }
    if tto.captions.is_empty() {
        return Err(anyhow!("You appear to have supplied an empty file."));
    }

    if let Some(at) = cli.at {
        let smart = cli.smart || config.smart_subtitles;
        let mut session = SubtitleSession::new();
        session.set_subtitle_delay(config.subtitle_delay_ms);
        session.insert(&cli.input, tto);
        for data in session.captions_at(smart, at) {
            for caption in data.captions {
                println!("{} --> {}", caption.start, caption.end);
                println!("{}", caption.content);
                println!();
            }
        }
        return Ok(());
    }

    let (format, dialect) = output_format(&cli, tto.source_format, config.ass_dialect)?;
    tto.offset = cli.offset.unwrap_or(config.offset_ms);
    tto.dialect = dialect;
    let lines = format.to_file(&tto);

    if cli.output == "-" {
        serialise(&lines, io::stdout())?;
    } else {
        let dst = std::fs::File::create(&cli.output)
            .context(format!("Failed to create output file: '{}'", cli.output))?;
        serialise(&lines, dst)?;
    };

    Ok(())
}

fn init_logging(config: &Config, verbose: u8) {
    let level = match verbose {
        0 => config.log_level.to_level_filter(),
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Picks the output codec from `--format`, else from the output extension,
/// else the input's own format. A name that spells out `ass` or `ssa` fixes
/// the dialect; the configured dialect applies only to the input fallback.
fn output_format(
    cli: &Cli,
    source: Option<Format>,
    configured: AssDialect,
) -> Result<(Format, AssDialect)> {
    let name = cli.format.clone().or_else(|| {
        PathBuf::from(&cli.output)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_string)
    });
    let name = match name {
        Some(name) => name,
        None => {
            let format = source.ok_or_else(|| anyhow!("Output format unknown, use --format."))?;
            return Ok((format, configured));
        }
    };
    let format: Format = name.parse()?;
    let dialect = match AssDialect::from_str(&name) {
        Ok(dialect) => dialect,
        Err(_) => configured,
    };
    Ok((format, dialect))
}
