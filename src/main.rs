use asstosrt::batch::{self, BatchOpts};
use asstosrt::{ConvertOptions, DictionaryTranslator, OutputFormat, Translator};

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("asstosrt=warn")),
        )
        .with_writer(io::stderr)
        .init();
}

#[derive(ClapParser)]
#[command(about = "Convert ASS/SSA subtitles to SRT, WebVTT or XML")]
struct Cli {
    #[arg(
        value_name = "FILE",
        help = "ASS/SSA files to convert. Defaults to every .ass/.ssa file in the current directory. Use '-' to convert standard input to standard output."
    )]
    files: Vec<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Translate dialogue with an OpenCC-style phrase table."
    )]
    translate_table: Option<PathBuf>,
    #[arg(short, long, help = "Drop all dialogue carrying an effect.")]
    no_effect: bool,
    #[arg(short = 'l', long, help = "Keep only the first line of each dialogue.")]
    only_first_line: bool,
    #[arg(
        short,
        long,
        value_name = "DIR",
        help = "The directory to write to. Defaults to the current directory."
    )]
    output_dir: Option<PathBuf>,
    #[arg(short, long, help = "Overwrite existing output files.")]
    force: bool,
    #[arg(
        short = 'T',
        long,
        value_name = "TYPE",
        default_value = "srt",
        help = "Output type: srt, vtt or xml (case-insensitive)."
    )]
    out_type: String,
    #[arg(long, help = "Skip malformed dialogue lines instead of failing the file.")]
    skip_malformed: bool,
}

fn run() -> Result<bool> {
    let cli = Cli::parse();

    let translator = match &cli.translate_table {
        Some(path) => Some(DictionaryTranslator::from_file(path)?),
        None => None,
    };
    let translator = translator.as_ref().map(|t| t as &dyn Translator);

    let convert_opts = ConvertOptions {
        no_effect: cli.no_effect,
        only_first_line: cli.only_first_line,
        output_format: OutputFormat::from_name(&cli.out_type.to_ascii_lowercase()),
        skip_malformed: cli.skip_malformed,
    };

    if cli.files.len() == 1 && cli.files[0].as_os_str() == "-" {
        let mut data = Vec::new();
        io::stdin()
            .read_to_end(&mut data)
            .context("Failed to read from stdin")?;
        let text = batch::decode(data).context("Standard input is not valid UTF-8")?;
        let converted = asstosrt::convert(text.lines(), translator, &convert_opts)
            .context("Failed to convert standard input")?;
        io::stdout()
            .write_all(converted.as_bytes())
            .context("Failed to write to stdout")?;
        return Ok(true);
    }

    let cwd = std::env::current_dir().context("Failed to determine the current directory")?;
    let files = if cli.files.is_empty() {
        batch::subtitle_files(&cwd).context("Failed to list the current directory")?
    } else {
        cli.files
    };
    if files.is_empty() {
        return Err(anyhow!(
            "ASS/SSA file not found. Try --help for more information."
        ));
    }

    let opts = BatchOpts {
        output_dir: cli.output_dir.unwrap_or(cwd),
        force: cli.force,
        convert: convert_opts,
    };
    let report = batch::run(&files, translator, &opts, &mut io::stdout().lock())
        .context("Failed to write progress report")?;
    Ok(report.failed == 0)
}
