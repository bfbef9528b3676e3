use file2prompt::config;
use file2prompt::{ConversionStore, ConversionSummary, FsStore, UploadedFile};

#[derive(clap::Parser, Debug)]
/// file2prompt: bundle text files into one fenced, filename-annotated prompt.
struct Cli {
    /// Config file path (default: ~/.config/file2prompt/config.yml)
    #[arg(
        short,
        long,
        global = true,
        required = false,
        help = format!("Config file path (default: {:?})", config::default_config_path())
    )]
    config: Option<std::path::PathBuf>,

    /// Directory holding saved conversions.
    #[arg(long, global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Offset used for timestamps and ids, like +09:00.
    #[arg(long, global = true, allow_hyphen_values = true)]
    utc_offset: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Print the formatted text for the given files.
    Convert {
        #[arg(required = true)]
        files: Vec<std::path::PathBuf>,
    },
    /// Format the given files and save the result.
    Save {
        #[arg(required = true)]
        files: Vec<std::path::PathBuf>,
    },
    /// List saved conversions, newest first.
    History,
    /// Print one saved conversion in full.
    Show { id: String },
    /// Write one file's original content from a saved conversion.
    Download {
        id: String,
        filename: String,
        /// Write here instead of standard output.
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
    /// Delete one saved conversion.
    Delete { id: String },
    /// Delete every saved conversion.
    Clear,
}

fn main() -> std::io::Result<std::process::ExitCode> {
    use clap::Parser;
    use std::io::Write;

    env_logger::init();

    let cli = Cli::parse();

    let mut stdout = std::io::stdout();
    match &cli.command {
        // uploads are converted without touching the store
        Command::Convert { files } => {
            let Some(uploads) = load_batch(files) else {
                return Ok(std::process::ExitCode::FAILURE);
            };
            let text = file2prompt::format_batch(uploads.iter().map(UploadedFile::as_pair));
            stdout.write_all(text.as_bytes())?;
        }
        Command::Save { files } => {
            let Some(uploads) = load_batch(files) else {
                return Ok(std::process::ExitCode::FAILURE);
            };
            let store = open_store(&cli)?;
            let text = file2prompt::format_batch(uploads.iter().map(UploadedFile::as_pair));
            let summary = store.save(&text, &file2prompt::inputs::filenames(&uploads))?;
            writeln!(stdout, "{}", json_or_io(summary.to_json())?)?;
        }
        Command::History => {
            let store = open_store(&cli)?;
            let history = store.list_history()?;
            writeln!(stdout, "{}", json_or_io(ConversionSummary::list_to_json(&history))?)?;
        }
        Command::Show { id } => match open_store(&cli)?.get_record(id) {
            Some(record) => writeln!(stdout, "{}", json_or_io(record.to_json())?)?,
            None => {
                eprintln!("Data not found: {}", id);
                return Ok(std::process::ExitCode::FAILURE);
            }
        },
        Command::Download {
            id,
            filename,
            output,
        } => {
            let Some(content) = open_store(&cli)?.get_original_file_content(id, filename) else {
                eprintln!("File not found: {} in {}", filename, id);
                return Ok(std::process::ExitCode::FAILURE);
            };
            match output {
                Some(path) => std::fs::write(path, content)?,
                None => stdout.write_all(content.as_bytes())?,
            }
        }
        Command::Delete { id } => {
            if !open_store(&cli)?.delete_record(id) {
                eprintln!("Data not found: {}", id);
                return Ok(std::process::ExitCode::FAILURE);
            }
            eprintln!("Data deleted successfully");
        }
        Command::Clear => {
            if !open_store(&cli)?.delete_all() {
                eprintln!("Failed to delete all data");
                return Ok(std::process::ExitCode::FAILURE);
            }
            eprintln!("All data deleted successfully");
        }
    }
    Ok(std::process::ExitCode::SUCCESS)
}

fn open_store(cli: &Cli) -> std::io::Result<FsStore> {
    let file_config = config::ConfigFile::load(&cli.config)?.unwrap_or_default();
    let flag_config = config::ConfigFile {
        data_dir: cli
            .data_dir
            .as_ref()
            .map(|dir| dir.to_string_lossy().into_owned()),
        utc_offset: cli.utc_offset.clone(),
    };
    let settings = config::Settings::resolve(file_config.merge(flag_config))?;
    log::debug!("using {:?}", settings);
    FsStore::open(settings.data_dir, settings.utc_offset)
}

/// Read and decode every file, or report why the batch can't be used.
fn load_batch(paths: &[std::path::PathBuf]) -> Option<Vec<UploadedFile>> {
    let loaded: Result<Vec<UploadedFile>, _> = paths.iter().map(UploadedFile::load).collect();
    match loaded {
        Ok(uploads) => Some(uploads),
        Err(e) => {
            eprintln!("Error processing files: {}", e);
            None
        }
    }
}

fn json_or_io(json: Result<String, String>) -> std::io::Result<String> {
    json.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
