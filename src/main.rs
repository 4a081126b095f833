use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use tracing::info;

use langmark::config::LangmarkConfig;
use langmark::env::{core::LogLevel, generate_env_docs, locale::Locale, EnvVar};
use langmark::error::{helpers::log_error, LangmarkError, LangmarkResult};
use langmark::page::Page;
use langmark::parsers::html::html_to_dom;
use langmark::runtime::Runtime;
use langmark::state::{LanguagePreference, MemoryStorage, RedbStorage, Storage};
use langmark::translation::extract::collect_into;
use langmark::translation::{to_js_source, Dictionary};

#[derive(Parser, Debug)]
#[command(name = "langmark", version, about = "Dictionary overlay translation for static pages")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect translatable strings into a skeleton dictionary
    Extract {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output file; `.js` writes the script global form, anything else JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Variable name used for the script global form
        #[arg(long, default_value = "tr_translations")]
        variable: String,
    },

    /// Reconcile a page against a dictionary and write the resulting HTML
    Translate {
        file: PathBuf,

        /// Dictionary file (.json or .js)
        #[arg(short, long)]
        dictionary: PathBuf,

        /// Language tag to switch to before writing
        #[arg(long)]
        lang: Option<String>,

        /// redb database holding the persisted language preference
        #[arg(long)]
        state: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the supported environment variables
    Env,
}

fn init_logging() {
    let level = LogLevel::get_or_default("info".to_string());
    let level = tracing::Level::from_str(&level).unwrap_or(tracing::Level::INFO);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn write_output(output: Option<&Path>, content: &str) -> LangmarkResult<()> {
    match output {
        Some(path) => fs::write(path, content)
            .map_err(|e| LangmarkError::from(e).with_context(path.display())),
        None => {
            io::stdout().write_all(content.as_bytes())?;
            Ok(())
        }
    }
}

fn read_file(path: &Path) -> LangmarkResult<Vec<u8>> {
    fs::read(path).map_err(|e| LangmarkError::from(e).with_context(path.display()))
}

fn extract(files: &[PathBuf], output: Option<&Path>, variable: &str) -> LangmarkResult<()> {
    let mut strings = BTreeMap::new();
    for file in files {
        let data = read_file(file)?;
        let dom = html_to_dom(&data, "utf-8");
        collect_into(&dom.document, &mut strings);
    }
    info!("从 {} 个文件提取了 {} 条字符串", files.len(), strings.len());

    let is_js = output
        .and_then(|path| path.extension())
        .is_some_and(|ext| ext == "js");
    let content = if is_js {
        to_js_source(&strings, variable)?
    } else {
        let mut json = serde_json::to_string_pretty(&strings)?;
        json.push('\n');
        json
    };

    write_output(output, &content)
}

fn parse_lang(config: &LangmarkConfig, tag: &str) -> LangmarkResult<LanguagePreference> {
    if tag == config.alt_locale {
        Ok(LanguagePreference::Alt)
    } else if tag == config.default_locale {
        Ok(LanguagePreference::Default)
    } else {
        Err(LangmarkError::Config(format!(
            "未知语言 '{}'，可选值: {}, {}",
            tag, config.default_locale, config.alt_locale
        )))
    }
}

fn translate(
    config: &LangmarkConfig,
    file: &Path,
    dictionary: &Path,
    lang: Option<&str>,
    state: Option<&Path>,
    output: Option<&Path>,
) -> LangmarkResult<()> {
    let preference = lang.map(|tag| parse_lang(config, tag)).transpose()?;
    let dictionary = Dictionary::load(dictionary)?;

    let source = String::from_utf8_lossy(&read_file(file)?).into_owned();
    let storage: Box<dyn Storage> = match state {
        Some(path) => Box::new(RedbStorage::open(path)?),
        None => Box::new(MemoryStorage::new()),
    };
    let page = Page::new(source, storage).with_locale(Locale::get().ok());

    let mut runtime = Runtime::with_config(page, config, Some(dictionary));
    runtime.start();
    runtime.document_ready();
    if let Some(preference) = preference {
        runtime.set_preference(preference);
    }
    runtime.settle();

    let stats = runtime.stats();
    info!(
        "完成: 语言 {:?}，执行 {} 次，翻译 {} 次",
        runtime.engine().current(),
        stats.enforce_runs,
        stats.translation_passes
    );

    write_output(output, &runtime.serialize()?)
}

fn run(cli: Cli) -> LangmarkResult<()> {
    match cli.command {
        Command::Extract {
            files,
            output,
            variable,
        } => extract(&files, output.as_deref(), &variable),
        Command::Translate {
            file,
            dictionary,
            lang,
            state,
            output,
        } => {
            let config = LangmarkConfig::load(cli.config.as_deref())?;
            translate(
                &config,
                &file,
                &dictionary,
                lang.as_deref(),
                state.as_deref(),
                output.as_deref(),
            )
        }
        Command::Env => write_output(None, &generate_env_docs()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error(&e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
