use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use gumdrop::Options;
use serde::Serialize;

use hfstol::analysis::{Analyser, Analysis, LookupConfig};
use hfstol::types::HeaderFlag;
use hfstol::vfs::Fs;
use hfstol::Transducer;

trait OutputWriter {
    fn write_analyses(&mut self, word: &str, analyses: &[Analysis]);
    fn finish(&mut self);
}

struct StdoutWriter {
    show_weights: bool,
    echo: bool,
}

impl OutputWriter for StdoutWriter {
    fn write_analyses(&mut self, word: &str, analyses: &[Analysis]) {
        if self.echo {
            println!("{}", word);
        }

        if analyses.is_empty() {
            println!("{}\t+?", word);
        }

        for a in analyses {
            if self.show_weights {
                println!("{}\t{}\t{}", word, a.output, a.weight);
            } else {
                println!("{}\t{}", word, a.output);
            }
        }

        println!();
    }

    fn finish(&mut self) {}
}

#[derive(Serialize)]
struct LookupResult {
    word: String,
    analyses: Vec<Analysis>,
}

#[derive(Serialize)]
struct JsonWriter {
    results: Vec<LookupResult>,
}

impl JsonWriter {
    pub fn new() -> JsonWriter {
        JsonWriter { results: vec![] }
    }
}

impl OutputWriter for JsonWriter {
    fn write_analyses(&mut self, word: &str, analyses: &[Analysis]) {
        self.results.push(LookupResult {
            word: word.to_owned(),
            analyses: analyses.to_vec(),
        });
    }

    fn finish(&mut self) {
        match serde_json::to_string_pretty(self) {
            Ok(s) => println!("{}", s),
            Err(e) => log::error!("Could not serialize results: {}", e),
        }
    }
}

#[derive(Debug, Options)]
struct Args {
    #[options(help = "print help message")]
    help: bool,

    #[options(command)]
    command: Option<Command>,
}

#[derive(Debug, Options)]
enum Command {
    #[options(help = "analyse words with a transducer")]
    Lookup(LookupArgs),

    #[options(help = "print header, alphabet and metadata of a transducer")]
    Info(InfoArgs),

    #[options(help = "print the input symbols each word is split into")]
    Tokenize(TokenizeArgs),
}

#[derive(Debug, Options)]
struct LookupArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(short = "w", long = "weights", help = "print weights")]
    show_weights: bool,

    #[options(short = "u", long = "unique", help = "print each analysis only once")]
    unique: bool,

    #[options(short = "n", help = "print at most this many analyses per word")]
    nbest: Option<usize>,

    #[options(short = "e", long = "echo", help = "echo each input word before its analyses")]
    echo: bool,

    #[options(no_short, long = "no-flags", help = "do not enforce flag diacritics")]
    no_flags: bool,

    #[options(short = "c", help = "JSON lookup configuration file")]
    config: Option<PathBuf>,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, required, help = "optimized-lookup transducer to use")]
    transducer: PathBuf,

    #[options(free, help = "words to be processed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct InfoArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(free, required, help = "optimized-lookup transducer to inspect")]
    transducer: PathBuf,
}

#[derive(Debug, Options)]
struct TokenizeArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(free, required, help = "optimized-lookup transducer to use")]
    transducer: PathBuf,

    #[options(free, help = "words to be tokenized")]
    inputs: Vec<String>,
}

fn load_transducer(path: &Path) -> anyhow::Result<Transducer> {
    Transducer::from_path(&Fs, path)
        .with_context(|| format!("Could not load transducer {}", path.display()))
}

fn read_words(inputs: Vec<String>) -> anyhow::Result<Vec<String>> {
    if !inputs.is_empty() {
        return Ok(inputs);
    }

    log::info!("Reading from stdin...");
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("reading stdin")?;

    Ok(buffer
        .lines()
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<LookupConfig> {
    let path = match path {
        Some(p) => p,
        None => return Ok(LookupConfig::default()),
    };

    let file = std::fs::File::open(path)
        .with_context(|| format!("Could not open config {}", path.display()))?;
    serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("Could not parse config {}", path.display()))
}

fn lookup(args: LookupArgs) -> anyhow::Result<()> {
    let transducer = load_transducer(&args.transducer)?;
    let mut config = load_config(args.config.as_deref())?;

    if args.unique {
        config.unique = true;
    }

    if let Some(v) = args.nbest {
        config.n_best = if v == 0 { None } else { Some(v) };
    }

    config.flag_diacritics = if args.no_flags {
        false
    } else {
        config.flag_diacritics || transducer.alphabet().has_flag_diacritics()
    };

    log::debug!("Lookup configuration: {:?}", config);

    let mut writer: Box<dyn OutputWriter> = if args.use_json {
        Box::new(JsonWriter::new())
    } else {
        Box::new(StdoutWriter {
            show_weights: args.show_weights,
            echo: args.echo,
        })
    };

    let analyser = Analyser::new(&transducer, config);

    for word in read_words(args.inputs)? {
        let analyses = match analyser.analyse(&word) {
            Ok(v) => v,
            Err(e) => {
                log::debug!("{}: {}", word, e);
                vec![]
            }
        };
        writer.write_analyses(&word, &analyses);
    }

    writer.finish();

    Ok(())
}

fn info(args: InfoArgs) -> anyhow::Result<()> {
    let transducer = load_transducer(&args.transducer)?;
    let header = transducer.header();
    let alphabet = transducer.alphabet();

    println!("symbols:\t{}", header.symbol_count());
    println!("input symbols:\t{}", header.input_symbol_count());
    println!("index table:\t{}", header.index_table_size());
    println!("target table:\t{}", header.target_table_size());
    println!("states:\t{}", header.states());
    println!("transitions:\t{}", header.transitions());

    for flag in HeaderFlag::ALL.iter() {
        println!("{:?}:\t{}", flag, header.has_flag(*flag));
    }

    println!("flag diacritics:\t{}", alphabet.operations().len());
    println!("flag features:\t{}", alphabet.state_size());
    if let Some(s) = alphabet.other_symbol() {
        println!("unknown symbol:\t{}", s);
    }

    for (key, value) in header.metadata() {
        println!("{}:\t{}", key, value);
    }

    Ok(())
}

fn tokenize(args: TokenizeArgs) -> anyhow::Result<()> {
    let transducer = load_transducer(&args.transducer)?;
    let keys = transducer.alphabet().key_table();

    for word in read_words(args.inputs)? {
        match transducer.tokenize(&word) {
            Ok(symbols) => {
                let tokens = symbols
                    .iter()
                    .map(|s| {
                        let key = keys.get(s.0 as usize).map(|k| k.as_str()).unwrap_or("");
                        format!("{}:\"{}\"", s, key)
                    })
                    .collect::<Vec<_>>();
                println!("{}\t{}", word, tokens.join(" "));
            }
            Err(e) => println!("{}\t+?\t{}", word, e),
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse_args_default_or_exit();

    match args.command {
        None => Ok(()),
        Some(Command::Lookup(args)) => lookup(args),
        Some(Command::Info(args)) => info(args),
        Some(Command::Tokenize(args)) => tokenize(args),
    }
}
