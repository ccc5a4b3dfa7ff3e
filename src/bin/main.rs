use std::io::{self, BufWriter, Write};
use std::process;

use clap::Parser;

use pare::{for_each_match, Error, LineSource, MatchMode, ModedItem, OptionsBuilder, QueryPathMode};

#[derive(Parser)]
#[command(
    name = "pare",
    about = "Fuzzy path matcher: rank candidates from stdin against a query",
    version
)]
struct Cli {
    /// Query to match items against
    #[arg(short, long, default_value = "")]
    query: String,

    /// Currently open file, used to rank its neighbors higher
    #[arg(long, default_value = "")]
    crfile: String,

    /// Maximum number of matches to print (0 = unlimited)
    #[arg(short, long, default_value_t = 10)]
    limit: usize,

    /// Match mode: full-line, filename-only, first-non-tab, until-last-tab
    #[arg(long, default_value = "full-line")]
    mmode: String,

    /// How query path separators constrain matches
    #[arg(long, value_enum, default_value_t = QueryPathMode::Auto)]
    query_path_mode: QueryPathMode,

    /// Number of matcher threads (default: available parallelism)
    #[arg(long)]
    threads: Option<usize>,

    /// Decode items as UTF-8 instead of raw bytes
    #[arg(long)]
    unicode: bool,

    /// Allow the currently open file itself to match
    #[arg(long)]
    match_crfile: bool,

    /// Single-character delimiter; query parts around it match in reverse order
    #[arg(long, default_value = "")]
    invert_delimiter: String,
}

fn main() {
    env_logger::init();

    match real_main() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("pare: {err}");
            process::exit(2);
        }
    }
}

fn real_main() -> Result<i32, Error> {
    let cli = Cli::parse();
    let mode = MatchMode::parse(&cli.mmode)?;
    let threads = cli.threads.unwrap_or_else(default_threads);

    let opts = OptionsBuilder::default()
        .crfile(cli.crfile.into_bytes())
        .limit(cli.limit)
        .match_crfile(cli.match_crfile)
        .nr_threads(threads)
        .unicode(cli.unicode)
        .want_match_info(true)
        .query_path_mode(cli.query_path_mode)
        .query_inverting_delimiter(cli.invert_delimiter.into_bytes())
        .build()
        .map_err(|err| Error::InvalidOption(err.to_string()))?;

    let stdin = io::BufReader::new(io::stdin());
    let source = LineSource::new(stdin, move |line| ModedItem::new(mode, line));

    let mut out = BufWriter::new(io::stdout().lock());
    let mut printed = 0usize;
    let mut io_failure: Option<io::Error> = None;

    for_each_match(
        cli.query.as_bytes(),
        &opts,
        &source,
        |item: ModedItem<Vec<u8>>, info| {
            if io_failure.is_some() {
                return;
            }
            printed += 1;
            let text = String::from_utf8_lossy(item.inner());
            let offset = item.key_offset();
            let result = match info {
                Some(info) => {
                    let positions = info
                        .match_positions()
                        .iter()
                        .map(|p| (p + offset).to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    writeln!(
                        out,
                        "{text}\n- score: {}; {}\n- match positions: {positions}",
                        info.score(),
                        info.score_debug_string()
                    )
                }
                None => writeln!(out, "{text}"),
            };
            if let Err(err) = result {
                io_failure = Some(err);
            }
        },
    )?;

    if io_failure.is_none() {
        if let Err(err) = out.flush() {
            io_failure = Some(err);
        }
    }
    if let Some(err) = io_failure {
        // A closed downstream pipe is a normal way to stop reading output.
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(0);
        }
        return Err(Error::Source(err.to_string()));
    }

    Ok(if printed == 0 { 1 } else { 0 })
}

fn default_threads() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}
