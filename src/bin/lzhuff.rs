use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use indicatif::{ProgressBar, ProgressStyle};
use lzhuff::{compress_file, decompress_file, Algorithm, CodecErr, CodecResult, CompressOptions};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Arguments shared by the `compress` and `decompress` subcommands
fn io_args<'a>(app: App<'a, 'a>) -> App<'a, 'a> {
    app.arg(
        Arg::with_name("algorithm")
            .required(true)
            .takes_value(true)
            .long("algorithm")
            .short("a")
            .possible_values(&["huffman", "huff", "lzw"])
            .case_insensitive(true)
            .help("The codec to use, the same codec must be given when decompressing"),
    )
    .arg(
        Arg::with_name("input-file")
            .required(true)
            .takes_value(true)
            .long("input-file")
            .short("i")
            .help("Path to the file that will be read")
            .validator(|s| match Path::new(&s).is_file() {
                true => Ok(()),
                false => Err(format!("The input file at {} does not exist", s)),
            }),
    )
    .arg(
        Arg::with_name("output-file")
            .required(true)
            .takes_value(true)
            .long("output-file")
            .short("o")
            .help("Path to the output file (careful, if a file already exists, it will be overwritten)"),
    )
}

/// Create the `compress` subcommand
fn compress_subcommand() -> App<'static, 'static> {
    io_args(
        SubCommand::with_name("compress")
            .about("Compress a file")
            .alias("c"),
    )
    .arg(
        Arg::with_name("allow-expansion")
            .long("allow-expansion")
            .help("Write the output even if it is not smaller than the input"),
    )
}

/// Create the `decompress` subcommand
fn decompress_subcommand() -> App<'static, 'static> {
    io_args(
        SubCommand::with_name("decompress")
            .about("Decompress a file")
            .alias("d"),
    )
}

fn main() {
    let app = App::new("lzhuff")
        .about("Utility to compress and decompress files with Huffman or LZW coding")
        .author("Bendi11")
        .version(crate_version!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .multiple(true)
                .global(true)
                .help("Print more diagnostics, can be repeated"),
        )
        .arg(
            Arg::with_name("quiet")
                .long("quiet")
                .short("q")
                .global(true)
                .help("Do not show a progress spinner or summary"),
        )
        .subcommand(compress_subcommand())
        .subcommand(decompress_subcommand());
    let matches = app.get_matches();
    // global flags given after the subcommand are only counted in its matches
    let verbosity = matches
        .subcommand()
        .1
        .map(|sub| sub.occurrences_of("verbose"))
        .unwrap_or(0)
        .max(matches.occurrences_of("verbose"));
    init_logging(verbosity);

    let res = match matches.subcommand() {
        ("compress", Some(args)) => run(args, true),
        ("decompress", Some(args)) => run(args, false),
        _ => Ok(()),
    };

    if let Err(e) = res {
        match e {
            CodecErr::NoGain { .. } => eprintln!(
                "{}, nothing was written (pass --allow-expansion to write it anyway)",
                e
            ),
            e => eprintln!("{}", e),
        }
        std::process::exit(1);
    }
}

/// Install a tracing subscriber, `RUST_LOG` takes priority over the verbosity flags
fn init_logging(verbosity: u64) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Compress or decompress one file
fn run(args: &ArgMatches, compress: bool) -> CodecResult<()> {
    let input = args.value_of("input-file").unwrap();
    let output = args.value_of("output-file").unwrap();
    let algorithm: Algorithm = args
        .value_of("algorithm")
        .unwrap()
        .parse()
        .map_err(|e: String| CodecErr::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;

    let prog = match args.is_present("quiet") {
        false => ProgressBar::new_spinner()
            .with_style(ProgressStyle::default_spinner().tick_chars(".,'`*`',")),
        true => ProgressBar::hidden(),
    };
    prog.enable_steady_tick(33);

    let report = if compress {
        prog.set_message(format!("Compressing {} with {}", input, algorithm));
        let opts = CompressOptions {
            require_gain: !args.is_present("allow-expansion"),
        };
        compress_file(input, output, algorithm, &opts)
    } else {
        prog.set_message(format!("Decompressing {} with {}", input, algorithm));
        decompress_file(input, output, algorithm)
    };
    prog.finish_and_clear();
    let report = report?;

    if !args.is_present("quiet") {
        println!(
            "{} -> {}: {} bytes -> {} bytes ({:.1}%)",
            input,
            output,
            report.input_len,
            report.output_len,
            report.ratio() * 100.0
        );
    }
    Ok(())
}
