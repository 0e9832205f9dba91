use std::cmp::Ordering;
use std::error::Error;
use std::fmt::Display;
use std::path::Path;
use std::process;
use std::str::FromStr;

use clap::ArgEnum;
use env_logger;
use log;

use kway_merge::run::{find_unsorted, load_run, save_run};
use kway_merge::{
    partial_compare, ComparisonError, KWayMerger, KWayMergerBuilder, LineCodec, MergeStrategy, RmpCodec, RunError,
};

fn main() {
    let arg_parser = build_arg_parser();

    let log_level: LogLevel = arg_parser.value_of_t_or_exit("log_level");
    init_logger(log_level);

    let order: Order = arg_parser.value_of_t_or_exit("sort");
    let format: Format = arg_parser.value_of_t_or_exit("format");
    let kind: Kind = arg_parser.value_of_t_or_exit("kind");
    let strategy: Strategy = arg_parser.value_of_t_or_exit("strategy");
    let threads: Option<usize> = arg_parser
        .is_present("threads")
        .then(|| arg_parser.value_of_t_or_exit("threads"));
    let parallel = arg_parser.is_present("parallel");

    let inputs: Vec<&str> = arg_parser.values_of("input").expect("value is required").collect();
    let output = arg_parser.value_of("output").expect("value is required");

    let mut merger_builder = KWayMergerBuilder::new()
        .with_strategy(strategy.into())
        .with_parallel(parallel);
    if let Some(threads) = threads {
        merger_builder = merger_builder.with_threads_number(threads);
    }

    let merger = match merger_builder.build() {
        Ok(merger) => merger,
        Err(err) => {
            log::error!("merger initialization error: {}", err);
            process::exit(1);
        }
    };

    let result = match kind {
        Kind::Str => merge_runs::<String>(&merger, &inputs, output, format, order),
        Kind::Int => merge_runs::<i64>(&merger, &inputs, output, format, order),
        Kind::Float => merge_runs::<f64>(&merger, &inputs, output, format, order),
    };

    if let Err(err) = result {
        log::error!("{}", err);
        process::exit(1);
    }
}

fn merge_runs<T>(
    merger: &KWayMerger,
    inputs: &[&str],
    output: &str,
    format: Format,
    order: Order,
) -> Result<(), Box<dyn Error>>
where
    T: PartialOrd + FromStr + Display + serde::Serialize + serde::de::DeserializeOwned + Send,
    T::Err: Display,
{
    let compare = order.comparator::<T>();

    let mut runs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let run: Vec<T> =
            load(Path::new(input), format).map_err(|err| format!("run {} loading error: {}", input, err))?;
        log::info!("loaded run {} (items: {})", input, run.len());

        if let Some(idx) = find_unsorted(&run, compare) {
            log::warn!(
                "run {} is not sorted (item {} is out of order), merge result order is undefined",
                input,
                idx + 2
            );
        }
        runs.push(run);
    }

    let merged = merger
        .try_merge_by(runs, compare)
        .map_err(|err| format!("data merging error: {}", err))?;

    save(Path::new(output), format, &merged).map_err(|err| format!("data saving error: {}", err))?;
    log::info!("merged {} runs into {} (items: {})", inputs.len(), output, merged.len());

    return Ok(());
}

fn load<T>(path: &Path, format: Format) -> Result<Vec<T>, RunError>
where
    T: FromStr + Display + serde::de::DeserializeOwned + serde::Serialize,
    T::Err: Display,
{
    match format {
        Format::Line => load_run::<T, LineCodec>(path),
        Format::Msgpack => load_run::<T, RmpCodec>(path),
    }
}

fn save<T>(path: &Path, format: Format, items: &[T]) -> Result<(), RunError>
where
    T: FromStr + Display + serde::de::DeserializeOwned + serde::Serialize,
    T::Err: Display,
{
    match format {
        Format::Line => save_run::<T, LineCodec>(path, items),
        Format::Msgpack => save_run::<T, RmpCodec>(path, items),
    }
}

#[derive(Copy, Clone, clap::ArgEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn possible_values() -> impl Iterator<Item = clap::PossibleValue<'static>> {
        Self::value_variants().iter().filter_map(|v| v.to_possible_value())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <LogLevel as clap::ArgEnum>::from_str(s, false)
    }
}

#[derive(Copy, Clone, clap::ArgEnum)]
enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn possible_values() -> impl Iterator<Item = clap::PossibleValue<'static>> {
        Order::value_variants().iter().filter_map(|v| v.to_possible_value())
    }

    fn comparator<T: PartialOrd>(self) -> impl Fn(&T, &T) -> Result<Ordering, ComparisonError> + Copy + Sync + Send {
        move |a: &T, b: &T| match self {
            Order::Asc => partial_compare(a, b),
            Order::Desc => partial_compare(b, a),
        }
    }
}

impl std::str::FromStr for Order {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Order as clap::ArgEnum>::from_str(s, false)
    }
}

#[derive(Copy, Clone, clap::ArgEnum)]
enum Format {
    Line,
    Msgpack,
}

impl Format {
    pub fn possible_values() -> impl Iterator<Item = clap::PossibleValue<'static>> {
        Format::value_variants().iter().filter_map(|v| v.to_possible_value())
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Format as clap::ArgEnum>::from_str(s, false)
    }
}

#[derive(Copy, Clone, clap::ArgEnum)]
enum Kind {
    Str,
    Int,
    Float,
}

impl Kind {
    pub fn possible_values() -> impl Iterator<Item = clap::PossibleValue<'static>> {
        Kind::value_variants().iter().filter_map(|v| v.to_possible_value())
    }
}

impl std::str::FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Kind as clap::ArgEnum>::from_str(s, false)
    }
}

#[derive(Copy, Clone, clap::ArgEnum)]
enum Strategy {
    DivideAndConquer,
    Tournament,
}

impl Strategy {
    pub fn possible_values() -> impl Iterator<Item = clap::PossibleValue<'static>> {
        Strategy::value_variants().iter().filter_map(|v| v.to_possible_value())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Strategy as clap::ArgEnum>::from_str(s, false)
    }
}

impl From<Strategy> for MergeStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::DivideAndConquer => MergeStrategy::DivideAndConquer,
            Strategy::Tournament => MergeStrategy::Tournament,
        }
    }
}

fn build_arg_parser() -> clap::ArgMatches {
    clap::App::new("kway-merge")
        .about("k-way sorted runs merger")
        .arg(
            clap::Arg::new("input")
                .short('i')
                .long("input")
                .help("sorted run file to be merged, runs given first take priority on ties")
                .required(true)
                .takes_value(true)
                .multiple_occurrences(true),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("result file")
                .required(true)
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("format")
                .short('f')
                .long("format")
                .help("runs file format")
                .takes_value(true)
                .default_value("line")
                .possible_values(Format::possible_values()),
        )
        .arg(
            clap::Arg::new("kind")
                .short('k')
                .long("kind")
                .help("runs item type")
                .takes_value(true)
                .default_value("str")
                .possible_values(Kind::possible_values()),
        )
        .arg(
            clap::Arg::new("sort")
                .short('s')
                .long("sort")
                .help("runs sorting order")
                .takes_value(true)
                .default_value("asc")
                .possible_values(Order::possible_values()),
        )
        .arg(
            clap::Arg::new("strategy")
                .short('m')
                .long("strategy")
                .help("merge strategy")
                .takes_value(true)
                .default_value("divide-and-conquer")
                .possible_values(Strategy::possible_values()),
        )
        .arg(
            clap::Arg::new("log_level")
                .short('l')
                .long("loglevel")
                .help("logging level")
                .takes_value(true)
                .default_value("info")
                .possible_values(LogLevel::possible_values()),
        )
        .arg(
            clap::Arg::new("parallel")
                .short('p')
                .long("parallel")
                .help("merge independent runs in parallel"),
        )
        .arg(
            clap::Arg::new("threads")
                .short('t')
                .long("threads")
                .help("number of threads to use for parallel merging")
                .takes_value(true),
        )
        .get_matches()
}

fn init_logger(log_level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(match log_level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        })
        .format_timestamp_millis()
        .init();
}
