use anyhow::{Context, Error, Result};
use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command};
use log::error;
use std::{
    io::{self, BufRead},
    time::Instant,
};
use zigfetch::{DownloadedArchive, ZigFetch, ZigFetchBuilder};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Reported elapsed times count from here, not from the first request.
    let start_time = Instant::now();

    let cmd = cmd();
    let matches = cmd.get_matches();
    if let Err(e) = init_logger_from_matches(&matches) {
        eprintln!("Error creating logger: {e}");
        std::process::exit(126);
    }

    let status = match make_zigfetch(&matches) {
        Ok(zigfetch) => match run(&zigfetch, start_time).await {
            Ok(()) => 0,
            Err(e) => {
                print_err(&e);
                1
            }
        },
        Err(e) => {
            print_err(&e);
            127
        }
    };
    std::process::exit(status);
}

const MAX_TERM_WIDTH: usize = 100;

fn cmd() -> Command {
    Command::new("zigfetch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Downloads the latest Zig master build for this machine")
        .arg(Arg::new("dir").long("dir").help(concat!(
            "The directory in which the archive is downloaded and extracted.",
            " Defaults to the current directory.",
        )))
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable verbose output."),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Enable debugging output."),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Suppresses most output."),
        )
        .group(ArgGroup::new("log-level").args(["verbose", "debug", "quiet"]))
        .max_term_width(MAX_TERM_WIDTH)
}

fn init_logger_from_matches(matches: &ArgMatches) -> Result<(), log::SetLoggerError> {
    let level = if matches.get_flag("debug") {
        log::LevelFilter::Debug
    } else if matches.get_flag("verbose") {
        log::LevelFilter::Info
    } else if matches.get_flag("quiet") {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Warn
    };

    zigfetch::init_logger(level)
}

fn make_zigfetch(matches: &ArgMatches) -> Result<ZigFetch> {
    let mut builder = ZigFetchBuilder::new();
    if let Some(dir) = matches.get_one::<String>("dir") {
        builder = builder.download_dir(dir);
    }
    builder.build()
}

async fn run(zigfetch: &ZigFetch, start_time: Instant) -> Result<()> {
    let download = zigfetch.download().await?;
    println!(
        "successfully downloaded the archive at: {}",
        download.archive_path().display()
    );

    println!("do you want to unzip it? - [y]/[n]");
    if !wants_extraction(&mut io::stdin().lock())? {
        report_elapsed(start_time);
        return Ok(());
    }

    let written = zigfetch.extract(&download)?;
    report_extraction(&download, written);
    report_elapsed(start_time);
    Ok(())
}

// Anything that does not start with a "y" is a no.
fn wants_extraction(input: &mut impl BufRead) -> Result<bool> {
    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read user input")?;
    Ok(answer.trim().starts_with(['y', 'Y']))
}

fn report_extraction(download: &DownloadedArchive, written: u64) {
    if download.counts_bytes() {
        println!(
            "successfully downloaded and extracted a total of {:.2}mb at: {}",
            written as f64 / 1_048_576.0,
            download.unpacked_path().display(),
        );
    } else {
        println!(
            "successfully downloaded and extracted the archive at: {}",
            download.unpacked_path().display(),
        );
    }
}

fn report_elapsed(start_time: Instant) {
    println!("time took: {:.2} seconds", start_time.elapsed().as_secs_f64());
}

fn print_err(e: &Error) {
    error!("{e:#}");
}
