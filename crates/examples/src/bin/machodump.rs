//! Print the load commands and security properties of Mach-O files.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{command, Arg, ArgAction};
use macho_audit::{MachOObject, MapMode, OpenOptions};
use macho_audit_examples::dump;

fn main() -> Result<()> {
    let matches = command!()
        .max_term_width(100)
        .args(&[
            Arg::new("file")
                .action(ArgAction::Append)
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("The files to read"),
            Arg::new("read")
                .long("read")
                .action(ArgAction::SetTrue)
                .help("Read files into memory instead of mapping them"),
            Arg::new("max-size")
                .long("max-size")
                .value_name("bytes")
                .value_parser(clap::value_parser!(u64))
                .help("Skip files larger than <bytes>. 0 disables the limit"),
            Arg::new("header")
                .long("header")
                .action(ArgAction::SetTrue)
                .help("Print the mach headers"),
            Arg::new("arches")
                .long("arches")
                .action(ArgAction::SetTrue)
                .help("Print the architecture slices"),
            Arg::new("load-commands")
                .long("load-commands")
                .action(ArgAction::SetTrue)
                .help("Print the load commands"),
            Arg::new("security")
                .long("security")
                .action(ArgAction::SetTrue)
                .help("Print the security properties"),
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable verbose parser logging"),
        ])
        .get_matches();

    if matches.get_flag("verbose") {
        env_logger::builder()
            .format_level(false)
            .format_target(false)
            .filter_module("macho_audit", log::LevelFilter::Trace)
            .init();
    }

    let mut options = dump::PrintOptions {
        header: matches.get_flag("header"),
        arches: matches.get_flag("arches"),
        load_commands: matches.get_flag("load-commands"),
        security: matches.get_flag("security"),
    };
    if options == dump::PrintOptions::none() {
        options = dump::PrintOptions::all();
    }

    let mut open_options = OpenOptions::default();
    if matches.get_flag("read") {
        open_options = open_options.map_mode(MapMode::Read);
    }
    if let Some(&max_size) = matches.get_one::<u64>("max-size") {
        open_options = open_options.max_size(Some(max_size).filter(|&size| size != 0));
    }

    let file_paths = matches.get_many::<PathBuf>("file").unwrap_or_default();
    let file_count = file_paths.len();
    let stdout = io::stdout();
    let stderr = io::stderr();
    for file_path in file_paths {
        if file_count > 1 {
            println!();
            println!("{}:", file_path.display());
        }

        // A file that can't be opened is reported and skipped.
        let file = match MachOObject::open_with(file_path, &open_options)
            .with_context(|| format!("Failed to open file '{}'", file_path.display()))
        {
            Ok(file) => file,
            Err(err) => {
                eprintln!("Error: {:#}", err);
                continue;
            }
        };
        dump::print(&mut stdout.lock(), &mut stderr.lock(), &file, &options)
            .context("Failed to write output")?;
        file.release();
    }
    Ok(())
}
