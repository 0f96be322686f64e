// Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

mod regs_gen;

#[derive(Parser, Debug)]
#[command(
    name = "xtask",
    author,
    version,
    about = "Register map tasks for the oscillator FPGA"
)]
struct Xtask {
    /// Log compiler decisions (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    xtask: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a register map and generate accessors
    RegsGen {
        /// Device description (TOML)
        #[arg(short, long, value_name = "FILE", default_value = "hw/lwdo_regs.toml")]
        desc: PathBuf,

        /// Built-in profile name (bus32, bus16) or profile file (TOML)
        #[arg(short, long, default_value = "bus32")]
        profile: String,

        /// Output format: c-header, cpp, tock or json
        #[arg(short, long, default_value = "c-header")]
        format: regs_gen::Format,

        /// Symbol prefix, defaults to the device name
        #[arg(long)]
        prefix: Option<String>,

        /// List reserved padding in the accessor table
        #[arg(long, default_value_t = false)]
        reserved: bool,

        /// Blocks or block.register names left out of the accessor table
        #[arg(long, value_name = "NAME")]
        exclude: Vec<String>,

        /// Output file, stdout if omitted
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Compile a register map for every profile and check the generated
    /// C header is up to date
    RegsCheck {
        /// Device description (TOML)
        #[arg(short, long, value_name = "FILE", default_value = "hw/lwdo_regs.toml")]
        desc: PathBuf,

        /// Profiles to compile
        #[arg(short, long, value_delimiter = ',', default_value = "bus32,bus16")]
        profiles: Vec<String>,

        /// Checked-in header generated with the first profile
        #[arg(long, value_name = "FILE", default_value = "hw/generated/lwdo_regs.h")]
        header: PathBuf,
    },
}

fn main() {
    let cli = Xtask::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(err) = SimpleLogger::new().with_level(level).init() {
        eprintln!("failed to initialize logging: {err}");
    }

    let result = match &cli.xtask {
        Commands::RegsGen {
            desc,
            profile,
            format,
            prefix,
            reserved,
            exclude,
            output,
        } => regs_gen::generate(
            desc,
            profile,
            *format,
            prefix.as_deref(),
            *reserved,
            exclude,
            output.as_deref(),
        ),
        Commands::RegsCheck {
            desc,
            profiles,
            header,
        } => regs_gen::check(desc, profiles, header),
    };
    result.unwrap_or_else(|e| {
        eprintln!("{:#}", e);
        std::process::exit(-1);
    });
}
