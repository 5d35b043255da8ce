//! Command-line surface, parsed with `clap`'s derive API.

use clap::Parser;

#[derive(Debug, Parser)]
#[clap(name = "atpg-solve", about = "combinational stuck-at ATPG over an ISCAS-89 netlist")]
pub struct Cli {
    /// Path to the ISCAS-89 netlist to process.
    pub netlist: String,

    /// Wall-clock budget for the whole run, in seconds. 0 means unbounded.
    #[clap(long, default_value_t = 0)]
    pub total_time_s: u64,

    /// Print each fault's description before solving it.
    #[clap(long)]
    pub print_faults: bool,

    /// Print the detecting input vector for every detectable fault.
    #[clap(long)]
    pub print_solutions: bool,

    /// Print a DETECTABLE/REDUNDANT tag per fault.
    #[clap(long)]
    pub print_detectability: bool,

    /// Fraction of primary outputs below which the cone-only CNF is used
    /// instead of the cached whole-circuit CNF.
    #[clap(long, default_value_t = 0.6)]
    pub threshold_ratio: f64,

    /// Print only the final one-line summary.
    #[clap(long)]
    pub short_stats: bool,

    /// Increase log verbosity (passed through to `env_logger` if RUST_LOG
    /// is unset).
    #[clap(short, long, parse(from_occurrences))]
    pub verbose: u8,
}
