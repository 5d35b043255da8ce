use std::fs;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info};

use atpg_solve::fault::{Fault, FaultCnfMaker, FaultManager};
use atpg_solve::graph::CircuitGraph;
use atpg_solve::parser;
use atpg_solve::solver::{KissatSolver, SatSolver, SolveResult, SolverSink};

mod cli;
use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

struct Tally {
    detectable: usize,
    undetectable: usize,
    unknown: usize,
}

fn run(cli: &Cli) -> Result<()> {
    let t_total = Instant::now();

    let source = fs::read_to_string(&cli.netlist)
        .with_context(|| format!("reading netlist {:?}", cli.netlist))?;

    let t_parse = Instant::now();
    let graph = parser::parse(&source).map_err(anyhow::Error::from)?;
    let parse_time = t_parse.elapsed();
    info!(
        "{} ({} lines, {} gates, {})",
        "parsed netlist",
        graph.lines().len(),
        graph.gates().len(),
        stats_string(&graph)
    );

    let mut solver = KissatSolver::new();

    let t_faults = Instant::now();
    let faults = FaultManager::enumerate(&graph);
    let fault_gen_time = t_faults.elapsed();
    info!("{} stuck-at faults enumerated", faults.len());

    let mut maker = FaultCnfMaker::new(cli.threshold_ratio);
    let budget = if cli.total_time_s == 0 {
        None
    } else {
        Some(Duration::from_secs(cli.total_time_s))
    };

    let mut tally = Tally {
        detectable: 0,
        undetectable: 0,
        unknown: 0,
    };
    let mut cnf_time = Duration::ZERO;
    let mut solve_time = Duration::ZERO;
    let mut worst_solve = Duration::ZERO;

    for fault in &faults {
        if let Some(budget) = budget {
            if t_total.elapsed() >= budget {
                debug!("time budget exhausted, remaining faults reported unknown");
                tally.unknown += 1;
                continue;
            }
        }

        if cli.print_faults {
            println!("{}", fault.report(&graph));
        }

        let t_cnf = Instant::now();
        solver.reset();
        let mut sink = SolverSink::new(&mut solver);
        maker.make_fault(&graph, fault, &mut sink);
        cnf_time += t_cnf.elapsed();

        let t_solve = Instant::now();
        let result = solver.solve_prepared();
        let this_solve = t_solve.elapsed();
        solve_time += this_solve;
        worst_solve = worst_solve.max(this_solve);

        report_result(&graph, fault, result, &solver, cli, &mut tally);
    }

    let total_time = t_total.elapsed();
    print_summary(
        cli,
        &faults,
        &tally,
        parse_time,
        fault_gen_time,
        cnf_time,
        solve_time,
        worst_solve,
        total_time,
    );

    Ok(())
}

fn stats_string(graph: &CircuitGraph) -> String {
    let mut parts: Vec<String> = graph
        .gate_type_histogram()
        .into_iter()
        .map(|(ty, n)| format!("{}={}", ty, n))
        .collect();
    parts.sort();
    parts.join(" ")
}

fn report_result(
    graph: &CircuitGraph,
    fault: &Fault,
    result: SolveResult,
    solver: &impl SatSolver,
    cli: &Cli,
    tally: &mut Tally,
) {
    match result {
        SolveResult::Sat => {
            tally.detectable += 1;
            if cli.print_detectability {
                println!("===DETECTABLE===");
            }
            if cli.print_solutions {
                let vector: Vec<&str> = graph
                    .inputs()
                    .iter()
                    .map(|&line| {
                        let v = solver.value(line.literal());
                        if v <= 0 {
                            "0"
                        } else {
                            "1"
                        }
                    })
                    .collect();
                println!("{}", vector.join(""));
            }
        }
        SolveResult::Unsat => {
            tally.undetectable += 1;
            if cli.print_detectability {
                println!("===REDUNDANT====");
            }
        }
        SolveResult::Unknown => {
            tally.unknown += 1;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn print_summary(
    cli: &Cli,
    faults: &[Fault],
    tally: &Tally,
    parse_time: Duration,
    fault_gen_time: Duration,
    cnf_time: Duration,
    solve_time: Duration,
    worst_solve: Duration,
    total_time: Duration,
) {
    if cli.short_stats {
        println!(
            "total={} detectable={} undetectable={} unknown={} total_time={:?}",
            faults.len(),
            tally.detectable,
            tally.undetectable,
            tally.unknown,
            total_time
        );
        return;
    }

    println!("total faults:     {}", faults.len());
    println!("detectable:       {}", tally.detectable);
    println!("undetectable:     {}", tally.undetectable);
    println!("unknown (budget): {}", tally.unknown);
    println!("--- timings ---");
    println!("parse:            {:?}", parse_time);
    println!("fault generation: {:?}", fault_gen_time);
    println!("cnf generation:   {:?}", cnf_time);
    println!("solving:          {:?}", solve_time);
    println!("worst solve:      {:?}", worst_solve);
    println!("total:            {:?}", total_time);
}
