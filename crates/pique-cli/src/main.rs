use clap::{Arg, Command, ValueHint};
use pique_core::estimator::ProteinEstimator;
use rand::rngs::StdRng;
use rand::SeedableRng;

mod input;
mod output;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::default()
        .filter_level(log::LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("PIQUE_LOG", "error,pique=info"))
        .init();

    let matches = Command::new("pique")
        .version(clap::crate_version!())
        .about("Protein-level FDR and q-value estimation from peptide identifications")
        .arg(
            Arg::new("parameters")
                .required(true)
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Path to configuration and identification input (JSON file)")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path for the TSV protein report. Overrides the path in the \
                     configuration file.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .get_matches();

    let path = matches
        .get_one::<String>("parameters")
        .expect("parameters argument is required");
    let input = input::Input::load(path)?;

    anyhow::ensure!(
        !input.config.mayu_fdr,
        "database-driven FDR estimation needs a live inference run; it is not \
         available when replaying a recorded ranked list"
    );

    let output_path = matches
        .get_one::<String>("output")
        .cloned()
        .or_else(|| input.output.clone());

    let mut engine = input::ReplayEngine::new(input.ranked.clone());
    let mut estimator = ProteinEstimator::new(input.config.clone(), &input.psms);
    let mut rng = StdRng::seed_from_u64(input.seed);
    estimator.run(&mut engine, None, &mut rng)?;

    let params = estimator.params();
    log::info!(
        "gamma = {}, alpha = {}, beta = {}, pi0 = {:.4}",
        params.gamma,
        params.alpha,
        params.beta,
        estimator.pi0()
    );

    match output_path {
        Some(path) => output::write_report(&path, estimator.registry())?,
        None => log::warn!("no output path given; statistics were not written"),
    }

    Ok(())
}
