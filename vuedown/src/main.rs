use color_eyre::eyre::{Context, Result, bail};
use log::{LevelFilter, info};
use vuedown::{
  cli::Cli,
  files::collect_inputs,
  run::{build_transformer, transform_files},
};
use vuedown_config::Config;

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  let mut config = Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")?;
  cli.apply_to(&mut config);

  let thread_count = config.jobs.unwrap_or_else(num_cpus::get);
  rayon::ThreadPoolBuilder::new()
    .num_threads(thread_count)
    .build_global()?;

  let files = collect_inputs(&cli.inputs)?;
  info!("Transforming {} documents", files.len());

  let transformer = build_transformer(&config)?;
  let outcomes = transform_files(&transformer, &files);

  let mut failed = 0;
  for outcome in &outcomes {
    match outcome.result {
      Ok(ref output) => {
        #[allow(clippy::print_stdout, reason = "Primary output")]
        {
          println!(
            "{} -> {}",
            outcome.input.display(),
            output.reference.path.display()
          );
        }
      },
      Err(_) => failed += 1,
    }
  }

  if failed > 0 {
    bail!("{failed} of {} documents failed to transform", outcomes.len());
  }

  Ok(())
}
