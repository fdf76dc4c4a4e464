use clinic_sim::cli::{self, Command, FormatArg};
use clinic_sim::config;
use clinic_sim::engine;
use clinic_sim::error::Result;
use clinic_sim::output::{
    format_config, Formatter, HumanFormatter, JsonFormatter, SummaryFormatter,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::parse_args()?;
    match cli.command {
        Some(Command::ShowConfig(args)) => {
            let (config, _) = config::build_config(args)?;
            print!("{}", format_config(&config));
        }
        Some(Command::Run(args)) => simulate(args)?,
        None => simulate(cli.run)?,
    }
    Ok(())
}

fn simulate(args: cli::RunArgs) -> Result<()> {
    let (config, format) = config::build_config(args)?;
    let result = engine::run_simulation(&config)?;

    let formatter = formatter_for(&format);
    let output = formatter.write(&result)?;
    print!("{}", output);

    Ok(())
}

fn formatter_for(format: &FormatArg) -> Box<dyn Formatter> {
    match format {
        FormatArg::Human => Box::new(HumanFormatter),
        FormatArg::Summary => Box::new(SummaryFormatter),
        FormatArg::Json => Box::new(JsonFormatter),
    }
}
