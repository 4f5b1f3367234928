use clap::Parser;
use miette::Result;
use occ::cli::{commands, Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    // Logs go to stderr so stdout stays parseable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("occ=warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let global = &cli.global;

    match cli.command {
        Commands::New(args) => commands::new::run(args, global),
        Commands::List(args) => commands::list::run(args, global),
        Commands::Show(args) => commands::show::run(args, global),
        Commands::Triage(args) => commands::triage::run(args, global),
        Commands::AckSentinel(args) => commands::triage::run_ack(args, global),
        Commands::Transition(args) => commands::transition::run(args, global),
        Commands::Outcome(args) => commands::outcome::run(args, global),
        Commands::Capa(cmd) => commands::capa::run(cmd, global),
        Commands::Forward(args) => commands::forward::run(args, global),
        Commands::Inform(args) => commands::forward::run_inform(args, global),
        Commands::Log(args) => commands::log::run(args, global),
        Commands::Validate(args) => commands::validate::run(args, global),
    }
}
