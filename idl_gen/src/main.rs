use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cmds;

#[derive(Parser)]
#[command(name = "idl-gen")]
#[command(about = "Go binding generator for COM interfaces described in IDL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Generate a Go source file from parsed IDL documents */
    Codegen {
        /* Parsed IDL documents (YAML, or JSON by extension) */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Output file; standard output when omitted */
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: Option<PathBuf>,

        /* Go package name, overriding the document and the config file */
        #[arg(short = 'p', long = "package", value_name = "NAME")]
        package: Option<String>,

        /* Base interface for interfaces that declare no parent */
        #[arg(long = "root-interface", value_name = "NAME")]
        root_interface: Option<String>,

        /* Generator config file (YAML) */
        #[arg(short = 'c', long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /* Formatter the generated buffer must pass before it is written */
        #[arg(long = "formatter", value_enum, default_value = "gofmt")]
        formatter: Formatter,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /* Show vtable layouts and per-method call planning without writing code */
    Analyze {
        /* Parsed IDL documents (YAML, or JSON by extension) */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Base interface for interfaces that declare no parent */
        #[arg(long = "root-interface", value_name = "NAME")]
        root_interface: Option<String>,

        /* Generator config file (YAML) */
        #[arg(short = 'c', long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /* Print the unformatted Go source after the report */
        #[arg(long = "print-source")]
        print_source: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum Formatter {
    /* Pipe through the gofmt binary */
    Gofmt,
    /* Bracket balance check only, for hosts without a Go toolchain */
    Check,
}

impl From<Formatter> for cmds::codegen::FormatterKind {
    fn from(formatter: Formatter) -> Self {
        match formatter {
            Formatter::Gofmt => cmds::codegen::FormatterKind::Gofmt,
            Formatter::Check => cmds::codegen::FormatterKind::SyntaxCheck,
        }
    }
}

fn init_tracing(verbose: bool) {
    /* RUST_LOG wins; otherwise verbose shows per-node debug output */
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Codegen {
            files,
            output,
            package,
            root_interface,
            config,
            formatter,
            verbose,
        } => {
            init_tracing(verbose);
            let settings = cmds::common::Settings {
                config,
                package,
                root_interface,
            };
            cmds::codegen::run(files, output, settings, formatter.into(), verbose)?;
        }

        Commands::Analyze {
            files,
            root_interface,
            config,
            print_source,
        } => {
            init_tracing(false);
            let settings = cmds::common::Settings {
                config,
                package: None,
                root_interface,
            };
            cmds::analyze::run(files, settings, print_source)?;
        }
    }

    Ok(())
}
