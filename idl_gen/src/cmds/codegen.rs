/* Codegen command - generate Go bindings from parsed IDL documents */

use super::common::{Settings, resolve_options};
use idl_gen::codegen::{Gofmt, SourceFormatter, SyntaxCheck};
use idl_gen::loader::load_idl_files;
use idl_gen::{GenError, GoCodeGenerator};
use std::path::PathBuf;
use tracing::info;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FormatterKind {
    Gofmt,
    SyntaxCheck,
}

/* Execute the codegen command */
pub fn run(
    files: Vec<PathBuf>,
    output: Option<PathBuf>,
    settings: Settings,
    formatter: FormatterKind,
    verbose: bool,
) -> anyhow::Result<()> {
    let generator = GoCodeGenerator::new(resolve_options(settings)?);
    let options = generator.options();

    if verbose {
        eprintln!("IDL Generator - Go Binding Generation");
        eprintln!("=====================================\n");
        eprintln!("[~] Configuration:");
        eprintln!("  Formatter: {:?}", formatter);
        eprintln!("  Root interface: {}", options.root_interface);
        if let Some(package) = &options.package_name {
            eprintln!("  Package: {}", package);
        }
        match &output {
            Some(path) => eprintln!("  Output file: {}", path.display()),
            None => eprintln!("  Output file: <stdout>"),
        }
        eprintln!("  Input files: {}", files.len());
        for file in &files {
            eprintln!("    - {}", file.display());
        }
        eprintln!();
    }

    let document = load_idl_files(&files)?;

    let formatter: Box<dyn SourceFormatter> = match formatter {
        FormatterKind::Gofmt => Box::new(Gofmt::default()),
        FormatterKind::SyntaxCheck => Box::new(SyntaxCheck),
    };

    let generated = match generator.generate_formatted(&document, formatter.as_ref()) {
        Ok(generated) => generated,
        Err(err @ GenError::Format { .. }) => {
            /* dump the unformatted buffer so the defect can be located */
            if let Some(raw) = err.raw_source() {
                eprintln!("[!] Unformatted output follows:\n{}", raw);
            }
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    if verbose {
        eprintln!("[~] Package: {}", generated.package);
        eprintln!("[~] Interfaces emitted: {}", generated.interfaces.len());
        eprintln!("[~] Imports:");
        for import in &generated.imports {
            eprintln!("    - {}", import);
        }
    }
    for warning in &generated.warnings {
        eprintln!("[!] {}", warning);
    }

    match &output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &generated.source)?;
            info!(path = %path.display(), bytes = generated.source.len(), "wrote bindings");
            if verbose {
                eprintln!("[✓] Wrote {}", path.display());
            }
        }
        None => print!("{}", generated.source),
    }

    Ok(())
}
