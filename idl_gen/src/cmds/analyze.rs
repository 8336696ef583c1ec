/* Analyze command - vtable layout and call planning report */

use super::common::{Settings, resolve_options};
use idl_gen::GoCodeGenerator;
use idl_gen::loader::load_idl_files;
use std::path::PathBuf;

/* Execute the analyze command */
pub fn run(files: Vec<PathBuf>, settings: Settings, print_source: bool) -> anyhow::Result<()> {
    println!("IDL Generator - Interface Analysis Tool");
    println!("=======================================\n");

    let options = resolve_options(settings)?;
    let document = load_idl_files(&files)?;
    println!("[~] Loaded {} file(s), {} top-level node(s)", files.len(), document.nodes.len());
    println!("[~] Root interface: {}\n", options.root_interface);

    let generator = GoCodeGenerator::new(options);
    let generated = generator.generate(&document)?;

    for summary in &generated.interfaces {
        let layout = &summary.layout;
        println!("[*] {} : {}", layout.interface, layout.parent);
        match (&layout.root, layout.total_slots()) {
            (Some(root), Some(total)) => {
                println!("    Root: {} ({} slot(s))", root, layout.root_slots.unwrap_or(0));
                println!("    Vtable width: {}", total);
            }
            _ => println!("    Root: unknown (parent declared outside this document)"),
        }

        println!(
            "    Slots: {} inherited, {} declared here",
            layout.inherited().len(),
            layout.own().len()
        );
        for slot in &layout.slots {
            let index = slot
                .index
                .map(|i| i.to_string())
                .unwrap_or_else(|| "?".to_string());
            println!("      [{:>3}] {}::{}", index, slot.interface, slot.method);
        }

        println!("    Methods:");
        for stub in &summary.methods {
            println!(
                "      {} -> syscall.{} ({} argument word(s) + receiver = {} of {}, {} padding)",
                stub.ident,
                stub.call.tier.function,
                stub.slot_count(),
                stub.call.total_slots,
                stub.call.tier.arity,
                stub.call.padding()
            );
            for param in &stub.params {
                println!(
                    "        {:<16} {:?}, {} slot(s)",
                    param.ident,
                    param.strategy,
                    param.strategy.slot_count()
                );
            }
        }
        println!();
    }

    println!("[~] Imports:");
    for import in &generated.imports {
        println!("    - {}", import);
    }

    if !generated.warnings.is_empty() {
        println!("\n[!] Warnings:");
        for warning in &generated.warnings {
            println!("    - {}", warning);
        }
    }

    if print_source {
        println!("\n[~] Unformatted source:\n");
        print!("{}", generated.source);
    }

    Ok(())
}
