use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the subcommands from src/main.rs
// We need to duplicate this here since build scripts can't access src/ modules
fn input() -> Arg {
    Arg::new("input")
        .help("Markdown or text file")
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn output() -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .value_hint(ValueHint::AnyPath)
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("mdmath")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Markdown with LaTeX math to HTML and documents, keeping formulas editable")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(Command::new("preview").arg(input()).arg(output()))
        .subcommand(
            Command::new("insert")
                .arg(input())
                .arg(Arg::new("standalone").long("standalone").action(ArgAction::SetTrue))
                .arg(Arg::new("report").long("report").action(ArgAction::SetTrue))
                .arg(output()),
        )
        .subcommand(
            Command::new("export")
                .arg(input())
                .arg(
                    Arg::new("exporter")
                        .long("exporter")
                        .value_parser(["altchunk", "pandoc"]),
                )
                .arg(output()),
        )
        .subcommand(
            Command::new("formulas")
                .arg(input())
                .arg(Arg::new("normalized").long("normalized").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("watch")
                .arg(input())
                .arg(output())
                .arg(Arg::new("once").long("once").action(ArgAction::SetTrue)),
        )
        .subcommand(Command::new("generate-css"));

    generate_to(Bash, &mut cmd, "mdmath", &outdir)?;
    generate_to(Zsh, &mut cmd, "mdmath", &outdir)?;
    generate_to(Fish, &mut cmd, "mdmath", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
