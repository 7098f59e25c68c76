use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{error, info};

use synvm::{assemble, disassemble, DisassemblyOptions, Interrupt, Machine, SymbolKind};

/// synvm toolchain
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a binary program, with stdout for OUT and stdin for IN
    Run {
        /// Program to load and execute
        program: PathBuf,

        /// Stop after this many instructions
        #[arg(long)]
        max_steps: Option<u64>,
    },

    /// Assemble source into a binary program
    Asm {
        /// Assembly source file
        source: PathBuf,

        /// Output file (defaults to the source path with a `.bin` extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the symbol table after assembling
        #[arg(long)]
        symbols: bool,
    },

    /// Disassemble a binary program into source
    Disasm {
        /// Program to disassemble
        program: PathBuf,

        #[command(flatten)]
        options: DisasmFlags,
    },
}

#[derive(Args)]
struct DisasmFlags {
    /// Fold runs of OUT into !print / !println
    #[arg(long)]
    fold_output: bool,

    /// Label jump targets as :jump-N
    #[arg(long)]
    label_jumps: bool,

    /// Label call targets as :proc-N
    #[arg(long)]
    label_calls: bool,

    /// Label memory addresses as :data-N
    #[arg(long)]
    label_memory: bool,

    /// Precede every instruction with its address
    #[arg(long)]
    address_comments: bool,

    /// Enable every option above
    #[arg(long)]
    all: bool,
}

impl From<&DisasmFlags> for DisassemblyOptions {
    fn from(flags: &DisasmFlags) -> Self {
        DisassemblyOptions {
            fold_output: flags.all || flags.fold_output,
            label_jumps: flags.all || flags.label_jumps,
            label_calls: flags.all || flags.label_calls,
            label_memory: flags.all || flags.label_memory,
            address_comments: flags.all || flags.address_comments,
        }
    }
}

fn main() -> Result<()> {
    let env = env_logger::Env::default()
        .filter_or("SYNVM_LOG", "info")
        .write_style_or("SYNVM_LOG", "always");
    env_logger::init_from_env(env);

    match Cli::parse().command {
        Command::Run { program, max_steps } => run(&program, max_steps),
        Command::Asm {
            source,
            output,
            symbols,
        } => {
            let output = output.unwrap_or_else(|| source.with_extension("bin"));
            asm(&source, &output, symbols)
        }
        Command::Disasm { program, options } => disasm(&program, (&options).into()),
    }
}

fn load(path: &Path) -> Result<Machine> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {:?}", path))?;
    let machine =
        Machine::from_bytes(&bytes).with_context(|| format!("failed to load {:?}", path))?;
    info!("loaded {} words from {:?}", machine.word_count(), path);
    Ok(machine)
}

fn run(path: &Path, max_steps: Option<u64>) -> Result<()> {
    let mut machine = load(path)?;
    let mut stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();

    let start = std::time::Instant::now();
    let mut steps = 0u64;
    loop {
        if max_steps.is_some_and(|limit| steps >= limit) {
            info!("stopped after {} steps", steps);
            break;
        }
        steps += 1;

        match machine
            .step()
            .with_context(|| format!("execution failed at step {}", steps))?
        {
            Interrupt::None => {}
            Interrupt::Halt => {
                info!("halted after {} steps in {:?}", steps, start.elapsed());
                break;
            }
            Interrupt::Output(code) => {
                let ch = char::from_u32(code as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
                write!(stdout, "{}", ch).context("failed to write output")?;
            }
            Interrupt::Input(destination) => {
                stdout.flush().context("failed to flush output")?;
                let mut byte = [0u8; 1];
                if stdin.read(&mut byte).context("failed to read input")? == 0 {
                    anyhow::bail!("input closed while the program was waiting for IN");
                }
                machine.resolve(destination, byte[0] as u16)?;
            }
        }
    }

    stdout.flush().context("failed to flush output")?;
    Ok(())
}

fn asm(source: &Path, output: &Path, print_symbols: bool) -> Result<()> {
    let text = std::fs::read_to_string(source)
        .with_context(|| format!("failed to read {:?}", source))?;

    let assembled = match assemble(&text) {
        Ok(assembled) => assembled,
        Err(errors) => {
            for e in &errors {
                error!("{}", e);
            }
            anyhow::bail!("assembly of {:?} failed with {} error(s)", source, errors.len());
        }
    };

    std::fs::write(output, &assembled.bytes)
        .with_context(|| format!("failed to write {:?}", output))?;
    info!(
        "wrote {} words ({} code, {} data) to {:?}",
        assembled.words.len(),
        assembled.code_words,
        assembled.words.len() - assembled.code_words,
        output
    );

    if print_symbols {
        for symbol in &assembled.symbol_table {
            match symbol.kind {
                SymbolKind::Label => println!("{:>5} :{}", symbol.address, symbol.name),
                SymbolKind::Data { value, repeat } => println!(
                    "{:>5} .{} {} x{}",
                    symbol.address, symbol.name, value, repeat
                ),
            }
        }
    }
    Ok(())
}

fn disasm(path: &Path, options: DisassemblyOptions) -> Result<()> {
    let machine = load(path)?;
    let mut stdout = std::io::stdout().lock();
    for line in disassemble(&machine, options) {
        writeln!(stdout, "{}", line).context("failed to write output")?;
    }
    Ok(())
}
