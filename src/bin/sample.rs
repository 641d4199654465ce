use std::error::Error;
use std::io::{self, Write};

use log::info;
use redblack::RBTree;

/// Reads the log level from `REDBLACK_LOG` (e.g. `trace`), defaulting to `warn`.
fn initialize_logging() -> Result<(), Box<dyn Error>> {
    use simplelog::*;
    let level = match std::env::var("REDBLACK_LOG") {
        Ok(level) => level.parse::<LevelFilter>()?,
        Err(_) => LevelFilter::Warn,
    };
    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;
    Ok(())
}

fn run<W: Write>(mut out: W) -> io::Result<()> {
    let mut tree = RBTree::new();

    let samples = [
        ("k", "카카오"),
        ("g", "구글"),
        ("a", "애플"),
        ("n", "네이버"),
        ("b", "배달의민족"),
    ];
    for (key, value) in samples {
        tree.insert(key, value);
    }
    info!("inserted {} samples", tree.len());

    tree.delete("g");

    if let Some(node) = tree.search("n") {
        writeln!(out, "key {:?} => {}", node.key(), node.value())?;
    }

    writeln!(out, "\n=== RBTree 구조 ===")?;
    tree.print(&mut out)
}

fn main() -> Result<(), Box<dyn Error>> {
    initialize_logging()?;
    run(io::stdout().lock())?;
    Ok(())
}
