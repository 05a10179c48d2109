use std::io::{self, Write};

use lumen_core::Registry;

/// Print `name<TAB>title` for every registered extension.
pub fn list(registry: &Registry) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    for extension in registry.iter() {
        writeln!(stdout, "{}\t{}", extension.name, extension.title())?;
    }
    Ok(())
}
