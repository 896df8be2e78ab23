use std::path::Path;

use anyhow::Result;

use super::read_input;

pub fn run(path: Option<&Path>) -> Result<()> {
    let cleaned = rxtract_core::clean(&read_input(path)?);
    if !cleaned.is_empty() {
        println!("{cleaned}");
    }
    Ok(())
}
