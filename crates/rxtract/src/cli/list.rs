use anyhow::Result;

use crate::store::RecordStore;

pub fn run(store: &RecordStore, limit: usize) -> Result<()> {
    let records = store.list(limit)?;
    if records.is_empty() {
        eprintln!("  (no stored records in {})", store.path().display());
    }
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
