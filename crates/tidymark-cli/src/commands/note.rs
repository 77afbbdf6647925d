//! `tidymark note` and `tidymark series` - note generation.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tidymark_core::Notebook;

pub fn generate(notebook: &mut Notebook, date: Option<&str>, force: bool) -> Result<()> {
    let date = resolve_date(notebook, date)?;
    if notebook.make_note(date, force)? {
        println!("Wrote note for {date}.");
    } else {
        println!("Note for {date} already exists - skipping.");
    }
    Ok(())
}

pub fn series(notebook: &mut Notebook, start: Option<&str>, count: u32) -> Result<()> {
    let start = resolve_date(notebook, start)?;
    let created = notebook.make_series(start, count)?;
    println!("Created {created} of {count} notes starting {start}.");
    Ok(())
}

fn resolve_date(notebook: &Notebook, input: Option<&str>) -> Result<NaiveDate> {
    match input {
        Some(raw) => Ok(notebook.config().parse_date(raw)?),
        None => Ok(Local::now().date_naive()),
    }
}
