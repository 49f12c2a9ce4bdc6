//! Schema command - print the expected portfolio input format

use crate::cmd::PortfolioInput;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let schema = schema_for!(PortfolioInput);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }
}
