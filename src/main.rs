//! code-assistant: fetch repositories, read their files and manage scratch storage
//! from the command line.

use anyhow::Result;

fn main() -> Result<()> {
    code_assistant::cli::run()
}
