// pagekeep/src/cli/completion.rs
use crate::cli::args::Cli;
use clap::CommandFactory;
use clap_complete::{
    generate,
    shells::{Bash, Fish, Zsh},
};
use std::io::{self, Write};
use tracing::{debug, instrument};

/// Writes the completion script for `shell` ("bash", "zsh" or "fish") to `out`.
///
/// ```bash
/// eval "$(pagekeep completion bash)"
/// ```
#[instrument(level = "debug", skip(out))]
pub fn generate_completion(shell: &str, out: &mut dyn Write) -> io::Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    match shell.to_lowercase().as_str() {
        "bash" => generate(Bash, &mut cmd, bin_name, out),
        "zsh" => generate(Zsh, &mut cmd, bin_name, out),
        "fish" => generate(Fish, &mut cmd, bin_name, out),
        _ => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Unsupported shell: {}. Supported shells: bash, zsh, fish",
                    shell
                ),
            ))
        }
    }
    debug!("Generated {} completion", shell);
    Ok(())
}
