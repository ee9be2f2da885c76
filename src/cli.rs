//! Interface de linha de comando do snowwatch baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (run, memory)
//! e flags globais (--config, --poll-interval, --prompt-timeout, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// snowwatch — vigia de fila de incidentes com replay de decisões.
#[derive(Debug, Parser)]
#[command(name = "snowwatch", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho para o arquivo de configuração (padrão: snowwatch.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Intervalo entre ciclos de descoberta, em segundos.
    #[arg(long, global = true)]
    pub poll_interval: Option<u64>,

    /// Janela das leituras interativas com contagem regressiva, em segundos.
    #[arg(long, global = true)]
    pub prompt_timeout: Option<u64>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Executa o laço de triagem contra o portal configurado.
    Run,

    /// Lista as resoluções lembradas na memória de decisões e sai.
    Memory {
        /// Lê do diretório compartilhado em vez do local.
        #[arg(long, default_value_t = false)]
        shared: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_run_subcommand() {
        let cli = Cli::parse_from(["snowwatch", "run"]);
        assert!(matches!(cli.command, Command::Run));
        assert!(!cli.verbose);
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "snowwatch",
            "--poll-interval",
            "10",
            "--prompt-timeout",
            "30",
            "--verbose",
            "run",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.poll_interval, Some(10));
        assert_eq!(cli.prompt_timeout, Some(30));
    }

    #[test]
    fn cli_parses_memory_subcommand() {
        let cli = Cli::parse_from(["snowwatch", "memory", "--shared"]);
        match cli.command {
            Command::Memory { shared } => assert!(shared),
            _ => panic!("expected Memory command"),
        }
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
