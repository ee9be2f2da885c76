//! Interface de terminal do snowwatch — banners, prompts e saída colorida.
//!
//! Usa as crates `console` para estilização com cores e `indicatif` para o
//! spinner exibido durante as esperas do laço. Os banners têm largura fixa
//! de 92 colunas, com o texto centralizado entre duas linhas divisórias.

use std::io::Write;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::livelog::LiveLog;

/// Largura das linhas divisórias e dos banners.
pub const LINE_LENGTH: usize = 92;

pub fn divider() -> String {
    "-".repeat(LINE_LENGTH)
}

pub fn heavy_divider() -> String {
    "=".repeat(LINE_LENGTH)
}

/// Centraliza o texto dentro da largura padrão.
pub fn centered(text: &str) -> String {
    let padding = LINE_LENGTH.saturating_sub(text.chars().count()) / 2;
    format!("{}{text}", " ".repeat(padding))
}

/// Registra um banner de três linhas (divisória, texto centralizado, divisória).
pub fn banner(log: &LiveLog, text: &str) {
    log.add(&divider());
    log.add(&centered(text));
    log.add(&divider());
}

/// Pergunta Y/N bloqueante usada apenas na sequência de startup.
/// Entradas inválidas repetem a pergunta.
pub fn ask_yes_no(question: &str) -> bool {
    loop {
        print!("{question} (Y/N): ");
        let _ = std::io::stdout().flush();
        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        match answer.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!(
                "    {}",
                Style::new()
                    .red()
                    .apply_to("invalid input, please enter Y or N")
            ),
        }
    }
}

/// Lê uma linha do console com um rótulo, retornando-a já sem espaços.
pub fn ask_line(label: &str) -> String {
    print!("{label}");
    let _ = std::io::stdout().flush();
    let mut answer = String::new();
    let _ = std::io::stdin().read_line(&mut answer);
    answer.trim().to_string()
}

/// Spinner exibido durante esperas do laço (login, intervalo entre ciclos).
pub struct PollPulse {
    pb: ProgressBar,
}

impl PollPulse {
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
