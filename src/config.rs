//! Configuração do snowwatch carregada a partir de `snowwatch.toml`.
//!
//! A struct [`SnowwatchConfig`] contém todos os parâmetros configuráveis,
//! agrupados por seção. Valores não presentes no arquivo usam defaults
//! sensíveis. As variáveis de ambiente `SNOWWATCH_USER` e
//! `SNOWWATCH_PASSWORD` têm precedência sobre o arquivo.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuração de nível superior carregada de `snowwatch.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnowwatchConfig {
    /// URLs e credenciais do portal ServiceNow.
    #[serde(default)]
    pub portal: PortalConfig,

    /// Parâmetros do laço de triagem.
    #[serde(default)]
    pub triage: TriageConfig,

    /// Diretórios e nomes de arquivo dos registros persistentes.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Endpoint de status e notificação sonora.
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Seção `[portal]`: alvo da automação.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// URL base da instância (ex.: "https://empresa.service-now.com").
    #[serde(default)]
    pub base_url: String,

    /// URL da lista de incidentes a vigiar (estado novo / grupo da equipe).
    #[serde(default)]
    pub list_url: String,

    /// Usuário corporativo. Sobrescrito por `SNOWWATCH_USER`.
    #[serde(default)]
    pub username: String,

    /// Senha corporativa. Sobrescrita por `SNOWWATCH_PASSWORD`.
    #[serde(default)]
    pub password: String,

    /// Endpoint do WebDriver local (chromedriver).
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
}

/// Seção `[triage]`: ritmo e limites do laço.
#[derive(Debug, Clone, Deserialize)]
pub struct TriageConfig {
    /// Segundos entre ciclos de descoberta.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Janela em segundos de cada leitura interativa com contagem regressiva.
    #[serde(default = "default_prompt_timeout_secs")]
    pub prompt_timeout_secs: u64,

    /// Espera fixa após perda de sessão ou erro de ciclo.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,

    /// Espera de assentamento após o submit do formulário.
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,

    /// Prefixo dos números de ticket reconhecidos.
    #[serde(default = "default_ticket_prefix")]
    pub ticket_prefix: String,

    /// Códigos de estado terminais, verificados apenas em leitura.
    /// Valor fornecido externamente; nenhuma semântica adicional é inferida.
    #[serde(default = "default_closed_states")]
    pub closed_states: Vec<String>,
}

/// Seção `[storage]`: onde os registros são gravados.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Diretório local (escolha padrão no startup).
    #[serde(default = "default_local_dir")]
    pub local_dir: String,

    /// Diretório compartilhado (drive sincronizado); vazio desabilita a opção.
    #[serde(default)]
    pub shared_dir: String,

    /// Nome do arquivo de log histórico.
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Nome do arquivo de log "live" (segundo sink independente).
    #[serde(default = "default_live_file")]
    pub live_file: String,

    /// Nome do arquivo da memória de decisões (append-only).
    #[serde(default = "default_memory_file")]
    pub memory_file: String,
}

/// Seção `[monitor]`: endpoint de status e som.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Porta do endpoint HTTP de status.
    #[serde(default = "default_monitor_port")]
    pub port: u16,

    /// Comando externo para tocar a notificação (ex.: "paplay chime.wav").
    #[serde(default)]
    pub sound_command: Option<String>,
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_prompt_timeout_secs() -> u64 {
    60
}

fn default_backoff_secs() -> u64 {
    5
}

fn default_settle_secs() -> u64 {
    3
}

fn default_ticket_prefix() -> String {
    "INC".to_string()
}

fn default_closed_states() -> Vec<String> {
    vec!["6".to_string(), "7".to_string(), "8".to_string()]
}

fn default_local_dir() -> String {
    ".".to_string()
}

fn default_log_file() -> String {
    "snowwatch.log".to_string()
}

fn default_live_file() -> String {
    "live.log".to_string()
}

fn default_memory_file() -> String {
    "decisions.log".to_string()
}

fn default_monitor_port() -> u16 {
    8000
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            list_url: String::new(),
            username: String::new(),
            password: String::new(),
            webdriver_url: default_webdriver_url(),
        }
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            prompt_timeout_secs: default_prompt_timeout_secs(),
            backoff_secs: default_backoff_secs(),
            settle_secs: default_settle_secs(),
            ticket_prefix: default_ticket_prefix(),
            closed_states: default_closed_states(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_dir: default_local_dir(),
            shared_dir: String::new(),
            log_file: default_log_file(),
            live_file: default_live_file(),
            memory_file: default_memory_file(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            port: default_monitor_port(),
            sound_command: None,
        }
    }
}

impl PortalConfig {
    /// URL de login (dashboard); derivada da base.
    pub fn login_url(&self) -> String {
        format!("{}/nav_to.do?uri=%2F$pa_dashboard.do", self.base_url)
    }

    /// URL do formulário de um incidente específico.
    pub fn ticket_url(&self, ticket_id: &str) -> String {
        format!(
            "{}/incident.do?sysparm_query=number={ticket_id}",
            self.base_url
        )
    }
}

impl TriageConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.prompt_timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

impl StorageConfig {
    /// Diretório efetivo conforme a escolha de armazenamento do operador.
    pub fn base_dir(&self, use_shared: bool) -> PathBuf {
        if use_shared && !self.shared_dir.is_empty() {
            PathBuf::from(&self.shared_dir)
        } else {
            PathBuf::from(&self.local_dir)
        }
    }

    pub fn log_path(&self, use_shared: bool) -> PathBuf {
        self.base_dir(use_shared).join(&self.log_file)
    }

    pub fn live_path(&self, use_shared: bool) -> PathBuf {
        self.base_dir(use_shared).join(&self.live_file)
    }

    pub fn memory_path(&self, use_shared: bool) -> PathBuf {
        self.base_dir(use_shared).join(&self.memory_file)
    }
}

impl SnowwatchConfig {
    /// Carrega a configuração do caminho fornecido, ou de `snowwatch.toml`
    /// no diretório atual. Usa valores padrão se o arquivo não existir.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let default_path = Path::new("snowwatch.toml");
        let path = path.unwrap_or(default_path);
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<SnowwatchConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variáveis de ambiente têm precedência sobre o arquivo para credenciais.
        if let Ok(user) = std::env::var("SNOWWATCH_USER")
            && !user.is_empty()
        {
            config.portal.username = user;
        }
        if let Ok(password) = std::env::var("SNOWWATCH_PASSWORD")
            && !password.is_empty()
        {
            config.portal.password = password;
        }

        Ok(config)
    }

    /// Credenciais presentes? Ausência é uma das duas condições fatais de startup.
    pub fn has_credentials(&self) -> bool {
        !self.portal.username.is_empty() && !self.portal.password.is_empty()
    }
}
