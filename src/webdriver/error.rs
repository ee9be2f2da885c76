//! Tipos de erro para o cliente do protocolo WebDriver.
//!
//! Define [`DriverError`] com variantes para sessão inválida, elemento
//! ausente/obsoleto, esperas esgotadas e erros de protocolo ou rede.
//! Usa `thiserror` para derivar `Display` e `Error` automaticamente a
//! partir dos atributos `#[error(...)]`.

use thiserror::Error;

use super::types::ErrorValue;

/// Erros que podem ocorrer ao conversar com o endpoint WebDriver.
///
/// As variantes cobrem os cenários de falha relevantes para o supervisor:
/// - [`InvalidSession`](DriverError::InvalidSession) — a sessão morreu e
///   precisa ser recriada por inteiro
/// - [`NoSuchElement`](DriverError::NoSuchElement) / [`StaleElement`](DriverError::StaleElement)
///   — falhas de localização de elemento, nunca fatais
/// - [`Timeout`](DriverError::Timeout) — uma espera limitada se esgotou
/// - [`Protocol`](DriverError::Protocol) — qualquer outro erro do wire protocol
/// - [`Network`](DriverError::Network) — falha na camada HTTP subjacente
#[derive(Debug, Error)]
pub enum DriverError {
    /// A sessão de automação não existe mais no lado do driver.
    #[error("invalid session: the automation session is no longer usable")]
    InvalidSession,

    /// O seletor não localizou nenhum elemento na página atual.
    #[error("no such element: {0}")]
    NoSuchElement(String),

    /// O elemento foi destacado do DOM entre a localização e a leitura.
    #[error("stale element reference")]
    StaleElement,

    /// Uma espera limitada expirou antes da condição se tornar verdadeira.
    #[error("timed out waiting for {0}")]
    Timeout(String),

    /// Erro retornado pelo driver (código de erro W3C + mensagem).
    #[error("webdriver error (status {status}): {error}: {message}")]
    Protocol {
        status: u16,
        error: String,
        message: String,
    },

    /// Falha de rede subjacente (conexão recusada, DNS, timeout HTTP).
    /// Encapsula o erro original do `reqwest` via `#[from]`.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl DriverError {
    /// Converte um corpo de erro do wire protocol na variante adequada.
    ///
    /// Os códigos de erro W3C relevantes ("invalid session id",
    /// "no such element", "stale element reference") viram variantes
    /// dedicadas; o restante cai em [`DriverError::Protocol`].
    pub fn from_wire(status: u16, value: ErrorValue) -> Self {
        match value.error.as_str() {
            "invalid session id" => DriverError::InvalidSession,
            "no such element" => DriverError::NoSuchElement(value.message),
            "stale element reference" => DriverError::StaleElement,
            _ => DriverError::Protocol {
                status,
                error: value.error,
                message: value.message,
            },
        }
    }

    /// Predicado de recuperação do supervisor: a sessão precisa ser
    /// derrubada e reconstruída por inteiro?
    pub fn is_session_loss(&self) -> bool {
        matches!(
            self,
            DriverError::InvalidSession | DriverError::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_session_from_wire() {
        let err = DriverError::from_wire(
            404,
            ErrorValue {
                error: "invalid session id".into(),
                message: "session deleted".into(),
            },
        );
        assert!(matches!(err, DriverError::InvalidSession));
        assert!(err.is_session_loss());
    }

    #[test]
    fn no_such_element_from_wire() {
        let err = DriverError::from_wire(
            404,
            ErrorValue {
                error: "no such element".into(),
                message: "css selector .missing".into(),
            },
        );
        assert!(matches!(err, DriverError::NoSuchElement(_)));
        assert!(!err.is_session_loss());
    }

    #[test]
    fn stale_element_from_wire() {
        let err = DriverError::from_wire(
            400,
            ErrorValue {
                error: "stale element reference".into(),
                message: "element is stale".into(),
            },
        );
        assert!(matches!(err, DriverError::StaleElement));
    }

    #[test]
    fn unknown_code_maps_to_protocol() {
        let err = DriverError::from_wire(
            500,
            ErrorValue {
                error: "javascript error".into(),
                message: "boom".into(),
            },
        );
        assert_eq!(
            err.to_string(),
            "webdriver error (status 500): javascript error: boom"
        );
    }

    #[test]
    fn timeout_is_not_session_loss() {
        assert!(!DriverError::Timeout("login form".into()).is_session_loss());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DriverError>();
    }
}
