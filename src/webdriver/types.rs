//! Tipos de dados para as respostas do wire protocol WebDriver (W3C).
//!
//! Toda resposta vem embrulhada em um envelope `{"value": ...}`; as structs
//! aqui modelam os corpos que o cliente precisa decodificar. Derivam
//! `Serialize`/`Deserialize` conforme o formato do protocolo.

use serde::{Deserialize, Serialize};

/// Chave W3C que identifica uma referência de elemento dentro do JSON.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Envelope padrão de toda resposta do driver: `{"value": ...}`.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    /// Corpo da resposta; o formato depende do comando executado.
    pub value: serde_json::Value,
}

/// Envelope de erro: `{"value": {"error": ..., "message": ...}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub value: ErrorValue,
}

/// Corpo de um erro do wire protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorValue {
    /// Código de erro W3C (ex.: "no such element", "invalid session id").
    pub error: String,
    /// Mensagem legível produzida pelo driver.
    pub message: String,
}

/// Corpo da resposta de `POST /session`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSessionValue {
    /// Identificador da sessão recém-criada.
    #[serde(rename = "sessionId")]
    pub session_id: String,
    /// Capacidades efetivamente negociadas com o navegador.
    #[serde(default)]
    pub capabilities: serde_json::Value,
}

/// Referência opaca a um elemento do DOM.
///
/// O identificador vem sob a chave [`ELEMENT_KEY`] no JSON, conforme o
/// padrão W3C; `serde(rename)` faz o mapeamento.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementRef {
    /// Identificador opaco atribuído pelo driver.
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    pub id: String,
}

/// Corpo da resposta de `POST /session/{id}/window/new`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWindowValue {
    /// Handle da nova janela ou aba.
    pub handle: String,
    /// Tipo do contexto criado ("tab" ou "window").
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_ref_uses_w3c_key() {
        let json = format!(r#"{{"{ELEMENT_KEY}": "el-42"}}"#);
        let el: ElementRef = serde_json::from_str(&json).unwrap();
        assert_eq!(el.id, "el-42");

        let back = serde_json::to_string(&el).unwrap();
        assert!(back.contains(ELEMENT_KEY));
        assert!(!back.contains("\"id\""));
    }

    #[test]
    fn new_session_value_deserializes() {
        let json = r#"{"sessionId": "abc123", "capabilities": {"browserName": "chrome"}}"#;
        let v: NewSessionValue = serde_json::from_str(json).unwrap();
        assert_eq!(v.session_id, "abc123");
        assert_eq!(v.capabilities["browserName"], "chrome");
    }

    #[test]
    fn error_envelope_deserializes() {
        let json = r#"{"value": {"error": "no such element", "message": "not found", "stacktrace": ""}}"#;
        let env: ErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.value.error, "no such element");
        assert_eq!(env.value.message, "not found");
    }

    #[test]
    fn new_window_value_deserializes() {
        let json = r#"{"handle": "CDwindow-9", "type": "tab"}"#;
        let v: NewWindowValue = serde_json::from_str(json).unwrap();
        assert_eq!(v.handle, "CDwindow-9");
        assert_eq!(v.kind, "tab");
    }
}
