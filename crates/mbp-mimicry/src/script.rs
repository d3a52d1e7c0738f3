//! Сценарии tone-burst: данные, по которым работает движок
//!
//! Сценарий — упорядоченная последовательность шагов «сказать»/«слушать»,
//! выбранная по паре (имитируемый протокол, роль). Он строится один раз из
//! статических данных профиля и не несёт состояния соединения, поэтому
//! безопасно разделяется между сессиями.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::text::StructuredText;

/// Шаг сценария tone-burst
#[derive(Debug, Clone)]
pub enum ToneBurstStep {
    /// Отправить отрисованный текст дословно
    Speak(StructuredText),
    /// Ждать совпадения грамматики, прочитав не более `max_bytes` байт
    Listen {
        /// Ожидаемая грамматика
        expected: StructuredText,
        /// Лимит прочитанных байт на шаг
        max_bytes: usize,
    },
}

/// Упорядоченный сценарий шагов для одной роли
#[derive(Debug, Clone)]
pub struct ToneBurstScript {
    steps: Vec<ToneBurstStep>,
}

impl ToneBurstScript {
    /// Построить сценарий из последовательности шагов
    pub fn new(steps: Vec<ToneBurstStep>) -> Self {
        Self { steps }
    }

    /// Шаги сценария
    pub fn steps(&self) -> &[ToneBurstStep] {
        &self.steps
    }

    /// Количество шагов
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Пуст ли сценарий
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Имитируемый протокол
///
/// Для `Pop3` сценарии пока не определены: выбор этой пары завершается
/// ошибкой `Unimplemented`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MimicProtocol {
    /// Почтовая сессия SMTP
    Smtp,
    /// Почтовая сессия POP3
    Pop3,
}

impl fmt::Display for MimicProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MimicProtocol::Smtp => write!(f, "smtp"),
            MimicProtocol::Pop3 => write!(f, "pop3"),
        }
    }
}

/// Роль стороны в обмене
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Инициатор (аналог клиента)
    Initiator,
    /// Отвечающая сторона (аналог сервера)
    Responder,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => write!(f, "initiator"),
            Role::Responder => write!(f, "responder"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{LineEnding, TextToken};

    #[test]
    fn test_script_accessors() {
        let script = ToneBurstScript::new(vec![ToneBurstStep::Speak(StructuredText::new(
            vec![
                TextToken::literal("220 Go ahead"),
                TextToken::newline(LineEnding::Crlf),
            ],
        ))]);

        assert_eq!(script.len(), 1);
        assert!(!script.is_empty());
        assert!(matches!(script.steps()[0], ToneBurstStep::Speak(_)));
    }

    #[test]
    fn test_protocol_serde_names() {
        assert_eq!(
            serde_json::to_string(&MimicProtocol::Smtp).unwrap(),
            "\"smtp\""
        );
        assert_eq!(serde_json::to_string(&Role::Responder).unwrap(), "\"responder\"");

        let parsed: MimicProtocol = serde_json::from_str("\"pop3\"").unwrap();
        assert_eq!(parsed, MimicProtocol::Pop3);
    }

    #[test]
    fn test_display() {
        assert_eq!(MimicProtocol::Smtp.to_string(), "smtp");
        assert_eq!(Role::Initiator.to_string(), "initiator");
    }
}
