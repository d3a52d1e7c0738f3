//! Профиль мимикрии SMTP
//!
//! Имитирует начало почтовой сессии вплоть до согласования STARTTLS: после
//! «220 Go ahead» настоящий почтовый обмен перешёл бы на TLS, поэтому
//! передача соединения внешнему слою обфускации выглядит для наблюдателя
//! как штатное продолжение протокола.
//!
//! Сценарии двух ролей зеркальны: каждый «сказанный» текст одной роли
//! дословно принимается грамматикой парного шага другой роли, так что
//! согласные стороны всегда проходят одинаковое число шагов в ногу.

use crate::error::Result;
use crate::script::{ToneBurstScript, ToneBurstStep};
use crate::text::{LineEnding, StructuredText, TextToken};

/// Лимит байт на шаг прослушивания инициатора
const MAX_REPLY_BYTES: usize = 255;

/// Лимит байт на команду, принимаемую отвечающей стороной
const MAX_COMMAND_BYTES: usize = 253;

/// Доменное имя, которым представляются обе стороны
const HOSTNAME: &str = "mail.imc.org";

/// Шаблон доменного имени в приветствии
const HOSTNAME_PATTERN: &str = "([a-zA-Z0-9.-]+)";

/// Шаблон произвольной непустой строки ответа
const ANY_REPLY_PATTERN: &str = "(.+)";

/// Строки баннера возможностей, завершающего ответ на EHLO
const CAPABILITY_BANNER: &[&str] = &[
    "250-mail.imc.org offers a warm hug of welcome",
    "250-8BITMIME",
    "250-DSN",
    "250 STARTTLS",
];

/// Сценарий инициатора (почтового клиента)
pub fn initiator_script() -> Result<ToneBurstScript> {
    Ok(ToneBurstScript::new(vec![
        // Приветствие сервера; доменное имя захватывается
        ToneBurstStep::Listen {
            expected: StructuredText::new(vec![
                TextToken::literal("220 "),
                TextToken::pattern(HOSTNAME_PATTERN)?,
                TextToken::literal(" SMTP service ready"),
                TextToken::newline(LineEnding::Crlf),
            ]),
            max_bytes: MAX_REPLY_BYTES,
        },
        ToneBurstStep::Speak(StructuredText::new(vec![
            TextToken::literal(format!("EHLO {}", HOSTNAME)),
            TextToken::newline(LineEnding::Crlf),
        ])),
        ToneBurstStep::Listen {
            expected: capability_banner_text(),
            max_bytes: MAX_REPLY_BYTES,
        },
        ToneBurstStep::Speak(StructuredText::new(vec![
            TextToken::literal("STARTTLS"),
            TextToken::newline(LineEnding::Crlf),
        ])),
        // Подтверждение перехода; точный текст сервера не важен
        ToneBurstStep::Listen {
            expected: StructuredText::new(vec![
                TextToken::pattern(ANY_REPLY_PATTERN)?,
                TextToken::newline(LineEnding::Crlf),
            ]),
            max_bytes: MAX_REPLY_BYTES,
        },
    ]))
}

/// Сценарий отвечающей стороны (почтового сервера)
pub fn responder_script() -> Result<ToneBurstScript> {
    Ok(ToneBurstScript::new(vec![
        ToneBurstStep::Speak(StructuredText::new(vec![
            TextToken::literal(format!("220 {} SMTP service ready", HOSTNAME)),
            TextToken::newline(LineEnding::Crlf),
        ])),
        // EHLO с любым корректным доменным именем клиента
        ToneBurstStep::Listen {
            expected: StructuredText::new(vec![
                TextToken::literal("EHLO "),
                TextToken::pattern(HOSTNAME_PATTERN)?,
                TextToken::newline(LineEnding::Crlf),
            ]),
            max_bytes: MAX_COMMAND_BYTES,
        },
        ToneBurstStep::Speak(capability_banner_text()),
        ToneBurstStep::Listen {
            expected: StructuredText::new(vec![
                TextToken::literal("STARTTLS"),
                TextToken::newline(LineEnding::Crlf),
            ]),
            max_bytes: MAX_COMMAND_BYTES,
        },
        ToneBurstStep::Speak(StructuredText::new(vec![
            TextToken::literal("220 Go ahead"),
            TextToken::newline(LineEnding::Crlf),
        ])),
    ]))
}

/// Баннер возможностей как структурированный текст
///
/// Используется с обеих сторон: отвечающая сторона его произносит,
/// инициатор принимает дословно.
fn capability_banner_text() -> StructuredText {
    let mut tokens = Vec::with_capacity(CAPABILITY_BANNER.len() * 2);
    for line in CAPABILITY_BANNER {
        tokens.push(TextToken::literal(*line));
        tokens.push(TextToken::newline(LineEnding::Crlf));
    }
    StructuredText::new(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::MatchOutcome;

    #[test]
    fn test_step_counts_match() {
        let initiator = initiator_script().unwrap();
        let responder = responder_script().unwrap();

        assert_eq!(initiator.len(), 5);
        assert_eq!(responder.len(), 5);
    }

    #[test]
    fn test_scripts_are_mutually_consistent() {
        let initiator = initiator_script().unwrap();
        let responder = responder_script().unwrap();

        for (ours, theirs) in initiator.steps().iter().zip(responder.steps()) {
            match (ours, theirs) {
                (ToneBurstStep::Listen { expected, .. }, ToneBurstStep::Speak(text))
                | (ToneBurstStep::Speak(text), ToneBurstStep::Listen { expected, .. }) => {
                    let rendered = text.render().unwrap();
                    assert!(
                        matches!(expected.match_text(&rendered), MatchOutcome::Success(_)),
                        "произнесённый текст {:?} не принят парной грамматикой",
                        rendered
                    );
                }
                _ => panic!("шаги ролей не чередуются"),
            }
        }
    }

    #[test]
    fn test_greeting_captures_hostname() {
        let initiator = initiator_script().unwrap();
        let ToneBurstStep::Listen { expected, .. } = &initiator.steps()[0] else {
            panic!("первый шаг инициатора должен слушать");
        };

        let outcome = expected.match_text("220 mx7.example.net SMTP service ready\r\n");
        assert_eq!(
            outcome,
            MatchOutcome::Success(Some("mx7.example.net".to_string()))
        );
    }

    #[test]
    fn test_spoken_lines_fit_command_limit() {
        for script in [initiator_script().unwrap(), responder_script().unwrap()] {
            for step in script.steps() {
                if let ToneBurstStep::Speak(text) = step {
                    assert!(text.render().unwrap().len() <= MAX_COMMAND_BYTES);
                }
            }
        }
    }
}
