//! Структурированный текст: грамматика фрагментов протокольного обмена
//!
//! Грамматика описывает либо текст для отправки дословно, либо текст,
//! ожидаемый от удалённой стороны, как упорядоченную последовательность
//! типизированных токенов: литерал, шаблон (регулярное выражение) и
//! окончание строки. Последовательность неизменяема после построения.

use regex::Regex;

use crate::error::{MimicryError, Result};

/// Окончание строки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// `\r\n`
    Crlf,
    /// `\n`
    Lf,
}

impl LineEnding {
    /// Литеральное представление окончания строки
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Crlf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

/// Шаблон переменного фрагмента текста
///
/// Регулярное выражение компилируется при построении и якорится с обеих
/// сторон: при сопоставлении оно проверяется на точное совпадение с
/// префиксом кандидата. Наружу поднимается не более одной группы захвата.
///
/// Шаблон описывает переменное поле, каждый частичный ввод которого сам
/// является совпадением (повторение символьного класса). Фиксированный
/// текст выражается литеральными токенами.
#[derive(Debug, Clone)]
pub struct TextPattern {
    source: String,
    exact: Regex,
}

impl TextPattern {
    /// Скомпилировать шаблон
    ///
    /// Некорректное регулярное выражение — ошибка времени построения
    /// грамматики, а не времени сопоставления.
    pub fn new(pattern: &str) -> Result<Self> {
        let exact = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
            MimicryError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self {
            source: pattern.to_string(),
            exact,
        })
    }

    /// Исходный текст шаблона
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Точное совпадение шаблона с кандидатом целиком
    ///
    /// Возвращает `None`, если совпадения нет, иначе значение первой группы
    /// захвата (или `None` внутри, если групп в шаблоне нет).
    fn exact_capture(&self, candidate: &str) -> Option<Option<String>> {
        let caps = self.exact.captures(candidate)?;
        Some(caps.get(1).map(|m| m.as_str().to_string()))
    }
}

/// Типизированный токен грамматики
#[derive(Debug, Clone)]
pub enum TextToken {
    /// Текст, который должен совпасть дословно
    Literal(String),
    /// Переменный фрагмент, описанный регулярным выражением
    Pattern(TextPattern),
    /// Окончание строки
    Newline(LineEnding),
}

impl TextToken {
    /// Литеральный токен
    pub fn literal(text: impl Into<String>) -> Self {
        TextToken::Literal(text.into())
    }

    /// Токен-шаблон
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(TextToken::Pattern(TextPattern::new(pattern)?))
    }

    /// Токен окончания строки
    pub fn newline(ending: LineEnding) -> Self {
        TextToken::Newline(ending)
    }
}

/// Вердикт сопоставления грамматики с накопленным буфером
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Буфер — допустимый префикс, нужны ещё байты
    Incomplete,
    /// Буфер уже никогда не сможет удовлетворить грамматику
    Failed,
    /// Грамматика совпала целиком; внутри — захват последнего шаблона
    Success(Option<String>),
}

/// Упорядоченная последовательность токенов грамматики
///
/// Последовательность фиксируется при построении и не меняется. Одна и та
/// же грамматика безопасно разделяется между сессиями только на чтение.
#[derive(Debug, Clone)]
pub struct StructuredText {
    tokens: Vec<TextToken>,
}

impl StructuredText {
    /// Построить грамматику из последовательности токенов
    pub fn new(tokens: Vec<TextToken>) -> Self {
        Self { tokens }
    }

    /// Токены грамматики
    pub fn tokens(&self) -> &[TextToken] {
        &self.tokens
    }

    /// Отрисовать грамматику в текст для отправки
    ///
    /// Допустимо только для грамматик из литералов и окончаний строк;
    /// шаблоны описывают приём, а не передачу.
    pub fn render(&self) -> Result<String> {
        let mut rendered = String::new();

        for token in &self.tokens {
            match token {
                TextToken::Literal(text) => rendered.push_str(text),
                TextToken::Newline(ending) => rendered.push_str(ending.as_str()),
                TextToken::Pattern(_) => return Err(MimicryError::RenderUnsupported),
            }
        }

        Ok(rendered)
    }

    /// Сопоставить грамматику с кандидатом, якорясь в его начале
    ///
    /// Сопоставление идёт токен за токеном. Точное совпадение внутреннего
    /// токена, оставляющее непустой остаток, не является успехом: успех
    /// наступает только когда совпали все токены и остатка нет.
    pub fn match_text(&self, candidate: &str) -> MatchOutcome {
        match_tokens(&self.tokens, candidate)
    }
}

fn match_tokens(tokens: &[TextToken], rest: &str) -> MatchOutcome {
    let Some((head, tail)) = tokens.split_first() else {
        // Токены кончились: успех только при полностью съеденном кандидате
        return if rest.is_empty() {
            MatchOutcome::Success(None)
        } else {
            MatchOutcome::Failed
        };
    };

    match head {
        TextToken::Literal(text) => match_fixed(text, tail, rest),
        TextToken::Newline(ending) => match_fixed(ending.as_str(), tail, rest),
        TextToken::Pattern(pattern) => match_pattern(pattern, tail, rest),
    }
}

fn match_fixed(text: &str, tail: &[TextToken], rest: &str) -> MatchOutcome {
    if let Some(remainder) = rest.strip_prefix(text) {
        match_tokens(tail, remainder)
    } else if text.starts_with(rest) {
        // Буфер оборвался внутри ожидаемого текста
        MatchOutcome::Incomplete
    } else {
        MatchOutcome::Failed
    }
}

fn match_pattern(pattern: &TextPattern, tail: &[TextToken], rest: &str) -> MatchOutcome {
    let mut pending = false;

    // Жадное сопоставление с откатом: длинные варианты первыми
    for split in (0..=rest.len()).rev() {
        if !rest.is_char_boundary(split) {
            continue;
        }

        let Some(captured) = pattern.exact_capture(&rest[..split]) else {
            continue;
        };

        match match_tokens(tail, &rest[split..]) {
            MatchOutcome::Success(later) => {
                // Захват самого позднего шаблона имеет приоритет
                return MatchOutcome::Success(later.or(captured));
            }
            MatchOutcome::Incomplete => pending = true,
            MatchOutcome::Failed => {}
        }
    }

    if pending || rest.is_empty() {
        MatchOutcome::Incomplete
    } else {
        MatchOutcome::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeting() -> StructuredText {
        StructuredText::new(vec![
            TextToken::literal("220 "),
            TextToken::pattern("([a-zA-Z0-9.-]+)").unwrap(),
            TextToken::literal(" SMTP service ready"),
            TextToken::newline(LineEnding::Crlf),
        ])
    }

    #[test]
    fn test_render_literals() {
        let text = StructuredText::new(vec![
            TextToken::literal("220 Go ahead"),
            TextToken::newline(LineEnding::Crlf),
        ]);

        assert_eq!(text.render().unwrap(), "220 Go ahead\r\n");
    }

    #[test]
    fn test_render_rejects_patterns() {
        let text = StructuredText::new(vec![
            TextToken::literal("220 "),
            TextToken::pattern("(.+)").unwrap(),
        ]);

        assert!(matches!(
            text.render(),
            Err(MimicryError::RenderUnsupported)
        ));
    }

    #[test]
    fn test_invalid_pattern_is_construction_error() {
        assert!(matches!(
            TextToken::pattern("(["),
            Err(MimicryError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_full_match_with_capture() {
        let outcome = greeting().match_text("220 mail.imc.org SMTP service ready\r\n");
        assert_eq!(
            outcome,
            MatchOutcome::Success(Some("mail.imc.org".to_string()))
        );
    }

    #[test]
    fn test_every_strict_prefix_is_incomplete() {
        let text = greeting();
        let full = "220 mail.imc.org SMTP service ready\r\n";

        for end in 1..full.len() {
            assert_eq!(
                text.match_text(&full[..end]),
                MatchOutcome::Incomplete,
                "префикс длиной {} должен быть неполным",
                end
            );
        }
    }

    #[test]
    fn test_altered_byte_fails() {
        // 'S' в " SMTP" заменена на 'X'
        let outcome = greeting().match_text("220 mail.imc.org XMTP");
        assert_eq!(outcome, MatchOutcome::Failed);
    }

    #[test]
    fn test_interior_match_is_not_success() {
        let text = StructuredText::new(vec![
            TextToken::literal("STARTTLS"),
            TextToken::newline(LineEnding::Crlf),
        ]);

        // Первый токен совпал целиком, но остаток ещё ждёт CRLF
        assert_eq!(text.match_text("STARTTLS"), MatchOutcome::Incomplete);
        assert_eq!(text.match_text("STARTTLS\r"), MatchOutcome::Incomplete);
        assert_eq!(
            text.match_text("STARTTLS\r\n"),
            MatchOutcome::Success(None)
        );
    }

    #[test]
    fn test_trailing_bytes_fail() {
        let text = StructuredText::new(vec![
            TextToken::literal("STARTTLS"),
            TextToken::newline(LineEnding::Crlf),
        ]);

        assert_eq!(text.match_text("STARTTLS\r\nX"), MatchOutcome::Failed);
    }

    #[test]
    fn test_pattern_backtracks_before_newline() {
        // Жадный шаблон обязан откатиться, чтобы CRLF достался своему токену
        let text = StructuredText::new(vec![
            TextToken::pattern("(.+)").unwrap(),
            TextToken::newline(LineEnding::Crlf),
        ]);

        assert_eq!(
            text.match_text("220 Go ahead\r\n"),
            MatchOutcome::Success(Some("220 Go ahead".to_string()))
        );
        assert_eq!(text.match_text("220 Go ahead\r"), MatchOutcome::Incomplete);
    }

    #[test]
    fn test_render_then_match_round_trip() {
        let text = StructuredText::new(vec![
            TextToken::literal("250-8BITMIME"),
            TextToken::newline(LineEnding::Crlf),
            TextToken::literal("250 STARTTLS"),
            TextToken::newline(LineEnding::Crlf),
        ]);

        let rendered = text.render().unwrap();
        assert_eq!(text.match_text(&rendered), MatchOutcome::Success(None));
    }

    #[test]
    fn test_capture_of_last_pattern_wins() {
        let text = StructuredText::new(vec![
            TextToken::pattern("([0-9]+)").unwrap(),
            TextToken::literal(" "),
            TextToken::pattern("([a-z]+)").unwrap(),
        ]);

        assert_eq!(
            text.match_text("250 ok"),
            MatchOutcome::Success(Some("ok".to_string()))
        );
    }

    #[test]
    fn test_pattern_without_group_captures_nothing() {
        let text = StructuredText::new(vec![
            TextToken::pattern("[A-Z]+").unwrap(),
            TextToken::newline(LineEnding::Crlf),
        ]);

        assert_eq!(text.match_text("EHLO\r\n"), MatchOutcome::Success(None));
    }

    #[test]
    fn test_empty_candidate_is_incomplete() {
        assert_eq!(greeting().match_text(""), MatchOutcome::Incomplete);
    }
}
